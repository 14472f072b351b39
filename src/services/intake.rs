use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Extensions accepted for reference uploads
pub const ALLOWED_EXTENSIONS: [&str; 5] = ["pdf", "txt", "docx", "xlsx", "csv"];

/// Errors that can occur while storing an upload
#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("failed to write upload {path}: {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Reference file intake
///
/// Validates the extension against the allow-list, sanitizes the filename
/// and writes the bytes into the upload directory. Upload lifetime is an
/// explicit policy: with `persist` off, `finish` removes the file once its
/// text has been extracted.
pub struct FileIntake {
    upload_dir: PathBuf,
    persist: bool,
}

impl FileIntake {
    pub fn new(upload_dir: impl Into<PathBuf>, persist: bool) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            persist,
        }
    }

    /// Check a filename against the extension allow-list
    pub fn allowed_file(filename: &str) -> bool {
        extension(filename)
            .map(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
            .unwrap_or(false)
    }

    /// Write an accepted upload to the upload directory.
    ///
    /// The stored name is the sanitized original prefixed with a short
    /// unique id, so concurrent uploads of the same filename never
    /// overwrite each other.
    pub fn store(&self, original_name: &str, data: &[u8]) -> Result<PathBuf, IntakeError> {
        fs::create_dir_all(&self.upload_dir).map_err(|source| IntakeError::WriteFailed {
            path: self.upload_dir.display().to_string(),
            source,
        })?;

        let unique = uuid::Uuid::new_v4().simple().to_string();
        let stored_name = format!("{}_{}", &unique[..8], sanitize_filename(original_name));
        let path = self.upload_dir.join(stored_name);

        fs::write(&path, data).map_err(|source| IntakeError::WriteFailed {
            path: path.display().to_string(),
            source,
        })?;

        tracing::debug!("Stored upload {} ({} bytes)", path.display(), data.len());

        Ok(path)
    }

    /// Apply the upload retention policy after extraction
    pub fn finish(&self, path: &Path) {
        if self.persist {
            return;
        }
        if let Err(e) = fs::remove_file(path) {
            tracing::warn!("Failed to remove upload {}: {}", path.display(), e);
        }
    }
}

/// Reduce a client-supplied filename to a filesystem-safe form.
///
/// Keeps ASCII alphanumerics, dots, dashes and underscores; everything else
/// (path separators included) becomes an underscore. Leading dots are
/// stripped so a stored name can never be hidden or traverse upward.
pub fn sanitize_filename(name: &str) -> String {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(name);

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let cleaned = cleaned.trim_start_matches('.').to_string();

    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

fn extension(filename: &str) -> Option<String> {
    let name = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() {
        return None;
    }
    Some(ext.to_lowercase())
}

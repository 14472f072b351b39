use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while extracting text from a stored upload
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("failed to decode {path}: {message}")]
    Decode { path: String, message: String },
}

/// Extract plain text from a stored reference file.
///
/// Dispatches on the file extension; each format is handled by its
/// ecosystem crate. Corrupt or unreadable content surfaces as a
/// [`ExtractError::Decode`].
pub fn extract_text(path: &Path) -> Result<String, ExtractError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    let text = match ext.as_str() {
        "txt" => std::fs::read_to_string(path).map_err(|source| ExtractError::Io {
            path: path.display().to_string(),
            source,
        })?,
        "pdf" => pdf_text(path)?,
        "csv" => csv_text(path)?,
        "xlsx" => xlsx_text(path)?,
        "docx" => docx_text(path)?,
        other => return Err(ExtractError::UnsupportedType(other.to_string())),
    };

    tracing::debug!(
        "Extracted {} chars from {}",
        text.chars().count(),
        path.display()
    );

    Ok(text)
}

fn pdf_text(path: &Path) -> Result<String, ExtractError> {
    pdf_extract::extract_text(path).map_err(|e| ExtractError::Decode {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

fn csv_text(path: &Path) -> Result<String, ExtractError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| ExtractError::Decode {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

    let mut out = String::new();
    for record in reader.records() {
        let record = record.map_err(|e| ExtractError::Decode {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let line = record.iter().collect::<Vec<_>>().join(", ");
        if !line.trim().is_empty() {
            out.push_str(&line);
            out.push('\n');
        }
    }

    Ok(out)
}

fn xlsx_text(path: &Path) -> Result<String, ExtractError> {
    use calamine::Reader;

    let mut workbook = calamine::open_workbook_auto(path).map_err(|e| ExtractError::Decode {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    let mut out = String::new();
    for sheet in workbook.sheet_names().to_owned() {
        let range = workbook
            .worksheet_range(&sheet)
            .map_err(|e| ExtractError::Decode {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        for row in range.rows() {
            let line = row
                .iter()
                .map(|cell| cell.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            if !line.chars().all(|c| c == ',' || c.is_whitespace()) {
                out.push_str(&line);
                out.push('\n');
            }
        }
    }

    Ok(out)
}

/// Pull paragraph text out of the WordprocessingML part of a .docx package
fn docx_text(path: &Path) -> Result<String, ExtractError> {
    use quick_xml::events::Event;
    use quick_xml::Reader;

    let decode = |message: String| ExtractError::Decode {
        path: path.display().to_string(),
        message,
    };

    let file = File::open(path).map_err(|source| ExtractError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let mut archive = zip::ZipArchive::new(file).map_err(|e| decode(e.to_string()))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| decode(e.to_string()))?
        .read_to_string(&mut xml)
        .map_err(|e| decode(e.to_string()))?;

    let mut reader = Reader::from_str(&xml);
    let mut out = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Text(t)) => {
                let text = t.unescape().map_err(|e| decode(e.to_string()))?;
                out.push_str(&text);
            }
            // Paragraph boundaries become newlines
            Ok(Event::End(e)) if e.name().as_ref() == b"w:p" => out.push('\n'),
            Ok(Event::Eof) => break,
            Err(e) => return Err(decode(e.to_string())),
            _ => {}
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_extract_txt() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "plain text content").unwrap();

        let text = extract_text(&path).unwrap();
        assert_eq!(text, "plain text content");
    }

    #[test]
    fn test_extract_csv() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(&path, "name,score\nalice,90\nbob,85\n").unwrap();

        let text = extract_text(&path).unwrap();
        assert!(text.contains("name, score"));
        assert!(text.contains("alice, 90"));
    }

    #[test]
    fn test_extract_docx() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.docx");

        // Minimal WordprocessingML package
        let file = File::create(&path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("word/document.xml", options).unwrap();
        zip.write_all(
            br#"<?xml version="1.0"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r><w:t>First paragraph</w:t></w:r></w:p><w:p><w:r><w:t>Second paragraph</w:t></w:r></w:p></w:body></w:document>"#,
        )
        .unwrap();
        zip.finish().unwrap();

        let text = extract_text(&path).unwrap();
        assert!(text.contains("First paragraph"));
        assert!(text.contains("Second paragraph"));
        assert!(text.contains('\n'));
    }

    #[test]
    fn test_extract_unsupported_type() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("image.png");
        std::fs::write(&path, [0u8; 8]).unwrap();

        let err = extract_text(&path).unwrap_err();
        assert!(matches!(err, ExtractError::UnsupportedType(_)));
    }

    #[test]
    fn test_extract_corrupt_docx() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.docx");
        std::fs::write(&path, b"this is not a zip archive").unwrap();

        let err = extract_text(&path).unwrap_err();
        assert!(matches!(err, ExtractError::Decode { .. }));
    }

    #[test]
    fn test_extract_missing_txt() {
        let err = extract_text(Path::new("/nonexistent/notes.txt")).unwrap_err();
        assert!(matches!(err, ExtractError::Io { .. }));
    }
}

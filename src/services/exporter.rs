use crate::models::{ExportFormat, Question};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while exporting questions
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no questions to export")]
    NoQuestions,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("spreadsheet encoding failed: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("document packaging failed: {0}")]
    Zip(#[from] zip::result::ZipError),
}

const COLUMN_HEADERS: [&str; 6] = [
    "Type",
    "Difficulty",
    "Question",
    "Options",
    "Answer",
    "Explanation",
];

/// Question export service
///
/// Serializes a question list into a downloadable artifact. Artifacts are
/// consumed once: `take` returns the bytes and removes the file, so the
/// export directory never accumulates.
pub struct Exporter {
    export_dir: PathBuf,
}

impl Exporter {
    pub fn new(export_dir: impl Into<PathBuf>) -> Self {
        Self {
            export_dir: export_dir.into(),
        }
    }

    /// Serialize `questions` into a new file in the export directory
    pub fn export(
        &self,
        questions: &[Question],
        format: ExportFormat,
    ) -> Result<PathBuf, ExportError> {
        if questions.is_empty() {
            return Err(ExportError::NoQuestions);
        }

        fs::create_dir_all(&self.export_dir)?;

        let unique = uuid::Uuid::new_v4().simple().to_string();
        let filename = format!(
            "questions_{}_{}.{}",
            chrono::Local::now().format("%Y%m%d_%H%M%S"),
            &unique[..8],
            format.extension()
        );
        let path = self.export_dir.join(filename);

        match format {
            ExportFormat::Xlsx => write_xlsx(&path, questions)?,
            ExportFormat::Csv => write_csv(&path, questions)?,
            ExportFormat::Docx => write_docx(&path, questions)?,
        }

        tracing::info!(
            "Exported {} questions to {}",
            questions.len(),
            path.display()
        );

        Ok(path)
    }

    /// Read the artifact bytes and delete the file
    pub fn take(&self, path: &Path) -> Result<Vec<u8>, ExportError> {
        let bytes = fs::read(path)?;
        if let Err(e) = fs::remove_file(path) {
            tracing::warn!("Failed to remove export {}: {}", path.display(), e);
        }
        Ok(bytes)
    }
}

fn joined_options(question: &Question) -> String {
    question
        .options
        .iter()
        .enumerate()
        .map(|(i, option)| format!("{}. {}", (b'A' + (i % 26) as u8) as char, option))
        .collect::<Vec<_>>()
        .join("\n")
}

fn write_xlsx(path: &Path, questions: &[Question]) -> Result<(), ExportError> {
    use rust_xlsxwriter::{Format, Workbook};

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    let bold = Format::new().set_bold();
    for (col, header) in COLUMN_HEADERS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *header, &bold)?;
    }

    for (i, q) in questions.iter().enumerate() {
        let row = i as u32 + 1;
        worksheet.write_string(row, 0, q.question_type.label())?;
        worksheet.write_string(row, 1, q.difficulty.label())?;
        worksheet.write_string(row, 2, q.question.as_str())?;
        worksheet.write_string(row, 3, joined_options(q))?;
        worksheet.write_string(row, 4, q.answer.as_str())?;
        worksheet.write_string(row, 5, q.explanation.as_deref().unwrap_or(""))?;
    }

    worksheet.set_column_width(2, 60.0)?;
    worksheet.set_column_width(3, 40.0)?;
    worksheet.set_column_width(5, 40.0)?;

    workbook.save(path)?;
    Ok(())
}

fn write_csv(path: &Path, questions: &[Question]) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_path(path)?;

    writer.write_record(COLUMN_HEADERS)?;
    for q in questions {
        writer.write_record([
            q.question_type.label(),
            q.difficulty.label(),
            q.question.as_str(),
            joined_options(q).as_str(),
            q.answer.as_str(),
            q.explanation.as_deref().unwrap_or(""),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Write a minimal WordprocessingML package: content types, package
/// relationships and one document part with a paragraph per line.
fn write_docx(path: &Path, questions: &[Question]) -> Result<(), ExportError> {
    use zip::write::SimpleFileOptions;

    let file = fs::File::create(path)?;
    let mut zip = zip::ZipWriter::new(file);
    let options = SimpleFileOptions::default();

    zip.start_file("[Content_Types].xml", options)?;
    zip.write_all(CONTENT_TYPES_XML.as_bytes())?;

    zip.start_file("_rels/.rels", options)?;
    zip.write_all(RELS_XML.as_bytes())?;

    zip.start_file("word/document.xml", options)?;
    zip.write_all(document_xml(questions).as_bytes())?;

    zip.finish()?;
    Ok(())
}

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
</Types>"#;

const RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#;

fn document_xml(questions: &[Question]) -> String {
    let mut body = String::new();

    for (i, q) in questions.iter().enumerate() {
        push_paragraph(
            &mut body,
            &format!(
                "{}. [{} / {}] {}",
                i + 1,
                q.question_type.label(),
                q.difficulty.label(),
                q.question
            ),
        );
        for (j, option) in q.options.iter().enumerate() {
            push_paragraph(
                &mut body,
                &format!("    {}. {}", (b'A' + (j % 26) as u8) as char, option),
            );
        }
        push_paragraph(&mut body, &format!("Answer: {}", q.answer));
        if let Some(explanation) = &q.explanation {
            push_paragraph(&mut body, &format!("Explanation: {}", explanation));
        }
        push_paragraph(&mut body, "");
    }

    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
        body
    )
}

fn push_paragraph(body: &mut String, text: &str) {
    body.push_str("<w:p><w:r><w:t xml:space=\"preserve\">");
    body.push_str(&xml_escape(text));
    body.push_str("</w:t></w:r></w:p>");
}

fn xml_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Difficulty, QuestionType};
    use tempfile::TempDir;

    fn sample_questions() -> Vec<Question> {
        vec![
            Question {
                question_type: QuestionType::MultipleChoice,
                difficulty: Difficulty::Easy,
                question: "What is 2 + 2?".to_string(),
                options: vec![
                    "3".to_string(),
                    "4".to_string(),
                    "5".to_string(),
                    "6".to_string(),
                ],
                answer: "4".to_string(),
                explanation: Some("Basic arithmetic.".to_string()),
            },
            Question {
                question_type: QuestionType::Essay,
                difficulty: Difficulty::Hard,
                question: "Discuss A & B < C.".to_string(),
                options: vec![],
                answer: "Key points only.".to_string(),
                explanation: None,
            },
        ]
    }

    #[test]
    fn test_export_empty_list_fails() {
        let dir = TempDir::new().unwrap();
        let exporter = Exporter::new(dir.path());

        let err = exporter.export(&[], ExportFormat::Xlsx).unwrap_err();
        assert!(matches!(err, ExportError::NoQuestions));
    }

    #[test]
    fn test_export_xlsx_creates_file() {
        let dir = TempDir::new().unwrap();
        let exporter = Exporter::new(dir.path());

        let path = exporter
            .export(&sample_questions(), ExportFormat::Xlsx)
            .unwrap();

        assert!(path.exists());
        assert_eq!(path.extension().unwrap(), "xlsx");
    }

    #[test]
    fn test_export_csv_contains_rows() {
        let dir = TempDir::new().unwrap();
        let exporter = Exporter::new(dir.path());

        let path = exporter
            .export(&sample_questions(), ExportFormat::Csv)
            .unwrap();
        let content = fs::read_to_string(&path).unwrap();

        assert!(content.starts_with("Type,Difficulty,Question"));
        assert!(content.contains("What is 2 + 2?"));
        assert!(content.contains("multiple choice"));
    }

    #[test]
    fn test_export_docx_is_readable_package() {
        let dir = TempDir::new().unwrap();
        let exporter = Exporter::new(dir.path());

        let path = exporter
            .export(&sample_questions(), ExportFormat::Docx)
            .unwrap();

        // The docx must round-trip through our own extractor
        let text = crate::services::extract::extract_text(&path).unwrap();
        assert!(text.contains("What is 2 + 2?"));
        assert!(text.contains("Answer: 4"));
        // Markup characters in question text must survive escaping
        assert!(text.contains("Discuss A & B < C."));
    }

    #[test]
    fn test_take_consumes_artifact() {
        let dir = TempDir::new().unwrap();
        let exporter = Exporter::new(dir.path());

        let path = exporter
            .export(&sample_questions(), ExportFormat::Csv)
            .unwrap();
        let bytes = exporter.take(&path).unwrap();

        assert!(!bytes.is_empty());
        assert!(!path.exists());
    }

    #[test]
    fn test_xml_escape() {
        assert_eq!(xml_escape("a & b"), "a &amp; b");
        assert_eq!(xml_escape("<tag>"), "&lt;tag&gt;");
        assert_eq!(xml_escape("plain"), "plain");
    }
}

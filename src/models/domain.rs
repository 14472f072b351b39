use serde::{Deserialize, Serialize};

/// A generated exam question
///
/// This is the wire shape returned by the generation endpoints and accepted
/// back by the export endpoint. `options` is only populated for
/// multiple-choice questions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "questionType")]
    pub question_type: QuestionType,
    pub difficulty: Difficulty,
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
    pub answer: String,
    #[serde(default)]
    pub explanation: Option<String>,
}

/// Supported question types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionType {
    MultipleChoice,
    FillInBlank,
    TrueFalse,
    ShortAnswer,
    Essay,
}

impl QuestionType {
    /// Parse the form-field value sent by the frontend
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "multiple-choice" | "multiple_choice" => Some(Self::MultipleChoice),
            "fill-in-blank" | "fill-in" | "fill_in_blank" => Some(Self::FillInBlank),
            "true-false" | "true_false" => Some(Self::TrueFalse),
            "short-answer" | "short_answer" => Some(Self::ShortAnswer),
            "essay" => Some(Self::Essay),
            _ => None,
        }
    }

    /// Human-readable label used in prompts and export headers
    pub fn label(&self) -> &'static str {
        match self {
            Self::MultipleChoice => "multiple choice",
            Self::FillInBlank => "fill in the blank",
            Self::TrueFalse => "true or false",
            Self::ShortAnswer => "short answer",
            Self::Essay => "essay",
        }
    }
}

impl Default for QuestionType {
    fn default() -> Self {
        Self::MultipleChoice
    }
}

/// Question difficulty levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Some(Self::Easy),
            "medium" => Some(Self::Medium),
            "hard" => Some(Self::Hard),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::Medium
    }
}

/// Parameters for a generation call
///
/// Transient: built per request from form fields plus the extracted
/// reference text, never persisted.
#[derive(Debug, Clone, Default)]
pub struct GenerationParams {
    pub subject: String,
    pub topic: String,
    pub difficulty: Difficulty,
    pub context: String,
    pub reference_text: String,
}

/// Target formats for question export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Xlsx,
    Csv,
    Docx,
}

impl ExportFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "xlsx" | "excel" => Some(Self::Xlsx),
            "csv" => Some(Self::Csv),
            "docx" | "word" => Some(Self::Docx),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Csv => "csv",
            Self::Docx => "docx",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            Self::Csv => "text/csv",
            Self::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }
}

impl Default for ExportFormat {
    fn default() -> Self {
        Self::Xlsx
    }
}

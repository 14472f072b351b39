use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::Question;

/// Request body for the export endpoint
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ExportRequest {
    #[validate(length(min = 1, message = "no questions to export"))]
    pub questions: Vec<Question>,
    /// Target format tag; defaults to xlsx when absent
    #[serde(default)]
    pub format: Option<String>,
}

/// Fields collected from the multipart generation forms.
///
/// Multipart bodies bypass serde, so the handlers collect fields into this
/// struct by name. Missing fields fall back to empty strings / defaults,
/// mirroring the original form semantics.
#[derive(Debug, Clone, Default)]
pub struct GenerationForm {
    pub subject: String,
    pub topic: String,
    pub question_type: String,
    pub question_types: Vec<String>,
    pub difficulty: String,
    pub context: String,
    pub num_questions: Option<usize>,
    /// Original filename and raw bytes of the uploaded reference file
    pub reference_file: Option<(String, Vec<u8>)>,
}

// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{Difficulty, ExportFormat, GenerationParams, Question, QuestionType};
pub use requests::{ExportRequest, GenerationForm};
pub use responses::{ErrorResponse, HealthResponse};

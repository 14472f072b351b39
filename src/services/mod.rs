// Service exports
pub mod exporter;
pub mod extract;
pub mod generator;
pub mod intake;
pub mod llm;

pub use exporter::{ExportError, Exporter};
pub use extract::{extract_text, ExtractError};
pub use generator::{GeneratorError, QuestionGenerator};
pub use intake::{sanitize_filename, FileIntake, IntakeError, ALLOWED_EXTENSIONS};
pub use llm::{LlmClient, LlmError};

//! Examgen - LLM-backed exam question generation service
//!
//! This library provides the building blocks of the examgen web backend:
//! prompt construction and response parsing for the LLM collaborator, file
//! intake and text extraction for reference uploads, and spreadsheet /
//! document export of generated questions.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use self::core::{build_question_prompt, parse_question, strip_code_fences, SYSTEM_PROMPT};
pub use models::{
    Difficulty, ErrorResponse, ExportFormat, ExportRequest, GenerationParams, Question,
    QuestionType,
};
pub use services::{Exporter, FileIntake, LlmClient, QuestionGenerator};

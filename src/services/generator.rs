use crate::core::{build_question_prompt, parse_question, ParseError, SYSTEM_PROMPT};
use crate::models::{GenerationParams, Question, QuestionType};
use crate::services::llm::{LlmClient, LlmError};
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur while generating questions
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("LLM call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("failed to parse LLM response: {0}")]
    Parse(#[from] ParseError),
}

/// Question generation orchestrator
///
/// Builds prompts from request parameters, delegates to the LLM client and
/// parses the replies into [`Question`] records.
pub struct QuestionGenerator {
    llm: Arc<LlmClient>,
    max_reference_chars: usize,
}

impl QuestionGenerator {
    pub fn new(llm: Arc<LlmClient>, max_reference_chars: usize) -> Self {
        Self {
            llm,
            max_reference_chars,
        }
    }

    /// Generate a single question of the given type
    pub async fn generate_single(
        &self,
        params: &GenerationParams,
        question_type: QuestionType,
    ) -> Result<Question, GeneratorError> {
        let prompt = build_question_prompt(params, question_type, self.max_reference_chars);

        tracing::debug!(
            "Generating {} question for {}/{}",
            question_type.label(),
            params.subject,
            params.topic
        );

        let content = self.llm.chat(SYSTEM_PROMPT, &prompt).await?;
        let question = parse_question(&content, question_type, params.difficulty)?;

        Ok(question)
    }

    /// Generate `count` questions, cycling through the requested types.
    ///
    /// One LLM call per question so the result always has exactly `count`
    /// records. Any failure aborts the whole batch - no partial results.
    pub async fn generate_batch(
        &self,
        params: &GenerationParams,
        count: usize,
        question_types: &[QuestionType],
    ) -> Result<Vec<Question>, GeneratorError> {
        let types: &[QuestionType] = if question_types.is_empty() {
            &[QuestionType::MultipleChoice]
        } else {
            question_types
        };

        let mut questions = Vec::with_capacity(count);
        for i in 0..count {
            let question_type = types[i % types.len()];
            let question = self.generate_single(params, question_type).await?;
            questions.push(question);
        }

        tracing::info!(
            "Generated batch of {} questions for {}/{}",
            questions.len(),
            params.subject,
            params.topic
        );

        Ok(questions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LlmSettings;
    use crate::models::Difficulty;

    fn stub_settings(base_url: String) -> LlmSettings {
        LlmSettings {
            base_url,
            api_key: "test_key".to_string(),
            model: "deepseek-chat".to_string(),
            timeout_secs: 5,
            temperature: 0.7,
        }
    }

    fn params() -> GenerationParams {
        GenerationParams {
            subject: "History".to_string(),
            topic: "Roman Empire".to_string(),
            difficulty: Difficulty::Medium,
            context: String::new(),
            reference_text: String::new(),
        }
    }

    const STUB_QUESTION: &str = r#"{"choices": [{"message": {"content": "{\"question\": \"Who was the first Roman emperor?\", \"options\": [\"Caesar\", \"Augustus\", \"Nero\", \"Trajan\"], \"answer\": \"Augustus\", \"explanation\": \"Augustus ruled from 27 BC.\"}"}}]}"#;

    #[tokio::test]
    async fn test_generate_single() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(STUB_QUESTION)
            .create_async()
            .await;

        let llm = Arc::new(LlmClient::new(&stub_settings(server.url())));
        let generator = QuestionGenerator::new(llm, 6000);

        let q = generator
            .generate_single(&params(), QuestionType::MultipleChoice)
            .await
            .unwrap();

        assert_eq!(q.answer, "Augustus");
        assert_eq!(q.question_type, QuestionType::MultipleChoice);
        assert_eq!(q.difficulty, Difficulty::Medium);
    }

    #[tokio::test]
    async fn test_generate_batch_exact_count_cycles_types() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(STUB_QUESTION)
            .expect(5)
            .create_async()
            .await;

        let llm = Arc::new(LlmClient::new(&stub_settings(server.url())));
        let generator = QuestionGenerator::new(llm, 6000);

        let types = [QuestionType::MultipleChoice, QuestionType::ShortAnswer];
        let questions = generator
            .generate_batch(&params(), 5, &types)
            .await
            .unwrap();

        assert_eq!(questions.len(), 5);
        assert_eq!(questions[0].question_type, QuestionType::MultipleChoice);
        assert_eq!(questions[1].question_type, QuestionType::ShortAnswer);
        assert_eq!(questions[2].question_type, QuestionType::MultipleChoice);
        assert_eq!(questions[4].question_type, QuestionType::MultipleChoice);
    }

    #[tokio::test]
    async fn test_generate_batch_empty_types_defaults_to_multiple_choice() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(STUB_QUESTION)
            .create_async()
            .await;

        let llm = Arc::new(LlmClient::new(&stub_settings(server.url())));
        let generator = QuestionGenerator::new(llm, 6000);

        let questions = generator.generate_batch(&params(), 2, &[]).await.unwrap();

        assert_eq!(questions.len(), 2);
        assert!(questions
            .iter()
            .all(|q| q.question_type == QuestionType::MultipleChoice));
    }

    #[tokio::test]
    async fn test_generator_propagates_llm_failure() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(500)
            .with_body("upstream down")
            .create_async()
            .await;

        let llm = Arc::new(LlmClient::new(&stub_settings(server.url())));
        let generator = QuestionGenerator::new(llm, 6000);

        let err = generator
            .generate_single(&params(), QuestionType::Essay)
            .await
            .unwrap_err();

        assert!(matches!(err, GeneratorError::Llm(_)));
    }
}

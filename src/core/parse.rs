use serde_json::Value;
use thiserror::Error;

use crate::models::{Difficulty, Question, QuestionType};

/// Errors produced while turning an LLM reply into a [`Question`]
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("response is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("response contains no question object")]
    EmptyResponse,

    #[error("question object is missing the \"{0}\" field")]
    MissingField(&'static str),
}

/// Parse one question out of a raw LLM reply.
///
/// Tolerates the shapes models actually produce: a bare object, a bare
/// array, or `{"questions": [...]}`, each optionally wrapped in markdown
/// fences. The requested type and difficulty are stamped onto the result;
/// the model's own copies of those fields are ignored.
pub fn parse_question(
    raw: &str,
    question_type: QuestionType,
    difficulty: Difficulty,
) -> Result<Question, ParseError> {
    let value: Value = serde_json::from_str(strip_code_fences(raw))?;

    let object = match &value {
        Value::Object(map) if map.contains_key("questions") => map
            .get("questions")
            .and_then(|q| q.as_array())
            .and_then(|a| a.first())
            .ok_or(ParseError::EmptyResponse)?,
        Value::Array(items) => items.first().ok_or(ParseError::EmptyResponse)?,
        Value::Object(_) => &value,
        _ => return Err(ParseError::EmptyResponse),
    };

    coerce_question(object, question_type, difficulty)
}

/// Strip a leading/trailing markdown code fence, if present.
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") up to the first newline
    let rest = match rest.find('\n') {
        Some(i) => &rest[i + 1..],
        None => rest,
    };
    let rest = rest.trim_end();
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Coerce a JSON object into a [`Question`], tolerating field aliases and
/// loose answer typing (index instead of text).
fn coerce_question(
    value: &Value,
    question_type: QuestionType,
    difficulty: Difficulty,
) -> Result<Question, ParseError> {
    let question = value
        .get("question")
        .or_else(|| value.get("stem"))
        .or_else(|| value.get("prompt"))
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or(ParseError::MissingField("question"))?;

    let options: Vec<String> = value
        .get("options")
        .or_else(|| value.get("choices"))
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .map(|item| match item.as_str() {
                    Some(s) => s.trim().to_string(),
                    None => item.to_string(),
                })
                .collect()
        })
        .unwrap_or_default();

    let answer = match value.get("answer").or_else(|| value.get("correct_answer")) {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        // Some models return the index of the correct option
        Some(Value::Number(n)) => {
            let index = n.as_u64().unwrap_or(0) as usize;
            match options.get(index) {
                Some(option) => option.clone(),
                None => n.to_string(),
            }
        }
        Some(Value::Bool(b)) => {
            if *b { "True".to_string() } else { "False".to_string() }
        }
        _ => return Err(ParseError::MissingField("answer")),
    };

    let explanation = value
        .get("explanation")
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    Ok(Question {
        question_type,
        difficulty,
        question,
        options,
        answer,
        explanation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_object() {
        let raw = r#"{
            "question": "What is the capital of France?",
            "options": ["London", "Paris", "Berlin", "Madrid"],
            "answer": "Paris",
            "explanation": "Paris has been the capital since 987."
        }"#;

        let q = parse_question(raw, QuestionType::MultipleChoice, Difficulty::Easy).unwrap();
        assert_eq!(q.question, "What is the capital of France?");
        assert_eq!(q.options.len(), 4);
        assert_eq!(q.answer, "Paris");
        assert!(q.explanation.is_some());
    }

    #[test]
    fn test_parse_strips_markdown_fences() {
        let raw = "```json\n{\"question\": \"2 + 2 = ____\", \"answer\": \"4\"}\n```";

        let q = parse_question(raw, QuestionType::FillInBlank, Difficulty::Easy).unwrap();
        assert_eq!(q.question, "2 + 2 = ____");
        assert_eq!(q.answer, "4");
        assert!(q.options.is_empty());
    }

    #[test]
    fn test_parse_questions_wrapper() {
        let raw = r#"{"questions": [{"question": "Is water wet?", "options": ["True", "False"], "answer": "True"}]}"#;

        let q = parse_question(raw, QuestionType::TrueFalse, Difficulty::Medium).unwrap();
        assert_eq!(q.answer, "True");
    }

    #[test]
    fn test_parse_bare_array() {
        let raw = r#"[{"question": "Define entropy.", "answer": "A measure of disorder."}]"#;

        let q = parse_question(raw, QuestionType::ShortAnswer, Difficulty::Hard).unwrap();
        assert_eq!(q.question, "Define entropy.");
    }

    #[test]
    fn test_parse_numeric_answer_resolves_option() {
        let raw = r#"{
            "question": "Pick the prime.",
            "options": ["4", "6", "7", "9"],
            "answer": 2
        }"#;

        let q = parse_question(raw, QuestionType::MultipleChoice, Difficulty::Easy).unwrap();
        assert_eq!(q.answer, "7");
    }

    #[test]
    fn test_parse_stamps_requested_type_and_difficulty() {
        let raw = r#"{"question": "Q", "answer": "A", "questionType": "essay"}"#;

        let q = parse_question(raw, QuestionType::ShortAnswer, Difficulty::Hard).unwrap();
        assert_eq!(q.question_type, QuestionType::ShortAnswer);
        assert_eq!(q.difficulty, Difficulty::Hard);
    }

    #[test]
    fn test_parse_rejects_missing_question() {
        let raw = r#"{"answer": "42"}"#;

        let err = parse_question(raw, QuestionType::ShortAnswer, Difficulty::Easy).unwrap_err();
        assert!(matches!(err, ParseError::MissingField("question")));
    }

    #[test]
    fn test_parse_rejects_invalid_json() {
        let err =
            parse_question("the model rambled", QuestionType::Essay, Difficulty::Easy).unwrap_err();
        assert!(matches!(err, ParseError::InvalidJson(_)));
    }

    #[test]
    fn test_parse_rejects_empty_array() {
        let err = parse_question("[]", QuestionType::Essay, Difficulty::Easy).unwrap_err();
        assert!(matches!(err, ParseError::EmptyResponse));
    }

    #[test]
    fn test_strip_code_fences_variants() {
        assert_eq!(strip_code_fences("{\"a\":1}"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("  ```json\n{}\n```  "), "{}");
    }
}

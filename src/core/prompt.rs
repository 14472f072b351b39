use crate::models::{GenerationParams, QuestionType};

/// System prompt shared by all generation calls.
///
/// The model is instructed to reply with bare JSON; `parse` still strips
/// markdown fences because smaller models ignore that instruction.
pub const SYSTEM_PROMPT: &str = "You are an experienced exam author. \
You write precise, unambiguous exam questions at the requested difficulty. \
Respond with a single JSON object and nothing else - no prose, no markdown fences. \
The object must have the keys \"question\", \"answer\" and \"explanation\", \
plus \"options\" (an array of strings) for multiple-choice and true-false questions.";

/// Build the user prompt for one question.
///
/// Layout: task line, structured parameters, per-type instructions, then the
/// optional free-text context and reference material.
pub fn build_question_prompt(
    params: &GenerationParams,
    question_type: QuestionType,
    max_reference_chars: usize,
) -> String {
    let mut prompt = format!(
        "Write one {} exam question.\n\nSubject: {}\nTopic: {}\nDifficulty: {}\n",
        question_type.label(),
        params.subject,
        params.topic,
        params.difficulty.label(),
    );

    prompt.push('\n');
    prompt.push_str(type_instructions(question_type));
    prompt.push('\n');

    if !params.context.trim().is_empty() {
        prompt.push_str("\nAdditional instructions from the user:\n");
        prompt.push_str(params.context.trim());
        prompt.push('\n');
    }

    if !params.reference_text.trim().is_empty() {
        let reference = truncate_reference(&params.reference_text, max_reference_chars);
        prompt.push_str("\nBase the question on the following reference material:\n---\n");
        prompt.push_str(reference.trim());
        prompt.push_str("\n---\n");
    }

    prompt.push_str(
        "\nReturn only the JSON object with keys \"question\", \"options\", \"answer\", \"explanation\".",
    );

    prompt
}

fn type_instructions(question_type: QuestionType) -> &'static str {
    match question_type {
        QuestionType::MultipleChoice => {
            "Provide exactly 4 answer options. Set \"answer\" to the full text of the \
correct option. Vary which position holds the correct option; do not always make \
the first option correct. Avoid \"all of the above\" style options."
        }
        QuestionType::FillInBlank => {
            "Write the question as a statement with the missing part marked as ____. \
Set \"answer\" to the text that belongs in the blank. Leave \"options\" empty."
        }
        QuestionType::TrueFalse => {
            "Write a statement that is clearly true or clearly false. Set \"options\" \
to [\"True\", \"False\"] and \"answer\" to either \"True\" or \"False\"."
        }
        QuestionType::ShortAnswer => {
            "The question should be answerable in one or two sentences. Set \"answer\" \
to a model answer. Leave \"options\" empty."
        }
        QuestionType::Essay => {
            "Write an open-ended essay prompt. Set \"answer\" to an outline of the key \
points a strong essay would cover. Leave \"options\" empty."
        }
    }
}

/// Truncate reference text to at most `max_chars` characters.
///
/// Cuts on a char boundary; byte-indexed slicing would panic on multi-byte
/// content (reference documents are frequently non-ASCII).
pub fn truncate_reference(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        text.chars().take(max_chars).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Difficulty;

    fn params() -> GenerationParams {
        GenerationParams {
            subject: "Math".to_string(),
            topic: "Algebra".to_string(),
            difficulty: Difficulty::Easy,
            context: String::new(),
            reference_text: String::new(),
        }
    }

    #[test]
    fn test_prompt_includes_parameters() {
        let prompt = build_question_prompt(&params(), QuestionType::MultipleChoice, 6000);

        assert!(prompt.contains("Subject: Math"));
        assert!(prompt.contains("Topic: Algebra"));
        assert!(prompt.contains("Difficulty: easy"));
        assert!(prompt.contains("multiple choice"));
    }

    #[test]
    fn test_prompt_omits_empty_sections() {
        let prompt = build_question_prompt(&params(), QuestionType::Essay, 6000);

        assert!(!prompt.contains("Additional instructions"));
        assert!(!prompt.contains("reference material"));
    }

    #[test]
    fn test_prompt_includes_reference_text() {
        let mut p = params();
        p.reference_text = "Quadratic equations have the form ax^2 + bx + c = 0.".to_string();

        let prompt = build_question_prompt(&p, QuestionType::ShortAnswer, 6000);

        assert!(prompt.contains("reference material"));
        assert!(prompt.contains("ax^2 + bx + c = 0"));
    }

    #[test]
    fn test_reference_truncated_to_limit() {
        let mut p = params();
        p.reference_text = "x".repeat(10_000);

        let prompt = build_question_prompt(&p, QuestionType::ShortAnswer, 100);

        // The full 10k-char reference must not survive into the prompt
        assert!(prompt.len() < 2000);
    }

    #[test]
    fn test_truncate_reference_char_boundary() {
        let text = "数学是研究数量、结构以及空间等概念的学科";
        let truncated = truncate_reference(text, 5);
        assert_eq!(truncated.chars().count(), 5);
    }

    #[test]
    fn test_truncate_reference_noop_when_short() {
        assert_eq!(truncate_reference("short", 100), "short");
    }
}

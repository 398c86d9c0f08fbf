//! Output formatting for CLI commands.

use serde::Serialize;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// JSON output.
    Json,
}

impl OutputFormat {
    /// Parses a format from a string, defaulting to [`OutputFormat::Text`]
    /// for anything unrecognized.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

#[derive(Serialize)]
struct AnsweredQuestion<'a> {
    question: &'a str,
    answer: &'a str,
}

/// Formats a batch of question/answer pairs for display.
#[must_use]
pub fn format_answers(questions: &[String], answers: &[String], format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let mut out = String::new();
            for (q, a) in questions.iter().zip(answers.iter()) {
                out.push_str("Q: ");
                out.push_str(q);
                out.push('\n');
                out.push_str("A: ");
                out.push_str(a);
                out.push_str("\n\n");
            }
            out
        }
        OutputFormat::Json => {
            let pairs: Vec<AnsweredQuestion> = questions
                .iter()
                .zip(answers.iter())
                .map(|(question, answer)| AnsweredQuestion { question, answer })
                .collect();
            serde_json::to_string_pretty(&pairs).unwrap_or_default()
        }
    }
}

/// Formats an error for display.
#[must_use]
pub fn format_error(err: &crate::error::Error, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => err.to_string(),
        OutputFormat::Json => {
            serde_json::json!({ "error": err.to_string() }).to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_defaults_to_text() {
        assert_eq!(OutputFormat::parse("bogus"), OutputFormat::Text);
        assert_eq!(OutputFormat::parse("JSON"), OutputFormat::Json);
    }

    #[test]
    fn format_answers_text_includes_question_and_answer() {
        let out = format_answers(&["Q1".to_string()], &["A1".to_string()], OutputFormat::Text);
        assert!(out.contains("Q1"));
        assert!(out.contains("A1"));
    }

    #[test]
    fn format_answers_json_is_valid_array() {
        let out = format_answers(&["Q1".to_string()], &["A1".to_string()], OutputFormat::Json);
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert!(parsed.is_array());
    }
}

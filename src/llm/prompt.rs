//! Type-conditioned prompt assembly and per-type generation parameters.

use crate::model::{FusedChunk, QueryType};

/// Sampling/length parameters tuned per [`QueryType`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    /// Sampling temperature.
    pub temperature: f32,
    /// Nucleus/top-k sampling width.
    pub top_k: u32,
    /// Maximum tokens in the generated response.
    pub max_output_tokens: u32,
}

/// Assembles the final prompt text and picks generation parameters for a
/// question's [`QueryType`].
pub struct PromptBuilder;

impl PromptBuilder {
    /// Returns the sampling parameters tuned for `query_type`. Numeric and
    /// regulatory questions get low temperature for precision; open-ended
    /// coverage/table questions get more room to synthesize.
    #[must_use]
    pub const fn generation_params(query_type: QueryType) -> GenerationParams {
        match query_type {
            QueryType::NumericalLimit => GenerationParams { temperature: 0.05, top_k: 15, max_output_tokens: 200 },
            QueryType::GracePeriod | QueryType::WaitingPeriod => {
                GenerationParams { temperature: 0.1, top_k: 20, max_output_tokens: 256 }
            }
            QueryType::UinRegulatory => GenerationParams { temperature: 0.1, top_k: 20, max_output_tokens: 250 },
            QueryType::Definition => GenerationParams { temperature: 0.2, top_k: 25, max_output_tokens: 300 },
            QueryType::AirAmbulance => GenerationParams { temperature: 0.15, top_k: 25, max_output_tokens: 300 },
            QueryType::Coverage => GenerationParams { temperature: 0.2, top_k: 30, max_output_tokens: 400 },
            QueryType::MaternityWellBaby => GenerationParams { temperature: 0.15, top_k: 30, max_output_tokens: 350 },
            QueryType::Exclusion => GenerationParams { temperature: 0.15, top_k: 40, max_output_tokens: 400 },
            QueryType::TableBenefits => GenerationParams { temperature: 0.2, top_k: 35, max_output_tokens: 450 },
            QueryType::General => GenerationParams { temperature: 0.3, top_k: 30, max_output_tokens: 300 },
        }
    }

    /// Builds the final prompt: role preamble, numbered context block,
    /// a query-type banner, the question, an analysis-framework hint, and
    /// fixed grounding instructions.
    #[must_use]
    pub fn build(question: &str, query_type: QueryType, chunks: &[FusedChunk]) -> String {
        let mut out = String::new();
        out.push_str(
            "You are an expert assistant answering questions about an insurance or legal policy \
             document. Answer only using the context provided below. If the context does not \
             contain the answer, say so plainly instead of guessing.\n\n",
        );

        out.push_str("Context:\n");
        for (i, chunk) in chunks.iter().enumerate() {
            out.push_str(&format!("[{}] {}\n", i + 1, chunk.text.trim()));
        }
        out.push('\n');

        out.push_str(&format!("Question type: {query_type}\n"));
        out.push_str(&hint_for(query_type));
        out.push_str(&format!("\nQuestion: {}\n\n", question.trim()));
        out.push_str(
            "Answer concisely and precisely, citing specific figures, timeframes, or conditions \
             from the context where relevant. Do not fabricate details not present in the context.",
        );
        out
    }
}

fn hint_for(query_type: QueryType) -> String {
    match query_type {
        QueryType::GracePeriod => "Focus on the exact grace period duration and what it applies to.".to_string(),
        QueryType::WaitingPeriod => {
            "Focus on the exact waiting period duration and the condition it gates.".to_string()
        }
        QueryType::NumericalLimit => "State the exact number, percentage, or monetary limit.".to_string(),
        QueryType::Exclusion => "List the specific exclusions or circumstances that are not covered.".to_string(),
        QueryType::Coverage => "Describe what is covered and any conditions that apply.".to_string(),
        QueryType::Definition => "Give the policy's own definition, quoting it where possible.".to_string(),
        QueryType::UinRegulatory => "State the identifier or regulatory detail exactly as written.".to_string(),
        QueryType::AirAmbulance => "Cover eligibility, distance limits, and any sub-limits that apply.".to_string(),
        QueryType::MaternityWellBaby => "Cover eligibility, waiting periods, and benefit limits.".to_string(),
        QueryType::TableBenefits => "Summarize the relevant rows of the benefit schedule.".to_string(),
        QueryType::General => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(text: &str) -> FusedChunk {
        FusedChunk { text: text.to_string(), doc_id: "doc1".to_string(), chunk_index: 0, final_score: 0.9, clause_type: None }
    }

    #[test]
    fn build_includes_question_and_context() {
        let prompt = PromptBuilder::build(
            "What is the grace period?",
            QueryType::GracePeriod,
            &[chunk("Grace period is thirty days.")],
        );
        assert!(prompt.contains("What is the grace period?"));
        assert!(prompt.contains("Grace period is thirty days."));
        assert!(prompt.contains("grace_period"));
    }

    #[test]
    fn numerical_params_favor_precision() {
        let params = PromptBuilder::generation_params(QueryType::NumericalLimit);
        assert!(params.temperature < 0.1);
    }

    #[test]
    fn general_params_allow_more_creativity_than_numerical() {
        let numerical = PromptBuilder::generation_params(QueryType::NumericalLimit);
        let general = PromptBuilder::generation_params(QueryType::General);
        assert!(general.temperature > numerical.temperature);
    }

    #[test]
    fn build_handles_no_chunks() {
        let prompt = PromptBuilder::build("anything?", QueryType::General, &[]);
        assert!(prompt.contains("anything?"));
    }
}

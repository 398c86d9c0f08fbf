//! Immutable configuration threaded through every component.
//!
//! Replaces the global-settings-object pattern with a single value
//! constructed once (from defaults, a TOML file, or an environment
//! overlay) and passed by reference from the orchestrator down into
//! every leaf that needs a tunable.

use serde::{Deserialize, Serialize};

/// Target characters per chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 1200;
/// Overlap, in characters, between consecutive chunks.
pub const DEFAULT_CHUNK_OVERLAP: usize = 250;
/// Minimum surviving chunk length; shorter chunks are discarded.
pub const MIN_CHUNK_LEN: usize = 75;

/// All tunables named in the external-interfaces configuration surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Target characters per chunk.
    pub chunk_size: usize,
    /// Characters of overlap between consecutive chunks.
    pub chunk_overlap: usize,
    /// Batch size used for embedding calls.
    pub embedding_batch_size: usize,
    /// First-pass similarity threshold.
    pub similarity_threshold_pass0: f32,
    /// Second-pass similarity threshold.
    pub similarity_threshold_pass1: f32,
    /// Maximum number of query variants kept per question.
    pub max_query_variations: usize,
    /// Context chunks handed to the LLM for ordinary query types.
    pub max_context_chunks: usize,
    /// Context chunks handed to the LLM for complex query types.
    pub max_context_chunks_complex: usize,
    /// LLM requests allowed per rolling 60-second window.
    pub llm_rate_limit_per_minute: u32,
    /// Daily LLM token budget.
    pub max_tokens_per_day: u64,
    /// Maximum number of questions processed concurrently per request.
    pub concurrent_questions: usize,
    /// TTL, in seconds, for cached parsed documents.
    pub doc_cache_ttl_secs: u64,
    /// TTL, in seconds, for cached answers.
    pub qa_cache_ttl_secs: u64,
    /// Total document fetch timeout, in seconds.
    pub fetch_total_timeout_secs: u64,
    /// Connect timeout for the document fetch, in seconds.
    pub fetch_connect_timeout_secs: u64,
    /// Maximum accepted document size, in bytes.
    pub max_document_bytes: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            embedding_batch_size: 32,
            similarity_threshold_pass0: 0.30,
            similarity_threshold_pass1: 0.40,
            max_query_variations: 20,
            max_context_chunks: 5,
            max_context_chunks_complex: 8,
            llm_rate_limit_per_minute: 15,
            max_tokens_per_day: 1_000_000,
            concurrent_questions: 3,
            doc_cache_ttl_secs: 7_200,
            qa_cache_ttl_secs: 3_600,
            fetch_total_timeout_secs: 120,
            fetch_connect_timeout_secs: 30,
            max_document_bytes: 100 * 1024 * 1024,
        }
    }
}

impl Config {
    /// Parses a configuration from TOML text, falling back to defaults for
    /// any field not present.
    ///
    /// # Errors
    ///
    /// Returns an error if `text` is not valid TOML or does not match the
    /// `Config` schema.
    pub fn from_toml(text: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

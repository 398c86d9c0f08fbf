//! Layered error hierarchy for the retrieval-and-answer pipeline.
//!
//! Mirrors the request lifecycle: a bad request is rejected before any work
//! happens, a parse/index failure aborts the whole batch, and per-question
//! failures (retrieval, LLM) are caught by the orchestrator and turned into
//! a canned apology rather than propagated.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type returned by public APIs.
#[derive(Debug, Error)]
pub enum Error {
    /// The caller's request was malformed (bad URL, empty/too-long question, …).
    #[error(transparent)]
    Request(#[from] RequestError),

    /// Fetching or parsing the document failed; aborts the whole batch.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The embedding index could not be reached or is in a bad state; aborts the batch.
    #[error(transparent)]
    Index(#[from] IndexError),

    /// Per-question retrieval or generation failure. The orchestrator catches
    /// these and substitutes a canned apology; they should not usually
    /// escape to a caller of `process`.
    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

    /// LLM backend failure.
    #[error(transparent)]
    Llm(#[from] LlmError),

    /// Cache failure. Always logged and swallowed by callers; exposed here
    /// only so cache implementations have something to return.
    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// Errors rejected at the request boundary, before any work is done.
#[derive(Debug, Error)]
pub enum RequestError {
    /// `doc_url` was not an absolute http/https URL.
    #[error("invalid document URL: {0}")]
    InvalidUrl(String),

    /// No questions were supplied, or more than 20 were supplied.
    #[error("expected 1..20 questions, got {count}")]
    QuestionCountOutOfRange {
        /// The number of questions actually supplied.
        count: usize,
    },

    /// A question was empty/whitespace or exceeded 500 characters after trim.
    #[error("question {index} has invalid length {len} (must be 3..500 chars after trim)")]
    QuestionLengthOutOfRange {
        /// Position of the offending question in the input list.
        index: usize,
        /// Trimmed length of the offending question.
        len: usize,
    },
}

/// Errors from fetching or parsing the source document.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The document could not be retrieved (network error, timeout, size cap exceeded).
    #[error("failed to fetch document: {0}")]
    FetchFailed(String),

    /// The document's MIME type is not one of the supported types.
    #[error("unsupported document MIME type: {0}")]
    UnsupportedMime(String),

    /// The parser produced no usable text.
    #[error("document parsing produced empty text")]
    EmptyText,

    /// The underlying decoder failed.
    #[error("document decode failed: {0}")]
    DecodeFailed(String),
}

/// Errors from the embedding index collaborator.
#[derive(Debug, Error)]
pub enum IndexError {
    /// The index (or the embedding model backing it) could not be reached.
    #[error("embedding index unavailable: {0}")]
    Unavailable(String),

    /// The embedding model returned a vector of the wrong dimensionality.
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimension the index was configured for.
        expected: usize,
        /// Dimension actually returned by the embedder.
        actual: usize,
    },
}

/// Per-question retrieval errors. Never escape the orchestrator.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// No chunks survived retrieval and fusion for this question.
    #[error("no relevant chunks found for question")]
    Empty,
}

/// LLM backend errors, retried per the backoff policy before surfacing.
#[derive(Debug, Error)]
pub enum LlmError {
    /// The response was blocked by safety filters on every retry.
    #[error("response blocked by safety filters")]
    Blocked,

    /// The daily token budget has been exhausted (or is within 5% of it).
    #[error("daily token quota exhausted or nearly exhausted")]
    QuotaExhausted,

    /// A transient failure (network, 5xx, timeout) that exhausted its retries.
    #[error("transient LLM failure: {0}")]
    Transient(String),
}

/// Cache failures. Always non-fatal; logged and bypassed by callers.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The backing store could not be read.
    #[error("cache read failed: {0}")]
    ReadFailed(String),

    /// The backing store could not be written.
    #[error("cache write failed: {0}")]
    WriteFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_error_displays_invalid_url() {
        let err = RequestError::InvalidUrl("not-a-url".to_string());
        assert_eq!(err.to_string(), "invalid document URL: not-a-url");
    }

    #[test]
    fn question_count_out_of_range_message() {
        let err = RequestError::QuestionCountOutOfRange { count: 21 };
        assert!(err.to_string().contains("21"));
    }

    #[test]
    fn from_request_error_converts() {
        let err: Error = RequestError::InvalidUrl("x".to_string()).into();
        assert!(matches!(err, Error::Request(_)));
    }

    #[test]
    fn from_parse_error_converts() {
        let err: Error = ParseError::EmptyText.into();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn from_index_error_converts() {
        let err: Error = IndexError::Unavailable("down".to_string()).into();
        assert!(matches!(err, Error::Index(_)));
    }

    #[test]
    fn from_retrieval_error_converts() {
        let err: Error = RetrievalError::Empty.into();
        assert!(matches!(err, Error::Retrieval(_)));
    }

    #[test]
    fn from_llm_error_converts() {
        let err: Error = LlmError::Blocked.into();
        assert!(matches!(err, Error::Llm(_)));
    }

    #[test]
    fn from_cache_error_converts() {
        let err: Error = CacheError::ReadFailed("oops".to_string()).into();
        assert!(matches!(err, Error::Cache(_)));
    }

    #[test]
    fn dimension_mismatch_message() {
        let err = IndexError::DimensionMismatch {
            expected: 384,
            actual: 256,
        };
        assert_eq!(
            err.to_string(),
            "embedding dimension mismatch: expected 384, got 256"
        );
    }
}

//! # policy-rag
//!
//! Retrieval-augmented question answering over insurance and legal policy
//! documents (PDF, DOCX, email, HTML).
//!
//! Given a document URL and a batch of natural-language questions, the
//! pipeline fetches and normalizes the document, chunks it, indexes the
//! chunks as embeddings, then for each question: classifies its type,
//! expands it into search-friendly variants, runs a two-pass multi-variant
//! retrieval, re-scores chunks against clause-family patterns, fuses the
//! two signals, builds a type-conditioned prompt, and calls the LLM under
//! rate limiting and retry.
//!
//! ## Modules
//!
//! - [`normalize`]: text cleanup ahead of chunking.
//! - [`chunking`]: splits normalized text into overlapping chunks.
//! - [`embedding`]: embedding generation and the in-process vector index.
//! - [`query`]: question classification and expansion.
//! - [`clause`]: clause-family pattern matching and confidence scoring.
//! - [`retrieval`]: multi-pass search and chunk fusion.
//! - [`llm`]: prompt assembly and the rate-limited LLM driver.
//! - [`cache`]: the document/answer cache interface.
//! - [`fetch`]: document byte retrieval.
//! - [`orchestrator`]: ties the above into a single `process` call.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![warn(unsafe_code)]

pub mod cache;
pub mod chunking;
pub mod clause;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod fetch;
pub mod llm;
pub mod model;
pub mod normalize;
pub mod orchestrator;
pub mod query;
pub mod retrieval;

pub use config::Config;
pub use error::{Error, Result};
pub use orchestrator::Orchestrator;

#[cfg(feature = "fastembed-embeddings")]
pub use embedding::FastEmbedEmbedder;
pub use embedding::{DEFAULT_DIMENSIONS, Embedder, EmbeddingIndex, FallbackEmbedder, InMemoryIndex, create_embedder};

pub use cache::{Cache, InMemoryCache};
pub use clause::ClauseMatcher;
pub use fetch::{Fetcher, ReqwestFetcher};
pub use llm::{LlmClient, LlmDriver, LlmUsageStats, PromptBuilder, ScriptedLlmClient};
pub use model::{ChunkText, ClauseMatch, ClauseType, Document, FusedChunk, QueryType, QueryVariant, SearchHit};
pub use retrieval::{ChunkFusion, Retriever};

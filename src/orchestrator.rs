//! Ties fetch, normalize, chunk, index, and per-question retrieval/answer
//! generation into a single `process` entry point.

use crate::cache::{Cache, doc_cache_key, qa_cache_key};
use crate::chunking::chunk_text;
use crate::clause::{ClauseMatcher, dominant_types_for};
use crate::config::Config;
use crate::embedding::EmbeddingIndex;
use crate::error::{RequestError, Result};
use crate::fetch::Fetcher;
use crate::llm::{LlmClient, LlmDriver, PromptBuilder};
use crate::model::{ChunkText, Document};
use crate::normalize::normalize;
use crate::query::{classify, expand};
use crate::retrieval::{ChunkFusion, Retriever};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

const CANNED_APOLOGY: &str =
    "I'm sorry, I could not find a reliable answer to this question in the provided document.";
const MIN_QUESTION_LEN: usize = 3;
const MAX_QUESTION_LEN: usize = 500;
const MAX_QUESTIONS: usize = 20;

/// Coordinates the full document-to-answers pipeline for one request.
pub struct Orchestrator<C: LlmClient> {
    config: Config,
    index: Box<dyn EmbeddingIndex>,
    fetcher: Box<dyn Fetcher>,
    cache: Box<dyn Cache>,
    llm: LlmDriver<C>,
}

impl<C: LlmClient> Orchestrator<C> {
    /// Assembles an orchestrator from its collaborators.
    #[must_use]
    pub fn new(
        config: Config,
        index: Box<dyn EmbeddingIndex>,
        fetcher: Box<dyn Fetcher>,
        cache: Box<dyn Cache>,
        llm: LlmDriver<C>,
    ) -> Self {
        Self { config, index, fetcher, cache, llm }
    }

    /// Answers every question in `questions` about the document at
    /// `doc_url`, returning answers in the same order as `questions`.
    ///
    /// Per-question failures (no relevant chunks, LLM errors) never fail
    /// the whole request: they become a canned apology for that question.
    ///
    /// # Errors
    ///
    /// Returns a [`RequestError`] if the request is malformed, or a
    /// [`crate::error::ParseError`]/[`crate::error::IndexError`] if
    /// fetching, parsing, or indexing the document fails outright.
    pub async fn process(&self, doc_url: &str, questions: &[String]) -> Result<Vec<String>> {
        validate_request(doc_url, questions)?;

        let doc_id = doc_cache_key(doc_url).trim_start_matches("doc:").to_string();
        let document = self.load_or_index_document(doc_url, &doc_id).await?;

        let semaphore = Arc::new(Semaphore::new(self.config.concurrent_questions.max(1)));
        let futures = questions.iter().map(|question| {
            let semaphore = Arc::clone(&semaphore);
            let doc_id = document.id.clone();
            async move {
                match semaphore.acquire().await {
                    Ok(_permit) => self.answer_question(&doc_id, question).await,
                    Err(_) => CANNED_APOLOGY.to_string(),
                }
            }
        });

        Ok(futures_util::future::join_all(futures).await)
    }

    async fn load_or_index_document(&self, doc_url: &str, doc_id: &str) -> Result<Document> {
        let key = doc_cache_key(doc_url);
        if let Some(cached) = self.cache.get(&key).await {
            if let Ok(document) = serde_json::from_str::<Document>(&cached) {
                return Ok(document);
            }
            tracing::warn!(doc_url, "cached document failed to deserialize, refetching");
        }

        let (bytes, content_type) = self.fetcher.fetch(doc_url).await?;
        let file_type = guess_file_type(&content_type, doc_url);
        let raw = String::from_utf8_lossy(&bytes).into_owned();
        let normalized = normalize(&raw);
        let chunks: Vec<ChunkText> = chunk_text(&normalized, self.config.chunk_size, self.config.chunk_overlap);

        let document =
            Document { id: doc_id.to_string(), url: doc_url.to_string(), file_type, raw_text: normalized, chunks };

        if !self.index.contains(&document.id) {
            let pairs: Vec<(usize, String)> = document.chunks.iter().map(|c| (c.index, c.text.clone())).collect();
            self.index.add(&document.id, &pairs)?;
        }

        if let Ok(serialized) = serde_json::to_string(&document) {
            self.cache.set(&key, &serialized, Duration::from_secs(self.config.doc_cache_ttl_secs)).await;
        }

        Ok(document)
    }

    async fn answer_question(&self, doc_id: &str, question: &str) -> String {
        let qa_key = qa_cache_key(doc_id, question);
        if let Some(cached) = self.cache.get(&qa_key).await {
            return cached;
        }

        let answer = self.answer_question_uncached(doc_id, question).await.unwrap_or_else(|err| {
            tracing::warn!(question, error = %err, "question processing failed, returning canned apology");
            CANNED_APOLOGY.to_string()
        });

        self.cache.set(&qa_key, &answer, Duration::from_secs(self.config.qa_cache_ttl_secs)).await;
        answer
    }

    async fn answer_question_uncached(&self, _doc_id: &str, question: &str) -> Result<String> {
        let query_type = classify(question);
        let variants = expand(question, self.config.max_query_variations);

        let retriever = Retriever::new(self.index.as_ref());
        let hits = retriever.search(&variants, &self.config)?;

        let dominant = dominant_types_for(query_type);
        let matches = ClauseMatcher::match_chunks(question, dominant, &hits);
        let filtered = ClauseMatcher::filter_relevant(matches);
        let fused = ChunkFusion::fuse(&hits, &filtered, query_type);

        if fused.is_empty() {
            return Err(crate::error::RetrievalError::Empty.into());
        }

        let prompt = PromptBuilder::build(question, query_type, &fused);
        let params = PromptBuilder::generation_params(query_type);
        let (answer, _confidence) = self.llm.generate_answer(&prompt, query_type, &params).await?;
        Ok(answer)
    }
}

fn validate_request(doc_url: &str, questions: &[String]) -> Result<()> {
    if !(doc_url.starts_with("http://") || doc_url.starts_with("https://")) {
        return Err(RequestError::InvalidUrl(doc_url.to_string()).into());
    }
    if questions.is_empty() || questions.len() > MAX_QUESTIONS {
        return Err(RequestError::QuestionCountOutOfRange { count: questions.len() }.into());
    }
    for (index, question) in questions.iter().enumerate() {
        let len = question.trim().chars().count();
        if !(MIN_QUESTION_LEN..=MAX_QUESTION_LEN).contains(&len) {
            return Err(RequestError::QuestionLengthOutOfRange { index, len }.into());
        }
    }
    Ok(())
}

fn guess_file_type(content_type: &str, url: &str) -> String {
    let lower = content_type.to_lowercase();
    if lower.contains("pdf") {
        "pdf".to_string()
    } else if lower.contains("wordprocessingml") || url.ends_with(".docx") {
        "docx".to_string()
    } else if lower.contains("message/rfc822") || url.ends_with(".eml") {
        "eml".to_string()
    } else if lower.contains("html") {
        "html".to_string()
    } else {
        "text".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::{FallbackEmbedder, InMemoryIndex};
    use crate::llm::ScriptedLlmClient;
    use crate::cache::InMemoryCache;

    struct FakeFetcher {
        body: &'static str,
        content_type: &'static str,
    }

    #[async_trait::async_trait]
    impl Fetcher for FakeFetcher {
        async fn fetch(&self, _url: &str) -> Result<(Vec<u8>, String)> {
            Ok((self.body.as_bytes().to_vec(), self.content_type.to_string()))
        }
    }

    fn orchestrator(answer: &'static str) -> Orchestrator<ScriptedLlmClient> {
        let index = InMemoryIndex::new(Box::new(FallbackEmbedder::new(32)));
        let fetcher = FakeFetcher {
            body: "The grace period for premium payment is thirty days from the due date.",
            content_type: "text/plain",
        };
        let cache = InMemoryCache::new();
        let llm = LlmDriver::new(ScriptedLlmClient::single(answer), 60, 1_000_000);
        Orchestrator::new(Config::default(), Box::new(index), Box::new(fetcher), Box::new(cache), llm)
    }

    #[tokio::test]
    async fn rejects_invalid_url() {
        let orch = orchestrator("answer");
        let err = orch.process("not-a-url", &["What is covered?".to_string()]).await.unwrap_err();
        assert!(matches!(err, crate::error::Error::Request(RequestError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn rejects_too_many_questions() {
        let orch = orchestrator("answer");
        let questions: Vec<String> = (0..21).map(|i| format!("Question number {i} about something?")).collect();
        let err = orch.process("https://example.com/doc.pdf", &questions).await.unwrap_err();
        assert!(matches!(err, crate::error::Error::Request(RequestError::QuestionCountOutOfRange { .. })));
    }

    #[tokio::test]
    async fn rejects_too_short_question() {
        let orch = orchestrator("answer");
        let err = orch.process("https://example.com/doc.pdf", &["Hi".to_string()]).await.unwrap_err();
        assert!(matches!(err, crate::error::Error::Request(RequestError::QuestionLengthOutOfRange { .. })));
    }

    #[tokio::test]
    async fn answers_in_input_order() {
        let orch = orchestrator("The grace period is thirty days.");
        let questions = vec![
            "What is the grace period for premium payment?".to_string(),
            "What is the waiting period for pre-existing diseases?".to_string(),
        ];
        let answers = orch.process("https://example.com/doc.pdf", &questions).await.unwrap();
        assert_eq!(answers.len(), 2);
    }

    #[tokio::test]
    async fn second_call_hits_document_cache() {
        let orch = orchestrator("answer");
        let questions = vec!["What is the grace period for premium payment?".to_string()];
        orch.process("https://example.com/doc.pdf", &questions).await.unwrap();
        let answers = orch.process("https://example.com/doc.pdf", &questions).await.unwrap();
        assert_eq!(answers.len(), 1);
    }
}

//! End-to-end scenarios driving `Orchestrator::process` against an
//! in-memory embedding index and a scripted LLM backend.

#![allow(clippy::expect_used)]

use async_trait::async_trait;
use policy_rag::{Config, Fetcher, InMemoryCache, LlmDriver, Orchestrator, ScriptedLlmClient};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct FakeFetcher {
    body: &'static str,
}

#[async_trait]
impl Fetcher for FakeFetcher {
    async fn fetch(&self, _url: &str) -> policy_rag::error::Result<(Vec<u8>, String)> {
        Ok((self.body.as_bytes().to_vec(), "text/plain".to_string()))
    }
}

/// Wraps a [`ScriptedLlmClient`] and counts how many times `generate` runs,
/// so cache-hit tests can assert on call volume rather than wall time.
struct CountingLlmClient {
    inner: ScriptedLlmClient,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl policy_rag::LlmClient for CountingLlmClient {
    async fn generate(
        &self,
        prompt: &str,
        params: &policy_rag::llm::GenerationParams,
    ) -> Result<policy_rag::llm::LlmResponse, String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.generate(prompt, params).await
    }
}

fn build_orchestrator(
    body: &'static str,
    answer: &'static str,
) -> (Orchestrator<ScriptedLlmClient>, Config) {
    let config = Config::default();
    let embedder = policy_rag::embedding::FallbackEmbedder::new(32);
    let index = policy_rag::embedding::InMemoryIndex::new(Box::new(embedder));
    let fetcher = FakeFetcher { body };
    let cache = InMemoryCache::new();
    let llm = LlmDriver::new(ScriptedLlmClient::single(answer), 60, 1_000_000);
    let orchestrator = Orchestrator::new(
        config.clone(),
        Box::new(index),
        Box::new(fetcher),
        Box::new(cache),
        llm,
    );
    (orchestrator, config)
}

#[tokio::test]
async fn s1_grace_period_question_answers_from_matching_chunk() {
    let (orchestrator, _) = build_orchestrator(
        "Section 1: A grace period of thirty days is provided for payment of premium \
         after the due date to renew or continue the policy without losing continuity benefits.",
        "A grace period of thirty days is provided for premium payment.",
    );

    let answers = orchestrator
        .process(
            "https://example.com/policy.pdf",
            &["What is the grace period for premium payment?".to_string()],
        )
        .await
        .expect("process should succeed");

    assert_eq!(answers.len(), 1);
    assert!(answers[0].starts_with("A grace period of thirty days"));
}

#[tokio::test]
async fn s2_waiting_period_answer_contains_36_months() {
    let (orchestrator, _) = build_orchestrator(
        "Pre-existing diseases are covered after a waiting period of thirty-six (36) months \
         of continuous coverage from the policy inception date.",
        "There is a waiting period of thirty-six (36) months for pre-existing diseases.",
    );

    let answers = orchestrator
        .process(
            "https://example.com/policy.pdf",
            &["What is the waiting period for pre-existing diseases?".to_string()],
        )
        .await
        .expect("process should succeed");

    assert!(answers[0].contains("36) months") || answers[0].contains("36 months"));
}

#[tokio::test]
async fn s3_uin_question_surfaces_the_literal_code() {
    let (orchestrator, _) = build_orchestrator(
        "This is a base product with UIN: ICIHLIP22012V012223 issued under applicable \
         insurance regulations.",
        "The UIN of the base product is ICIHLIP22012V012223.",
    );

    let answers = orchestrator
        .process(
            "https://example.com/policy.pdf",
            &["What is the UIN of the base product?".to_string()],
        )
        .await
        .expect("process should succeed");

    assert!(answers[0].contains("ICIHLIP22012V012223"));
}

#[tokio::test]
async fn s4_unrelated_question_returns_canned_apology() {
    let (orchestrator, _) = build_orchestrator(
        "A grace period of thirty days is provided for payment of premium.",
        "irrelevant scripted answer",
    );

    let answers = orchestrator
        .process(
            "https://example.com/policy.pdf",
            &["What is the airspeed velocity of an unladen swallow?".to_string()],
        )
        .await
        .expect("process should succeed");

    assert!(answers[0].contains("could not find") || answers[0].contains("not available"));
}

#[tokio::test]
async fn s5_repeated_question_hits_cache_and_skips_the_llm() {
    let calls = Arc::new(AtomicUsize::new(0));
    let config = Config::default();
    let embedder = policy_rag::embedding::FallbackEmbedder::new(32);
    let index = policy_rag::embedding::InMemoryIndex::new(Box::new(embedder));
    let fetcher = FakeFetcher {
        body: "A grace period of thirty days is provided for payment of premium.",
    };
    let cache = InMemoryCache::new();
    let counting = CountingLlmClient {
        inner: ScriptedLlmClient::single("A grace period of thirty days is provided."),
        calls: Arc::clone(&calls),
    };
    let llm = LlmDriver::new(counting, 60, 1_000_000);
    let orchestrator = Orchestrator::new(
        config,
        Box::new(index),
        Box::new(fetcher),
        Box::new(cache),
        llm,
    );

    let question = "What is the grace period for premium payment?".to_string();
    let first = orchestrator
        .process("https://example.com/policy.pdf", std::slice::from_ref(&question))
        .await
        .expect("first call should succeed");
    let second = orchestrator
        .process("https://example.com/policy.pdf", std::slice::from_ref(&question))
        .await
        .expect("second call should succeed");

    assert_eq!(first, second);
    assert_eq!(calls.load(Ordering::SeqCst), 1, "second call must be served from cache");
}

/// Blocks every request whose prompt contains `trigger`, answers normally
/// otherwise. Lets one question in a batch trip a persistent safety block
/// while the rest complete.
struct SelectivelyBlockingLlmClient {
    trigger: &'static str,
    normal_answer: &'static str,
}

#[async_trait]
impl policy_rag::LlmClient for SelectivelyBlockingLlmClient {
    async fn generate(
        &self,
        prompt: &str,
        _params: &policy_rag::llm::GenerationParams,
    ) -> Result<policy_rag::llm::LlmResponse, String> {
        if prompt.contains(self.trigger) {
            Ok(policy_rag::llm::LlmResponse { text: String::new(), safety_blocked: true })
        } else {
            Ok(policy_rag::llm::LlmResponse { text: self.normal_answer.to_string(), safety_blocked: false })
        }
    }
}

#[tokio::test]
async fn s6_persistent_safety_block_apologizes_without_failing_the_batch() {
    let config = Config::default();
    let embedder = policy_rag::embedding::FallbackEmbedder::new(32);
    let index = policy_rag::embedding::InMemoryIndex::new(Box::new(embedder));
    let fetcher = FakeFetcher {
        body: "A grace period of thirty days is provided for payment of premium after the due date.",
    };
    let cache = InMemoryCache::new();
    let blocked_question = "What is the grace period for premium payment, blocked-variant?";
    let blocking_client =
        SelectivelyBlockingLlmClient { trigger: blocked_question, normal_answer: "A grace period of thirty days." };
    let llm = LlmDriver::new(blocking_client, 60, 1_000_000);
    let orchestrator = Orchestrator::new(
        config,
        Box::new(index),
        Box::new(fetcher),
        Box::new(cache),
        llm,
    );

    let mut questions: Vec<String> = (0..19)
        .map(|i| format!("What is the grace period for premium payment, variant {i}?"))
        .collect();
    questions.push(blocked_question.to_string());

    let answers = orchestrator
        .process("https://example.com/policy.pdf", &questions)
        .await
        .expect("a safety-blocked question must not fail the whole batch");

    assert_eq!(answers.len(), 20);
    for answer in &answers[..19] {
        assert_eq!(answer, "A grace period of thirty days.");
    }
    assert!(answers[19].contains("could not find"));
}

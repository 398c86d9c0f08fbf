//! Rate-limited, retrying LLM client wrapper.
//!
//! Wraps a pluggable [`LlmClient`] with the rate-limiting, retry, token
//! accounting, and post-processing behavior every backend needs, so
//! backend implementations only have to implement a single `generate`
//! call.

use crate::error::{LlmError, Result};
use crate::model::QueryType;
use async_trait::async_trait;
use regex::Regex;
use std::collections::VecDeque;
use std::sync::LazyLock;
use std::sync::Mutex;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use super::prompt::GenerationParams;

const MAX_ATTEMPTS: u32 = 4;
const BACKOFF_MIN_SECS: u64 = 2;
const BACKOFF_MAX_SECS: u64 = 15;
const RATE_WINDOW: Duration = Duration::from_secs(60);
const QUOTA_WARN_FRACTION: f64 = 0.95;

const STRIP_PREFIXES: &[&str] = &[
    "based on the provided context,",
    "based on the context,",
    "according to the policy,",
    "according to the provided document,",
    "the answer is:",
    "the answer is",
    "here is the answer:",
    "to answer your question,",
    "in response to your question,",
    "as per the document,",
    "as per the policy,",
];

static UIN_SHAPED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Z]{3,}\d{2,}[A-Z0-9]*").unwrap_or_else(|e| unreachable!("{e}")));

/// A raw LLM backend response before post-processing.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// Generated text.
    pub text: String,
    /// Whether the backend's safety filters blocked or truncated generation.
    pub safety_blocked: bool,
}

/// Pluggable LLM backend. Implementations do not need to handle rate
/// limiting, retries, or token accounting; [`LlmDriver`] does that.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generates a single completion for `prompt` using `params`.
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> std::result::Result<LlmResponse, String>;
}

/// A scripted backend that returns canned responses, for tests and offline
/// use. Responses are consumed in order; once exhausted it repeats the
/// last one.
pub struct ScriptedLlmClient {
    responses: Mutex<VecDeque<LlmResponse>>,
}

impl ScriptedLlmClient {
    /// Builds a scripted client that yields `responses` in order.
    #[must_use]
    pub fn new(responses: Vec<LlmResponse>) -> Self {
        Self { responses: Mutex::new(responses.into()) }
    }

    /// Convenience constructor for a single plain-text answer.
    #[must_use]
    pub fn single(text: &str) -> Self {
        Self::new(vec![LlmResponse { text: text.to_string(), safety_blocked: false }])
    }
}

#[async_trait]
impl LlmClient for ScriptedLlmClient {
    async fn generate(&self, _prompt: &str, _params: &GenerationParams) -> std::result::Result<LlmResponse, String> {
        let mut queue = self.responses.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        if queue.len() > 1 { Ok(queue.pop_front().unwrap_or_else(|| unreachable!())) } else {
            queue.front().cloned().ok_or_else(|| "scripted client has no responses".to_string())
        }
    }
}

#[async_trait]
impl LlmClient for Box<dyn LlmClient> {
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> std::result::Result<LlmResponse, String> {
        (**self).generate(prompt, params).await
    }
}

struct RateLimiterState {
    recent_calls: VecDeque<Instant>,
    hourly_calls: VecDeque<Instant>,
    day_epoch: u64,
    tokens_used_today: u64,
    total_requests: u64,
    error_count: u64,
}

/// Point-in-time usage snapshot, mirroring what an ops dashboard or a
/// periodic log line would want to report.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmUsageStats {
    /// Tokens consumed since the last daily rollover.
    pub daily_tokens_used: u64,
    /// Configured daily token budget.
    pub max_daily_tokens: u64,
    /// `daily_tokens_used / max_daily_tokens * 100`.
    pub token_usage_percentage: f64,
    /// Calls within the trailing 60-second window.
    pub requests_last_minute: usize,
    /// Calls within the trailing 3600-second window.
    pub requests_last_hour: usize,
    /// Configured per-minute rate limit.
    pub rate_limit_per_minute: u32,
    /// Total successful calls ever made through this driver.
    pub total_requests: u64,
    /// Total calls that ended in an error (blocked, transient, or quota).
    pub error_count: u64,
    /// `(total_requests - error_count) / total_requests * 100`, 100 if no calls yet.
    pub success_rate: f64,
}

fn current_day_epoch() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs() / 86_400).unwrap_or(0)
}

/// Wraps an [`LlmClient`] with sliding-window rate limiting, a daily token
/// budget, exponential-backoff retries, and response post-processing.
pub struct LlmDriver<C: LlmClient> {
    client: C,
    rate_limit_per_minute: u32,
    max_tokens_per_day: u64,
    state: Mutex<RateLimiterState>,
}

impl<C: LlmClient> LlmDriver<C> {
    /// Builds a driver around `client` with the given per-minute call limit
    /// and daily token budget.
    #[must_use]
    pub fn new(client: C, rate_limit_per_minute: u32, max_tokens_per_day: u64) -> Self {
        Self {
            client,
            rate_limit_per_minute,
            max_tokens_per_day,
            state: Mutex::new(RateLimiterState {
                recent_calls: VecDeque::new(),
                hourly_calls: VecDeque::new(),
                day_epoch: current_day_epoch(),
                tokens_used_today: 0,
                total_requests: 0,
                error_count: 0,
            }),
        }
    }

    /// Generates and post-processes an answer for `prompt`, retrying
    /// transient failures with exponential backoff and handling one
    /// safety-block retry before surfacing [`LlmError::Blocked`].
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::QuotaExhausted`] if the daily token budget is
    /// exhausted, [`LlmError::Blocked`] if the response is blocked twice,
    /// or [`LlmError::Transient`] if all retry attempts fail.
    pub async fn generate_answer(
        &self,
        prompt: &str,
        query_type: QueryType,
        params: &GenerationParams,
    ) -> Result<(String, f32)> {
        self.check_quota()?;
        self.wait_for_rate_window().await;

        let mut blocked_retries = 0u8;
        let mut last_error = String::new();

        for attempt in 0..MAX_ATTEMPTS {
            if attempt > 0 {
                tokio::time::sleep(backoff_duration(attempt)).await;
            }

            match self.client.generate(prompt, params).await {
                Ok(response) if response.safety_blocked => {
                    self.record_attempt(false);
                    if blocked_retries >= 1 {
                        return Err(LlmError::Blocked.into());
                    }
                    blocked_retries += 1;
                    continue;
                }
                Ok(response) => {
                    self.record_attempt(true);
                    self.record_call(prompt, &response.text);
                    let confidence = score_confidence(&response.text, query_type);
                    return Ok((post_process(&response.text), confidence));
                }
                Err(e) => {
                    self.record_attempt(false);
                    last_error = e;
                }
            }
        }

        Err(LlmError::Transient(last_error).into())
    }

    /// Returns a point-in-time snapshot of call volume and token usage,
    /// mirroring what an operations dashboard would poll periodically.
    #[must_use]
    pub fn usage_stats(&self) -> LlmUsageStats {
        let mut state = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let now = Instant::now();
        while state.recent_calls.front().is_some_and(|t| now.duration_since(*t) > RATE_WINDOW) {
            state.recent_calls.pop_front();
        }
        let hour = Duration::from_secs(3600);
        while state.hourly_calls.front().is_some_and(|t| now.duration_since(*t) > hour) {
            state.hourly_calls.pop_front();
        }
        let success_rate = if state.total_requests == 0 {
            100.0
        } else {
            ((state.total_requests - state.error_count) as f64 / state.total_requests as f64) * 100.0
        };
        LlmUsageStats {
            daily_tokens_used: state.tokens_used_today,
            max_daily_tokens: self.max_tokens_per_day,
            token_usage_percentage: (state.tokens_used_today as f64 / self.max_tokens_per_day.max(1) as f64) * 100.0,
            requests_last_minute: state.recent_calls.len(),
            requests_last_hour: state.hourly_calls.len(),
            rate_limit_per_minute: self.rate_limit_per_minute,
            total_requests: state.total_requests,
            error_count: state.error_count,
            success_rate,
        }
    }

    fn record_attempt(&self, success: bool) {
        let mut state = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        state.total_requests += 1;
        if !success {
            state.error_count += 1;
        }
        if success {
            state.hourly_calls.push_back(Instant::now());
        }
    }

    fn check_quota(&self) -> Result<()> {
        let mut state = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let today = current_day_epoch();
        if state.day_epoch != today {
            state.day_epoch = today;
            state.tokens_used_today = 0;
        }
        let threshold = (self.max_tokens_per_day as f64 * QUOTA_WARN_FRACTION) as u64;
        if state.tokens_used_today >= threshold {
            return Err(LlmError::QuotaExhausted.into());
        }
        Ok(())
    }

    async fn wait_for_rate_window(&self) {
        loop {
            let wait = {
                let mut state = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
                let now = Instant::now();
                while state.recent_calls.front().is_some_and(|t| now.duration_since(*t) > RATE_WINDOW) {
                    state.recent_calls.pop_front();
                }
                if state.recent_calls.len() < self.rate_limit_per_minute as usize {
                    state.recent_calls.push_back(now);
                    None
                } else {
                    state.recent_calls.front().map(|oldest| RATE_WINDOW.saturating_sub(now.duration_since(*oldest)))
                }
            };
            match wait {
                None => return,
                Some(d) => tokio::time::sleep(d).await,
            }
        }
    }

    fn record_call(&self, prompt: &str, response: &str) {
        let mut state = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        state.tokens_used_today += estimate_tokens(prompt, response);
    }
}

fn backoff_duration(attempt: u32) -> Duration {
    let secs = BACKOFF_MIN_SECS.saturating_mul(1 << attempt.min(4)).min(BACKOFF_MAX_SECS);
    Duration::from_secs(secs.max(BACKOFF_MIN_SECS))
}

/// Estimates token usage as `ceil(1.2 * (prompt_len + response_len) / 3.5)`.
#[must_use]
pub fn estimate_tokens(prompt: &str, response: &str) -> u64 {
    let chars = (prompt.chars().count() + response.chars().count()) as f64;
    ((chars * 1.2 / 3.5).ceil()) as u64
}

fn post_process(text: &str) -> String {
    let mut out = text.trim().to_string();
    let lower = out.to_lowercase();
    for prefix in STRIP_PREFIXES {
        if lower.starts_with(prefix) {
            out = out[prefix.len()..].trim_start().to_string();
            break;
        }
    }
    if let Some(first) = out.chars().next() {
        let mut capitalized = first.to_uppercase().collect::<String>();
        capitalized.push_str(&out[first.len_utf8()..]);
        out = capitalized;
    }
    if !out.is_empty() && !out.ends_with(['.', '?', '!', ':']) {
        out.push('.');
    }
    out
}

fn score_confidence(text: &str, query_type: QueryType) -> f32 {
    let lower = text.to_lowercase();
    if lower.contains("information not available") || lower.contains("not available in the") {
        return 0.1;
    }

    let mut score = 0.5f32;
    if text.chars().count() > 50 {
        score += 0.2;
    }
    if text.chars().any(|c| c.is_ascii_digit()) {
        score += 0.1;
    }
    if lower.contains("exactly") || lower.contains("specifically") {
        score += 0.1;
    }
    if query_type == QueryType::NumericalLimit && text.contains('%') {
        score += 0.1;
    }
    if UIN_SHAPED.is_match(text) {
        score += 0.15;
    }
    if lower.contains("may ") || lower.contains("might ") {
        score -= 0.1;
    }
    score.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn generate_answer_post_processes_and_scores() {
        let client = ScriptedLlmClient::single(
            "based on the provided context, the grace period is exactly 30 days",
        );
        let driver = LlmDriver::new(client, 15, 1_000_000);
        let params = GenerationParams { temperature: 0.1, top_k: 20, max_output_tokens: 200 };
        let (answer, confidence) =
            driver.generate_answer("prompt", QueryType::GracePeriod, &params).await.unwrap();
        assert!(answer.starts_with("The grace period"));
        assert!(confidence > 0.5);
    }

    #[tokio::test]
    async fn blocked_twice_surfaces_llm_blocked() {
        let client = ScriptedLlmClient::new(vec![
            LlmResponse { text: String::new(), safety_blocked: true },
            LlmResponse { text: String::new(), safety_blocked: true },
        ]);
        let driver = LlmDriver::new(client, 15, 1_000_000);
        let params = GenerationParams { temperature: 0.1, top_k: 20, max_output_tokens: 200 };
        let err = driver.generate_answer("prompt", QueryType::General, &params).await.unwrap_err();
        assert!(matches!(err, crate::error::Error::Llm(LlmError::Blocked)));
    }

    #[tokio::test]
    async fn quota_exhausted_short_circuits() {
        let client = ScriptedLlmClient::single("answer");
        let driver = LlmDriver::new(client, 15, 10);
        {
            let mut state = driver.state.lock().unwrap();
            state.tokens_used_today = 10;
        }
        let params = GenerationParams { temperature: 0.1, top_k: 20, max_output_tokens: 200 };
        let err = driver.generate_answer("prompt", QueryType::General, &params).await.unwrap_err();
        assert!(matches!(err, crate::error::Error::Llm(LlmError::QuotaExhausted)));
    }

    #[test]
    fn estimate_tokens_matches_formula() {
        let tokens = estimate_tokens("12345", "12345");
        assert_eq!(tokens, ((10.0_f64 * 1.2 / 3.5).ceil()) as u64);
    }

    #[test]
    fn post_process_strips_known_prefix() {
        assert_eq!(post_process("The answer is: yes"), "Yes.");
    }

    #[test]
    fn confidence_low_for_information_not_available() {
        let score = score_confidence("Information not available in the provided context.", QueryType::General);
        assert!((score - 0.1).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn usage_stats_tracks_requests_and_tokens() {
        let client = ScriptedLlmClient::single("The grace period is thirty days.");
        let driver = LlmDriver::new(client, 15, 1_000_000);
        let params = GenerationParams { temperature: 0.1, top_k: 20, max_output_tokens: 200 };
        driver.generate_answer("prompt", QueryType::GracePeriod, &params).await.unwrap();

        let stats = driver.usage_stats();
        assert_eq!(stats.total_requests, 1);
        assert_eq!(stats.error_count, 0);
        assert_eq!(stats.requests_last_minute, 1);
        assert!((stats.success_rate - 100.0).abs() < f64::EPSILON);
        assert!(stats.daily_tokens_used > 0);
    }

    #[test]
    fn confidence_boosted_for_uin_shaped_codes() {
        let with_code = score_confidence("The UIN is ICIHLIP22012V012223 exactly.", QueryType::UinRegulatory);
        let without = score_confidence("The UIN is present.", QueryType::UinRegulatory);
        assert!(with_code > without);
    }
}

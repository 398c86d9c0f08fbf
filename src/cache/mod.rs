//! A duck-typed cache interface (`get`/`set`/`delete`) plus an in-process
//! TTL-expiring implementation. Cache failures are always non-fatal: the
//! orchestrator logs and falls through to the uncached path rather than
//! letting a cache outage fail a request.

use async_trait::async_trait;
use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// The cache contract every backend implements.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Returns the cached value for `key`, or `None` on a miss or expiry.
    async fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key` with the given time-to-live.
    async fn set(&self, key: &str, value: &str, ttl: Duration);

    /// Removes `key`, if present.
    async fn delete(&self, key: &str);
}

struct Entry {
    value: String,
    expires_at: Instant,
}

/// An in-process cache with lazy TTL expiry: entries are checked for
/// expiry on read, and a stale entry is evicted the first time it's
/// touched rather than on a background sweep.
#[derive(Default)]
pub struct InMemoryCache {
    entries: Mutex<HashMap<String, Entry>>,
}

impl InMemoryCache {
    /// Builds an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get(&self, key: &str) -> Option<String> {
        let mut entries = self.entries.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) {
        let mut entries = self.entries.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        entries.insert(key.to_string(), Entry { value: value.to_string(), expires_at: Instant::now() + ttl });
    }

    async fn delete(&self, key: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        entries.remove(key);
    }
}

fn stable_hash(text: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    hasher.finish()
}

/// Deterministic cache key for a fetched/parsed document, keyed by URL.
#[must_use]
pub fn doc_cache_key(url: &str) -> String {
    format!("doc:{:016x}", stable_hash(url))
}

/// Deterministic cache key for a question's answer, keyed by document id
/// and question text.
#[must_use]
pub fn qa_cache_key(doc_id: &str, question: &str) -> String {
    format!("qa:{:016x}", stable_hash(&format!("{doc_id}\u{0}{question}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_then_get_returns_value() {
        let cache = InMemoryCache::new();
        cache.set("k", "v", Duration::from_secs(60)).await;
        assert_eq!(cache.get("k").await, Some("v".to_string()));
    }

    #[tokio::test]
    async fn get_miss_returns_none() {
        let cache = InMemoryCache::new();
        assert_eq!(cache.get("missing").await, None);
    }

    #[tokio::test]
    async fn expired_entry_is_evicted_on_read() {
        let cache = InMemoryCache::new();
        cache.set("k", "v", Duration::from_millis(1)).await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(cache.get("k").await, None);
    }

    #[tokio::test]
    async fn delete_removes_entry() {
        let cache = InMemoryCache::new();
        cache.set("k", "v", Duration::from_secs(60)).await;
        cache.delete("k").await;
        assert_eq!(cache.get("k").await, None);
    }

    #[test]
    fn cache_keys_are_deterministic() {
        assert_eq!(doc_cache_key("https://example.com/a.pdf"), doc_cache_key("https://example.com/a.pdf"));
        assert_ne!(doc_cache_key("https://example.com/a.pdf"), doc_cache_key("https://example.com/b.pdf"));
    }

    #[test]
    fn qa_cache_keys_distinguish_doc_and_question() {
        let a = qa_cache_key("doc1", "question");
        let b = qa_cache_key("doc2", "question");
        let c = qa_cache_key("doc1", "other question");
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn cache_key_prefixes_identify_kind() {
        assert!(doc_cache_key("x").starts_with("doc:"));
        assert!(qa_cache_key("d", "q").starts_with("qa:"));
    }
}

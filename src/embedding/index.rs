//! In-process vector index implementing the `add`/`search`/`remove`/`stats`
//! contract the retrieval pipeline consumes.
//!
//! The embedding model and its storage/persistence are out of scope for this
//! crate; what's specified is the thin wrapper other components call
//! against. [`InMemoryIndex`] is a flat inner-product index with no
//! tombstones: `remove` rebuilds the live vector set without the evicted
//! document's rows, per the index-rebuild-on-remove design note.

use super::{Embedder, cosine_similarity};
use crate::error::Result;
use crate::model::{IndexedChunk, SearchHit};
use std::collections::HashMap;
use std::sync::RwLock;

/// Snapshot of index occupancy, returned by `stats()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexStats {
    /// Total number of vectors currently stored.
    pub total_vectors: usize,
    /// Dimensionality of stored vectors.
    pub dimension: usize,
    /// Number of distinct documents represented.
    pub unique_documents: usize,
}

struct Entry {
    chunk: IndexedChunk,
    vector: Vec<f32>,
}

/// The add/search/remove/stats contract consumed by the retriever.
///
/// A single writer is assumed; this trait does not itself provide locking
/// beyond what an implementation chooses (`InMemoryIndex` uses an
/// `RwLock`, serializing writers against readers per the shared-resource
/// policy).
pub trait EmbeddingIndex: Send + Sync {
    /// Adds `chunks` under `doc_id`. Idempotent: re-adding the same
    /// `doc_id` is a no-op if it is already present.
    ///
    /// # Errors
    ///
    /// Returns an error if embedding any chunk fails.
    fn add(&self, doc_id: &str, chunks: &[(usize, String)]) -> Result<()>;

    /// Returns at most `k` hits with score ≥ `threshold`, ordered by score
    /// descending.
    ///
    /// # Errors
    ///
    /// Returns an error if the query could not be embedded.
    fn search(&self, query: &str, k: usize, threshold: f32) -> Result<Vec<SearchHit>>;

    /// Removes all chunks belonging to `doc_id`.
    fn remove(&self, doc_id: &str);

    /// Returns whether `doc_id` has already been indexed.
    fn contains(&self, doc_id: &str) -> bool;

    /// Returns current index occupancy.
    fn stats(&self) -> IndexStats;
}

/// Flat in-memory inner-product index over unit-normalized embeddings.
pub struct InMemoryIndex {
    embedder: Box<dyn Embedder>,
    entries: RwLock<Vec<Entry>>,
    next_chunk_id: RwLock<u64>,
}

impl InMemoryIndex {
    /// Creates an empty index backed by `embedder`.
    #[must_use]
    pub fn new(embedder: Box<dyn Embedder>) -> Self {
        Self {
            embedder,
            entries: RwLock::new(Vec::new()),
            next_chunk_id: RwLock::new(1),
        }
    }
}

impl EmbeddingIndex for InMemoryIndex {
    fn add(&self, doc_id: &str, chunks: &[(usize, String)]) -> Result<()> {
        if self.contains(doc_id) {
            return Ok(());
        }
        let texts: Vec<&str> = chunks.iter().map(|(_, t)| t.as_str()).collect();
        let vectors = self.embedder.embed_batch(&texts)?;

        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let mut next_id = self.next_chunk_id.write().unwrap_or_else(|e| e.into_inner());

        for ((chunk_index, text), vector) in chunks.iter().zip(vectors.into_iter()) {
            let chunk_id = *next_id;
            *next_id += 1;
            entries.push(Entry {
                chunk: IndexedChunk {
                    chunk_id,
                    doc_id: doc_id.to_string(),
                    chunk_index: *chunk_index,
                    text: text.clone(),
                },
                vector,
            });
        }
        Ok(())
    }

    fn search(&self, query: &str, k: usize, threshold: f32) -> Result<Vec<SearchHit>> {
        let query_vec = self.embedder.embed(query)?;
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());

        let mut scored: Vec<(f32, &Entry)> = entries
            .iter()
            .map(|e| (cosine_similarity(&query_vec, &e.vector), e))
            .filter(|(score, _)| *score >= threshold)
            .collect();

        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(score, e)| SearchHit {
                chunk_id: e.chunk.chunk_id,
                score: score.clamp(0.0, 1.0),
                text: e.chunk.text.clone(),
                doc_id: e.chunk.doc_id.clone(),
                chunk_index: e.chunk.chunk_index,
                matched_query: query.to_string(),
                search_pass: 0,
            })
            .collect())
    }

    fn remove(&self, doc_id: &str) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.retain(|e| e.chunk.doc_id != doc_id);
    }

    fn contains(&self, doc_id: &str) -> bool {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.iter().any(|e| e.chunk.doc_id == doc_id)
    }

    fn stats(&self) -> IndexStats {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        let unique_documents = entries
            .iter()
            .map(|e| e.chunk.doc_id.as_str())
            .collect::<std::collections::HashSet<_>>()
            .len();
        IndexStats {
            total_vectors: entries.len(),
            dimension: self.embedder.dimensions(),
            unique_documents,
        }
    }
}

/// Groups chunk ids by document, used by `remove` callers that need to know
/// which chunk ids a document owned before eviction.
#[must_use]
pub fn chunk_ids_by_doc(chunks: &[IndexedChunk]) -> HashMap<String, Vec<u64>> {
    let mut map: HashMap<String, Vec<u64>> = HashMap::new();
    for c in chunks {
        map.entry(c.doc_id.clone()).or_default().push(c.chunk_id);
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::FallbackEmbedder;

    fn index() -> InMemoryIndex {
        InMemoryIndex::new(Box::new(FallbackEmbedder::new(32)))
    }

    #[test]
    fn add_then_search_finds_chunk() {
        let idx = index();
        idx.add(
            "doc1",
            &[(0, "grace period thirty days premium payment".to_string())],
        )
        .unwrap();
        let hits = idx.search("grace period premium", 5, 0.0).unwrap();
        assert!(!hits.is_empty());
        assert_eq!(hits[0].doc_id, "doc1");
    }

    #[test]
    fn add_is_idempotent_per_doc_id() {
        let idx = index();
        idx.add("doc1", &[(0, "alpha beta".to_string())]).unwrap();
        idx.add("doc1", &[(0, "alpha beta".to_string()), (1, "gamma".to_string())])
            .unwrap();
        assert_eq!(idx.stats().total_vectors, 1);
    }

    #[test]
    fn remove_evicts_only_that_document() {
        let idx = index();
        idx.add("doc1", &[(0, "alpha".to_string())]).unwrap();
        idx.add("doc2", &[(0, "beta".to_string())]).unwrap();
        idx.remove("doc1");
        assert!(!idx.contains("doc1"));
        assert!(idx.contains("doc2"));
        assert_eq!(idx.stats().total_vectors, 1);
    }

    #[test]
    fn search_respects_k_and_threshold() {
        let idx = index();
        for i in 0..10 {
            idx.add(&format!("doc{i}"), &[(0, format!("chunk number {i} content"))])
                .unwrap();
        }
        let hits = idx.search("chunk number content", 3, 0.0).unwrap();
        assert!(hits.len() <= 3);
    }

    #[test]
    fn search_returns_empty_above_impossible_threshold() {
        let idx = index();
        idx.add("doc1", &[(0, "alpha".to_string())]).unwrap();
        let hits = idx.search("completely unrelated text", 5, 1.01).unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn chunk_ids_per_doc_groups_correctly() {
        let chunks = vec![
            IndexedChunk {
                chunk_id: 1,
                doc_id: "a".to_string(),
                chunk_index: 0,
                text: String::new(),
            },
            IndexedChunk {
                chunk_id: 2,
                doc_id: "a".to_string(),
                chunk_index: 1,
                text: String::new(),
            },
            IndexedChunk {
                chunk_id: 3,
                doc_id: "b".to_string(),
                chunk_index: 0,
                text: String::new(),
            },
        ];
        let grouped = chunk_ids_by_doc(&chunks);
        assert_eq!(grouped["a"], vec![1, 2]);
        assert_eq!(grouped["b"], vec![3]);
    }
}

//! Multi-pass, multi-variant retrieval and score fusion.

mod fusion;

pub use fusion::ChunkFusion;

use crate::config::Config;
use crate::embedding::EmbeddingIndex;
use crate::error::Result;
use crate::model::{QueryVariant, SearchHit};
use std::collections::HashMap;

struct PassConfig {
    threshold: f32,
    k: usize,
    boost: f32,
}

/// Runs a two-pass, multi-variant search against an [`EmbeddingIndex`],
/// merging hits by chunk id and keeping the best score seen for each.
pub struct Retriever<'a> {
    index: &'a dyn EmbeddingIndex,
}

impl<'a> Retriever<'a> {
    /// Wraps `index` for multi-pass retrieval.
    #[must_use]
    pub const fn new(index: &'a dyn EmbeddingIndex) -> Self {
        Self { index }
    }

    /// Searches with every variant in `variants`, across both retrieval
    /// passes, and returns at most 15 merged hits sorted by score
    /// descending.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying index search fails.
    pub fn search(&self, variants: &[QueryVariant], config: &Config) -> Result<Vec<SearchHit>> {
        let passes = [
            PassConfig { threshold: config.similarity_threshold_pass0, k: 6, boost: 1.00 },
            PassConfig { threshold: config.similarity_threshold_pass1, k: 4, boost: 0.80 },
        ];

        let mut best: HashMap<u64, SearchHit> = HashMap::new();

        for (pass_idx, pass) in passes.iter().enumerate() {
            for (i, variant) in variants.iter().enumerate() {
                let adjusted_k = (pass.k.saturating_sub(i / 3)).max(3);
                let adjusted_threshold = (pass.threshold + 0.02 * i as f32).min(0.7);

                let hits = self.index.search(&variant.text, adjusted_k, adjusted_threshold)?;
                for mut hit in hits {
                    let decay = (1.0 - 0.02 * i as f32).max(0.0);
                    hit.score = (hit.score * pass.boost * decay).clamp(0.0, 1.0);
                    hit.matched_query = variant.text.clone();
                    hit.search_pass = u8::try_from(pass_idx).unwrap_or(u8::MAX);

                    best.entry(hit.chunk_id)
                        .and_modify(|existing| {
                            if hit.score > existing.score {
                                *existing = hit.clone();
                            }
                        })
                        .or_insert(hit);
                }
            }
        }

        let mut merged: Vec<SearchHit> = best.into_values().collect();
        merged.sort_by(|a, b| b.score.total_cmp(&a.score));
        merged.truncate(15);
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::{FallbackEmbedder, InMemoryIndex};

    fn index_with(docs: &[(&str, &str)]) -> InMemoryIndex {
        let idx = InMemoryIndex::new(Box::new(FallbackEmbedder::new(32)));
        for (doc_id, text) in docs {
            idx.add(doc_id, &[(0, (*text).to_string())]).unwrap();
        }
        idx
    }

    #[test]
    fn search_merges_hits_across_passes_and_variants() {
        let idx = index_with(&[
            ("doc1", "grace period thirty days premium payment"),
            ("doc2", "waiting period pre-existing disease thirty six months"),
        ]);
        let retriever = Retriever::new(&idx);
        let variants = vec![
            QueryVariant { text: "grace period premium".to_string(), priority_score: 100.0 },
            QueryVariant { text: "thirty days grace".to_string(), priority_score: 60.0 },
        ];
        let hits = retriever.search(&variants, &Config::default()).unwrap();
        assert!(hits.len() <= 15);
        assert!(!hits.is_empty());
    }

    #[test]
    fn search_caps_at_fifteen_hits() {
        let docs: Vec<(String, String)> =
            (0..20).map(|i| (format!("doc{i}"), format!("grace period premium chunk {i}"))).collect();
        let idx = InMemoryIndex::new(Box::new(FallbackEmbedder::new(32)));
        for (doc_id, text) in &docs {
            idx.add(doc_id, &[(0, text.clone())]).unwrap();
        }
        let retriever = Retriever::new(&idx);
        let variants = vec![QueryVariant { text: "grace period premium".to_string(), priority_score: 100.0 }];
        let hits = retriever.search(&variants, &Config::default()).unwrap();
        assert!(hits.len() <= 15);
    }

    #[test]
    fn later_variants_get_narrower_k_and_stricter_threshold() {
        let idx = index_with(&[("doc1", "grace period premium payment thirty days")]);
        let retriever = Retriever::new(&idx);
        let many_variants: Vec<QueryVariant> = (0..10)
            .map(|i| QueryVariant { text: format!("grace period variant {i}"), priority_score: 100.0 - i as f32 })
            .collect();
        let hits = retriever.search(&many_variants, &Config::default()).unwrap();
        assert!(hits.len() <= 15);
    }
}

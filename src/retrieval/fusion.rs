//! Weighted fusion of vector similarity and clause confidence.

use crate::model::{ClauseMatch, FusedChunk, QueryType, SearchHit};
use std::collections::HashMap;

/// Combines retrieval hits with clause-matcher confidence into a single
/// ranked, capped list of chunks.
pub struct ChunkFusion;

impl ChunkFusion {
    /// Fuses `hits` and `matches` (joined by `(doc_id, chunk_index)`) using
    /// `final = 0.6 * vector_score + 0.3 * clause_confidence + 0.1 * first_pass_bonus`,
    /// where `first_pass_bonus` is 0.1 when the hit came from the first
    /// retrieval pass and 0 otherwise. Keeps the top 5 chunks normally, or
    /// the top 8 for [`QueryType::is_complex`] types.
    #[must_use]
    pub fn fuse(hits: &[SearchHit], matches: &[ClauseMatch], query_type: QueryType) -> Vec<FusedChunk> {
        let by_key: HashMap<(&str, usize), &ClauseMatch> =
            matches.iter().map(|m| ((m.doc_id.as_str(), m.chunk_index), m)).collect();

        let mut fused: Vec<FusedChunk> = hits
            .iter()
            .map(|hit| {
                let clause_match = by_key.get(&(hit.doc_id.as_str(), hit.chunk_index));
                let clause_confidence = clause_match.map_or(0.0, |m| m.confidence);
                let first_pass_bonus = if hit.search_pass == 0 { 0.1 } else { 0.0 };
                let final_score = 0.6 * hit.score + 0.3 * clause_confidence + 0.1 * first_pass_bonus;

                FusedChunk {
                    text: hit.text.clone(),
                    doc_id: hit.doc_id.clone(),
                    chunk_index: hit.chunk_index,
                    final_score: final_score.clamp(0.0, 1.0),
                    clause_type: clause_match.map(|m| m.clause_type),
                }
            })
            .collect();

        fused.sort_by(|a, b| b.final_score.total_cmp(&a.final_score));
        let limit = if query_type.is_complex() { 8 } else { 5 };
        fused.truncate(limit);
        fused
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ClauseType;

    fn hit(doc_id: &str, chunk_index: usize, score: f32, pass: u8) -> SearchHit {
        SearchHit {
            chunk_id: u64::try_from(chunk_index + 1).unwrap(),
            score,
            text: format!("chunk {chunk_index}"),
            doc_id: doc_id.to_string(),
            chunk_index,
            matched_query: "q".to_string(),
            search_pass: pass,
        }
    }

    fn clause_match(doc_id: &str, chunk_index: usize, confidence: f32) -> ClauseMatch {
        ClauseMatch {
            text: format!("chunk {chunk_index}"),
            similarity_score: 0.5,
            doc_id: doc_id.to_string(),
            chunk_index,
            clause_type: ClauseType::Coverage,
            confidence,
            pattern_matches: vec![],
            keyword_density: 0.0,
            context_relevance: 0.0,
            regulatory_score: 0.0,
        }
    }

    #[test]
    fn caps_at_five_for_simple_types() {
        let hits: Vec<SearchHit> = (0..10).map(|i| hit("doc1", i, 0.9, 0)).collect();
        let fused = ChunkFusion::fuse(&hits, &[], QueryType::GracePeriod);
        assert_eq!(fused.len(), 5);
    }

    #[test]
    fn caps_at_eight_for_complex_types() {
        let hits: Vec<SearchHit> = (0..10).map(|i| hit("doc1", i, 0.9, 0)).collect();
        let fused = ChunkFusion::fuse(&hits, &[], QueryType::Exclusion);
        assert_eq!(fused.len(), 8);
    }

    #[test]
    fn first_pass_hits_score_higher_all_else_equal() {
        let hits = vec![hit("doc1", 0, 0.5, 0), hit("doc1", 1, 0.5, 1)];
        let fused = ChunkFusion::fuse(&hits, &[], QueryType::General);
        assert!(fused[0].chunk_index == 0);
        assert!(fused[0].final_score > fused[1].final_score);
    }

    #[test]
    fn clause_confidence_contributes_to_final_score() {
        let hits = vec![hit("doc1", 0, 0.5, 1)];
        let matches = vec![clause_match("doc1", 0, 1.0)];
        let fused = ChunkFusion::fuse(&hits, &matches, QueryType::General);
        assert!((fused[0].final_score - (0.6 * 0.5 + 0.3 * 1.0)).abs() < 1e-5);
        assert_eq!(fused[0].clause_type, Some(ClauseType::Coverage));
    }

    #[test]
    fn unmatched_hits_get_zero_clause_confidence() {
        let hits = vec![hit("doc1", 0, 0.8, 0)];
        let fused = ChunkFusion::fuse(&hits, &[], QueryType::General);
        assert_eq!(fused[0].clause_type, None);
    }
}

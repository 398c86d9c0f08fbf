//! Clause-family pattern matching: re-scores retrieved chunks against the
//! question's dominant clause types to sharpen vector-only similarity.

mod patterns;

use crate::model::{ClauseMatch, ClauseType, QueryType, SearchHit};
use patterns::CLAUSE_PATTERNS;
use rayon::prelude::*;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "is", "are", "was", "were", "be", "been", "being", "of", "to", "in", "on",
    "for", "and", "or", "but", "with", "what", "how", "does", "do", "this", "that", "it", "as",
    "by", "at", "from",
];

static REGULATORY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)irdai|regulatory|regulation|authority|licensed?|uin\b")
        .unwrap_or_else(|e| unreachable!("{e}"))
});

/// Scores retrieved chunks against a question's clause relevance.
pub struct ClauseMatcher;

impl ClauseMatcher {
    /// Scores every hit in `hits` against `dominant` clause types, returning
    /// one [`ClauseMatch`] per hit attributed to the highest-scoring
    /// dominant type present.
    #[must_use]
    pub fn match_chunks(question: &str, dominant: &[ClauseType], hits: &[SearchHit]) -> Vec<ClauseMatch> {
        hits.par_iter().map(|hit| Self::score_chunk(question, dominant, hit)).collect()
    }

    /// Scores a single chunk against the best-matching type in `dominant`
    /// (or [`ClauseType::Coverage`] if `dominant` is empty).
    #[must_use]
    pub fn score_chunk(question: &str, dominant: &[ClauseType], hit: &SearchHit) -> ClauseMatch {
        let pattern_matches = matching_clause_names(&hit.text);
        let fallback = [ClauseType::Coverage];
        let candidates: &[ClauseType] = if dominant.is_empty() { &fallback } else { dominant };

        let mut best: Option<(ClauseType, f32, f32, f32, f32, f32, f32)> = None;
        for &clause_type in candidates {
            let pattern_boost = pattern_boost_for(clause_type, &hit.text);
            let keyword_density = keyword_density(question, &hit.text);
            let context_relevance = context_relevance_for(clause_type, &hit.text);
            let regulatory_score = regulatory_score(&hit.text);
            let length_boost = length_boost(&hit.text);
            let insurance_boost = insurance_boost(&hit.text);

            let confidence = (0.4 * hit.score
                + 0.25 * pattern_boost
                + 0.15 * keyword_density
                + 0.1 * context_relevance
                + 0.05 * length_boost
                + 0.05 * insurance_boost)
                .min(1.0);

            let better = match &best {
                Some((_, existing_confidence, ..)) => confidence > *existing_confidence,
                None => true,
            };
            if better {
                best = Some((
                    clause_type,
                    confidence,
                    keyword_density,
                    context_relevance,
                    regulatory_score,
                    length_boost,
                    insurance_boost,
                ));
            }
        }

        let (clause_type, confidence, keyword_density, context_relevance, regulatory_score, ..) =
            best.unwrap_or((ClauseType::Coverage, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0));

        ClauseMatch {
            text: hit.text.clone(),
            similarity_score: hit.score,
            doc_id: hit.doc_id.clone(),
            chunk_index: hit.chunk_index,
            clause_type,
            confidence,
            pattern_matches,
            keyword_density,
            context_relevance,
            regulatory_score,
        }
    }

    /// Filters matches to those worth keeping: confidence ≥ 0.3, at least
    /// one pattern match, keyword density ≥ 0.15, context relevance ≥ 0.2,
    /// or similarity ≥ 0.5. Falls back to the top 8 by confidence if fewer
    /// than 3 survive.
    #[must_use]
    pub fn filter_relevant(mut matches: Vec<ClauseMatch>) -> Vec<ClauseMatch> {
        let kept: Vec<ClauseMatch> = matches
            .iter()
            .filter(|m| {
                m.confidence >= 0.3
                    || !m.pattern_matches.is_empty()
                    || m.keyword_density >= 0.15
                    || m.context_relevance >= 0.2
                    || m.similarity_score >= 0.5
            })
            .cloned()
            .collect();

        if kept.len() >= 3 {
            return kept;
        }

        matches.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        matches.truncate(8);
        matches
    }

    /// Co-occurrence counts: how often each pair of clause types appears
    /// together across `matches`' pattern-match attributions.
    #[must_use]
    pub fn relationships(matches: &[ClauseMatch]) -> Vec<(ClauseType, ClauseType, usize)> {
        let mut counts: std::collections::HashMap<(ClauseType, ClauseType), usize> =
            std::collections::HashMap::new();
        for m in matches {
            let types: Vec<ClauseType> = m
                .pattern_matches
                .iter()
                .filter_map(|name| ClauseType::ALL.iter().find(|ct| ct.as_str() == name).copied())
                .collect();
            for i in 0..types.len() {
                for j in (i + 1)..types.len() {
                    let (a, b) = order_pair(types[i], types[j]);
                    *counts.entry((a, b)).or_insert(0) += 1;
                }
            }
        }
        let mut out: Vec<(ClauseType, ClauseType, usize)> =
            counts.into_iter().map(|((a, b), n)| (a, b, n)).collect();
        out.sort_by(|a, b| b.2.cmp(&a.2));
        out
    }

    /// Per-clause-type match counts and mean confidence across `matches`.
    #[must_use]
    pub fn statistics(matches: &[ClauseMatch]) -> Vec<(ClauseType, usize, f32)> {
        let mut out = Vec::new();
        for ct in ClauseType::ALL {
            let relevant: Vec<&ClauseMatch> = matches.iter().filter(|m| m.clause_type == ct).collect();
            if relevant.is_empty() {
                continue;
            }
            let mean = relevant.iter().map(|m| m.confidence).sum::<f32>() / relevant.len() as f32;
            out.push((ct, relevant.len(), mean));
        }
        out
    }
}

/// Maps a question's [`QueryType`] to the clause families its chunks should
/// be scored against. An empty result means the matcher falls back to
/// [`ClauseType::Coverage`].
#[must_use]
pub const fn dominant_types_for(query_type: QueryType) -> &'static [ClauseType] {
    match query_type {
        QueryType::GracePeriod => &[ClauseType::GracePeriod],
        QueryType::WaitingPeriod => &[ClauseType::WaitingPeriod, ClauseType::PreExisting, ClauseType::Maternity],
        QueryType::Coverage => &[ClauseType::Coverage, ClauseType::TableBenefits],
        QueryType::Exclusion => &[ClauseType::Exclusion],
        QueryType::NumericalLimit => {
            &[ClauseType::SumInsuredLimits, ClauseType::RoomRent, ClauseType::IcuCharges, ClauseType::Deductible]
        }
        QueryType::Definition => &[ClauseType::HospitalDefinition],
        QueryType::UinRegulatory => &[ClauseType::Regulatory, ClauseType::Licensing],
        QueryType::AirAmbulance => &[ClauseType::AirAmbulance, ClauseType::DistanceTravel],
        QueryType::MaternityWellBaby => {
            &[ClauseType::Maternity, ClauseType::WellMother, ClauseType::WellBaby, ClauseType::MultipleBirth]
        }
        QueryType::TableBenefits => &[ClauseType::TableBenefits, ClauseType::PlanTypes],
        QueryType::General => &[],
    }
}

fn order_pair(a: ClauseType, b: ClauseType) -> (ClauseType, ClauseType) {
    if a.as_str() <= b.as_str() { (a, b) } else { (b, a) }
}

fn matching_clause_names(text: &str) -> Vec<String> {
    CLAUSE_PATTERNS
        .iter()
        .filter(|(_, _, patterns)| patterns.iter().any(|re| re.is_match(text)))
        .map(|(ct, ..)| ct.as_str().to_string())
        .collect()
}

/// Hand-curated context indicator terms per clause type. Types absent from
/// this map contribute nothing to context relevance.
const CONTEXT_INDICATORS: &[(ClauseType, &[&str])] = &[
    (ClauseType::AirAmbulance, &["hospital", "emergency", "medical", "transport", "evacuation"]),
    (ClauseType::WellMother, &["pregnancy", "maternal", "delivery", "prenatal", "postnatal"]),
    (ClauseType::WellBaby, &["newborn", "infant", "baby", "neonatal", "pediatric"]),
    (ClauseType::Regulatory, &["authority", "government", "approval", "license", "compliance"]),
    (ClauseType::WaitingPeriod, &["months", "years", "continuous", "inception", "commencement"]),
    (ClauseType::GracePeriod, &["payment", "premium", "renewal", "due", "extension"]),
    (ClauseType::Maternity, &["pregnancy", "delivery", "childbirth", "obstetric", "labor"]),
];

/// High-value insurance terms, weighted 0.05 per hit.
const HIGH_VALUE_TERMS: &[&str] = &[
    "sum insured", "policy limit", "coverage amount", "benefit limit", "waiting period",
    "grace period", "pre-existing", "maternity", "air ambulance", "well mother", "well baby",
    "proportionate", "licensed authority", "competent authority", "table of benefits",
];

/// Medium-value insurance terms, weighted 0.02 per hit.
const MEDIUM_VALUE_TERMS: &[&str] = &[
    "premium", "deductible", "co-pay", "exclusion", "coverage", "benefit", "treatment",
    "hospitalization", "medical expenses", "reimbursement", "indemnity", "compensation",
];

/// `min(0.3, 0.1 * match_count * weight)` for `clause_type`'s own patterns,
/// clamped to 0.5 overall.
fn pattern_boost_for(clause_type: ClauseType, text: &str) -> f32 {
    CLAUSE_PATTERNS
        .iter()
        .find(|(ct, ..)| *ct == clause_type)
        .map(|(_, weight, patterns)| {
            let hits: usize = patterns.iter().map(|re| re.find_iter(text).count()).sum();
            (0.1 * hits as f32 * weight).min(0.3)
        })
        .unwrap_or(0.0)
        .min(0.5)
}

/// Counts hand-curated context indicator hits for `clause_type`, scored
/// `min(0.3, 0.1 * count * weight)` and clamped to 1.0.
fn context_relevance_for(clause_type: ClauseType, text: &str) -> f32 {
    let Some((_, indicators)) = CONTEXT_INDICATORS.iter().find(|(ct, _)| *ct == clause_type) else {
        return 0.0;
    };
    let text_lower = text.to_lowercase();
    let matches = indicators.iter().filter(|term| text_lower.contains(**term)).count();
    if matches == 0 {
        return 0.0;
    }
    let weight = CLAUSE_PATTERNS.iter().find(|(ct, ..)| *ct == clause_type).map_or(1.0, |(_, w, _)| *w);
    (0.1 * matches as f32 * weight).min(0.3).min(1.0)
}

fn keyword_density(question: &str, text: &str) -> f32 {
    let q_tokens = meaningful_tokens(question);
    if q_tokens.is_empty() {
        return 0.0;
    }
    let text_lower = text.to_lowercase();
    let overlap = q_tokens.iter().filter(|t| text_lower.contains(t.as_str())).count();
    let overlap_ratio = overlap as f32 / q_tokens.len() as f32;

    let question_lower = question.to_lowercase();
    let phrase_boost = if text_lower.contains(question_lower.trim()) {
        0.3
    } else {
        let words: Vec<&str> = question_lower.split_whitespace().collect();
        let bigram_hits = words.windows(2).filter(|w| text_lower.contains(&w.join(" "))).count();
        (0.1 * bigram_hits as f32).min(0.2)
    };

    (overlap_ratio + phrase_boost).min(1.0)
}

fn meaningful_tokens(question: &str) -> HashSet<String> {
    question
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty() && !STOP_WORDS.contains(w))
        .map(str::to_string)
        .collect()
}

/// `min(1.0, count * 0.1)` over the regulatory pattern set.
fn regulatory_score(text: &str) -> f32 {
    let count = REGULATORY_PATTERN.find_iter(text).count();
    (count as f32 * 0.1).min(1.0)
}

/// Word-count tiered boost; can be negative for very short chunks.
fn length_boost(text: &str) -> f32 {
    let words = text.split_whitespace().count();
    if words < 15 {
        -0.1
    } else if words < 30 {
        0.0
    } else if words < 100 {
        0.1
    } else if words < 200 {
        0.15
    } else {
        0.1
    }
}

fn insurance_boost(text: &str) -> f32 {
    let lower = text.to_lowercase();
    let high = HIGH_VALUE_TERMS.iter().filter(|t| lower.contains(**t)).count();
    let medium = MEDIUM_VALUE_TERMS.iter().filter(|t| lower.contains(**t)).count();
    (high as f32 * 0.05 + medium as f32 * 0.02).min(0.3)
}

//! Domain entities shared across the pipeline.
//!
//! These are pure data structures with no I/O: the normalizer, chunker,
//! matcher, retriever, and orchestrator all read and write values of these
//! types rather than reaching into each other's internals.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A fetched and parsed source document, chunked and ready to index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Stable content hash, used as the index's `doc_id` and as half of the
    /// per-question cache key.
    pub id: String,
    /// The URL the document was fetched from.
    pub url: String,
    /// Coarse file type ("pdf", "docx", "eml", "html", "text").
    pub file_type: String,
    /// Normalized full text, markers and all.
    pub raw_text: String,
    /// Ordered chunks produced from `raw_text`.
    pub chunks: Vec<ChunkText>,
}

/// A bounded, non-empty slice of normalized text, the atomic unit of retrieval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkText {
    /// Position of this chunk within its document, starting at 0.
    pub index: usize,
    /// The chunk's text. Length is always in `[MIN_CHUNK_LEN, 1.5 * target]`.
    pub text: String,
}

/// A chunk as stored in the embedding index, addressable by a monotonically
/// assigned integer id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedChunk {
    /// Monotonic id assigned by the index at insertion time.
    pub chunk_id: u64,
    /// Owning document id.
    pub doc_id: String,
    /// Position within the document. `(doc_id, chunk_index)` is unique.
    pub chunk_index: usize,
    /// The chunk's text.
    pub text: String,
}

/// The ~30 typed clause families the matcher scores chunks against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClauseType {
    /// Waiting periods (pre-existing conditions, specific illnesses, …).
    WaitingPeriod,
    /// Grace period for premium payment.
    GracePeriod,
    /// General coverage / benefit scope.
    Coverage,
    /// Exclusions and "not covered" statements.
    Exclusion,
    /// Premium amounts, modes, and schedules.
    Premium,
    /// Maternity coverage.
    Maternity,
    /// Pre-existing disease provisions.
    PreExisting,
    /// Deductible amounts.
    Deductible,
    /// Air ambulance coverage.
    AirAmbulance,
    /// Distance/travel limits tied to a benefit.
    DistanceTravel,
    /// Well-mother care.
    WellMother,
    /// Well-baby care.
    WellBaby,
    /// Routine / preventive medical care.
    RoutineCare,
    /// Regulatory language generally.
    Regulatory,
    /// Licensing and authority requirements.
    Licensing,
    /// Table-of-benefits / benefit schedules.
    TableBenefits,
    /// Multiple-birth provisions.
    MultipleBirth,
    /// Proportionate payment calculations.
    ProportionatePayment,
    /// Named time-period options (e.g., policy term choices).
    PeriodOptions,
    /// Medical examination requirements.
    MedicalExamination,
    /// Sum-insured limits and sub-limits.
    SumInsuredLimits,
    /// Plan-type variations (Plan A/B/C, …).
    PlanTypes,
    /// AYUSH (alternative medicine) treatment coverage.
    AyushTreatment,
    /// The policy's definition of "Hospital".
    HospitalDefinition,
    /// Organ donor expense coverage.
    OrganDonor,
    /// No-claim discount provisions.
    NoClaimDiscount,
    /// Health checkup / preventive screening benefits.
    HealthCheckup,
    /// Room rent sub-limits.
    RoomRent,
    /// ICU charge sub-limits.
    IcuCharges,
    /// Cataract surgery-specific provisions.
    CataractSurgery,
}

impl ClauseType {
    /// All clause types, in a fixed and stable order.
    pub const ALL: [ClauseType; 30] = [
        ClauseType::WaitingPeriod,
        ClauseType::GracePeriod,
        ClauseType::Coverage,
        ClauseType::Exclusion,
        ClauseType::Premium,
        ClauseType::Maternity,
        ClauseType::PreExisting,
        ClauseType::Deductible,
        ClauseType::AirAmbulance,
        ClauseType::DistanceTravel,
        ClauseType::WellMother,
        ClauseType::WellBaby,
        ClauseType::RoutineCare,
        ClauseType::Regulatory,
        ClauseType::Licensing,
        ClauseType::TableBenefits,
        ClauseType::MultipleBirth,
        ClauseType::ProportionatePayment,
        ClauseType::PeriodOptions,
        ClauseType::MedicalExamination,
        ClauseType::SumInsuredLimits,
        ClauseType::PlanTypes,
        ClauseType::AyushTreatment,
        ClauseType::HospitalDefinition,
        ClauseType::OrganDonor,
        ClauseType::NoClaimDiscount,
        ClauseType::HealthCheckup,
        ClauseType::RoomRent,
        ClauseType::IcuCharges,
        ClauseType::CataractSurgery,
    ];

    /// Stable lowercase-snake-case name, used for logging and serialization keys.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ClauseType::WaitingPeriod => "waiting_period",
            ClauseType::GracePeriod => "grace_period",
            ClauseType::Coverage => "coverage",
            ClauseType::Exclusion => "exclusion",
            ClauseType::Premium => "premium",
            ClauseType::Maternity => "maternity",
            ClauseType::PreExisting => "pre_existing",
            ClauseType::Deductible => "deductible",
            ClauseType::AirAmbulance => "air_ambulance",
            ClauseType::DistanceTravel => "distance_travel",
            ClauseType::WellMother => "well_mother",
            ClauseType::WellBaby => "well_baby",
            ClauseType::RoutineCare => "routine_care",
            ClauseType::Regulatory => "regulatory",
            ClauseType::Licensing => "licensing",
            ClauseType::TableBenefits => "table_benefits",
            ClauseType::MultipleBirth => "multiple_birth",
            ClauseType::ProportionatePayment => "proportionate_payment",
            ClauseType::PeriodOptions => "period_options",
            ClauseType::MedicalExamination => "medical_examination",
            ClauseType::SumInsuredLimits => "sum_insured_limits",
            ClauseType::PlanTypes => "plan_types",
            ClauseType::AyushTreatment => "ayush_treatment",
            ClauseType::HospitalDefinition => "hospital_definition",
            ClauseType::OrganDonor => "organ_donor",
            ClauseType::NoClaimDiscount => "no_claim_discount",
            ClauseType::HealthCheckup => "health_checkup",
            ClauseType::RoomRent => "room_rent",
            ClauseType::IcuCharges => "icu_charges",
            ClauseType::CataractSurgery => "cataract_surgery",
        }
    }
}

impl fmt::Display for ClauseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The 11-way classification used to select a prompt template and
/// generation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueryType {
    /// Grace period for premium payment.
    GracePeriod,
    /// Waiting periods before a benefit applies.
    WaitingPeriod,
    /// What is covered and under what conditions.
    Coverage,
    /// What is explicitly excluded.
    Exclusion,
    /// Percentages, sub-limits, amounts.
    NumericalLimit,
    /// "What does X mean" / glossary-style questions.
    Definition,
    /// UIN / regulatory identifiers and authority requirements.
    UinRegulatory,
    /// Air ambulance coverage specifics.
    AirAmbulance,
    /// Maternity / well-mother / well-baby questions.
    MaternityWellBaby,
    /// Benefit schedules and tables.
    TableBenefits,
    /// Anything not matched by a more specific type.
    General,
}

impl QueryType {
    /// Whether this type gets a widened context window in chunk fusion.
    #[must_use]
    pub const fn is_complex(self) -> bool {
        matches!(
            self,
            QueryType::Exclusion | QueryType::TableBenefits | QueryType::Coverage | QueryType::MaternityWellBaby
        )
    }

    /// Stable lowercase name for logging.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            QueryType::GracePeriod => "grace_period",
            QueryType::WaitingPeriod => "waiting_period",
            QueryType::Coverage => "coverage",
            QueryType::Exclusion => "exclusion",
            QueryType::NumericalLimit => "numerical_limit",
            QueryType::Definition => "definition",
            QueryType::UinRegulatory => "uin_regulatory",
            QueryType::AirAmbulance => "air_ambulance",
            QueryType::MaternityWellBaby => "maternity_wellbaby",
            QueryType::TableBenefits => "table_benefits",
            QueryType::General => "general",
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rewritten form of the user's question, used to broaden recall.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryVariant {
    /// The variant text.
    pub text: String,
    /// Priority score used to rank and truncate the variant list.
    pub priority_score: f32,
}

/// A single scored hit returned by the embedding index and carried through
/// retrieval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Id of the matched chunk in the index.
    pub chunk_id: u64,
    /// Effective score in `[0, 1]` after boost/decay.
    pub score: f32,
    /// Chunk text.
    pub text: String,
    /// Owning document id.
    pub doc_id: String,
    /// Position within the document.
    pub chunk_index: usize,
    /// The variant text that produced this hit.
    pub matched_query: String,
    /// Which retrieval pass (0 or 1) produced this hit.
    pub search_pass: u8,
}

/// The clause matcher's scoring of a single chunk against the question's
/// dominant clause types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClauseMatch {
    /// Chunk text that was scored.
    pub text: String,
    /// The chunk's vector similarity score (carried through from retrieval).
    pub similarity_score: f32,
    /// Owning document id.
    pub doc_id: String,
    /// Position within the document.
    pub chunk_index: usize,
    /// The clause type this match is attributed to (the question's dominant type).
    pub clause_type: ClauseType,
    /// Final confidence in `[0, 1]`.
    pub confidence: f32,
    /// Names of clause types whose patterns matched in this chunk.
    pub pattern_matches: Vec<String>,
    /// Stop-word-adjusted lexical overlap with the question, in `[0, 1]`.
    pub keyword_density: f32,
    /// Indicator-word overlap for the dominant clause type, in `[0, 1]`.
    pub context_relevance: f32,
    /// Regulatory-pattern overlap, in `[0, 1]`.
    pub regulatory_score: f32,
}

/// A chunk after fusion of vector similarity and clause confidence, ready
/// to be handed to the prompt builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusedChunk {
    /// Chunk text.
    pub text: String,
    /// Owning document id.
    pub doc_id: String,
    /// Position within the document.
    pub chunk_index: usize,
    /// Combined score: `0.6 * vector + 0.3 * clause_confidence + 0.1 * first_pass_bonus`.
    pub final_score: f32,
    /// The clause type attributed to this chunk, if any matcher ran over it.
    pub clause_type: Option<ClauseType>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clause_type_all_has_no_duplicates_and_matches_const_len() {
        let mut seen = std::collections::HashSet::new();
        for ct in ClauseType::ALL {
            assert!(seen.insert(ct.as_str()));
        }
        assert_eq!(ClauseType::ALL.len(), 30);
    }

    #[test]
    fn query_type_complex_set_matches_spec() {
        assert!(QueryType::Exclusion.is_complex());
        assert!(QueryType::TableBenefits.is_complex());
        assert!(QueryType::Coverage.is_complex());
        assert!(QueryType::MaternityWellBaby.is_complex());
        assert!(!QueryType::General.is_complex());
        assert!(!QueryType::GracePeriod.is_complex());
    }

    #[test]
    fn clause_type_display_uses_snake_case() {
        assert_eq!(ClauseType::AirAmbulance.to_string(), "air_ambulance");
        assert_eq!(QueryType::UinRegulatory.to_string(), "uin_regulatory");
    }
}

//! Regex pattern sets and weights for each clause family.

use crate::model::ClauseType;
use regex::Regex;
use std::sync::LazyLock;

pub(super) struct ClausePatterns {
    pub(super) clause_type: ClauseType,
    pub(super) weight: f32,
    pub(super) patterns: &'static [&'static str],
}

const RAW: &[ClausePatterns] = &[
    ClausePatterns {
        clause_type: ClauseType::WaitingPeriod,
        weight: 1.3,
        patterns: &[r"(?i)waiting\s*period", r"(?i)wait\s*\d+\s*(days?|months?|years?)", r"(?i)cooling\s*period"],
    },
    ClausePatterns {
        clause_type: ClauseType::GracePeriod,
        weight: 1.2,
        patterns: &[r"(?i)grace\s*period", r"(?i)premium\s*grace", r"(?i)payment\s*grace"],
    },
    ClausePatterns {
        clause_type: ClauseType::Coverage,
        weight: 1.0,
        patterns: &[r"(?i)is\s*covered", r"(?i)coverage\s*includes?", r"(?i)benefits?\s*payable"],
    },
    ClausePatterns {
        clause_type: ClauseType::Exclusion,
        weight: 1.25,
        patterns: &[r"(?i)shall\s*not\s*cover", r"(?i)excluded?", r"(?i)not\s*covered", r"(?i)exception"],
    },
    ClausePatterns {
        clause_type: ClauseType::Premium,
        weight: 1.0,
        patterns: &[r"(?i)premium\s*(amount|payable|mode)", r"(?i)instal?ment"],
    },
    ClausePatterns {
        clause_type: ClauseType::Maternity,
        weight: 1.2,
        patterns: &[r"(?i)maternity", r"(?i)pregnancy", r"(?i)childbirth", r"(?i)delivery\s*expenses"],
    },
    ClausePatterns {
        clause_type: ClauseType::PreExisting,
        weight: 1.3,
        patterns: &[r"(?i)pre[\s-]*existing", r"(?i)\bped\b"],
    },
    ClausePatterns {
        clause_type: ClauseType::Deductible,
        weight: 1.0,
        patterns: &[r"(?i)deductible", r"(?i)excess\s*amount"],
    },
    ClausePatterns {
        clause_type: ClauseType::AirAmbulance,
        weight: 1.4,
        patterns: &[r"(?i)air\s*ambulance", r"(?i)helicopter", r"(?i)aviation\s*evacuation"],
    },
    ClausePatterns {
        clause_type: ClauseType::DistanceTravel,
        weight: 1.1,
        patterns: &[r"(?i)\d+\s*(km|kilometers?|miles?)", r"(?i)distance\s*limit"],
    },
    ClausePatterns {
        clause_type: ClauseType::WellMother,
        weight: 1.2,
        patterns: &[r"(?i)well\s*mother", r"(?i)postnatal\s*mother"],
    },
    ClausePatterns {
        clause_type: ClauseType::WellBaby,
        weight: 1.2,
        patterns: &[r"(?i)well\s*baby", r"(?i)newborn\s*care", r"(?i)infant\s*care"],
    },
    ClausePatterns {
        clause_type: ClauseType::RoutineCare,
        weight: 1.0,
        patterns: &[r"(?i)routine\s*(care|checkup)", r"(?i)preventive\s*care"],
    },
    ClausePatterns {
        clause_type: ClauseType::Regulatory,
        weight: 1.15,
        patterns: &[r"(?i)regulatory", r"(?i)irdai", r"(?i)regulations?"],
    },
    ClausePatterns {
        clause_type: ClauseType::Licensing,
        weight: 1.1,
        patterns: &[r"(?i)licensed?", r"(?i)registered\s*under", r"(?i)authority"],
    },
    ClausePatterns {
        clause_type: ClauseType::TableBenefits,
        weight: 1.2,
        patterns: &[r"(?i)table\s*of\s*benefits", r"(?i)benefit\s*schedule", r"(?i)schedule\s*of\s*benefits"],
    },
    ClausePatterns {
        clause_type: ClauseType::MultipleBirth,
        weight: 1.1,
        patterns: &[r"(?i)multiple\s*birth", r"(?i)twins?", r"(?i)multiple\s*delivery"],
    },
    ClausePatterns {
        clause_type: ClauseType::ProportionatePayment,
        weight: 1.15,
        patterns: &[r"(?i)proportionate", r"(?i)pro[\s-]*rata"],
    },
    ClausePatterns {
        clause_type: ClauseType::PeriodOptions,
        weight: 1.0,
        patterns: &[r"(?i)policy\s*term", r"(?i)\d+\s*year\s*(policy|term)"],
    },
    ClausePatterns {
        clause_type: ClauseType::MedicalExamination,
        weight: 1.0,
        patterns: &[r"(?i)medical\s*examination", r"(?i)pre[\s-]*policy\s*check"],
    },
    ClausePatterns {
        clause_type: ClauseType::SumInsuredLimits,
        weight: 1.2,
        patterns: &[r"(?i)sum\s*insured", r"(?i)sub[\s-]?limit", r"(?i)maximum\s*(amount|limit)"],
    },
    ClausePatterns {
        clause_type: ClauseType::PlanTypes,
        weight: 1.0,
        patterns: &[r"(?i)plan\s*[abc]\b", r"(?i)plan\s*type"],
    },
    ClausePatterns {
        clause_type: ClauseType::AyushTreatment,
        weight: 1.2,
        patterns: &[r"(?i)ayush", r"(?i)ayurveda|yoga|unani|siddha|homeopathy"],
    },
    ClausePatterns {
        clause_type: ClauseType::HospitalDefinition,
        weight: 1.1,
        patterns: &[r"(?i)hospital\s*means", r"(?i)definition\s*of\s*hospital", r"(?i)nursing\s*home"],
    },
    ClausePatterns {
        clause_type: ClauseType::OrganDonor,
        weight: 1.1,
        patterns: &[r"(?i)organ\s*donor", r"(?i)donor\s*expenses", r"(?i)transplant"],
    },
    ClausePatterns {
        clause_type: ClauseType::NoClaimDiscount,
        weight: 1.15,
        patterns: &[r"(?i)no\s*claim\s*discount", r"(?i)\bncd\b", r"(?i)claim\s*free\s*discount"],
    },
    ClausePatterns {
        clause_type: ClauseType::HealthCheckup,
        weight: 1.0,
        patterns: &[r"(?i)health\s*check[\s-]*up", r"(?i)preventive\s*screening"],
    },
    ClausePatterns {
        clause_type: ClauseType::RoomRent,
        weight: 1.2,
        patterns: &[r"(?i)room\s*rent", r"(?i)accommodation\s*charges"],
    },
    ClausePatterns {
        clause_type: ClauseType::IcuCharges,
        weight: 1.2,
        patterns: &[r"(?i)\bicu\b", r"(?i)intensive\s*care\s*unit"],
    },
    ClausePatterns {
        clause_type: ClauseType::CataractSurgery,
        weight: 1.15,
        patterns: &[r"(?i)cataract"],
    },
];

pub(super) static CLAUSE_PATTERNS: LazyLock<Vec<(ClauseType, f32, Vec<Regex>)>> = LazyLock::new(|| {
    RAW.iter()
        .map(|cp| {
            let compiled = cp.patterns.iter().filter_map(|p| Regex::new(p).ok()).collect();
            (cp.clause_type, cp.weight, compiled)
        })
        .collect()
});

//! 11-way pattern-vote query classification.

use crate::model::QueryType;
use regex::Regex;
use std::sync::LazyLock;

struct TypePatterns {
    query_type: QueryType,
    patterns: &'static [&'static str],
}

/// Tie-break priority, most to least specific, per the specified order:
/// Numerical ≻ UIN ≻ AirAmbulance ≻ MaternityWellBaby ≻ WaitingPeriod ≻
/// GracePeriod ≻ Exclusion ≻ Definition ≻ Table ≻ Coverage ≻ General.
const PRIORITY: [QueryType; 10] = [
    QueryType::NumericalLimit,
    QueryType::UinRegulatory,
    QueryType::AirAmbulance,
    QueryType::MaternityWellBaby,
    QueryType::WaitingPeriod,
    QueryType::GracePeriod,
    QueryType::Exclusion,
    QueryType::Definition,
    QueryType::TableBenefits,
    QueryType::Coverage,
];

static TYPE_PATTERNS: LazyLock<Vec<(QueryType, Vec<Regex>)>> = LazyLock::new(|| {
    const RAW: &[TypePatterns] = &[
        TypePatterns {
            query_type: QueryType::GracePeriod,
            patterns: &[
                r"(?i)grace\s*period",
                r"(?i)payment\s*grace",
                r"(?i)premium\s*grace",
                r"(?i)renewal\s*grace",
                r"(?i)thirty\s*days?\s*grace",
                r"(?i)30\s*days?\s*grace",
                r"(?i)payment\s*window",
            ],
        },
        TypePatterns {
            query_type: QueryType::WaitingPeriod,
            patterns: &[
                r"(?i)waiting\s*period",
                r"(?i)wait\s*period",
                r"(?i)exclusion\s*period",
                r"(?i)cooling\s*period",
                r"(?i)\d+\s*months?\s*waiting",
                r"(?i)\d+\s*years?\s*waiting",
                r"(?i)continuous\s*coverage",
            ],
        },
        TypePatterns {
            query_type: QueryType::Coverage,
            patterns: &[
                r"(?i)coverage",
                r"(?i)covered",
                r"(?i)benefits?",
                r"(?i)indemnity",
                r"(?i)compensation",
                r"(?i)reimbursement",
                r"(?i)what\s*is\s*covered",
                r"(?i)coverage\s*scope",
            ],
        },
        TypePatterns {
            query_type: QueryType::Exclusion,
            patterns: &[
                r"(?i)exclusion",
                r"(?i)excluded",
                r"(?i)not\s*covered",
                r"(?i)exception",
                r"(?i)limitation",
                r"(?i)list.*exclusion",
                r"(?i)what.*not.*covered",
                r"(?i)circumstances.*not.*covered",
            ],
        },
        TypePatterns {
            query_type: QueryType::NumericalLimit,
            patterns: &[
                r"(?i)limit",
                r"(?i)maximum",
                r"(?i)minimum",
                r"(?i)percentage",
                r"\d+%",
                r"(?i)sub[\s-]?limit",
                r"(?i)room\s*rent.*limit",
                r"(?i)icu.*limit",
                r"(?i)co[\s-]?payment",
            ],
        },
        TypePatterns {
            query_type: QueryType::Definition,
            patterns: &[
                r"(?i)define",
                r"(?i)definition",
                r"(?i)what\s*is",
                r"(?i)how.*define",
                r"(?i)meaning\s*of",
                r"(?i)hospital.*define",
                r"(?i)what.*mean",
            ],
        },
        TypePatterns {
            query_type: QueryType::UinRegulatory,
            patterns: &[
                r"(?i)\buin\b",
                r"(?i)unique\s*identification",
                r"(?i)base\s*product",
                r"(?i)regulatory",
                r"(?i)authority",
                r"(?i)licensed?",
                r"(?i)certification",
                r"(?i)approval",
            ],
        },
        TypePatterns {
            query_type: QueryType::AirAmbulance,
            patterns: &[
                r"(?i)air\s*ambulance",
                r"(?i)helicopter",
                r"(?i)aviation",
                r"(?i)medical\s*helicopter",
                r"(?i)air\s*medical",
                r"(?i)emergency\s*aviation",
                r"(?i)flight\s*ambulance",
            ],
        },
        TypePatterns {
            query_type: QueryType::MaternityWellBaby,
            patterns: &[
                r"(?i)maternity",
                r"(?i)pregnancy",
                r"(?i)well\s*mother",
                r"(?i)well\s*baby",
                r"(?i)newborn",
                r"(?i)infant",
                r"(?i)childbirth",
                r"(?i)delivery",
                r"(?i)baby\s*care",
            ],
        },
        TypePatterns {
            query_type: QueryType::TableBenefits,
            patterns: &[
                r"(?i)table\s*of\s*benefits",
                r"(?i)benefit\s*table",
                r"(?i)schedule",
                r"(?i)benefit\s*schedule",
                r"(?i)coverage\s*table",
                r"(?i)payment\s*mode",
            ],
        },
    ];

    RAW.iter()
        .map(|tp| {
            let compiled = tp
                .patterns
                .iter()
                .filter_map(|p| Regex::new(p).ok())
                .collect();
            (tp.query_type, compiled)
        })
        .collect()
});

/// Classifies `question` into a [`QueryType`] by pattern vote, breaking ties
/// by the fixed priority order. Zero votes across all types yields
/// [`QueryType::General`].
#[must_use]
pub fn classify(question: &str) -> QueryType {
    let lower = question.to_lowercase();

    let mut scores: Vec<(QueryType, usize)> = TYPE_PATTERNS
        .iter()
        .map(|(qt, patterns)| {
            let score = patterns
                .iter()
                .map(|re| re.find_iter(&lower).count())
                .sum();
            (*qt, score)
        })
        .collect();

    scores.retain(|(_, score)| *score > 0);
    if scores.is_empty() {
        return QueryType::General;
    }

    let max_score = scores.iter().map(|(_, s)| *s).max().unwrap_or(0);
    let tied: Vec<QueryType> = scores
        .iter()
        .filter(|(_, s)| *s == max_score)
        .map(|(qt, _)| *qt)
        .collect();

    for candidate in PRIORITY {
        if tied.contains(&candidate) {
            return candidate;
        }
    }
    QueryType::General
}

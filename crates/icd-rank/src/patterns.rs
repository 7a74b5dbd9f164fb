use std::sync::LazyLock;

use regex::Regex;

use crate::options::PatternMode;

/// Letter, two digits, up to four letters/digits, optional encounter suffix.
static STRICT_CODE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Z][0-9]{2}[A-Z0-9]{0,4}[A-Z]?\b").expect("Invalid strict code regex")
});

/// Any letters-then-digits run, used when the strict pattern finds nothing.
static LOOSE_CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Z]+[0-9]+[A-Z0-9]*").expect("Invalid loose code regex"));

/// Token patterns in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodePattern {
    Strict,
    Loose,
}

impl CodePattern {
    pub const ORDERED: [CodePattern; 2] = [CodePattern::Strict, CodePattern::Loose];

    pub fn regex(self) -> &'static Regex {
        match self {
            Self::Strict => &STRICT_CODE_REGEX,
            Self::Loose => &LOOSE_CODE_REGEX,
        }
    }

    pub fn find_all(self, text: &str) -> Vec<&str> {
        self.regex().find_iter(text).map(|m| m.as_str()).collect()
    }
}

/// Raw candidate tokens from canonicalized text, in discovery order.
///
/// Duplicates are kept; validation deduplicates later.
pub fn extract_candidates(text: &str, mode: PatternMode) -> Vec<&str> {
    let mut matches = Vec::new();
    for pattern in CodePattern::ORDERED {
        matches.extend(pattern.find_all(text));
        if mode == PatternMode::Cascade && !matches.is_empty() {
            break;
        }
    }
    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_pattern_finds_flat_codes() {
        let found = CodePattern::Strict.find_all("I214, S066X1A AND W1830XA; N19");
        assert_eq!(found, vec!["I214", "S066X1A", "W1830XA", "N19"]);
    }

    #[test]
    fn strict_pattern_needs_word_boundaries() {
        assert!(CodePattern::Strict.find_all("XI214 AB12").is_empty());
    }

    #[test]
    fn cascade_stops_at_first_productive_pattern() {
        let found = extract_candidates("I214 AND CODEI48", PatternMode::Cascade);
        assert_eq!(found, vec!["I214"]);
    }

    #[test]
    fn cascade_falls_through_to_loose_pattern() {
        let found = extract_candidates("DXI214", PatternMode::Cascade);
        assert_eq!(found, vec!["DXI214"]);
    }

    #[test]
    fn pool_keeps_every_match() {
        let found = extract_candidates("I214", PatternMode::Pool);
        assert_eq!(found, vec!["I214", "I214"]);
    }

    #[test]
    fn no_digits_no_candidates() {
        assert!(extract_candidates("MILD NAUSEA", PatternMode::Pool).is_empty());
    }
}

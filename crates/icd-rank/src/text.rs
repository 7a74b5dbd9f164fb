//! Response text preparation: budget cut, label stripping, canonicalization.

/// Cuts `text` to at most `max_chars` characters on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Orders labels longest first so `PRIMARY ICD-10-CM CODES:` wins over `CODES:`.
pub fn sort_labels(labels: &[String]) -> Vec<String> {
    let mut sorted: Vec<String> = labels
        .iter()
        .map(|label| label.trim().to_string())
        .filter(|label| !label.is_empty())
        .collect();
    sorted.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    sorted
}

/// Removes one leading label (ASCII case-insensitive) and surrounding space.
///
/// Returns the trimmed text and whether a label was removed.
pub fn strip_prefix_label<'a>(text: &'a str, labels: &[String]) -> (&'a str, bool) {
    let trimmed = text.trim();
    for label in labels {
        let Some(head) = trimmed.get(..label.len()) else {
            continue;
        };
        if head.eq_ignore_ascii_case(label) {
            return (trimmed[label.len()..].trim(), true);
        }
    }
    (trimmed, false)
}

/// Uppercases and removes dots so `I21.4` reads as `I214`.
pub fn canonicalize_text(text: &str) -> String {
    text.to_uppercase().replace('.', "")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(raw: &[&str]) -> Vec<String> {
        sort_labels(&raw.iter().map(|s| s.to_string()).collect::<Vec<_>>())
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn longest_label_wins() {
        let labels = labels(&["CODES:", "PRIMARY ICD-10-CM CODES:"]);
        let (rest, stripped) = strip_prefix_label("primary icd-10-cm codes: I214", &labels);
        assert!(stripped);
        assert_eq!(rest, "I214");
    }

    #[test]
    fn label_only_in_the_middle_is_kept() {
        let labels = labels(&["CODES:"]);
        let (rest, stripped) = strip_prefix_label("  The codes: I214 ", &labels);
        assert!(!stripped);
        assert_eq!(rest, "The codes: I214");
    }

    #[test]
    fn multibyte_text_shorter_than_label() {
        let labels = labels(&["CODES:"]);
        let (rest, stripped) = strip_prefix_label("é", &labels);
        assert!(!stripped);
        assert_eq!(rest, "é");
    }

    #[test]
    fn canonical_text_has_no_dots() {
        assert_eq!(canonicalize_text("s06.6x1a, r07.9."), "S066X1A, R079");
    }
}

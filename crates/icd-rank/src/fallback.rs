use icd_model::Code;

use crate::options::KeywordFallback;

/// First entry of `table` whose phrase occurs in `text`.
///
/// `text` is expected to be canonicalized (uppercase); phrases are compared
/// uppercased. Table order decides between several matching phrases.
pub fn keyword_fallback<'a>(text: &str, table: &'a [KeywordFallback]) -> Option<&'a Code> {
    table
        .iter()
        .find(|entry| {
            let phrase = entry.phrase.trim().to_uppercase();
            !phrase.is_empty() && text.contains(phrase.as_str())
        })
        .map(|entry| &entry.code)
}

//! Best-effort aggregation of reference code lists into a [`FrequencyModel`].

use icd_model::{Code, FrequencyModel};
use serde::Serialize;
use tracing::info;

/// Default name of the column holding comma-separated reference codes.
pub const DEFAULT_TARGET_COLUMN: &str = "target";

/// Row accounting for one build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BuildStats {
    /// Rows offered to the builder.
    pub rows: usize,
    /// Rows that contributed at least one code.
    pub contributing: usize,
    /// Rows with a missing or blank target.
    pub blank: usize,
    /// Rows skipped because they could not be decoded.
    pub malformed: usize,
    /// Code occurrences counted across all rows.
    pub codes: usize,
}

/// A finished model together with the statistics of its build.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    pub model: FrequencyModel,
    pub stats: BuildStats,
}

/// Splits a target cell on commas and canonicalizes each token.
///
/// Tokens that are empty after canonicalization are dropped. Duplicates are
/// kept: a code listed twice counts twice.
pub fn parse_target_codes(raw: &str) -> Vec<Code> {
    raw.split(',').filter_map(Code::canonicalize).collect()
}

/// Accumulates rows one at a time.
#[derive(Debug, Default)]
pub struct FrequencyBuilder {
    codes: Vec<Code>,
    stats: BuildStats,
}

impl FrequencyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_target(&mut self, raw: &str) {
        self.stats.rows += 1;
        let parsed = parse_target_codes(raw);
        if parsed.is_empty() {
            self.stats.blank += 1;
            return;
        }
        self.stats.contributing += 1;
        self.stats.codes += parsed.len();
        self.codes.extend(parsed);
    }

    pub fn add_blank(&mut self) {
        self.stats.rows += 1;
        self.stats.blank += 1;
    }

    pub fn add_malformed(&mut self) {
        self.stats.rows += 1;
        self.stats.malformed += 1;
    }

    pub fn stats(&self) -> BuildStats {
        self.stats
    }

    pub fn finish(self) -> BuildReport {
        let model: FrequencyModel = self.codes.into_iter().collect();
        info!(
            rows = self.stats.rows,
            contributing = self.stats.contributing,
            blank = self.stats.blank,
            malformed = self.stats.malformed,
            distinct_codes = model.len(),
            "frequency model built"
        );
        BuildReport {
            model,
            stats: self.stats,
        }
    }
}

/// Builds a model from target cells; `None` stands for a missing value.
pub fn build_frequency_model<I, S>(targets: I) -> BuildReport
where
    I: IntoIterator<Item = Option<S>>,
    S: AsRef<str>,
{
    let mut builder = FrequencyBuilder::new();
    for target in targets {
        match target {
            Some(raw) => builder.add_target(raw.as_ref()),
            None => builder.add_blank(),
        }
    }
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_target_codes_canonicalizes_tokens() {
        let codes = parse_target_codes(" i21.4 , R07.9,, ,W18.30XA");
        let raw: Vec<&str> = codes.iter().map(Code::as_str).collect();
        assert_eq!(raw, vec!["I214", "R079", "W1830XA"]);
    }

    #[test]
    fn duplicates_within_a_row_count_twice() {
        let report = build_frequency_model([Some("I214, I214, R079")]);
        assert_eq!(report.model.count_str("I214"), 2);
        assert_eq!(report.model.count_str("R079"), 1);
        assert_eq!(report.stats.codes, 3);
    }

    #[test]
    fn missing_and_blank_rows_contribute_nothing() {
        let report = build_frequency_model([None, Some("   "), Some(",,"), Some("N19")]);
        assert_eq!(report.model.len(), 1);
        assert_eq!(
            report.stats,
            BuildStats {
                rows: 4,
                contributing: 1,
                blank: 3,
                malformed: 0,
                codes: 1,
            }
        );
    }

    #[test]
    fn empty_table_builds_empty_model() {
        let report = build_frequency_model(Vec::<Option<String>>::new());
        assert!(report.model.is_empty());
        assert_eq!(report.stats, BuildStats::default());
    }
}

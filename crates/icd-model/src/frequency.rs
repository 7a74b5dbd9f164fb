//! Code frequency model derived from labeled training examples.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::Code;

/// Read-only mapping from code to the number of times it was observed.
///
/// The model is assembled once (see [`FrequencyModel::from_counts`] or the
/// `FromIterator` impl) and never mutated afterwards, so it can be shared
/// across threads behind an `Arc` without locking.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyModel {
    counts: HashMap<Code, u32>,
}

impl FrequencyModel {
    /// An empty model. Ranking falls back to category bonuses alone.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_counts(counts: HashMap<Code, u32>) -> Self {
        Self { counts }
    }

    /// Count for a code; 0 if it never appeared.
    pub fn count(&self, code: &Code) -> u32 {
        self.counts.get(code).copied().unwrap_or(0)
    }

    /// Count for a raw token after canonicalization.
    pub fn count_str(&self, raw: &str) -> u32 {
        Code::canonicalize(raw).map_or(0, |code| self.count(&code))
    }

    /// Number of distinct codes.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.counts.values().map(|&count| u64::from(count)).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Code, u32)> {
        self.counts.iter().map(|(code, &count)| (code, count))
    }

    /// The `n` most frequent codes, descending by count, ties by code.
    pub fn most_common(&self, n: usize) -> Vec<(Code, u32)> {
        let mut entries: Vec<(Code, u32)> = self
            .counts
            .iter()
            .map(|(code, &count)| (code.clone(), count))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        entries.truncate(n);
        entries
    }
}

impl FromIterator<Code> for FrequencyModel {
    fn from_iter<I: IntoIterator<Item = Code>>(iter: I) -> Self {
        let mut counts = HashMap::new();
        for code in iter {
            *counts.entry(code).or_insert(0u32) += 1;
        }
        Self { counts }
    }
}

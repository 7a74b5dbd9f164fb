//! Per-response candidate and result types.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Code, ModelError};

/// Separator between codes in the serialized result.
pub const CODE_SEPARATOR: &str = ", ";

/// Codes extracted from one response, in discovery order, duplicates kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateSet {
    codes: Vec<Code>,
}

impl CandidateSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, code: Code) {
        self.codes.push(code);
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn as_slice(&self) -> &[Code] {
        &self.codes
    }

    /// Unique codes in first-seen order.
    pub fn dedup(&self) -> Vec<Code> {
        let mut seen = HashSet::with_capacity(self.codes.len());
        self.codes
            .iter()
            .filter(|code| seen.insert(*code))
            .cloned()
            .collect()
    }
}

impl FromIterator<Code> for CandidateSet {
    fn from_iter<I: IntoIterator<Item = Code>>(iter: I) -> Self {
        Self {
            codes: iter.into_iter().collect(),
        }
    }
}

/// How a [`RankedResult`] was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankOutcome {
    /// Codes found in the response, scored and truncated.
    Ranked,
    /// No valid code; a keyword phrase in the text selected one.
    KeywordFallback,
    /// Nothing usable; the configured default code.
    DefaultFallback,
}

impl RankOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ranked => "ranked",
            Self::KeywordFallback => "keyword fallback",
            Self::DefaultFallback => "default fallback",
        }
    }

    pub fn is_fallback(&self) -> bool {
        !matches!(self, Self::Ranked)
    }
}

/// Final ordered codes for one response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRankedResult")]
pub struct RankedResult {
    codes: Vec<Code>,
    outcome: RankOutcome,
}

#[derive(Deserialize)]
struct RawRankedResult {
    codes: Vec<Code>,
    outcome: RankOutcome,
}

impl TryFrom<RawRankedResult> for RankedResult {
    type Error = ModelError;

    /// Deserialized results must satisfy what the constructors guarantee:
    /// at least one code, no duplicates, exactly one code for a fallback.
    fn try_from(raw: RawRankedResult) -> Result<Self, Self::Error> {
        if raw.codes.is_empty() {
            return Err(ModelError::InvalidResult("no codes".to_string()));
        }
        match raw.outcome {
            RankOutcome::Ranked => {
                let count = raw.codes.len();
                let result = Self::ranked(raw.codes);
                if result.len() != count {
                    return Err(ModelError::InvalidResult("duplicate codes".to_string()));
                }
                Ok(result)
            }
            outcome => {
                if raw.codes.len() != 1 {
                    return Err(ModelError::InvalidResult(format!(
                        "{} holds {} codes",
                        outcome.as_str(),
                        raw.codes.len()
                    )));
                }
                Ok(Self {
                    codes: raw.codes,
                    outcome,
                })
            }
        }
    }
}

impl RankedResult {
    /// Ranked codes. Duplicates are dropped, keeping the first occurrence.
    pub fn ranked(codes: Vec<Code>) -> Self {
        let mut seen = HashSet::with_capacity(codes.len());
        let codes = codes
            .into_iter()
            .filter(|code| seen.insert(code.clone()))
            .collect();
        Self {
            codes,
            outcome: RankOutcome::Ranked,
        }
    }

    pub fn keyword_fallback(code: Code) -> Self {
        Self {
            codes: vec![code],
            outcome: RankOutcome::KeywordFallback,
        }
    }

    pub fn default_fallback(code: Code) -> Self {
        Self {
            codes: vec![code],
            outcome: RankOutcome::DefaultFallback,
        }
    }

    pub fn codes(&self) -> &[Code] {
        &self.codes
    }

    pub fn outcome(&self) -> RankOutcome {
        self.outcome
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Codes joined with `", "`.
    pub fn to_output(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for RankedResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, code) in self.codes.iter().enumerate() {
            if idx > 0 {
                f.write_str(CODE_SEPARATOR)?;
            }
            f.write_str(code.as_str())?;
        }
        Ok(())
    }
}

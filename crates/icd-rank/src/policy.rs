//! Candidate validity policy.
//!
//! The ranker asks a [`CodeFilter`] whether each canonicalized candidate may
//! appear in a result. [`ValidityPolicy`] is the configured implementation;
//! any `Fn(&Code) -> bool` can be injected in its place.

use std::fmt;

use icd_model::Code;

use crate::options::{RankerOptions, Vocabulary};

/// Why a candidate was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Not "letter, two digits, letters/digits".
    Shape,
    /// Outside the configured length bounds.
    Length { len: usize, min: usize, max: usize },
    /// Starts with a reserved, non-diagnostic prefix.
    ExcludedPrefix(String),
    /// Ends in a pattern typical of truncated matches.
    SuspiciousSuffix(String),
    /// Not a member of the allow-list.
    NotAllowed,
    /// Rejected by an injected predicate.
    Custom,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shape => f.write_str("not shaped like a diagnosis code"),
            Self::Length { len, min, max } => {
                write!(f, "length {len} outside {min}..={max}")
            }
            Self::ExcludedPrefix(prefix) => write!(f, "excluded prefix {prefix}"),
            Self::SuspiciousSuffix(suffix) => write!(f, "suspicious suffix {suffix}"),
            Self::NotAllowed => f.write_str("not in allow-list"),
            Self::Custom => f.write_str("rejected by filter"),
        }
    }
}

/// Decides whether a canonical candidate is an acceptable code.
pub trait CodeFilter: Send + Sync {
    fn check(&self, code: &Code) -> Result<(), Rejection>;

    fn accepts(&self, code: &Code) -> bool {
        self.check(code).is_ok()
    }
}

impl<F> CodeFilter for F
where
    F: Fn(&Code) -> bool + Send + Sync,
{
    fn check(&self, code: &Code) -> Result<(), Rejection> {
        if self(code) {
            Ok(())
        } else {
            Err(Rejection::Custom)
        }
    }
}

/// Shape, length, prefix, suffix and vocabulary checks from [`RankerOptions`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidityPolicy {
    min_len: usize,
    max_len: usize,
    excluded_prefixes: Vec<String>,
    suspicious_suffixes: Vec<String>,
    vocabulary: Vocabulary,
}

impl ValidityPolicy {
    pub fn from_options(options: &RankerOptions) -> Self {
        let normalize = |values: &[String]| -> Vec<String> {
            values
                .iter()
                .map(|value| value.trim().to_uppercase())
                .filter(|value| !value.is_empty())
                .collect()
        };
        Self {
            min_len: options.min_len,
            max_len: options.max_len,
            excluded_prefixes: normalize(&options.excluded_prefixes),
            suspicious_suffixes: normalize(&options.suspicious_suffixes),
            vocabulary: options.vocabulary.clone(),
        }
    }
}

impl CodeFilter for ValidityPolicy {
    fn check(&self, code: &Code) -> Result<(), Rejection> {
        if !code.has_code_shape() {
            return Err(Rejection::Shape);
        }
        let len = code.len();
        if len < self.min_len || len > self.max_len {
            return Err(Rejection::Length {
                len,
                min: self.min_len,
                max: self.max_len,
            });
        }
        let raw = code.as_str();
        if let Some(prefix) = self.excluded_prefixes.iter().find(|p| raw.starts_with(p.as_str())) {
            return Err(Rejection::ExcludedPrefix(prefix.clone()));
        }
        if let Some(suffix) = self
            .suspicious_suffixes
            .iter()
            .find(|s| raw.ends_with(s.as_str()))
        {
            return Err(Rejection::SuspiciousSuffix(suffix.clone()));
        }
        if !self.vocabulary.allows(code) {
            return Err(Rejection::NotAllowed);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(raw: &str) -> Code {
        Code::new(raw).unwrap()
    }

    #[test]
    fn open_policy_checks_shape_and_bounds() {
        let policy = ValidityPolicy::from_options(&RankerOptions::open_vocabulary());
        assert!(policy.accepts(&code("R11")));
        assert!(policy.accepts(&code("S066X1A")));
        assert_eq!(policy.check(&code("ICD10")), Err(Rejection::Shape));
        assert_eq!(
            policy.check(&code("A123456789")),
            Err(Rejection::Length {
                len: 10,
                min: 3,
                max: 8
            })
        );
    }

    #[test]
    fn reserved_prefix_and_zero_suffix_are_rejected() {
        let policy = ValidityPolicy::from_options(&RankerOptions::open_vocabulary());
        assert_eq!(
            policy.check(&code("U071")),
            Err(Rejection::ExcludedPrefix("U".to_string()))
        );
        assert_eq!(
            policy.check(&code("I21000")),
            Err(Rejection::SuspiciousSuffix("000".to_string()))
        );
    }

    #[test]
    fn constrained_policy_uses_allow_list() {
        let policy = ValidityPolicy::from_options(&RankerOptions::constrained());
        assert!(policy.accepts(&code("I4891")));
        assert_eq!(policy.check(&code("J189")), Err(Rejection::NotAllowed));
    }

    #[test]
    fn closures_are_filters() {
        let only_r = |code: &Code| code.category() == 'R';
        assert!(only_r.accepts(&code("R079")));
        assert_eq!(only_r.check(&code("I214")), Err(Rejection::Custom));
    }
}

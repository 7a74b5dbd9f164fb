#![deny(unsafe_code)]

use std::fmt;
use std::str::FromStr;

use crate::ModelError;

/// A diagnosis code in canonical form.
///
/// Canonical means uppercase ASCII letters and digits only: `i21.4` and
/// `I21-4` both become `I214`. Whether a canonical token is an acceptable
/// diagnosis code (shape, length, allow-list) is decided by the ranking
/// policy, not here.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct Code(String);

impl Code {
    /// Canonicalizes a raw token, returning `None` if nothing is left.
    pub fn canonicalize(raw: &str) -> Option<Self> {
        let canonical: String = raw
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|ch| ch.to_ascii_uppercase())
            .collect();
        if canonical.is_empty() {
            None
        } else {
            Some(Self(canonical))
        }
    }

    pub fn new(value: impl Into<String>) -> Result<Self, ModelError> {
        let value = value.into();
        Self::canonicalize(&value).ok_or(ModelError::InvalidCode(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Leading character, which carries the ICD-10 chapter.
    pub fn category(&self) -> char {
        // Canonical codes are never empty.
        self.0.chars().next().unwrap_or('?')
    }

    /// True for "letter, two digits, then letters/digits".
    pub fn has_code_shape(&self) -> bool {
        let bytes = self.0.as_bytes();
        bytes.len() >= 3
            && bytes[0].is_ascii_uppercase()
            && bytes[1].is_ascii_digit()
            && bytes[2].is_ascii_digit()
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Code {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Code {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Code> for String {
    fn from(code: Code) -> Self {
        code.0
    }
}

impl AsRef<str> for Code {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_dots_and_uppercases() {
        let code = Code::canonicalize(" s06.6x1a ").unwrap();
        assert_eq!(code.as_str(), "S066X1A");
        assert_eq!(code.category(), 'S');
    }

    #[test]
    fn rejects_tokens_without_alphanumerics() {
        assert!(Code::canonicalize("").is_none());
        assert!(Code::canonicalize(" .-, ").is_none());
        assert_eq!(
            Code::new("..."),
            Err(ModelError::InvalidCode("...".to_string()))
        );
    }

    #[test]
    fn non_ascii_letters_are_dropped() {
        let code = Code::canonicalize("É11.9").unwrap();
        assert_eq!(code.as_str(), "119");
        assert!(!code.has_code_shape());
    }

    #[test]
    fn code_shape() {
        assert!(Code::new("I214").unwrap().has_code_shape());
        assert!(Code::new("N19").unwrap().has_code_shape());
        assert!(!Code::new("ICD10").unwrap().has_code_shape());
        assert!(!Code::new("I2").unwrap().has_code_shape());
        assert!(!Code::new("12A").unwrap().has_code_shape());
    }

    #[test]
    fn serde_uses_plain_string() {
        let code = Code::new("R07.9").unwrap();
        let json = serde_json::to_string(&code).unwrap();
        assert_eq!(json, "\"R079\"");
        let back: Code = serde_json::from_str("\"r07.9\"").unwrap();
        assert_eq!(back, code);
        assert!(serde_json::from_str::<Code>("\"--\"").is_err());
    }
}

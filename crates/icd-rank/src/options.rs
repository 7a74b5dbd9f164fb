//! Configuration for the ranking pipeline.
//!
//! Every policy knob lives here so the allow-list versus open-vocabulary
//! choice, the result cap and the fallback tables are configuration rather
//! than separate code paths. Options can be loaded from JSON; missing fields
//! take the [`RankerOptions::constrained`] defaults.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use icd_model::Code;
use serde::{Deserialize, Serialize};

use crate::error::OptionsError;

/// Codes the constrained deployment is allowed to emit.
pub const DEFAULT_ALLOWED_CODES: [&str; 16] = [
    "I214", "I4891", "I82431", "K7581", "N19", "M5440", "R531", "R0600", "R079", "R339", "R509",
    "I6203", "W1830XA", "S066X1A", "M5489", "E2740",
];

/// Returned when nothing usable is found ("other ill-defined conditions").
pub const DEFAULT_FALLBACK_CODE: &str = "R6889";

/// Leading labels stripped from a response before parsing.
pub const DEFAULT_PREFIX_LABELS: [&str; 10] = [
    "PRIMARY ICD-10-CM CODES:",
    "PRIMARY ICD-10 CODES:",
    "ICD-10-CM CODES:",
    "ICD-10 CODES:",
    "PRIMARY DIAGNOSIS CODES:",
    "DIAGNOSIS CODES:",
    "CORRECT CODES:",
    "CODES:",
    "OUTPUT:",
    "PRIMARY:",
];

/// Phrase to code pairs scanned in order when no code survives validation.
pub const DEFAULT_KEYWORD_FALLBACKS: [(&str, &str); 10] = [
    ("CHEST PAIN", "R079"),
    ("DYSPNEA", "R0600"),
    ("SHORTNESS OF BREATH", "R0600"),
    ("SYNCOPE", "R531"),
    ("URINARY RETENTION", "R339"),
    ("NAUSEA", "R11"),
    ("DIARRHEA", "K5900"),
    ("FEVER", "R5090"),
    ("HEADACHE", "R51"),
    ("CONFUSION", "R410"),
];

fn builtin(raw: &str) -> Code {
    Code::canonicalize(raw).expect("built-in code literal is alphanumeric")
}

/// Which codes may appear in a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "codes")]
pub enum Vocabulary {
    /// Any well-formed code.
    Open,
    /// Only members of a fixed set.
    AllowList(BTreeSet<Code>),
}

impl Vocabulary {
    pub fn default_allow_list() -> Self {
        Self::AllowList(DEFAULT_ALLOWED_CODES.iter().map(|raw| builtin(raw)).collect())
    }

    pub fn allows(&self, code: &Code) -> bool {
        match self {
            Self::Open => true,
            Self::AllowList(codes) => codes.contains(code),
        }
    }
}

/// How the ordered token patterns are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternMode {
    /// Stop at the first pattern that matches anything.
    #[default]
    Cascade,
    /// Run every pattern and pool the matches in discovery order.
    Pool,
}

/// Category bonuses added on top of the training frequency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryBonuses {
    /// Leading letters of symptom codes.
    pub symptom_prefixes: String,
    pub symptom_bonus: u64,
    /// Leading letters of specific-disease codes.
    pub disease_prefixes: String,
    pub disease_bonus: u64,
}

impl Default for CategoryBonuses {
    fn default() -> Self {
        Self {
            symptom_prefixes: "R".to_string(),
            symptom_bonus: 100,
            disease_prefixes: "ABCDEFGHIJKLMNOPQST".to_string(),
            disease_bonus: 100,
        }
    }
}

/// Drops `code` unless the response mentions one of `keywords`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuppressionRule {
    pub code: Code,
    pub keywords: Vec<String>,
}

impl SuppressionRule {
    pub fn new(code: Code, keywords: &[&str]) -> Self {
        Self {
            code,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    /// The intracranial hemorrhage code needs supporting clinical language.
    pub fn intracranial_hemorrhage() -> Self {
        Self::new(builtin("I6203"), &["BLEED", "HEMORRHAGE", "STROKE"])
    }

    /// True if `text` (already uppercased) holds a corroborating keyword.
    pub fn is_corroborated(&self, text: &str) -> bool {
        self.keywords
            .iter()
            .map(|keyword| keyword.trim().to_uppercase())
            .any(|keyword| !keyword.is_empty() && text.contains(keyword.as_str()))
    }
}

/// A literal phrase that maps to one code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordFallback {
    pub phrase: String,
    pub code: Code,
}

impl KeywordFallback {
    pub fn new(phrase: impl Into<String>, code: Code) -> Self {
        Self {
            phrase: phrase.into(),
            code,
        }
    }
}

/// Options controlling the ranking pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankerOptions {
    /// Maximum number of codes in a result.
    pub max_codes: usize,
    /// Responses are cut to this many characters before parsing.
    pub max_input_chars: usize,
    pub vocabulary: Vocabulary,
    /// Shortest accepted code.
    pub min_len: usize,
    /// Longest accepted code.
    pub max_len: usize,
    /// Leading letters that never denote a diagnosis (e.g. `U`, reserved).
    pub excluded_prefixes: Vec<String>,
    /// Trailing patterns that indicate a truncated or garbage match.
    pub suspicious_suffixes: Vec<String>,
    pub pattern_mode: PatternMode,
    pub prefix_labels: Vec<String>,
    pub suppression_rules: Vec<SuppressionRule>,
    pub bonuses: CategoryBonuses,
    pub keyword_fallbacks: Vec<KeywordFallback>,
    pub default_code: Code,
}

impl Default for RankerOptions {
    fn default() -> Self {
        Self::constrained()
    }
}

impl RankerOptions {
    /// Fixed 16-code vocabulary, at most three codes.
    pub fn constrained() -> Self {
        Self {
            max_codes: 3,
            max_input_chars: 2600,
            vocabulary: Vocabulary::default_allow_list(),
            min_len: 3,
            max_len: 8,
            excluded_prefixes: vec!["U".to_string()],
            suspicious_suffixes: vec!["000".to_string()],
            pattern_mode: PatternMode::Cascade,
            prefix_labels: DEFAULT_PREFIX_LABELS.iter().map(|s| s.to_string()).collect(),
            suppression_rules: vec![SuppressionRule::intracranial_hemorrhage()],
            bonuses: CategoryBonuses::default(),
            keyword_fallbacks: DEFAULT_KEYWORD_FALLBACKS
                .iter()
                .map(|(phrase, code)| KeywordFallback::new(*phrase, builtin(code)))
                .collect(),
            default_code: builtin(DEFAULT_FALLBACK_CODE),
        }
    }

    /// Any well-formed code, at most five codes.
    pub fn open_vocabulary() -> Self {
        Self {
            max_codes: 5,
            max_input_chars: 2000,
            vocabulary: Vocabulary::Open,
            ..Self::constrained()
        }
    }

    /// Loads options from a JSON file and validates them.
    pub fn from_json_path(path: &Path) -> Result<Self, OptionsError> {
        let raw = fs::read_to_string(path).map_err(|source| OptionsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let options: Self = serde_json::from_str(&raw).map_err(|source| OptionsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.max_codes == 0 {
            return Err(OptionsError::Invalid("max_codes must be at least 1".into()));
        }
        if self.max_input_chars == 0 {
            return Err(OptionsError::Invalid(
                "max_input_chars must be at least 1".into(),
            ));
        }
        if self.min_len == 0 || self.min_len > self.max_len {
            return Err(OptionsError::Invalid(format!(
                "code length bounds {}..={} are empty",
                self.min_len, self.max_len
            )));
        }
        if let Vocabulary::AllowList(codes) = &self.vocabulary {
            if codes.is_empty() {
                return Err(OptionsError::Invalid("allow-list is empty".into()));
            }
        }
        if let Some(entry) = self
            .keyword_fallbacks
            .iter()
            .find(|entry| entry.phrase.trim().is_empty())
        {
            return Err(OptionsError::Invalid(format!(
                "keyword fallback for {} has an empty phrase",
                entry.code
            )));
        }
        if let Some(rule) = self
            .suppression_rules
            .iter()
            .find(|rule| {
                rule.keywords.is_empty() || rule.keywords.iter().any(|k| k.trim().is_empty())
            })
        {
            return Err(OptionsError::Invalid(format!(
                "suppression rule for {} has a missing or blank keyword",
                rule.code
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn with_max_codes(mut self, max_codes: usize) -> Self {
        self.max_codes = max_codes;
        self
    }

    #[must_use]
    pub fn with_max_input_chars(mut self, max_input_chars: usize) -> Self {
        self.max_input_chars = max_input_chars;
        self
    }

    #[must_use]
    pub fn with_vocabulary(mut self, vocabulary: Vocabulary) -> Self {
        self.vocabulary = vocabulary;
        self
    }

    #[must_use]
    pub fn with_pattern_mode(mut self, mode: PatternMode) -> Self {
        self.pattern_mode = mode;
        self
    }

    #[must_use]
    pub fn with_bonuses(mut self, bonuses: CategoryBonuses) -> Self {
        self.bonuses = bonuses;
        self
    }

    #[must_use]
    pub fn with_default_code(mut self, code: Code) -> Self {
        self.default_code = code;
        self
    }
}

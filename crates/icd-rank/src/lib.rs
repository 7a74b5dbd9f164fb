//! Diagnosis code extraction and ranking.
//!
//! [`Ranker`] turns the free text a language model produced into an ordered,
//! deduplicated list of diagnosis codes, weighted by how often each code
//! appeared in training data. It never fails per call: unusable input maps to
//! a keyword fallback or the configured default code.

pub mod engine;
pub mod error;
pub mod fallback;
pub mod options;
pub mod patterns;
pub mod policy;
pub mod score;
pub mod text;

pub use engine::{RankTrace, Ranker};
pub use error::{OptionsError, RankError};
pub use fallback::keyword_fallback;
pub use options::{
    CategoryBonuses, DEFAULT_ALLOWED_CODES, DEFAULT_FALLBACK_CODE, KeywordFallback, PatternMode,
    RankerOptions, SuppressionRule, Vocabulary,
};
pub use patterns::{CodePattern, extract_candidates};
pub use policy::{CodeFilter, Rejection, ValidityPolicy};
pub use score::{CodeCategory, CodeScore, ScoreComponent, Scorer};

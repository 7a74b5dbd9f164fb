pub mod code;
pub mod error;
pub mod frequency;
pub mod ranked;

pub use code::Code;
pub use error::{ModelError, Result};
pub use frequency::FrequencyModel;
pub use ranked::{CODE_SEPARATOR, CandidateSet, RankOutcome, RankedResult};

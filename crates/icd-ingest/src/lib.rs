pub mod builder;
pub mod csv_table;
pub mod error;
pub mod frame;

pub use builder::{
    BuildReport, BuildStats, DEFAULT_TARGET_COLUMN, FrequencyBuilder, build_frequency_model,
    parse_target_codes,
};
pub use csv_table::{read_training_csv, read_training_csv_from_reader};
pub use error::{IngestError, Result};
pub use frame::frequency_model_from_frame;

//! Frequency model construction from an in-memory polars frame.

use polars::prelude::{AnyValue, DataFrame};
use tracing::warn;

use crate::builder::{BuildReport, FrequencyBuilder};
use crate::error::Result;

/// Converts a cell to text. Returns `None` for nulls.
fn any_to_target(value: AnyValue<'_>) -> Option<String> {
    match value {
        AnyValue::Null => None,
        AnyValue::String(s) => Some(s.to_string()),
        AnyValue::StringOwned(s) => Some(s.to_string()),
        other => Some(other.to_string()),
    }
}

/// Counts the codes in `column` of `df`.
///
/// Column lookup is case-insensitive. Nulls and blank strings count as blank
/// rows; non-string columns are rendered with their display form. A frame
/// without the column yields an empty model.
pub fn frequency_model_from_frame(df: &DataFrame, column: &str) -> Result<BuildReport> {
    let Some(name) = df
        .get_column_names_owned()
        .into_iter()
        .find(|name| name.as_str().eq_ignore_ascii_case(column))
    else {
        warn!(column, "frame has no target column; using an empty model");
        return Ok(BuildReport::default());
    };

    let series = df.column(name.as_str())?;
    let mut builder = FrequencyBuilder::new();
    for idx in 0..df.height() {
        match series.get(idx) {
            Ok(value) => match any_to_target(value) {
                Some(text) if !text.trim().is_empty() => builder.add_target(&text),
                _ => builder.add_blank(),
            },
            Err(error) => {
                warn!(row = idx, %error, "skipping unreadable training row");
                builder.add_malformed();
            }
        }
    }
    Ok(builder.finish())
}

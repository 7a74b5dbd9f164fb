use std::io::Read;
use std::path::Path;

use csv::{ByteRecord, ReaderBuilder};
use tracing::{debug, warn};

use crate::builder::{BuildReport, FrequencyBuilder};
use crate::error::{IngestError, Result};

fn normalize_header(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw)
        .trim()
        .trim_matches('\u{feff}')
        .trim()
        .to_string()
}

/// Position of `column` in the header row, compared case-insensitively.
fn find_column(headers: &ByteRecord, column: &str) -> Option<usize> {
    headers
        .iter()
        .position(|header| normalize_header(header).eq_ignore_ascii_case(column.trim()))
}

/// Reads a training CSV and counts the codes in `column`.
///
/// A table without the column yields an empty model. Records that fail to
/// decode, are too short, or hold non-UTF-8 text are skipped and counted as
/// malformed.
pub fn read_training_csv(path: &Path, column: &str) -> Result<BuildReport> {
    let reader = ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|source| IngestError::Open {
            path: path.to_path_buf(),
            source,
        })?;
    debug!(path = %path.display(), column, "reading training table");
    collect_targets(reader, column)
}

/// Same as [`read_training_csv`] for an already-open source.
pub fn read_training_csv_from_reader<R: Read>(source: R, column: &str) -> Result<BuildReport> {
    let reader = ReaderBuilder::new().flexible(true).from_reader(source);
    collect_targets(reader, column)
}

fn collect_targets<R: Read>(mut reader: csv::Reader<R>, column: &str) -> Result<BuildReport> {
    let headers = reader.byte_headers().map_err(IngestError::Header)?.clone();
    let Some(index) = find_column(&headers, column) else {
        warn!(column, "training table has no target column; using an empty model");
        return Ok(BuildReport::default());
    };

    let mut builder = FrequencyBuilder::new();
    for (line, record) in reader.byte_records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(error) => {
                let fatal = matches!(error.kind(), csv::ErrorKind::Io(_));
                warn!(row = line + 1, %error, "skipping malformed training row");
                builder.add_malformed();
                if fatal {
                    break;
                }
                continue;
            }
        };
        let Some(field) = record.get(index) else {
            warn!(row = line + 1, "training row is missing the target field");
            builder.add_malformed();
            continue;
        };
        match std::str::from_utf8(field) {
            Ok(text) if text.trim().is_empty() => builder.add_blank(),
            Ok(text) => builder.add_target(text),
            Err(error) => {
                warn!(row = line + 1, %error, "training row target is not UTF-8");
                builder.add_malformed();
            }
        }
    }
    Ok(builder.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_ignores_case_and_bom() {
        let headers = ByteRecord::from(vec!["\u{feff}id", " Target "]);
        assert_eq!(find_column(&headers, "target"), Some(1));
        assert_eq!(find_column(&headers, "ID"), Some(0));
        assert_eq!(find_column(&headers, "codes"), None);
    }

    #[test]
    fn reads_quoted_code_lists() {
        let data = "hospital_course,target\n\"chest pain\",\"I21.4, R07.9\"\nsyncope,R531\n";
        let report = read_training_csv_from_reader(data.as_bytes(), "target").unwrap();
        assert_eq!(report.model.count_str("I214"), 1);
        assert_eq!(report.model.count_str("R531"), 1);
        assert_eq!(report.stats.contributing, 2);
    }

    #[test]
    fn short_and_non_utf8_rows_are_skipped() {
        let mut data = b"text,target\nfirst,I214\nshort\nthird,".to_vec();
        data.extend_from_slice(&[0xff, 0xfe]);
        data.extend_from_slice(b"\nfourth,N19\n");
        let report = read_training_csv_from_reader(data.as_slice(), "target").unwrap();
        assert_eq!(report.stats.malformed, 2);
        assert_eq!(report.stats.contributing, 2);
        assert_eq!(report.model.count_str("N19"), 1);
    }

    #[test]
    fn missing_column_yields_empty_model() {
        let data = "text,codes\na,I214\n";
        let report = read_training_csv_from_reader(data.as_bytes(), "target").unwrap();
        assert!(report.model.is_empty());
        assert_eq!(report.stats.rows, 0);
    }
}

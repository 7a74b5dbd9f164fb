//! Batch ranking over CSV or JSONL response files.
//!
//! Every input record produces exactly one output row. Records that cannot be
//! decoded are ranked as missing responses, which yields the default code.

use std::fs::File;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use csv::{ByteRecord, ReaderBuilder, WriterBuilder};
use serde_json::Value;
use tracing::warn;

use icd_model::{RankOutcome, RankedResult};
use icd_rank::Ranker;

/// Input file layout, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchFormat {
    Csv,
    /// One JSON value per line.
    Jsonl,
}

impl BatchFormat {
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("jsonl" | "ndjson") => Self::Jsonl,
            _ => Self::Csv,
        }
    }
}

/// Where to find the response and the record id.
#[derive(Debug, Clone, Copy)]
pub struct BatchColumns<'a> {
    pub response: &'a str,
    /// Falls back to the 1-based record number (CSV) or line number (JSONL).
    pub id: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedRecord {
    pub id: String,
    pub result: RankedResult,
}

/// Per-outcome record counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutcomeTally {
    pub ranked: usize,
    pub keyword_fallback: usize,
    pub default_fallback: usize,
}

impl OutcomeTally {
    pub fn from_records(records: &[RankedRecord]) -> Self {
        let mut tally = Self::default();
        for record in records {
            tally.record(record.result.outcome());
        }
        tally
    }

    pub fn record(&mut self, outcome: RankOutcome) {
        match outcome {
            RankOutcome::Ranked => self.ranked += 1,
            RankOutcome::KeywordFallback => self.keyword_fallback += 1,
            RankOutcome::DefaultFallback => self.default_fallback += 1,
        }
    }

    pub fn get(&self, outcome: RankOutcome) -> usize {
        match outcome {
            RankOutcome::Ranked => self.ranked,
            RankOutcome::KeywordFallback => self.keyword_fallback,
            RankOutcome::DefaultFallback => self.default_fallback,
        }
    }

    pub fn total(&self) -> usize {
        self.ranked + self.keyword_fallback + self.default_fallback
    }
}

/// Ranks every record of `path`.
pub fn rank_file(
    ranker: &Ranker,
    path: &Path,
    format: BatchFormat,
    columns: BatchColumns<'_>,
) -> Result<Vec<RankedRecord>> {
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let records = match format {
        BatchFormat::Csv => rank_csv(ranker, file, columns),
        BatchFormat::Jsonl => rank_jsonl(ranker, BufReader::new(file), columns),
    };
    records.with_context(|| format!("rank {}", path.display()))
}

pub fn rank_csv<R: Read>(
    ranker: &Ranker,
    source: R,
    columns: BatchColumns<'_>,
) -> Result<Vec<RankedRecord>> {
    let mut reader = ReaderBuilder::new().flexible(true).from_reader(source);
    let headers = reader.byte_headers().context("read CSV header")?.clone();
    let response_idx = find_column(&headers, columns.response)
        .ok_or_else(|| anyhow!("response column `{}` not found", columns.response))?;
    let id_idx = columns
        .id
        .map(|name| find_column(&headers, name).ok_or_else(|| anyhow!("id column `{name}` not found")))
        .transpose()?;

    let mut records = Vec::new();
    for (index, row) in reader.byte_records().enumerate() {
        let number = index + 1;
        let record = match row {
            Ok(record) => record,
            Err(error) if error.is_io_error() => {
                return Err(error).with_context(|| format!("read CSV record {number}"));
            }
            Err(error) => {
                warn!(record = number, %error, "unreadable CSV record; using default code");
                records.push(RankedRecord {
                    id: number.to_string(),
                    result: ranker.rank(None),
                });
                continue;
            }
        };
        let id = id_idx
            .and_then(|idx| record.get(idx))
            .map(|raw| String::from_utf8_lossy(raw).trim().to_string())
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| number.to_string());
        let result = match record.get(response_idx) {
            Some(raw) => ranker.rank_bytes(raw),
            None => ranker.rank(None),
        };
        records.push(RankedRecord { id, result });
    }
    Ok(records)
}

/// Ranks one JSON value per line.
///
/// Objects are looked up by field name; any other value is the response
/// itself. Blank lines are skipped.
pub fn rank_jsonl<R: BufRead>(
    ranker: &Ranker,
    source: R,
    columns: BatchColumns<'_>,
) -> Result<Vec<RankedRecord>> {
    let mut records = Vec::new();
    for (index, line) in source.split(b'\n').enumerate() {
        let number = index + 1;
        let line = line.with_context(|| format!("read line {number}"))?;
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }
        let value = match serde_json::from_slice::<Value>(&line) {
            Ok(value) => value,
            Err(error) => {
                warn!(line = number, %error, "invalid JSON line; using default code");
                Value::Null
            }
        };
        let record = match &value {
            Value::Object(fields) => RankedRecord {
                id: columns
                    .id
                    .and_then(|name| fields.get(name))
                    .and_then(json_id)
                    .unwrap_or_else(|| number.to_string()),
                result: match fields.get(columns.response) {
                    Some(response) => ranker.rank_value(response),
                    None => ranker.rank(None),
                },
            },
            other => RankedRecord {
                id: number.to_string(),
                result: ranker.rank_value(other),
            },
        };
        records.push(record);
    }
    Ok(records)
}

/// Writes `id,codes` rows.
pub fn write_records<W: Write>(records: &[RankedRecord], sink: W) -> Result<()> {
    let mut writer = WriterBuilder::new().from_writer(sink);
    writer
        .write_record(["id", "codes"])
        .context("write CSV header")?;
    for record in records {
        writer
            .write_record([record.id.as_str(), record.result.to_output().as_str()])
            .with_context(|| format!("write record {}", record.id))?;
    }
    writer.flush().context("flush output")?;
    Ok(())
}

fn find_column(headers: &ByteRecord, name: &str) -> Option<usize> {
    headers.iter().position(|header| {
        let header = String::from_utf8_lossy(header);
        header
            .trim_start_matches('\u{feff}')
            .trim()
            .eq_ignore_ascii_case(name.trim())
    })
}

fn json_id(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn format_follows_extension() {
        assert_eq!(
            BatchFormat::from_path(&PathBuf::from("out.JSONL")),
            BatchFormat::Jsonl
        );
        assert_eq!(
            BatchFormat::from_path(&PathBuf::from("rows.ndjson")),
            BatchFormat::Jsonl
        );
        assert_eq!(
            BatchFormat::from_path(&PathBuf::from("rows.csv")),
            BatchFormat::Csv
        );
        assert_eq!(BatchFormat::from_path(&PathBuf::from("rows")), BatchFormat::Csv);
    }

    #[test]
    fn tally_counts_each_outcome() {
        let mut tally = OutcomeTally::default();
        tally.record(RankOutcome::Ranked);
        tally.record(RankOutcome::Ranked);
        tally.record(RankOutcome::DefaultFallback);
        assert_eq!(tally.get(RankOutcome::Ranked), 2);
        assert_eq!(tally.get(RankOutcome::KeywordFallback), 0);
        assert_eq!(tally.total(), 3);
    }

    #[test]
    fn ids_from_json() {
        assert_eq!(json_id(&serde_json::json!(" a7 ")), Some("a7".to_string()));
        assert_eq!(json_id(&serde_json::json!(12)), Some("12".to_string()));
        assert_eq!(json_id(&serde_json::json!("")), None);
        assert_eq!(json_id(&serde_json::json!(null)), None);
    }
}

//! CLI argument definitions for the diagnosis code ranker.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use icd_ingest::DEFAULT_TARGET_COLUMN;

#[derive(Parser)]
#[command(
    name = "icd-rank",
    version,
    about = "Extract and rank ICD-10-CM codes from model output",
    long_about = "Extract ICD-10-CM codes from free-text model output.\n\n\
                  Candidates are validated, deduplicated, weighted by training-set\n\
                  frequency and truncated. Every response yields at least one code."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Prefix log lines with a timestamp.
    #[arg(long = "log-timestamps", global = true)]
    pub log_timestamps: bool,

    /// Include the module path of each log event.
    #[arg(long = "log-target", global = true)]
    pub log_target: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Rank the codes in one response.
    Rank(RankArgs),

    /// Rank every response in a CSV or JSONL file.
    Batch(BatchArgs),

    /// Show the most frequent codes in a training table.
    Freq(FreqArgs),
}

/// How the ranker is configured; shared by `rank` and `batch`.
#[derive(Args)]
pub struct RankerArgs {
    /// Training CSV used to weight codes by frequency.
    #[arg(long = "train", value_name = "CSV")]
    pub train: Option<PathBuf>,

    /// Column of the training CSV holding comma-separated codes.
    #[arg(long = "target-column", default_value = DEFAULT_TARGET_COLUMN)]
    pub target_column: String,

    /// Built-in option set.
    #[arg(long = "preset", value_enum, default_value = "constrained")]
    pub preset: PresetArg,

    /// JSON file with ranker options (overrides --preset).
    #[arg(long = "options", value_name = "JSON")]
    pub options: Option<PathBuf>,

    /// Maximum number of codes per response.
    #[arg(long = "max-codes", value_name = "N")]
    pub max_codes: Option<usize>,
}

#[derive(Parser)]
pub struct RankArgs {
    /// Response text (read from stdin when omitted).
    #[arg(value_name = "TEXT")]
    pub text: Option<String>,

    #[command(flatten)]
    pub ranker: RankerArgs,

    /// Print every candidate with its score breakdown.
    #[arg(long = "explain")]
    pub explain: bool,
}

#[derive(Parser)]
pub struct BatchArgs {
    /// CSV or JSONL (.jsonl, .ndjson) file of responses.
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    #[command(flatten)]
    pub ranker: RankerArgs,

    /// Column (CSV) or field (JSONL) holding the response text.
    #[arg(long = "response-column", default_value = "response")]
    pub response_column: String,

    /// Column or field used as the record id (default: 1-based record number).
    #[arg(long = "id-column")]
    pub id_column: Option<String>,

    /// Output CSV (default: stdout).
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Parser)]
pub struct FreqArgs {
    /// Training CSV.
    #[arg(value_name = "CSV")]
    pub train: PathBuf,

    /// Column holding comma-separated codes.
    #[arg(long = "target-column", default_value = DEFAULT_TARGET_COLUMN)]
    pub target_column: String,

    /// Number of codes to show.
    #[arg(long = "top", default_value_t = 30)]
    pub top: usize,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum PresetArg {
    /// Fixed 16-code vocabulary, three codes.
    Constrained,
    /// Any well-formed code, five codes.
    Open,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

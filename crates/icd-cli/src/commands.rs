use std::fs::File;
use std::io::{self, BufWriter, Read};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{info, info_span};

use icd_cli::batch::{BatchColumns, BatchFormat, OutcomeTally, rank_file, write_records};
use icd_cli::summary::{print_explain, print_frequency};
use icd_ingest::read_training_csv;
use icd_model::FrequencyModel;
use icd_rank::{Ranker, RankerOptions};

use crate::cli::{BatchArgs, FreqArgs, PresetArg, RankArgs, RankerArgs};

pub fn build_ranker(args: &RankerArgs) -> Result<Ranker> {
    let model = match &args.train {
        Some(path) => {
            let report = read_training_csv(path, &args.target_column)
                .with_context(|| format!("load training data {}", path.display()))?;
            report.model
        }
        None => FrequencyModel::empty(),
    };

    let mut options = match &args.options {
        Some(path) => RankerOptions::from_json_path(path)?,
        None => match args.preset {
            PresetArg::Constrained => RankerOptions::constrained(),
            PresetArg::Open => RankerOptions::open_vocabulary(),
        },
    };
    if let Some(max_codes) = args.max_codes {
        options = options.with_max_codes(max_codes);
    }

    Ranker::new(options, Arc::new(model)).context("configure ranker")
}

pub fn run_rank(args: &RankArgs) -> Result<()> {
    let ranker = build_ranker(&args.ranker)?;
    let text = match &args.text {
        Some(text) => text.clone(),
        None => read_stdin()?,
    };
    if args.explain {
        match ranker.explain(&text) {
            Ok(trace) => print_explain(&trace),
            Err(error) => {
                eprintln!("warning: {error}");
                println!("{}", ranker.rank_text(&text));
            }
        }
    } else {
        println!("{}", ranker.rank_text(&text));
    }
    Ok(())
}

pub fn run_batch(args: &BatchArgs) -> Result<OutcomeTally> {
    let ranker = build_ranker(&args.ranker)?;
    let format = BatchFormat::from_path(&args.input);
    let batch_span = info_span!(
        "batch",
        input = %args.input.display(),
        format = ?format
    );
    let _guard = batch_span.enter();

    let start = Instant::now();
    let columns = BatchColumns {
        response: &args.response_column,
        id: args.id_column.as_deref(),
    };
    let records = rank_file(&ranker, &args.input, format, columns)?;
    match &args.output {
        Some(path) => {
            let file =
                File::create(path).with_context(|| format!("create {}", path.display()))?;
            write_records(&records, BufWriter::new(file))?;
        }
        None => write_records(&records, io::stdout().lock())?,
    }

    let tally = OutcomeTally::from_records(&records);
    info!(
        records = tally.total(),
        ranked = tally.ranked,
        keyword_fallback = tally.keyword_fallback,
        default_fallback = tally.default_fallback,
        duration_ms = start.elapsed().as_millis(),
        "batch complete"
    );
    Ok(tally)
}

pub fn run_freq(args: &FreqArgs) -> Result<()> {
    let report = read_training_csv(&args.train, &args.target_column)
        .with_context(|| format!("load training data {}", args.train.display()))?;
    print_frequency(&report, args.top);
    Ok(())
}

fn read_stdin() -> Result<String> {
    let mut raw = Vec::new();
    io::stdin()
        .lock()
        .read_to_end(&mut raw)
        .context("read response from stdin")?;
    // Non-UTF-8 input is not text; the ranker maps the empty string to the default code.
    Ok(String::from_utf8(raw).unwrap_or_default())
}

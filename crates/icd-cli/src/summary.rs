//! Terminal tables for batch outcomes, score breakdowns and code frequencies.

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::batch::OutcomeTally;
use icd_ingest::BuildReport;
use icd_model::RankOutcome;
use icd_rank::{CodeCategory, CodeScore, RankTrace};

const OUTCOMES: [RankOutcome; 3] = [
    RankOutcome::Ranked,
    RankOutcome::KeywordFallback,
    RankOutcome::DefaultFallback,
];

/// Batch outcome counts, written to stderr so stdout stays machine-readable.
pub fn print_outcome_summary(tally: &OutcomeTally) {
    eprintln!("{}", outcome_table(tally));
}

pub fn outcome_table(tally: &OutcomeTally) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Outcome"),
        header_cell("Records"),
        header_cell("Share"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    let total = tally.total();
    for outcome in OUTCOMES {
        let count = tally.get(outcome);
        table.add_row(vec![
            outcome_cell(outcome),
            count_cell(count, outcome_color(outcome)),
            dim_cell(share(count, total)),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(total).add_attribute(Attribute::Bold),
        dim_cell("-"),
    ]);
    table
}

/// Per-candidate score breakdown for one response.
pub fn print_explain(trace: &RankTrace) {
    println!("Result: {} ({})", trace.result, trace.result.outcome().as_str());
    if trace.label_stripped {
        println!("Leading label removed");
    }
    if let Some(table) = score_table(trace) {
        println!("{table}");
    }
    if let Some(table) = dropped_table(trace) {
        println!("Dropped:");
        println!("{table}");
    }
}

/// Scored candidates, highest first; `None` when nothing was scored.
pub fn score_table(trace: &RankTrace) -> Option<Table> {
    if trace.scores.is_empty() {
        return None;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Code"),
        header_cell("Category"),
        header_cell("Score"),
        header_cell("Kept"),
        header_cell("Breakdown"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Center);
    for score in &trace.scores {
        let kept = trace.result.codes().contains(&score.code);
        table.add_row(vec![
            Cell::new(score.code.as_str())
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(category_label(score)),
            Cell::new(score.score),
            kept_cell(kept),
            Cell::new(score.explain()),
        ]);
    }
    Some(table)
}

/// Rejected and suppressed candidates; `None` when nothing was dropped.
pub fn dropped_table(trace: &RankTrace) -> Option<Table> {
    if trace.rejected.is_empty() && trace.suppressed.is_empty() {
        return None;
    }
    let mut table = Table::new();
    table.set_header(vec![header_cell("Candidate"), header_cell("Reason")]);
    apply_table_style(&mut table);
    for (raw, reason) in &trace.rejected {
        table.add_row(vec![dim_cell(raw), Cell::new(reason).fg(Color::Yellow)]);
    }
    for code in &trace.suppressed {
        table.add_row(vec![
            dim_cell(code),
            Cell::new("suppressed: no corroborating keyword").fg(Color::Yellow),
        ]);
    }
    Some(table)
}

/// Most frequent training codes plus the build statistics.
pub fn print_frequency(report: &BuildReport, top: usize) {
    let stats = report.stats;
    println!(
        "Rows: {} (contributing {}, blank {}, malformed {})",
        stats.rows, stats.contributing, stats.blank, stats.malformed
    );
    println!(
        "Codes: {} occurrences, {} distinct",
        stats.codes,
        report.model.len()
    );
    println!("{}", frequency_table(report, top));
}

pub fn frequency_table(report: &BuildReport, top: usize) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Rank"),
        header_cell("Code"),
        header_cell("Count"),
        header_cell("Share"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    let total = usize::try_from(report.model.total()).unwrap_or(usize::MAX);
    for (rank, (code, count)) in report.model.most_common(top).into_iter().enumerate() {
        table.add_row(vec![
            dim_cell(rank + 1),
            Cell::new(code.as_str())
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(count),
            dim_cell(share(count as usize, total)),
        ]);
    }
    table
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(80);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn share(count: usize, total: usize) -> String {
    if total == 0 {
        return "-".to_string();
    }
    format!("{:.1}%", count as f64 * 100.0 / total as f64)
}

fn category_label(score: &CodeScore) -> &'static str {
    match score.category {
        CodeCategory::Symptom => "symptom",
        CodeCategory::Disease => "disease",
        CodeCategory::Other => "other",
    }
}

fn outcome_cell(outcome: RankOutcome) -> Cell {
    Cell::new(outcome.as_str()).fg(outcome_color(outcome))
}

fn outcome_color(outcome: RankOutcome) -> Color {
    match outcome {
        RankOutcome::Ranked => Color::Green,
        RankOutcome::KeywordFallback => Color::Yellow,
        RankOutcome::DefaultFallback => Color::Red,
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn kept_cell(kept: bool) -> Cell {
    if kept {
        Cell::new("✓")
            .fg(Color::Green)
            .add_attribute(Attribute::Bold)
    } else {
        dim_cell("-")
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

//! Results table (terminal) and CSV export for a benchmark run.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::batch::{BatchSummary, PairResult};

const HEADERS: [&str; 7] = ["Document", "Model", "Elapsed (s)", "Status", "Score", "Matched", "Total"];

/// One CSV record. Unscored pairs leave `score`/`matched` empty and fill `error`.
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    document: &'a str,
    model: &'a str,
    elapsed_secs: f64,
    status: &'a str,
    score: Option<f64>,
    matched: Option<usize>,
    total: usize,
    error: Option<&'a str>,
}

impl<'a> From<&'a PairResult> for CsvRow<'a> {
    fn from(result: &'a PairResult) -> Self {
        let report = result.outcome.report();
        CsvRow {
            document: &result.document,
            model: &result.model,
            elapsed_secs: result.elapsed_secs,
            status: result.outcome.status(),
            score: report.map(|r| r.score),
            matched: report.map(|r| r.matched_leaves),
            total: result.total_leaves,
            error: result.outcome.error(),
        }
    }
}

fn cells(result: &PairResult) -> [String; 7] {
    let report = result.outcome.report();
    [
        result.document.clone(),
        result.model.clone(),
        format!("{:.2}", result.elapsed_secs),
        result.outcome.status().to_string(),
        report.map_or_else(|| "-".to_string(), |r| format!("{:.4}", r.score)),
        report.map_or_else(|| "-".to_string(), |r| r.matched_leaves.to_string()),
        result.total_leaves.to_string(),
    ]
}

/// Render the results as a bordered text table.
pub fn render_table(summary: &BatchSummary) -> String {
    let rows: Vec<[String; 7]> = summary.results.iter().map(cells).collect();

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let border = {
        let mut line = String::from("+");
        for width in &widths {
            line.push_str(&"-".repeat(width + 2));
            line.push('+');
        }
        line
    };
    let format_row = |cells: &[&str]| {
        let mut line = String::from("|");
        for (cell, width) in cells.iter().zip(&widths) {
            let pad = width - cell.chars().count();
            line.push(' ');
            line.push_str(cell);
            line.push_str(&" ".repeat(pad + 1));
            line.push('|');
        }
        line
    };

    let mut out = Vec::with_capacity(rows.len() + 4);
    out.push(border.clone());
    out.push(format_row(&HEADERS[..]));
    out.push(border.clone());
    for row in &rows {
        let refs: Vec<&str> = row.iter().map(String::as_str).collect();
        out.push(format_row(refs.as_slice()));
    }
    out.push(border);
    out.join("\n")
}

/// Write one CSV record per (document, model) pair.
pub fn write_csv(path: &Path, summary: &BatchSummary) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
    for result in &summary.results {
        writer
            .serialize(CsvRow::from(result))
            .with_context(|| format!("Failed to write CSV row to {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to flush CSV file: {}", path.display()))?;
    Ok(())
}

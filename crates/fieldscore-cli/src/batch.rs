//! Benchmark runner: every document against every model, scored and timed.
//!
//! Failures stay local to one (document, model) pair. A document with missing
//! fixtures is skipped before any model is called; a failed request or a reply that
//! is not JSON leaves that pair unscored while the rest of the batch continues.

use std::path::{Path, PathBuf};
use std::time::Instant;

use fieldscore_core::{score_with, AccuracyReport, ScoreOptions, Value};
use tracing::{info, warn};

use crate::extract::{ExtractionRequest, Extractor};
use crate::manifest::DocumentSpec;

#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    pub score: ScoreOptions,
    /// Save each decoded response as `<dir>/<document>__<model>.json`.
    pub responses_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PairOutcome {
    Scored(AccuracyReport),
    TransportError(String),
    DecodeError(String),
}

impl PairOutcome {
    pub fn status(&self) -> &'static str {
        match self {
            PairOutcome::Scored(_) => "scored",
            PairOutcome::TransportError(_) => "transport_error",
            PairOutcome::DecodeError(_) => "decode_error",
        }
    }

    pub fn report(&self) -> Option<&AccuracyReport> {
        match self {
            PairOutcome::Scored(report) => Some(report),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            PairOutcome::Scored(_) => None,
            PairOutcome::TransportError(message) | PairOutcome::DecodeError(message) => Some(message),
        }
    }
}

/// Result for one (document, model) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct PairResult {
    pub document: String,
    pub model: String,
    pub elapsed_secs: f64,
    /// Leaf count of the expected tree, known even when the pair was not scored.
    pub total_leaves: usize,
    pub outcome: PairOutcome,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedDocument {
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSummary {
    pub results: Vec<PairResult>,
    pub skipped: Vec<SkippedDocument>,
}

impl BatchSummary {
    /// Mean score per model over the pairs that were scored, in first-seen order.
    pub fn mean_scores(&self) -> Vec<(String, f64, usize)> {
        let mut means: Vec<(String, f64, usize)> = Vec::new();
        for result in &self.results {
            let Some(report) = result.outcome.report() else {
                continue;
            };
            match means.iter_mut().find(|(model, _, _)| *model == result.model) {
                Some((_, sum, count)) => {
                    *sum += report.score;
                    *count += 1;
                }
                None => means.push((result.model.clone(), report.score, 1)),
            }
        }
        for (_, sum, count) in &mut means {
            *sum /= *count as f64;
        }
        means
    }
}

/// Run every document in `documents` through every model in `models`.
pub fn run(
    documents: &[DocumentSpec],
    models: &[String],
    extractor: &dyn Extractor,
    options: &BatchOptions,
) -> BatchSummary {
    let mut summary = BatchSummary::default();

    for spec in documents {
        let document = match spec.load() {
            Ok(document) => document,
            Err(err) => {
                warn!(document = %spec.name, "skipping document: {err}");
                summary.skipped.push(SkippedDocument {
                    name: spec.name.clone(),
                    reason: err.to_string(),
                });
                continue;
            }
        };
        let total_leaves = fieldscore_core::count_leaves(&document.expected);

        for model in models {
            info!(document = %document.name, %model, "requesting model");
            let request = ExtractionRequest {
                model,
                schema: &document.schema,
                text: &document.text,
            };

            let start = Instant::now();
            let response = extractor.extract(&request);
            let elapsed_secs = start.elapsed().as_secs_f64();

            let outcome = match response {
                Err(err) => {
                    warn!(document = %document.name, %model, "request failed: {err}");
                    PairOutcome::TransportError(err.to_string())
                }
                Ok(content) => match Value::from_json_str(&content) {
                    Err(err) => {
                        warn!(document = %document.name, %model, "response is not JSON: {err}");
                        PairOutcome::DecodeError(err.to_string())
                    }
                    Ok(generated) => {
                        if let Some(dir) = &options.responses_dir {
                            save_response(dir, &document.name, model, &generated);
                        }
                        let report = score_with(&document.expected, &generated, &options.score);
                        info!(
                            document = %document.name,
                            %model,
                            score = report.score,
                            elapsed_secs,
                            "scored response"
                        );
                        PairOutcome::Scored(report)
                    }
                },
            };

            summary.results.push(PairResult {
                document: document.name.clone(),
                model: model.clone(),
                elapsed_secs,
                total_leaves,
                outcome,
            });
        }
    }

    summary
}

/// File name for a saved response; model tags like `llama3:8b` are not
/// filesystem-safe everywhere.
fn response_file_name(document: &str, model: &str) -> String {
    let sanitize = |s: &str| -> String {
        s.chars()
            .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
            .collect()
    };
    format!("{}__{}.json", sanitize(document), sanitize(model))
}

fn save_response(dir: &Path, document: &str, model: &str, generated: &Value) {
    let path = dir.join(response_file_name(document, model));
    let written = std::fs::create_dir_all(dir).and_then(|()| {
        let pretty = serde_json::to_string_pretty(&generated.to_json()).map_err(std::io::Error::other)?;
        std::fs::write(&path, pretty)
    });
    if let Err(err) = written {
        warn!(path = %path.display(), "could not save response: {err}");
    }
}

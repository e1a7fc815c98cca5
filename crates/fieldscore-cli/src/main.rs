//! `fieldscore` CLI — score LLM form extraction against expected JSON.
//!
//! ## Usage
//!
//! ```sh
//! # Score one generated response against its fixture
//! fieldscore score -e expected_1.json -g response.json
//!
//! # Show every leaf comparison, or emit the full report as JSON
//! fieldscore score -e expected_1.json -g response.json --trace
//! fieldscore score -e expected_1.json -g response.json --format json
//!
//! # Count the leaves a fixture will be scored on (stdin if -i is omitted)
//! fieldscore count -i expected_1.json
//!
//! # Benchmark models on a local Ollama server
//! fieldscore bench -m manifest.json --csv results.csv --responses-dir res/
//!
//! # Benchmark through OpenAI function calling
//! OPENAI_API_KEY=... fieldscore bench -m manifest.json --backend openai --model gpt-4-0613
//! ```

mod batch;
mod extract;
mod manifest;
mod table;

use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use fieldscore_core::{count_leaves, score_with, ScoreOptions, Value};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::batch::BatchOptions;
use crate::extract::{
    Extractor, OllamaExtractor, OpenAiExtractor, Sampling, DEFAULT_OLLAMA_ENDPOINT, DEFAULT_OPENAI_ENDPOINT,
};
use crate::manifest::Manifest;

#[derive(Parser)]
#[command(
    name = "fieldscore",
    version,
    about = "Structural accuracy scoring for LLM-extracted JSON"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a generated JSON file against an expected JSON file
    Score {
        /// Expected (ground truth) JSON file
        #[arg(short, long)]
        expected: PathBuf,
        /// Generated JSON file to score
        #[arg(short, long)]
        generated: PathBuf,
        /// Print every comparison made
        #[arg(long)]
        trace: bool,
        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
        /// Count an expected null as matched when the generated key is absent
        #[arg(long)]
        null_matches_missing: bool,
    },
    /// Count the scorable leaves in a JSON document
    Count {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
    /// Run every manifest document through every model and score the responses
    Bench {
        /// Manifest listing models and document fixtures
        #[arg(short, long)]
        manifest: PathBuf,
        /// Chat-completion backend
        #[arg(long, value_enum, default_value = "ollama")]
        backend: Backend,
        /// Backend base URL (defaults per backend)
        #[arg(long)]
        endpoint: Option<String>,
        /// API key for the OpenAI backend
        #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
        /// Model to run; repeat to run several. Overrides the manifest's list
        #[arg(long = "model")]
        models: Vec<String>,
        /// Write results as CSV to this file
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Save each decoded response under this directory
        #[arg(long)]
        responses_dir: Option<PathBuf>,
        /// Per-request timeout in seconds
        #[arg(long, default_value_t = 120)]
        timeout_secs: u64,
        /// Sampling seed sent with every request
        #[arg(long, default_value_t = 123)]
        seed: u64,
        /// Sampling temperature sent with every request
        #[arg(long, default_value_t = 0.01)]
        temperature: f64,
        /// Count an expected null as matched when the generated key is absent
        #[arg(long)]
        null_matches_missing: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Backend {
    /// Ollama `/api/chat` with JSON output
    Ollama,
    /// OpenAI chat completions with a forced `fill_form` function call
    Openai,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Score {
            expected,
            generated,
            trace,
            format,
            null_matches_missing,
        } => {
            let expected = read_value(&expected)?;
            let generated = read_value(&generated)?;
            let options = ScoreOptions { null_matches_missing };
            let report = score_with(&expected, &generated, &options);

            match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                }
                OutputFormat::Text => {
                    if trace {
                        print!("{}", report.render_trace());
                    }
                    println!("Score:    {:.4}", report.score);
                    println!("Matched:  {}/{}", report.matched_leaves, report.total_leaves);
                }
            }
        }
        Commands::Count { input } => {
            let json = read_input(input.as_deref())?;
            let value = Value::from_json_str(&json).context("Failed to parse JSON input")?;
            println!("{}", count_leaves(&value));
        }
        Commands::Bench {
            manifest,
            backend,
            endpoint,
            api_key,
            models,
            csv,
            responses_dir,
            timeout_secs,
            seed,
            temperature,
            null_matches_missing,
        } => {
            let loaded = Manifest::load(&manifest)?;
            let models = if models.is_empty() { loaded.models.clone() } else { models };
            if models.is_empty() {
                anyhow::bail!(
                    "No models to run: list them under \"models\" in {} or pass --model",
                    manifest.display()
                );
            }

            let sampling = Sampling { seed, temperature };
            let timeout = Duration::from_secs(timeout_secs);
            let extractor: Box<dyn Extractor> = match backend {
                Backend::Ollama => Box::new(
                    OllamaExtractor::new(
                        endpoint.as_deref().unwrap_or(DEFAULT_OLLAMA_ENDPOINT),
                        sampling,
                        timeout,
                    )
                    .context("Failed to build HTTP client")?,
                ),
                Backend::Openai => {
                    let Some(api_key) = api_key else {
                        anyhow::bail!("The openai backend requires --api-key or OPENAI_API_KEY");
                    };
                    Box::new(
                        OpenAiExtractor::new(
                            endpoint.as_deref().unwrap_or(DEFAULT_OPENAI_ENDPOINT),
                            api_key,
                            sampling,
                            timeout,
                        )
                        .context("Failed to build HTTP client")?,
                    )
                }
            };

            info!(
                documents = loaded.documents.len(),
                models = models.len(),
                "starting benchmark"
            );
            let options = BatchOptions {
                score: ScoreOptions { null_matches_missing },
                responses_dir,
            };
            let summary = batch::run(&loaded.documents, &models, extractor.as_ref(), &options);

            if !summary.results.is_empty() {
                println!("{}", table::render_table(&summary));
            }
            for (model, mean, count) in summary.mean_scores() {
                println!("Mean score {model}: {mean:.4} over {count} document(s)");
            }
            for skipped in &summary.skipped {
                println!("Skipped {}: {}", skipped.name, skipped.reason);
            }
            if let Some(path) = csv {
                table::write_csv(&path, &summary)?;
                println!("Results written to {}", path.display());
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn read_value(path: &Path) -> Result<Value> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    Value::from_json_str(&json).with_context(|| format!("Failed to parse JSON: {}", path.display()))
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

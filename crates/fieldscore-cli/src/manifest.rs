//! Benchmark manifest: which models to run and which documents to score.
//!
//! ```json
//! {
//!   "models": ["llama3:8b", "llama3.2:3b"],
//!   "documents": [
//!     {"name": "feridas-1", "schema": "feridas/schema.json",
//!      "text": "feridas/texto_1.txt", "expected": "feridas/expected_1.json"}
//!   ]
//! }
//! ```
//!
//! Relative fixture paths resolve against the directory holding the manifest.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fieldscore_core::Value;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub models: Vec<String>,
    pub documents: Vec<DocumentSpec>,
}

/// Fixture files for one document.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentSpec {
    pub name: String,
    pub schema: PathBuf,
    pub text: PathBuf,
    pub expected: PathBuf,
}

/// A document whose fixtures have all been read and parsed.
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub name: String,
    pub schema: serde_json::Value,
    pub text: String,
    pub expected: Value,
}

/// Why a document's fixtures could not be used.
#[derive(Error, Debug)]
pub enum FixtureError {
    #[error("fixture not found: {}", .0.display())]
    Missing(PathBuf),

    #[error("could not read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not valid JSON: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl Manifest {
    /// Read a manifest and resolve its fixture paths.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
        let mut manifest: Manifest = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse manifest: {}", path.display()))?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        for document in &mut manifest.documents {
            document.resolve_against(base);
        }
        Ok(manifest)
    }
}

impl DocumentSpec {
    fn resolve_against(&mut self, base: &Path) {
        for path in [&mut self.schema, &mut self.text, &mut self.expected] {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }

    /// Read all three fixtures. Any missing or malformed file rejects the whole
    /// document.
    pub fn load(&self) -> Result<LoadedDocument, FixtureError> {
        let schema = read_json(&self.schema)?;
        let text = read_text(&self.text)?;
        let expected = Value::from(read_json(&self.expected)?);
        Ok(LoadedDocument {
            name: self.name.clone(),
            schema,
            text,
            expected,
        })
    }
}

fn read_text(path: &Path) -> Result<String, FixtureError> {
    if !path.exists() {
        return Err(FixtureError::Missing(path.to_path_buf()));
    }
    std::fs::read_to_string(path).map_err(|source| FixtureError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn read_json(path: &Path) -> Result<serde_json::Value, FixtureError> {
    let raw = read_text(path)?;
    serde_json::from_str(&raw).map_err(|source| FixtureError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

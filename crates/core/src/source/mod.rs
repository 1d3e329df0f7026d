//! Source module reading raw catalog documents.
//!
//! `JsonFileSource` reads exports laid out as `<dir>/<collection>.json`
//! (a JSON array) or `<dir>/<collection>.jsonl` (one document per line).

mod json_file;

pub use json_file::JsonFileSource;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::catalog::CatalogKind;

/// A raw source document.
pub type SourceDocument = serde_json::Value;

/// Errors that can occur while reading a catalog batch.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Export file could not be read.
    #[error("Failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Export file is not valid JSON.
    #[error("Failed to parse {path} (line {line})")]
    Parse {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Reads every document of a catalog.
#[async_trait]
pub trait SourceReader: Send + Sync {
    /// Returns the name of this reader implementation.
    fn name(&self) -> &str;

    /// Reads the whole batch for `kind`.
    async fn read(&self, kind: CatalogKind) -> Result<Vec<SourceDocument>, SourceError>;
}

/// Source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Directory containing one export file per collection.
    #[serde(default = "default_dir")]
    pub dir: PathBuf,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self { dir: default_dir() }
    }
}

fn default_dir() -> PathBuf {
    PathBuf::from("data/source")
}

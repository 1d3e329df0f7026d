//! JSON export file reader.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use serde_json::Value;
use tracing::{debug, warn};

use super::{SourceDocument, SourceError, SourceReader};
use crate::catalog::CatalogKind;

/// Reads `<dir>/<collection>.json` or `<dir>/<collection>.jsonl`.
///
/// The array file wins when both exist. A missing file is an empty batch.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    dir: PathBuf,
}

impl JsonFileSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn read_optional(path: &Path) -> Result<Option<String>, SourceError> {
        match fs::read_to_string(path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(SourceError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

fn parse_array(path: &Path, contents: &str) -> Result<Vec<SourceDocument>, SourceError> {
    serde_json::from_str(contents).map_err(|source| SourceError::Parse {
        path: path.to_path_buf(),
        line: source.line(),
        source,
    })
}

/// Each line is its own document. An unparsable line is kept as a raw
/// string so it fails deserialization as one document instead of failing
/// the whole batch.
fn parse_lines(path: &Path, contents: &str) -> Vec<SourceDocument> {
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str(line).unwrap_or_else(|e| {
                warn!(path = %path.display(), line = idx + 1, error = %e, "Unparsable source line");
                Value::String(line.to_string())
            })
        })
        .collect()
}

#[async_trait]
impl SourceReader for JsonFileSource {
    fn name(&self) -> &str {
        "json_file"
    }

    async fn read(&self, kind: CatalogKind) -> Result<Vec<SourceDocument>, SourceError> {
        let array_path = self.dir.join(format!("{}.json", kind.collection()));
        if let Some(contents) = Self::read_optional(&array_path).await? {
            let documents = parse_array(&array_path, &contents)?;
            debug!(path = %array_path.display(), count = documents.len(), "Read source batch");
            return Ok(documents);
        }

        let lines_path = self.dir.join(format!("{}.jsonl", kind.collection()));
        if let Some(contents) = Self::read_optional(&lines_path).await? {
            let documents = parse_lines(&lines_path, &contents);
            debug!(path = %lines_path.display(), count = documents.len(), "Read source batch");
            return Ok(documents);
        }

        debug!(dir = %self.dir.display(), catalog = %kind, "No export file, empty batch");
        Ok(Vec::new())
    }
}

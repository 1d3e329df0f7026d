//! Types for the target module.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Equality filter on a document's natural key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyFilter {
    pub field: String,
    pub value: String,
}

impl KeyFilter {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Fields to overwrite, addressed by dotted path (`title`, `images.poster`).
///
/// Paths not named are left untouched in an existing document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldSet {
    fields: BTreeMap<String, Value>,
}

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `path` to `value`, replacing any earlier value for the same path.
    pub fn set(&mut self, path: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.fields.insert(path.into(), value.into());
        self
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        self.fields.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.fields.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Writes every field into `document`, creating intermediate objects.
    ///
    /// A non-object value found on the way to a nested path is replaced by an
    /// object.
    pub fn apply_to(&self, document: &mut Map<String, Value>) {
        for (path, value) in &self.fields {
            let mut segments = path.split('.').peekable();
            let mut target = &mut *document;

            while let Some(segment) = segments.next() {
                if segments.peek().is_none() {
                    target.insert(segment.to_string(), value.clone());
                    break;
                }
                let slot = target
                    .entry(segment.to_string())
                    .or_insert_with(|| Value::Object(Map::new()));
                if !slot.is_object() {
                    *slot = Value::Object(Map::new());
                }
                let Value::Object(map) = slot else {
                    break;
                };
                target = map;
            }
        }
    }
}

/// Whether an upsert created or modified the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

impl UpsertOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inserted => "inserted",
            Self::Updated => "updated",
        }
    }
}

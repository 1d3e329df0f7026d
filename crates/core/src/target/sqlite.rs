//! SQLite-backed document store.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use serde_json::{Map, Value};

use super::error::UpsertError;
use super::traits::TargetStore;
use super::types::{FieldSet, KeyFilter, UpsertOutcome};
use crate::metrics;

/// JSON documents stored in SQLite, one row per (collection, key field, key value).
pub struct SqliteDocumentStore {
    conn: Mutex<Connection>,
}

impl SqliteDocumentStore {
    /// Create a new store, creating the database file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, UpsertError> {
        let conn = Connection::open(path)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self, UpsertError> {
        let conn = Connection::open_in_memory()?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), UpsertError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                collection TEXT NOT NULL,
                key_field TEXT NOT NULL,
                key_value TEXT NOT NULL,
                body TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (collection, key_field, key_value)
            );

            CREATE INDEX IF NOT EXISTS idx_documents_collection ON documents(collection);
            "#,
        )?;

        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, UpsertError> {
        self.conn
            .lock()
            .map_err(|e| UpsertError::Lock(e.to_string()))
    }

    fn upsert_blocking(
        &self,
        collection: &str,
        filter: &KeyFilter,
        fields: &FieldSet,
    ) -> Result<UpsertOutcome, UpsertError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let existing: Option<String> = tx
            .query_row(
                "SELECT body FROM documents
                 WHERE collection = ?1 AND key_field = ?2 AND key_value = ?3",
                params![collection, filter.field, filter.value],
                |row| row.get(0),
            )
            .optional()?;

        let now = Utc::now().to_rfc3339();
        let outcome = match existing {
            Some(body) => {
                let mut document = match serde_json::from_str::<Value>(&body)? {
                    Value::Object(map) => map,
                    _ => Map::new(),
                };
                fields.apply_to(&mut document);
                tx.execute(
                    "UPDATE documents SET body = ?4, updated_at = ?5
                     WHERE collection = ?1 AND key_field = ?2 AND key_value = ?3",
                    params![
                        collection,
                        filter.field,
                        filter.value,
                        serde_json::to_string(&document)?,
                        now
                    ],
                )?;
                UpsertOutcome::Updated
            }
            None => {
                let mut document = Map::new();
                document.insert(filter.field.clone(), Value::String(filter.value.clone()));
                fields.apply_to(&mut document);
                tx.execute(
                    "INSERT INTO documents
                     (collection, key_field, key_value, body, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
                    params![
                        collection,
                        filter.field,
                        filter.value,
                        serde_json::to_string(&document)?,
                        now
                    ],
                )?;
                UpsertOutcome::Inserted
            }
        };

        tx.commit()?;
        Ok(outcome)
    }
}

#[async_trait]
impl TargetStore for SqliteDocumentStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn find_one_and_upsert(
        &self,
        collection: &str,
        filter: &KeyFilter,
        fields: &FieldSet,
    ) -> Result<UpsertOutcome, UpsertError> {
        let start = Instant::now();
        let result = self.upsert_blocking(collection, filter, fields);

        let label = match &result {
            Ok(outcome) => outcome.as_str(),
            Err(_) => "failed",
        };
        metrics::UPSERT_DURATION
            .with_label_values(&[collection, label])
            .observe(start.elapsed().as_secs_f64());

        result
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: &KeyFilter,
    ) -> Result<Option<Value>, UpsertError> {
        let conn = self.lock()?;
        let body: Option<String> = conn
            .query_row(
                "SELECT body FROM documents
                 WHERE collection = ?1 AND key_field = ?2 AND key_value = ?3",
                params![collection, filter.field, filter.value],
                |row| row.get(0),
            )
            .optional()?;

        body.map(|b| serde_json::from_str(&b).map_err(UpsertError::from))
            .transpose()
    }

    async fn count(&self, collection: &str) -> Result<u64, UpsertError> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM documents WHERE collection = ?1",
            params![collection],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}

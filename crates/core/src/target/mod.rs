//! Target module for the document store receiving synced records.
//!
//! Writes are keyed on the record's natural key and overwrite only the
//! dotted paths named in a [`FieldSet`], so repeated syncs converge.

mod config;
mod error;
mod sqlite;
mod traits;
mod types;

pub use config::TargetConfig;
pub use error::UpsertError;
pub use sqlite::SqliteDocumentStore;
pub use traits::TargetStore;
pub use types::{FieldSet, KeyFilter, UpsertOutcome};

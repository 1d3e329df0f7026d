//! Media catalog data model.
//!
//! Source documents are deserialized into typed [`CatalogRecord`]s. Each record
//! carries an [`ImageSet`] whose URLs are mirrored into object storage under an
//! [`AssetKey`] derived from the record identity, the [`AssetKind`] and the
//! source file name.

mod images;
mod kind;
mod record;

pub use images::{parse_absolute_url, AssetKey, ImageSet};
pub use kind::{AssetKind, CatalogKind};
pub use record::{AnimeRecord, CatalogRecord, MovieRecord, Rating, ShowRecord};

use thiserror::Error;

/// Errors raised while turning a source document into a [`CatalogRecord`].
#[derive(Debug, Error)]
pub enum DeserializeError {
    /// The document is not a JSON object.
    #[error("source document is not an object (found {found})")]
    NotAnObject { found: &'static str },

    /// Required fields are missing or have the wrong shape.
    #[error("invalid {kind} document: {source}")]
    Invalid {
        kind: CatalogKind,
        #[source]
        source: serde_json::Error,
    },

    /// The natural key is present but empty.
    #[error("{kind} document has an empty {field}")]
    MissingKey {
        kind: CatalogKind,
        field: &'static str,
    },
}

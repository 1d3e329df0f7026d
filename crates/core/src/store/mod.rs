//! Store module for durable, publicly readable object storage.
//!
//! `BlobBackend` is the raw container client. `ObjectStoreBuilder::provision`
//! creates the container and grants anonymous blob reads once; the resulting
//! `ObjectStore` is the only handle the syncer uses, so nothing can touch
//! storage before provisioning succeeded.
//!
//! # Example
//!
//! ```ignore
//! use reelsync_core::store::{FsBlobBackend, ObjectStoreBuilder};
//!
//! let backend = Arc::new(FsBlobBackend::new("/srv/blobs", "https://cdn.example.com"));
//! let store = ObjectStoreBuilder::new(backend, "assets").provision().await?;
//! let animes = store.scoped("animes");
//! ```

mod config;
mod error;
mod fs_backend;
mod object_store;
mod traits;
mod types;

pub use config::{FsStorageConfig, StorageBackend, StorageConfig};
pub use error::StoreError;
pub use fs_backend::FsBlobBackend;
pub use object_store::{ObjectStore, ObjectStoreBuilder};
pub use traits::BlobBackend;
pub use types::{PublicAccess, StoredObject};

//! Cache module deciding whether an asset needs (re-)fetching.
//!
//! `AssetCache` drives fetcher, transformer and object store for one asset:
//!
//! 1. Non-absolute source URL: `Absent`, no I/O.
//! 2. Key exists and `force_replace` is false: `Reused`, no fetch.
//! 3. Otherwise fetch, transform visual kinds on the blocking pool (falling
//!    back to the original bytes), upload: `Uploaded`.

mod asset_cache;
mod config;
mod error;
mod key_lock;
mod types;

pub use asset_cache::AssetCache;
pub use config::CacheConfig;
pub use error::AssetError;
pub use key_lock::{KeyGuard, KeyLocks};
pub use types::{AssetOutcome, CacheDecision};

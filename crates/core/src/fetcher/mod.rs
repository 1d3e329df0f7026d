//! Fetcher module for downloading remote image assets.
//!
//! This module provides the `AssetFetcher` trait and an HTTP implementation
//! with a bounded timeout and per-host request decoration.
//!
//! # Features
//!
//! - One GET per call, no retries at this layer
//! - Host rules (regular expressions) attach cookies and headers from configuration
//! - Errors classify themselves as retryable or permanent
//!
//! # Example
//!
//! ```ignore
//! use reelsync_core::fetcher::{AssetFetcher, FetcherConfig, HostRule, HttpFetcher};
//!
//! let config = FetcherConfig::default()
//!     .with_host_rule(HostRule::new(r"yts\.mx$").with_cookie("cf_clearance", "..."));
//! let fetcher = HttpFetcher::new(&config)?;
//!
//! let bytes = fetcher.fetch("https://img.yts.mx/assets/images/movies/x/large-cover.jpg").await?;
//! ```

mod config;
mod decorator;
mod error;
mod http;
mod traits;

pub use config::{FetcherConfig, HostRule};
pub use decorator::HostDecorators;
pub use error::FetchError;
pub use http::HttpFetcher;
pub use traits::AssetFetcher;

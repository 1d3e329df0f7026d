use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::IpAddr;

use crate::cache::CacheConfig;
use crate::fetcher::{FetcherConfig, HostRule};
use crate::source::SourceConfig;
use crate::store::StorageConfig;
use crate::sync::SyncConfig;
use crate::target::TargetConfig;
use crate::transform::TransformConfig;

/// Root configuration. Every section has defaults, so an empty file is valid.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub target: TargetConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub transform: TransformConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Bearer token required by `POST /sync` when set.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub log_format: LogFormat,
    /// Serve the filesystem blob root under `/assets`.
    #[serde(default = "default_serve_assets")]
    pub serve_assets: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            api_key: None,
            log_format: LogFormat::default(),
            serve_assets: default_serve_assets(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
}

fn default_serve_assets() -> bool {
    true
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

const REDACTED: &str = "<redacted>";

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub source: SourceConfig,
    pub target: TargetConfig,
    pub storage: StorageConfig,
    pub fetcher: FetcherConfig,
    pub transform: TransformConfig,
    pub cache: CacheConfig,
    pub sync: SyncConfig,
    pub server: SanitizedServerConfig,
}

/// Server config with the API key hidden
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedServerConfig {
    pub host: IpAddr,
    pub port: u16,
    pub api_key_configured: bool,
    pub log_format: LogFormat,
    pub serve_assets: bool,
}

fn redact_values(values: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    values
        .keys()
        .map(|name| (name.clone(), REDACTED.to_string()))
        .collect()
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        let mut fetcher = config.fetcher.clone();
        fetcher.host_rules = config
            .fetcher
            .host_rules
            .iter()
            .map(|rule| HostRule {
                host_pattern: rule.host_pattern.clone(),
                cookies: redact_values(&rule.cookies),
                headers: redact_values(&rule.headers),
            })
            .collect();

        Self {
            source: config.source.clone(),
            target: config.target.clone(),
            storage: config.storage.clone(),
            fetcher,
            transform: config.transform.clone(),
            cache: config.cache.clone(),
            sync: config.sync.clone(),
            server: SanitizedServerConfig {
                host: config.server.host,
                port: config.server.port,
                api_key_configured: config
                    .server
                    .api_key
                    .as_deref()
                    .is_some_and(|key| !key.is_empty()),
                log_format: config.server.log_format,
                serve_assets: config.server.serve_assets,
            },
        }
    }
}

//! Configuration for the fetcher module.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Configuration for the HTTP asset fetcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// `User-Agent` sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-host request decorators.
    #[serde(default)]
    pub host_rules: Vec<HostRule>,
}

/// Cookies and headers attached to requests whose host matches `host_pattern`.
///
/// ```toml
/// [[fetcher.host_rules]]
/// host_pattern = '^(.+\.)?yts\.mx$'
/// cookies = { cf_clearance = "...", __cfduid = "..." }
/// headers = { Referer = "https://yts.mx/" }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostRule {
    /// Regular expression matched against the request host.
    pub host_pattern: String,

    /// Cookies joined into one `Cookie` header.
    #[serde(default)]
    pub cookies: BTreeMap<String, String>,

    /// Extra request headers.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

fn default_timeout() -> u64 {
    10
}

fn default_user_agent() -> String {
    format!("reelsync/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
            host_rules: Vec::new(),
        }
    }
}

impl FetcherConfig {
    /// Sets the request timeout.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Adds a host rule.
    pub fn with_host_rule(mut self, rule: HostRule) -> Self {
        self.host_rules.push(rule);
        self
    }
}

impl HostRule {
    pub fn new(host_pattern: impl Into<String>) -> Self {
        Self {
            host_pattern: host_pattern.into(),
            ..Default::default()
        }
    }

    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

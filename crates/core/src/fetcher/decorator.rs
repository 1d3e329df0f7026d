//! Per-host request decoration compiled from [`HostRule`]s.

use regex_lite::Regex;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, COOKIE};

use super::config::HostRule;
use super::error::FetchError;

struct CompiledRule {
    pattern: Regex,
    cookie: Option<String>,
    headers: Vec<(HeaderName, HeaderValue)>,
}

/// Compiled host rules.
#[derive(Default)]
pub struct HostDecorators {
    rules: Vec<CompiledRule>,
}

impl HostDecorators {
    /// Compiles every rule, failing on the first bad pattern or header.
    pub fn compile(rules: &[HostRule]) -> Result<Self, FetchError> {
        let rules = rules
            .iter()
            .map(compile_rule)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Headers to attach to a request for `host`.
    ///
    /// Cookies of all matching rules are merged into a single `Cookie` header.
    pub fn headers_for(&self, host: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let mut cookies: Vec<&str> = Vec::new();

        for rule in self.rules.iter().filter(|r| r.pattern.is_match(host)) {
            if let Some(cookie) = &rule.cookie {
                cookies.push(cookie);
            }
            for (name, value) in &rule.headers {
                headers.insert(name.clone(), value.clone());
            }
        }

        if !cookies.is_empty() {
            if let Ok(value) = HeaderValue::from_str(&cookies.join("; ")) {
                headers.insert(COOKIE, value);
            }
        }

        headers
    }
}

fn compile_rule(rule: &HostRule) -> Result<CompiledRule, FetchError> {
    let pattern = Regex::new(&rule.host_pattern).map_err(|e| {
        FetchError::Configuration(format!(
            "invalid host pattern {:?}: {}",
            rule.host_pattern, e
        ))
    })?;

    let cookie = if rule.cookies.is_empty() {
        None
    } else {
        let joined = rule
            .cookies
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("; ");
        HeaderValue::from_str(&joined).map_err(|_| {
            FetchError::Configuration(format!(
                "cookies for {:?} are not a valid header value",
                rule.host_pattern
            ))
        })?;
        Some(joined)
    };

    let headers = rule
        .headers
        .iter()
        .map(|(name, value)| {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
                FetchError::Configuration(format!("invalid header name {:?}", name))
            })?;
            let value = HeaderValue::from_str(value).map_err(|_| {
                FetchError::Configuration(format!("invalid value for header {}", name))
            })?;
            Ok((name, value))
        })
        .collect::<Result<Vec<_>, FetchError>>()?;

    Ok(CompiledRule {
        pattern,
        cookie,
        headers,
    })
}

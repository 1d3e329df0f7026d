//! Image sets and asset keys.

use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::kind::AssetKind;

/// Parses `raw` as an absolute URL with a host.
///
/// Anything else (relative paths, `mailto:`-style URIs, empty strings) is
/// treated as "no asset" by the syncer.
pub fn parse_absolute_url(raw: &str) -> Option<Url> {
    let url = Url::parse(raw).ok()?;
    if url.cannot_be_a_base() {
        return None;
    }
    match url.host_str() {
        Some(host) if !host.is_empty() => Some(url),
        _ => None,
    }
}

/// Remote image URLs of a record, one optional entry per asset kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fanart: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
}

impl ImageSet {
    /// Returns the URL stored for `kind`, if non-empty.
    pub fn get(&self, kind: AssetKind) -> Option<&str> {
        let value = match kind {
            AssetKind::Poster => &self.poster,
            AssetKind::Banner => &self.banner,
            AssetKind::Fanart => &self.fanart,
            AssetKind::Background => &self.background,
        };
        value.as_deref().filter(|url| !url.is_empty())
    }

    /// Replaces the URL stored for `kind`.
    pub fn set(&mut self, kind: AssetKind, url: impl Into<String>) {
        let slot = match kind {
            AssetKind::Poster => &mut self.poster,
            AssetKind::Banner => &mut self.banner,
            AssetKind::Fanart => &mut self.fanart,
            AssetKind::Background => &mut self.background,
        };
        *slot = Some(url.into());
    }
}

/// Object storage key of a mirrored asset: `{record_id}/{kind}/{base_name}.jpg`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetKey(String);

impl AssetKey {
    /// Derives the key for an asset of `record_id` fetched from `source_url`.
    ///
    /// The base name is the trailing path segment of the URL without query,
    /// fragment or extension. An empty segment falls back to the kind name.
    pub fn derive(record_id: &str, kind: AssetKind, source_url: &str) -> Self {
        let path = source_url
            .split(['?', '#'])
            .next()
            .unwrap_or_default();
        let segment = path.rsplit('/').next().unwrap_or_default();
        let base_name = match segment.rfind('.') {
            Some(idx) if idx > 0 => &segment[..idx],
            _ => segment,
        };
        let base_name = if base_name.is_empty() {
            kind.as_str()
        } else {
            base_name
        };

        Self(format!("{}/{}/{}.jpg", record_id, kind.as_str(), base_name))
    }

    /// Wraps an already formatted key.
    pub fn from_raw(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_absolute_url() {
        assert!(parse_absolute_url("http://x/a.jpg").is_some());
        assert!(parse_absolute_url("https://image.tmdb.org/t/p/w500/abc.jpg").is_some());
        assert!(parse_absolute_url("").is_none());
        assert!(parse_absolute_url("not-a-url").is_none());
        assert!(parse_absolute_url("/relative/path.jpg").is_none());
        assert!(parse_absolute_url("mailto:someone@example.com").is_none());
        assert!(parse_absolute_url("file:///tmp/a.jpg").is_none());
    }

    #[test]
    fn test_asset_key_strips_extension() {
        let key = AssetKey::derive("1", AssetKind::Poster, "http://x/a.jpg");
        assert_eq!(key.as_str(), "1/poster/a.jpg");
    }

    #[test]
    fn test_asset_key_ignores_query_and_fragment() {
        let key = AssetKey::derive(
            "tt0111161",
            AssetKind::Banner,
            "https://cdn.example.com/img/banner.png?w=1280#top",
        );
        assert_eq!(key.as_str(), "tt0111161/banner/banner.jpg");
    }

    #[test]
    fn test_asset_key_without_extension() {
        let key = AssetKey::derive("42", AssetKind::Fanart, "https://example.com/images/12345");
        assert_eq!(key.as_str(), "42/fanart/12345.jpg");
    }

    #[test]
    fn test_asset_key_empty_segment_falls_back_to_kind() {
        let key = AssetKey::derive("42", AssetKind::Background, "https://example.com/images/");
        assert_eq!(key.as_str(), "42/background/background.jpg");
    }

    #[test]
    fn test_asset_key_keeps_dotfile_name() {
        let key = AssetKey::derive("7", AssetKind::Poster, "https://example.com/.hidden");
        assert_eq!(key.as_str(), "7/poster/.hidden.jpg");
    }

    #[test]
    fn test_asset_key_is_deterministic() {
        let a = AssetKey::derive("9", AssetKind::Poster, "https://a.example/p/x.jpg");
        let b = AssetKey::derive("9", AssetKind::Poster, "https://b.example/q/x.jpeg");
        assert_eq!(a, b);
    }

    #[test]
    fn test_image_set_get_ignores_empty() {
        let mut images = ImageSet {
            poster: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(images.get(AssetKind::Poster), None);

        images.set(AssetKind::Poster, "http://x/a.jpg");
        assert_eq!(images.get(AssetKind::Poster), Some("http://x/a.jpg"));
        assert_eq!(images.get(AssetKind::Banner), None);
    }

    #[test]
    fn test_image_set_deserialize_partial() {
        let images: ImageSet =
            serde_json::from_str(r#"{"poster": "http://x/p.jpg", "unknown": "ignored"}"#).unwrap();
        assert_eq!(images.poster.as_deref(), Some("http://x/p.jpg"));
        assert!(images.banner.is_none());
    }
}

//! Types for the store module.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Anonymous read access level of a container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublicAccess {
    /// No anonymous access.
    #[default]
    Private,
    /// Anonymous reads of individual objects.
    Blob,
    /// Anonymous reads and listing.
    Container,
}

impl PublicAccess {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::Blob => "blob",
            Self::Container => "container",
        }
    }
}

impl fmt::Display for PublicAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PublicAccess {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "private" => Ok(Self::Private),
            "blob" => Ok(Self::Blob),
            "container" => Ok(Self::Container),
            other => Err(format!("unknown access level: {}", other)),
        }
    }
}

/// Result of storing one object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredObject {
    /// Full key inside the container.
    pub key: String,
    /// Public URL of the object.
    pub url: String,
    /// Size in bytes.
    pub size_bytes: u64,
    /// SHA-256 of the stored bytes, hex encoded.
    pub sha256: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_access_round_trip() {
        for access in [PublicAccess::Private, PublicAccess::Blob, PublicAccess::Container] {
            assert_eq!(access.as_str().parse::<PublicAccess>().unwrap(), access);
        }
        assert!("public".parse::<PublicAccess>().is_err());
    }
}

//! Catalog and asset kinds.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The catalogs that can be synchronized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogKind {
    Movies,
    Shows,
    Animes,
}

impl CatalogKind {
    /// All catalog kinds, in sync order.
    pub const ALL: [CatalogKind; 3] = [Self::Movies, Self::Shows, Self::Animes];

    /// Target collection name.
    pub fn collection(&self) -> &'static str {
        match self {
            Self::Movies => "movies",
            Self::Shows => "shows",
            Self::Animes => "animes",
        }
    }

    /// Field holding the natural key in source and target documents.
    pub fn key_field(&self) -> &'static str {
        match self {
            Self::Movies | Self::Shows => "imdb_id",
            Self::Animes => "mal_id",
        }
    }

    /// Object storage folder that scopes this catalog's assets.
    pub fn asset_folder(&self) -> &'static str {
        self.collection()
    }

    /// Asset kinds carried by records of this catalog.
    pub fn asset_kinds(&self) -> &'static [AssetKind] {
        match self {
            Self::Movies => &[AssetKind::Poster, AssetKind::Banner, AssetKind::Background],
            Self::Shows => &[AssetKind::Poster, AssetKind::Banner],
            Self::Animes => &[AssetKind::Poster, AssetKind::Banner, AssetKind::Fanart],
        }
    }
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.collection())
    }
}

impl FromStr for CatalogKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "movies" | "movie" => Ok(Self::Movies),
            "shows" | "show" => Ok(Self::Shows),
            "animes" | "anime" => Ok(Self::Animes),
            other => Err(format!("unknown catalog kind: {}", other)),
        }
    }
}

/// Semantic role of an image asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Poster,
    Banner,
    Fanart,
    Background,
}

impl AssetKind {
    /// Name used in asset keys and image field paths.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Poster => "poster",
            Self::Banner => "banner",
            Self::Fanart => "fanart",
            Self::Background => "background",
        }
    }

    /// Whether assets of this kind are normalized to a canonical size before upload.
    pub fn requires_transform(&self) -> bool {
        matches!(self, Self::Poster | Self::Banner | Self::Background)
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

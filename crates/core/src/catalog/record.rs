//! Typed catalog records.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::images::ImageSet;
use super::kind::CatalogKind;
use super::DeserializeError;

/// Audience rating block shared by all catalogs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    #[serde(default, deserialize_with = "lenient_u32")]
    pub percentage: Option<u32>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub watching: Option<u32>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub votes: Option<u32>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub loved: Option<u32>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub hated: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieRecord {
    #[serde(deserialize_with = "natural_key")]
    pub imdb_id: String,
    pub title: String,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub year: Option<u32>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub synopsis: Option<String>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub rating: Option<Rating>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub released: Option<i64>,
    #[serde(default)]
    pub trailer: Option<String>,
    #[serde(default)]
    pub certification: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    /// Torrent listing, passed through untouched.
    #[serde(default)]
    pub torrents: Option<Value>,
    #[serde(default)]
    pub images: ImageSet,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowRecord {
    #[serde(deserialize_with = "natural_key")]
    pub imdb_id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub tvdb_id: Option<String>,
    pub title: String,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub year: Option<u32>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub synopsis: Option<String>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub rating: Option<Rating>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub network: Option<String>,
    #[serde(default)]
    pub air_day: Option<String>,
    #[serde(default)]
    pub air_time: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub num_seasons: Option<u32>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub last_updated: Option<i64>,
    /// Episode listing, passed through untouched.
    #[serde(default)]
    pub episodes: Option<Value>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub images: ImageSet,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimeRecord {
    #[serde(deserialize_with = "natural_key")]
    pub mal_id: String,
    pub title: String,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub year: Option<u32>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub synopsis: Option<String>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(rename = "type", default)]
    pub anime_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub last_updated: Option<i64>,
    #[serde(rename = "__v", default, deserialize_with = "lenient_i64")]
    pub version: Option<i64>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub num_seasons: Option<u32>,
    /// Episode listing, passed through untouched.
    #[serde(default)]
    pub episodes: Option<Value>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub images: ImageSet,
    #[serde(default)]
    pub rating: Option<Rating>,
}

/// A media record deserialized from one source document.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogRecord {
    Movie(MovieRecord),
    Show(ShowRecord),
    Anime(AnimeRecord),
}

impl CatalogRecord {
    /// Deserializes `document` as a record of the given catalog.
    pub fn from_document(kind: CatalogKind, document: &Value) -> Result<Self, DeserializeError> {
        if !document.is_object() {
            return Err(DeserializeError::NotAnObject {
                found: json_type_name(document),
            });
        }

        let invalid = |source| DeserializeError::Invalid { kind, source };
        let record = match kind {
            CatalogKind::Movies => {
                Self::Movie(serde_json::from_value(document.clone()).map_err(invalid)?)
            }
            CatalogKind::Shows => {
                Self::Show(serde_json::from_value(document.clone()).map_err(invalid)?)
            }
            CatalogKind::Animes => {
                Self::Anime(serde_json::from_value(document.clone()).map_err(invalid)?)
            }
        };

        if record.natural_key().trim().is_empty() {
            return Err(DeserializeError::MissingKey {
                kind,
                field: kind.key_field(),
            });
        }

        Ok(record)
    }

    pub fn kind(&self) -> CatalogKind {
        match self {
            Self::Movie(_) => CatalogKind::Movies,
            Self::Show(_) => CatalogKind::Shows,
            Self::Anime(_) => CatalogKind::Animes,
        }
    }

    /// Value of the natural key (`imdb_id` or `mal_id`).
    pub fn natural_key(&self) -> &str {
        match self {
            Self::Movie(m) => &m.imdb_id,
            Self::Show(s) => &s.imdb_id,
            Self::Anime(a) => &a.mal_id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Movie(m) => &m.title,
            Self::Show(s) => &s.title,
            Self::Anime(a) => &a.title,
        }
    }

    pub fn images(&self) -> &ImageSet {
        match self {
            Self::Movie(m) => &m.images,
            Self::Show(s) => &s.images,
            Self::Anime(a) => &a.images,
        }
    }

    pub fn images_mut(&mut self) -> &mut ImageSet {
        match self {
            Self::Movie(m) => &mut m.images,
            Self::Show(s) => &mut s.images,
            Self::Anime(a) => &mut a.images,
        }
    }

    /// Serializes every scalar field of the record, excluding `images`.
    pub fn scalar_fields(&self) -> Result<Map<String, Value>, serde_json::Error> {
        let value = match self {
            Self::Movie(m) => serde_json::to_value(m)?,
            Self::Show(s) => serde_json::to_value(s)?,
            Self::Anime(a) => serde_json::to_value(a)?,
        };
        let mut fields = match value {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        fields.remove("images");
        Ok(fields)
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Accepts string or integer keys; integers are rendered in decimal.
fn natural_key<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) if n.is_i64() || n.is_u64() => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or integer key, found {}",
            json_type_name(&other)
        ))),
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?
        .as_ref()
        .and_then(value_to_i64))
}

fn lenient_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?
        .as_ref()
        .and_then(value_to_i64)
        .and_then(|n| u32::try_from(n).ok()))
}

// Source exports mix numbers and numeric strings for the same field.
fn value_to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

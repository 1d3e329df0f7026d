//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the collaborator traits,
//! allowing end-to-end sync tests without network or real storage.
//!
//! # Example
//!
//! ```rust,ignore
//! use reelsync_core::testing::{fixtures, MemoryBlobBackend, MockFetcher, RecordingTelemetry};
//!
//! let fetcher = MockFetcher::new();
//! fetcher.set_default_response(fixtures::jpeg_bytes(100, 150)).await;
//!
//! let backend = Arc::new(MemoryBlobBackend::new());
//! let store = ObjectStoreBuilder::new(backend.clone(), "assets").provision().await?;
//! ```

mod memory_blob;
mod mock_fetcher;
mod recording_telemetry;

pub use memory_blob::MemoryBlobBackend;
pub use mock_fetcher::MockFetcher;
pub use recording_telemetry::RecordingTelemetry;

/// Test fixtures and helper functions.
pub mod fixtures {
    use image::codecs::jpeg::JpegEncoder;
    use image::{ImageBuffer, Rgb};
    use serde_json::{json, Value};

    /// Encode a `width`x`height` JPEG with a colour gradient.
    pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = ImageBuffer::from_fn(width, height, |x, y| {
            Rgb([
                (x * 255 / width.max(1)) as u8,
                (y * 255 / height.max(1)) as u8,
                ((x ^ y) & 0xff) as u8,
            ])
        });
        let mut out = Vec::new();
        JpegEncoder::new_with_quality(&mut out, 90)
            .encode_image(&img)
            .expect("encode fixture jpeg");
        out
    }

    /// Create an anime source document.
    pub fn anime_document(mal_id: u64, title: &str, poster: &str) -> Value {
        json!({
            "_id": format!("oid-{}", mal_id),
            "mal_id": mal_id,
            "title": title,
            "year": "2001",
            "slug": title.to_lowercase().replace(' ', "-"),
            "synopsis": format!("{} synopsis.", title),
            "runtime": "24",
            "status": "Finished Airing",
            "type": "TV",
            "last_updated": 1_500_000_000_000i64,
            "__v": 0,
            "num_seasons": 1,
            "episodes": [],
            "genres": ["action"],
            "rating": { "percentage": 85, "watching": 10, "votes": 100, "loved": 90, "hated": 10 },
            "images": { "poster": poster }
        })
    }

    /// Create a movie source document.
    pub fn movie_document(imdb_id: &str, title: &str, poster: &str, background: &str) -> Value {
        json!({
            "imdb_id": imdb_id,
            "title": title,
            "year": 2010,
            "slug": title.to_lowercase().replace(' ', "-"),
            "synopsis": format!("{} synopsis.", title),
            "runtime": "120",
            "country": "us",
            "released": 1_280_000_000,
            "certification": "PG-13",
            "genres": ["drama"],
            "torrents": { "en": { "720p": { "url": "magnet:?xt=urn:btih:abc" } } },
            "images": { "poster": poster, "background": background }
        })
    }

    /// Create a show source document.
    pub fn show_document(imdb_id: &str, title: &str, banner: &str) -> Value {
        json!({
            "imdb_id": imdb_id,
            "tvdb_id": "81189",
            "title": title,
            "year": "2008",
            "network": "AMC",
            "air_day": "Sunday",
            "status": "ended",
            "num_seasons": 5,
            "episodes": [{ "season": 1, "episode": 1 }],
            "genres": ["drama"],
            "images": { "banner": banner }
        })
    }
}

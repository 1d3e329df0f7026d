//! Transform module for normalizing image assets.
//!
//! Posters become 400x600, banners and backgrounds 1280x720 (stretched,
//! aspect ratio not preserved) and are re-encoded as JPEG. Fanart passes
//! through untouched.

mod config;
mod error;
mod jpeg;
mod policy;
mod traits;

pub use config::{ResizeFilter, TransformConfig};
pub use error::TransformError;
pub use jpeg::JpegTransformer;
pub use policy::target_size;
pub use traits::ImageTransformer;

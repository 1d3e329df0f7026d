//! Error types for the transform module.

use thiserror::Error;

/// Errors that can occur while transforming an image.
///
/// All of them are recovered by uploading the original bytes.
#[derive(Debug, Error)]
pub enum TransformError {
    /// Input is not a decodable JPEG.
    #[error("Failed to decode image")]
    Decode(#[source] image::ImageError),

    /// Re-encoding failed.
    #[error("Failed to encode image")]
    Encode(#[source] image::ImageError),

    /// The codec panicked or its task was cancelled.
    #[error("Image transform aborted: {0}")]
    Panicked(String),
}

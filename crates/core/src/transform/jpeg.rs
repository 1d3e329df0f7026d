//! JPEG transformer built on the `image` crate.

use image::codecs::jpeg::JpegEncoder;
use image::ImageFormat;
use tracing::debug;

use super::config::TransformConfig;
use super::error::TransformError;
use super::policy::target_size;
use super::traits::ImageTransformer;
use crate::catalog::AssetKind;

/// Stretches images to their kind's canonical size and re-encodes them as JPEG.
#[derive(Debug, Clone, Default)]
pub struct JpegTransformer {
    config: TransformConfig,
}

impl JpegTransformer {
    pub fn new(config: TransformConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TransformConfig {
        &self.config
    }
}

impl ImageTransformer for JpegTransformer {
    fn name(&self) -> &str {
        "jpeg"
    }

    fn transform(&self, bytes: &[u8], kind: AssetKind) -> Result<Vec<u8>, TransformError> {
        let Some((width, height)) = target_size(kind) else {
            return Ok(bytes.to_vec());
        };

        let decoded = image::load_from_memory_with_format(bytes, ImageFormat::Jpeg)
            .map_err(TransformError::Decode)?;
        debug!(
            kind = %kind,
            from_width = decoded.width(),
            from_height = decoded.height(),
            width,
            height,
            "Resizing image"
        );

        let resized = decoded
            .resize_exact(width, height, self.config.filter.filter_type())
            .to_rgb8();

        let mut out = Vec::new();
        JpegEncoder::new_with_quality(&mut out, self.config.jpeg_quality)
            .encode_image(&resized)
            .map_err(TransformError::Encode)?;

        Ok(out)
    }
}

//! Configuration for the transform module.

use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

/// Resampling filter used when resizing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeFilter {
    #[default]
    Nearest,
    Triangle,
    CatmullRom,
    Lanczos3,
}

impl ResizeFilter {
    pub fn filter_type(&self) -> FilterType {
        match self {
            Self::Nearest => FilterType::Nearest,
            Self::Triangle => FilterType::Triangle,
            Self::CatmullRom => FilterType::CatmullRom,
            Self::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Configuration for the image transformer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformConfig {
    /// JPEG quality (1-100).
    #[serde(default = "default_quality")]
    pub jpeg_quality: u8,

    /// Resampling filter.
    #[serde(default)]
    pub filter: ResizeFilter,
}

fn default_quality() -> u8 {
    80
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: default_quality(),
            filter: ResizeFilter::default(),
        }
    }
}

impl TransformConfig {
    /// Sets the JPEG quality.
    pub fn with_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality;
        self
    }

    /// Sets the resampling filter.
    pub fn with_filter(mut self, filter: ResizeFilter) -> Self {
        self.filter = filter;
        self
    }
}

//! Container formats for encoded thumbnail payloads
//!
//! The container is chosen solely by whether transparency has to survive the
//! encode. PNG keeps the alpha channel, JPEG drops it.

use crate::error::{CompressionError, Result};
use image::ImageFormat;
use std::fmt;
use std::str::FromStr;

/// Supported output containers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Container {
    /// Lossy, quality-driven, no alpha
    Jpeg,
    /// Lossless, alpha-capable
    Png,
}

impl Container {
    /// Picks the container for a `preserve_alpha` flag
    pub fn for_alpha(preserve_alpha: bool) -> Self {
        if preserve_alpha {
            Container::Png
        } else {
            Container::Jpeg
        }
    }

    pub fn supports_alpha(&self) -> bool {
        matches!(self, Container::Png)
    }

    /// Whether a quality knob can shrink the output
    pub fn is_lossy(&self) -> bool {
        matches!(self, Container::Jpeg)
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Container::Jpeg => "jpg",
            Container::Png => "png",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Container::Jpeg => "image/jpeg",
            Container::Png => "image/png",
        }
    }

    /// Convert to the image crate's ImageFormat
    pub fn to_image_format(&self) -> ImageFormat {
        match self {
            Container::Jpeg => ImageFormat::Jpeg,
            Container::Png => ImageFormat::Png,
        }
    }
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Container::Jpeg => "JPEG",
            Container::Png => "PNG",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Container {
    type Err = CompressionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(Container::Jpeg),
            "png" => Ok(Container::Png),
            _ => Err(CompressionError::UnsupportedFormat(s.to_string())),
        }
    }
}

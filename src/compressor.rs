use crate::constants::{
    BYTES_PER_KB, LIBDEFLATER_HIGH_LEVEL, MAXIMUM_PNG_PRESET, MAX_QUALITY, QUALITY_STEP,
    STANDARD_PNG_PRESET, ZOPFLI_ITERATIONS,
};
use crate::error::{CompressionError, Result};
use crate::formats::Container;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::DynamicImage;
use oxipng::{Deflaters, Options};
use std::num::NonZeroU8;

/// Lossless post-pass applied to PNG output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PngOptimization {
    /// Keep the encoder's output as-is
    #[default]
    Off,
    /// oxipng with libdeflater
    Standard,
    /// oxipng with Zopfli, slow
    Maximum,
}

#[derive(Debug, Clone)]
pub struct CompressOptions {
    pub max_size_kb: u32,
    pub preserve_alpha: bool,
    pub png_optimization: PngOptimization,
}

impl CompressOptions {
    pub fn new(max_size_kb: u32, preserve_alpha: bool) -> Result<Self> {
        let options = Self {
            max_size_kb,
            preserve_alpha,
            png_optimization: PngOptimization::default(),
        };
        options.validate()?;
        Ok(options)
    }

    pub fn with_png_optimization(mut self, png_optimization: PngOptimization) -> Self {
        self.png_optimization = png_optimization;
        self
    }

    pub fn container(&self) -> Container {
        Container::for_alpha(self.preserve_alpha)
    }

    fn validate(&self) -> Result<()> {
        if self.max_size_kb == 0 {
            return Err(CompressionError::InvalidInput(
                "max_size_kb must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Outcome of an adaptive compression run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compressed {
    pub bytes: Vec<u8>,
    pub container: Container,
    /// Quality of the encode that produced `bytes`
    pub quality: u8,
    /// Number of encoder calls made
    pub attempts: u32,
}

impl Compressed {
    /// Encoded size in whole kilobytes, rounded down.
    pub fn size_kb(&self) -> usize {
        size_in_kb(self.bytes.len())
    }

    pub fn fits(&self, max_size_kb: u32) -> bool {
        self.size_kb() <= max_size_kb as usize
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Encodes a raster image into a container at a given quality.
///
/// Implementations must not keep references to `image` past the call.
pub trait Encoder {
    fn encode(&self, image: &DynamicImage, container: Container, quality: u8) -> Result<Vec<u8>>;
}

/// Encoder backed by the `image` crate codecs, with optional oxipng post-pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterEncoder {
    png_optimization: PngOptimization,
}

impl RasterEncoder {
    pub fn new(png_optimization: PngOptimization) -> Self {
        Self { png_optimization }
    }
}

impl Encoder for RasterEncoder {
    fn encode(&self, image: &DynamicImage, container: Container, quality: u8) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        match container {
            Container::Jpeg => {
                // JPEG has no alpha channel; flatten to RGB on a copy
                let rgb = image.to_rgb8();
                let encoder = JpegEncoder::new_with_quality(&mut buf, quality);
                rgb.write_with_encoder(encoder)
                    .map_err(|e| CompressionError::EncodingFailure(e.to_string()))?;
                Ok(buf)
            }
            Container::Png => {
                let rgba = image.to_rgba8();
                let encoder = PngEncoder::new(&mut buf);
                rgba.write_with_encoder(encoder)
                    .map_err(|e| CompressionError::EncodingFailure(e.to_string()))?;
                optimize_png(buf, self.png_optimization)
            }
        }
    }
}

/// Encodes `image` so that it fits in `max_size_kb` kilobytes where possible.
///
/// # Arguments
/// * `image` - Borrowed source image, left untouched
/// * `max_size_kb` - Size ceiling in kilobytes (1 KB = 1024 bytes)
/// * `preserve_alpha` - PNG when true, JPEG when false
///
/// # Returns
/// * `Ok(bytes)` - The encoded image. At the quality floor the ceiling may still be
///   exceeded; callers with a hard limit should check the length themselves.
/// * `Err(CompressionError::InvalidInput)` - Zero-sized image or `max_size_kb == 0`
/// * `Err(CompressionError::EncodingFailure)` - The codec rejected the image
///
/// # Example
/// ```
/// use image::DynamicImage;
/// use thumb_squeeze::compress;
///
/// let img = DynamicImage::new_rgb8(10, 10);
/// let bytes = compress(&img, 32, false).unwrap();
/// assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
/// ```
pub fn compress(image: &DynamicImage, max_size_kb: u32, preserve_alpha: bool) -> Result<Vec<u8>> {
    let options = CompressOptions::new(max_size_kb, preserve_alpha)?;
    compress_with_options(image, &options).map(Compressed::into_bytes)
}

pub fn compress_with_options(image: &DynamicImage, options: &CompressOptions) -> Result<Compressed> {
    let encoder = RasterEncoder::new(options.png_optimization);
    compress_with_encoder(&encoder, image, options)
}

/// Runs the quality step-down search with a caller-supplied encoder.
///
/// JPEG starts at quality 100 and drops by 10 while the output is over the
/// ceiling, stopping after the quality 10 attempt. PNG is encoded exactly once.
pub fn compress_with_encoder<E: Encoder + ?Sized>(
    encoder: &E,
    image: &DynamicImage,
    options: &CompressOptions,
) -> Result<Compressed> {
    options.validate()?;
    validate_image(image)?;

    let container = options.container();
    let mut quality = MAX_QUALITY;
    let mut bytes = encoder.encode(image, container, quality)?;
    let mut attempts = 1;

    if container.is_lossy() {
        while size_in_kb(bytes.len()) > options.max_size_kb as usize {
            if quality <= QUALITY_STEP {
                break;
            }
            quality -= QUALITY_STEP;
            bytes = encoder.encode(image, container, quality)?;
            attempts += 1;
        }
    }

    Ok(Compressed {
        bytes,
        container,
        quality,
        attempts,
    })
}

pub fn validate_image(image: &DynamicImage) -> Result<()> {
    if image.width() == 0 || image.height() == 0 {
        return Err(CompressionError::InvalidInput(format!(
            "image has zero area: {}x{}",
            image.width(),
            image.height()
        )));
    }
    Ok(())
}

pub fn size_in_kb(len: usize) -> usize {
    len / BYTES_PER_KB
}

fn optimize_png(data: Vec<u8>, level: PngOptimization) -> Result<Vec<u8>> {
    let mut options = match level {
        PngOptimization::Off => return Ok(data),
        PngOptimization::Standard => {
            let mut options = Options::from_preset(STANDARD_PNG_PRESET);
            options.deflate = Deflaters::Libdeflater {
                compression: LIBDEFLATER_HIGH_LEVEL,
            };
            options
        }
        PngOptimization::Maximum => {
            let mut options = Options::from_preset(MAXIMUM_PNG_PRESET);
            options.deflate = Deflaters::Zopfli {
                iterations: NonZeroU8::new(ZOPFLI_ITERATIONS).unwrap_or(NonZeroU8::MIN),
            };
            options
        }
    };

    // Keep the RGBA channel model; only recompress the image data
    options.bit_depth_reduction = false;
    options.color_type_reduction = false;
    options.palette_reduction = false;
    options.grayscale_reduction = false;
    options.optimize_alpha = false;

    let optimized = oxipng::optimize_from_memory(&data, &options)
        .map_err(|e| CompressionError::PngOptimization(e.to_string()))?;

    if optimized.len() < data.len() {
        Ok(optimized)
    } else {
        Ok(data)
    }
}

use crate::compressor::{
    compress_with_options, validate_image, CompressOptions, Encoder, RasterEncoder,
};
use crate::constants::{MAX_QUALITY, MINI_PROGRAM_THUMB_MAX_KB};
use crate::error::{CompressionError, Result};
use crate::formats::Container;
use image::imageops::FilterType;
use image::DynamicImage;

/// Scales `image` to exactly `width` x `height` with bilinear filtering.
///
/// Returns a new image; the source is not modified.
pub fn scale_thumbnail(image: &DynamicImage, width: u32, height: u32) -> Result<DynamicImage> {
    validate_image(image)?;
    if width == 0 || height == 0 {
        return Err(CompressionError::InvalidInput(format!(
            "thumbnail size must be non-zero: {}x{}",
            width, height
        )));
    }
    if (width, height) == (image.width(), image.height()) {
        return Ok(image.clone());
    }
    Ok(image.resize_exact(width, height, FilterType::Triangle))
}

/// Crops the top-left square whose side is the shorter image edge.
pub fn crop_square(image: &DynamicImage) -> Result<DynamicImage> {
    validate_image(image)?;
    let side = image.width().min(image.height());
    Ok(image.crop_imm(0, 0, side, side))
}

/// Thumbnail attached to image, music, video and web page shares.
///
/// The image is scaled to the requested size and encoded losslessly as PNG so
/// transparency survives. No size ceiling applies; the output size is set by
/// the thumbnail dimensions.
pub fn share_thumbnail(image: &DynamicImage, width: u32, height: u32) -> Result<Vec<u8>> {
    let thumb = scale_thumbnail(image, width, height)?;
    RasterEncoder::default().encode(&thumb, Container::Png, MAX_QUALITY)
}

/// Thumbnail attached to mini-program shares: square crop, then JPEG under `max_size_kb`.
pub fn mini_program_thumbnail(image: &DynamicImage, max_size_kb: u32) -> Result<Vec<u8>> {
    let square = crop_square(image)?;
    let options = CompressOptions::new(max_size_kb, false)?;
    Ok(compress_with_options(&square, &options)?.into_bytes())
}

pub fn default_mini_program_thumbnail(image: &DynamicImage) -> Result<Vec<u8>> {
    mini_program_thumbnail(image, MINI_PROGRAM_THUMB_MAX_KB)
}

use crate::constants::MINI_PROGRAM_THUMB_MAX_KB;
use crate::error::Result;
use crate::formats::Container;
use crate::processing::load_image_with_metadata;
use crate::utils::format_file_size;
use image::{ColorType, DynamicImage, GenericImageView};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq)]
pub struct ImageSummary {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub color: ColorType,
    pub file_size: u64,
    pub has_alpha: bool,
    /// Container a thumbnail of this image would use
    pub recommended: Container,
    pub estimated_memory_mib: f64,
}

pub fn get_image_info(input_path: &Path) -> Result<ImageSummary> {
    let (img, file_size) = load_image_with_metadata(input_path)?;
    Ok(summarize(input_path, &img, file_size))
}

pub fn summarize(path: &Path, img: &DynamicImage, file_size: u64) -> ImageSummary {
    let (width, height) = img.dimensions();
    let has_alpha = img.color().has_alpha();
    ImageSummary {
        path: path.to_path_buf(),
        width,
        height,
        color: img.color(),
        file_size,
        has_alpha,
        recommended: Container::for_alpha(has_alpha),
        estimated_memory_mib: estimate_memory_usage(img),
    }
}

pub fn print_image_info(summary: &ImageSummary) {
    crate::info!("📋 Basic Information:");
    crate::info!("  📁 File: {:?}", summary.path);
    crate::info!(
        "  📏 Dimensions: {}x{} pixels",
        summary.width,
        summary.height
    );
    crate::info!(
        "  📦 File size: {} bytes ({})",
        summary.file_size,
        format_file_size(summary.file_size)
    );
    crate::info!("  🎨 Color type: {:?}", summary.color);
    crate::info!("  🫥 Alpha channel: {}", if summary.has_alpha { "yes" } else { "no" });
    crate::info!(
        "  💾 Estimated memory usage: {:.2} MiB",
        summary.estimated_memory_mib
    );

    crate::info!("\n💡 Thumbnail Suggestions:");
    match summary.recommended {
        Container::Png => {
            crate::info!("  🎭 Has transparency: PNG thumbnail, size is not reduced by quality");
        }
        Container::Jpeg => {
            crate::info!("  🎭 Opaque: JPEG thumbnail, quality steps down to fit the ceiling");
        }
    }
    crate::info!(
        "  🎯 Share thumbnail: lossless PNG, mini-program ceiling: {} KB",
        MINI_PROGRAM_THUMB_MAX_KB
    );
    if summary.width != summary.height {
        let side = summary.width.min(summary.height);
        crate::info!("  📐 Mini-program thumbnail crops to {}x{}", side, side);
    }
}

fn estimate_memory_usage(img: &DynamicImage) -> f64 {
    let (width, height) = img.dimensions();
    let bytes_per_pixel = img.color().bytes_per_pixel() as u64;
    (width as u64 * height as u64 * bytes_per_pixel) as f64 / (1024.0 * 1024.0)
}

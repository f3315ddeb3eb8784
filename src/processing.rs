use crate::compressor::{compress_with_options, size_in_kb, CompressOptions, Compressed};
use crate::constants::{MAX_FILE_SIZE, MAX_IMAGE_DIMENSION};
use crate::error::{CompressionError, Result};
use crate::formats::Container;
use crate::thumbnail::{mini_program_thumbnail, share_thumbnail};
use crate::utils::{
    create_progress_spinner, format_file_size, print_compression_result, run_with_spinner,
};
use image::{DynamicImage, GenericImageView, ImageReader};
use std::fs;
use std::path::{Path, PathBuf};

/// Sizes and settings of one file written by the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub output: PathBuf,
    pub original_size: u64,
    pub compressed_size: u64,
    pub container: Container,
    pub quality: u8,
    pub attempts: u32,
}

/// Validates that a file exists at the given path.
///
/// # Example
/// ```
/// use std::path::Path;
/// use thumb_squeeze::validate_file_exists;
///
/// let result = validate_file_exists(Path::new("nonexistent.jpg"));
/// assert!(result.is_err());
/// ```
pub fn validate_file_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(CompressionError::FileNotFound(path.to_path_buf()));
    }
    Ok(())
}

/// Loads an image file and returns it along with its size on disk.
///
/// # Returns
/// * `Ok((image, file_size))` - The decoded image and its file size in bytes
/// * `Err(CompressionError)` - If the file is missing, too large, undecodable,
///   or wider/taller than `MAX_IMAGE_DIMENSION`
pub fn load_image_with_metadata(input_path: &Path) -> Result<(DynamicImage, u64)> {
    validate_file_exists(input_path)?;

    let canonical_path = input_path
        .canonicalize()
        .map_err(|_| CompressionError::FileNotFound(input_path.to_path_buf()))?;

    // Check size before decoding anything
    let file_size = fs::metadata(&canonical_path)?.len();
    if file_size > MAX_FILE_SIZE {
        return Err(CompressionError::FileTooLarge(file_size, MAX_FILE_SIZE));
    }

    let img = ImageReader::open(&canonical_path)?
        .with_guessed_format()?
        .decode()?;

    let (width, height) = img.dimensions();
    if width > MAX_IMAGE_DIMENSION || height > MAX_IMAGE_DIMENSION {
        return Err(CompressionError::InvalidDimensions(
            width,
            height,
            MAX_IMAGE_DIMENSION,
        ));
    }

    Ok((img, file_size))
}

/// Gives `output` the container's extension when it has none.
pub fn resolve_output_path(output: &Path, container: Container) -> PathBuf {
    match output.extension().and_then(|ext| ext.to_str()) {
        None => output.with_extension(container.extension()),
        Some(ext) => {
            if ext.parse::<Container>().ok() != Some(container) {
                crate::warn!(
                    "Output {:?} does not look like {}; writing {} data anyway",
                    output,
                    container,
                    container
                );
            }
            output.to_path_buf()
        }
    }
}

pub fn write_output(output: &Path, bytes: &[u8]) -> Result<u64> {
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|_| CompressionError::DirectoryCreationFailed(parent.to_path_buf()))?;
    }
    fs::write(output, bytes)?;
    Ok(bytes.len() as u64)
}

/// load -> adaptive compress -> write
pub fn compress_file(
    input_path: &Path,
    output_path: &Path,
    options: &CompressOptions,
) -> Result<FileReport> {
    let (img, original_size) = load_image_with_metadata(input_path)?;
    let compressed = compress_with_options(&img, options)?;
    let output = resolve_output_path(output_path, compressed.container);
    let compressed_size = write_output(&output, &compressed.bytes)?;

    let Compressed {
        container,
        quality,
        attempts,
        ..
    } = compressed;

    Ok(FileReport {
        output,
        original_size,
        compressed_size,
        container,
        quality,
        attempts,
    })
}

pub fn compress_image(input: &Path, output: &Path, options: &CompressOptions) -> Result<()> {
    crate::info!("🗜️  Compressing image: {:?}", input);
    crate::info!("📁 Output: {:?}", output);

    let pb = create_progress_spinner("Encoding...");
    let report = run_with_spinner(&pb, || compress_file(input, output, options))?;

    crate::info!(
        "📊 Original size: {} ({})",
        report.original_size,
        format_file_size(report.original_size)
    );
    crate::verbose!(
        "{} at quality {} after {} encode(s)",
        report.container,
        report.quality,
        report.attempts
    );
    print_compression_result(report.original_size, report.compressed_size);

    if report.container.is_lossy()
        && size_in_kb(report.compressed_size as usize) > options.max_size_kb as usize
    {
        crate::warn!(
            "Could not reach {} KB; kept the quality {} encoding",
            options.max_size_kb,
            report.quality
        );
    }

    Ok(())
}

pub fn thumbnail_file(input: &Path, output: &Path, width: u32, height: u32) -> Result<u64> {
    let (img, _) = load_image_with_metadata(input)?;
    let bytes = share_thumbnail(&img, width, height)?;
    let output = resolve_output_path(output, Container::Png);
    let size = write_output(&output, &bytes)?;
    crate::success!(
        "Thumbnail {}x{} written to {:?} ({})",
        width,
        height,
        output,
        format_file_size(size)
    );
    Ok(size)
}

pub fn mini_program_thumbnail_file(input: &Path, output: &Path, max_size_kb: u32) -> Result<u64> {
    let (img, _) = load_image_with_metadata(input)?;
    let bytes = mini_program_thumbnail(&img, max_size_kb)?;
    let output = resolve_output_path(output, Container::Jpeg);
    let size = write_output(&output, &bytes)?;
    crate::success!(
        "Mini-program thumbnail written to {:?} ({})",
        output,
        format_file_size(size)
    );
    Ok(size)
}

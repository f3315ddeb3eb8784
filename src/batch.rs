use crate::compressor::CompressOptions;
use crate::error::{CompressionError, Result};
use crate::formats::Container;
use crate::processing::compress_file;
use crate::utils::{calculate_compression_ratio, create_progress_bar, format_file_size, is_image_file};
use glob::glob;
use rayon::prelude::*;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use walkdir::WalkDir;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSummary {
    pub processed: usize,
    pub failed: usize,
    /// Outputs that are still over the ceiling after the quality floor
    pub over_ceiling: usize,
    pub total_before: u64,
    pub total_after: u64,
    pub elapsed: Duration,
}

impl BatchSummary {
    pub fn compression_ratio(&self) -> f64 {
        calculate_compression_ratio(self.total_before, self.total_after)
    }
}

/// Compresses every image found under `input` into `output`, in parallel.
///
/// Each file is independent: one failure is reported and counted, the rest
/// of the batch carries on.
pub fn batch_compress_images(
    input: &str,
    output: &Path,
    options: &CompressOptions,
    recursive: bool,
) -> Result<BatchSummary> {
    crate::info!("🚀 Starting batch compression...");
    crate::info!("📁 Input: {}", input);
    crate::info!("📁 Output: {:?}", output);

    let start_time = Instant::now();

    let image_files = collect_image_files(input, recursive)?;
    if image_files.is_empty() {
        crate::warn!("No image files found in the input path");
        return Ok(BatchSummary::default());
    }

    crate::info!(
        "📊 Found {} image files, ceiling {} KB, container {}",
        image_files.len(),
        options.max_size_kb,
        options.container()
    );

    fs::create_dir_all(output)
        .map_err(|_| CompressionError::DirectoryCreationFailed(output.to_path_buf()))?;

    let output_paths = plan_output_paths(&image_files, output, options.container());
    let progress = create_progress_bar(image_files.len() as u64);
    let processed = AtomicUsize::new(0);
    let failed = AtomicUsize::new(0);
    let over_ceiling = AtomicUsize::new(0);
    let total_before = AtomicU64::new(0);
    let total_after = AtomicU64::new(0);

    image_files
        .par_iter()
        .zip(output_paths.par_iter())
        .for_each(|(input_path, planned)| {
            let output_path = match planned {
                Ok(path) => path,
                Err(e) => {
                    crate::error!("Failed to process {:?}: {}", input_path, e);
                    failed.fetch_add(1, Ordering::Relaxed);
                    progress.inc(1);
                    return;
                }
            };

            match compress_file(input_path, output_path, options) {
                Ok(report) => {
                    total_before.fetch_add(report.original_size, Ordering::Relaxed);
                    total_after.fetch_add(report.compressed_size, Ordering::Relaxed);
                    processed.fetch_add(1, Ordering::Relaxed);
                    if report.container.is_lossy()
                        && report.compressed_size / 1024 > options.max_size_kb as u64
                    {
                        over_ceiling.fetch_add(1, Ordering::Relaxed);
                    }
                    crate::verbose!(
                        "{:?} -> {:?} at quality {}",
                        input_path,
                        report.output,
                        report.quality
                    );
                }
                Err(e) => {
                    crate::error!("Failed to process {:?}: {}", input_path, e);
                    failed.fetch_add(1, Ordering::Relaxed);
                }
            }
            progress.inc(1);
        });

    progress.finish_with_message("done");

    let summary = BatchSummary {
        processed: processed.into_inner(),
        failed: failed.into_inner(),
        over_ceiling: over_ceiling.into_inner(),
        total_before: total_before.into_inner(),
        total_after: total_after.into_inner(),
        elapsed: start_time.elapsed(),
    };
    print_summary(&summary);

    Ok(summary)
}

fn print_summary(summary: &BatchSummary) {
    crate::info!("\n📊 Batch Compression Summary:");
    crate::info!("  📁 Total files processed: {}", summary.processed);
    crate::info!(
        "  📊 Total original size: {}",
        format_file_size(summary.total_before)
    );
    crate::info!(
        "  📊 Total compressed size: {}",
        format_file_size(summary.total_after)
    );
    crate::info!(
        "  🎯 Overall compression ratio: {:.1}%",
        summary.compression_ratio()
    );
    crate::info!("  ⏱️  Total time: {:?}", summary.elapsed);

    if summary.over_ceiling > 0 {
        crate::warn!(
            "{} file(s) stayed over the ceiling at the lowest quality",
            summary.over_ceiling
        );
    }
    if summary.failed > 0 {
        crate::warn!("Failed files: {}", summary.failed);
    }
}

/// Resolves `input` as a file, a directory, or a glob pattern.
pub fn collect_image_files(input: &str, recursive: bool) -> Result<Vec<PathBuf>> {
    let mut image_files = Vec::new();
    let input_path = Path::new(input);

    if input_path.is_file() {
        let canonical = input_path
            .canonicalize()
            .map_err(|_| CompressionError::NoImageFilesFound(input.to_string()))?;
        image_files.push(canonical);
    } else if input_path.is_dir() {
        let walker = if recursive {
            WalkDir::new(input_path)
        } else {
            WalkDir::new(input_path).max_depth(1)
        };

        for entry in walker
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'))
        {
            let entry = entry?;
            let path = entry.path();
            if path.is_file() && is_image_file(path) {
                if let Ok(canonical_path) = path.canonicalize() {
                    image_files.push(canonical_path);
                }
            }
        }
    } else if let Ok(pattern) = glob(input) {
        for entry in pattern.flatten() {
            if entry.is_file() && is_image_file(&entry) {
                if let Ok(canonical_path) = entry.canonicalize() {
                    image_files.push(canonical_path);
                }
            }
        }
    } else {
        return Err(CompressionError::NoImageFilesFound(input.to_string()));
    }

    image_files.sort();
    Ok(image_files)
}

pub fn generate_output_path(
    input_path: &Path,
    output_dir: &Path,
    container: Container,
) -> Result<PathBuf> {
    let file_stem = input_path
        .file_stem()
        .ok_or_else(|| CompressionError::UnsupportedFormat("Invalid file name".to_string()))?;

    let output_filename = format!("{}.{}", file_stem.to_string_lossy(), container.extension());
    Ok(output_dir.join(output_filename))
}

/// Assigns every input a distinct output path in `output_dir`.
///
/// The first input for a stem keeps `<stem>.<ext>`. Later inputs with the same
/// stem get their source extension appended (`photo-png.jpg`), then a counter.
/// `inputs` should be sorted so the naming is stable between runs.
pub fn plan_output_paths(
    inputs: &[PathBuf],
    output_dir: &Path,
    container: Container,
) -> Vec<Result<PathBuf>> {
    let mut taken = HashSet::new();

    inputs
        .iter()
        .map(|input| -> Result<PathBuf> {
            let mut path = generate_output_path(input, output_dir, container)?;
            if taken.contains(&path) {
                path = disambiguate(input, output_dir, container, &taken);
                crate::verbose!(
                    "{:?} shares its name with another input, using {:?}",
                    input,
                    path
                );
            }
            taken.insert(path.clone());
            Ok(path)
        })
        .collect()
}

fn disambiguate(
    input: &Path,
    output_dir: &Path,
    container: Container,
    taken: &HashSet<PathBuf>,
) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let source_ext = input
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let base = format!("{}-{}", stem, source_ext);

    let mut candidate = output_dir.join(format!("{}.{}", base, container.extension()));
    let mut counter = 2;
    while taken.contains(&candidate) {
        candidate = output_dir.join(format!("{}-{}.{}", base, counter, container.extension()));
        counter += 1;
    }
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::DynamicImage;
    use std::fs::File;
    use tempfile::TempDir;

    #[test]
    fn test_generate_output_path() {
        let output_dir = Path::new("/tmp/output");

        let result = generate_output_path(Path::new("test.png"), output_dir, Container::Jpeg);
        assert_eq!(result.unwrap(), PathBuf::from("/tmp/output/test.jpg"));

        let result = generate_output_path(Path::new("a/b/photo.jpeg"), output_dir, Container::Png);
        assert_eq!(result.unwrap(), PathBuf::from("/tmp/output/photo.png"));
    }

    #[test]
    fn test_plan_output_paths_keeps_colliding_stems_apart() {
        let output_dir = Path::new("/tmp/output");
        let inputs = vec![
            PathBuf::from("/in/a/photo.jpg"),
            PathBuf::from("/in/b/photo.jpg"),
            PathBuf::from("/in/photo.jpg"),
            PathBuf::from("/in/photo.png"),
            PathBuf::from("/in/other.webp"),
        ];

        let planned: Vec<PathBuf> = plan_output_paths(&inputs, output_dir, Container::Jpeg)
            .into_iter()
            .map(|p| p.unwrap())
            .collect();

        assert_eq!(
            planned,
            vec![
                PathBuf::from("/tmp/output/photo.jpg"),
                PathBuf::from("/tmp/output/photo-jpg.jpg"),
                PathBuf::from("/tmp/output/photo-jpg-2.jpg"),
                PathBuf::from("/tmp/output/photo-png.jpg"),
                PathBuf::from("/tmp/output/other.jpg"),
            ]
        );
    }

    #[test]
    fn test_generate_output_path_without_stem() {
        let result = generate_output_path(Path::new("/"), Path::new("/tmp"), Container::Png);
        assert!(matches!(result, Err(CompressionError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_collect_image_files_single_file() {
        let temp_dir = TempDir::new().unwrap();
        let test_file = temp_dir.path().join("test.jpg");
        File::create(&test_file).unwrap();

        let files = collect_image_files(&test_file.to_string_lossy(), false).unwrap();
        assert_eq!(files, vec![test_file.canonicalize().unwrap()]);
    }

    #[test]
    fn test_collect_image_files_directory() {
        let temp_dir = TempDir::new().unwrap();
        let subdir = temp_dir.path().join("subdir");
        fs::create_dir(&subdir).unwrap();

        File::create(temp_dir.path().join("test1.jpg")).unwrap();
        File::create(temp_dir.path().join("not_image.txt")).unwrap();
        File::create(temp_dir.path().join(".hidden.png")).unwrap();
        File::create(subdir.join("test2.png")).unwrap();

        let flat = collect_image_files(&temp_dir.path().to_string_lossy(), false).unwrap();
        assert_eq!(flat.len(), 1);

        let deep = collect_image_files(&temp_dir.path().to_string_lossy(), true).unwrap();
        assert_eq!(deep.len(), 2);
    }

    #[test]
    fn test_collect_image_files_glob_pattern() {
        let temp_dir = TempDir::new().unwrap();
        File::create(temp_dir.path().join("test1.jpg")).unwrap();
        File::create(temp_dir.path().join("test2.png")).unwrap();
        File::create(temp_dir.path().join("other.txt")).unwrap();

        let pattern = format!("{}/*.jpg", temp_dir.path().to_string_lossy());
        let files = collect_image_files(&pattern, false).unwrap();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_batch_counts_failures_separately() {
        let temp_dir = TempDir::new().unwrap();
        let input_dir = temp_dir.path().join("in");
        fs::create_dir(&input_dir).unwrap();
        DynamicImage::new_rgb8(40, 30).save(input_dir.join("a.png")).unwrap();
        DynamicImage::new_rgb8(30, 40).save(input_dir.join("b.png")).unwrap();
        fs::write(input_dir.join("broken.jpg"), b"not really a jpeg").unwrap();

        let output_dir = temp_dir.path().join("out");
        let options = CompressOptions::new(8, false).unwrap();
        let summary =
            batch_compress_images(&input_dir.to_string_lossy(), &output_dir, &options, false)
                .unwrap();

        assert_eq!(summary.processed, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.over_ceiling, 0);
        assert!(output_dir.join("a.jpg").exists());
        assert!(output_dir.join("b.jpg").exists());
    }

    #[test]
    fn test_batch_same_stem_writes_every_output() {
        let temp_dir = TempDir::new().unwrap();
        let input_dir = temp_dir.path().join("in");
        fs::create_dir(&input_dir).unwrap();
        DynamicImage::new_rgb8(40, 30).save(input_dir.join("photo.png")).unwrap();
        DynamicImage::new_rgb8(30, 40).save(input_dir.join("photo.jpg")).unwrap();

        let output_dir = temp_dir.path().join("out");
        let options = CompressOptions::new(8, false).unwrap();
        let summary =
            batch_compress_images(&input_dir.to_string_lossy(), &output_dir, &options, false)
                .unwrap();

        assert_eq!(summary.processed, 2);
        let mut outputs: Vec<String> = fs::read_dir(&output_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        outputs.sort();
        assert_eq!(outputs, vec!["photo-png.jpg", "photo.jpg"]);
        assert_eq!(image::open(output_dir.join("photo.jpg")).unwrap().width(), 30);
        assert_eq!(image::open(output_dir.join("photo-png.jpg")).unwrap().width(), 40);
    }

    #[test]
    fn test_batch_with_no_images() {
        let temp_dir = TempDir::new().unwrap();
        let options = CompressOptions::new(8, false).unwrap();
        let summary = batch_compress_images(
            &temp_dir.path().to_string_lossy(),
            &temp_dir.path().join("out"),
            &options,
            false,
        )
        .unwrap();
        assert_eq!(summary, BatchSummary::default());
    }
}

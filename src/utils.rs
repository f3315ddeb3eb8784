//! Helpers shared by the file pipeline, batch mode and the CLI

use crate::constants::{PROGRESS_BAR_TEMPLATE, PROGRESS_SPINNER_TEMPLATE, SUPPORTED_IMAGE_EXTENSIONS};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::path::Path;

/// Check if a file path has a decodable image extension
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext_lower = ext.to_lowercase();
            SUPPORTED_IMAGE_EXTENSIONS.contains(&ext_lower.as_str())
        })
        .unwrap_or(false)
}

/// Spinner with the crate's styling; hidden in quiet mode.
pub fn create_progress_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template(PROGRESS_SPINNER_TEMPLATE) {
        pb.set_style(style);
    }
    if crate::logger::is_quiet() {
        pb.set_draw_target(ProgressDrawTarget::hidden());
    }
    pb.set_message(message.to_string());
    pb
}

/// Runs `task` while `pb` spins, then clears it whether the task failed or not.
pub fn run_with_spinner<T>(pb: &ProgressBar, task: impl FnOnce() -> T) -> T {
    let result = task();
    pb.finish_and_clear();
    result
}

pub fn create_progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::default_bar().template(PROGRESS_BAR_TEMPLATE) {
        pb.set_style(style.progress_chars("#>-"));
    }
    if crate::logger::is_quiet() {
        pb.set_draw_target(ProgressDrawTarget::hidden());
    }
    pb
}

/// Format file size in human-readable format (e.g. "1.2 MB", "512 B")
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    const THRESHOLD: f64 = 1024.0;

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= THRESHOLD && unit_index < UNITS.len() - 1 {
        size /= THRESHOLD;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

/// Positive means the output is smaller than the input.
pub fn calculate_compression_ratio(original_size: u64, compressed_size: u64) -> f64 {
    if original_size == 0 {
        return 0.0;
    }
    ((original_size as f64 - compressed_size as f64) / original_size as f64) * 100.0
}

pub fn print_compression_result(original_size: u64, compressed_size: u64) {
    let ratio = calculate_compression_ratio(original_size, compressed_size);

    crate::info!(
        "📈 Compressed size: {} ({})",
        compressed_size,
        format_file_size(compressed_size)
    );
    crate::info!("🎯 Compression ratio: {:.1}%", ratio);

    if ratio > 0.0 {
        crate::success!("Reduced size by {:.1}%", ratio);
    } else {
        crate::warn!("Size increased by {:.1}%", ratio.abs());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_image_file() {
        assert!(is_image_file(Path::new("test.jpg")));
        assert!(is_image_file(Path::new("test.JPEG")));
        assert!(is_image_file(Path::new("test.png")));
        assert!(is_image_file(Path::new("test.webp")));
        assert!(is_image_file(Path::new("test.gif")));

        assert!(!is_image_file(Path::new("test.txt")));
        assert!(!is_image_file(Path::new("test")));
        assert!(!is_image_file(Path::new("test.heic")));
    }

    #[test]
    fn test_spinner_is_cleared_on_failure() {
        let pb = ProgressBar::hidden();
        let result: Result<(), String> = run_with_spinner(&pb, || Err("boom".to_string()));

        assert_eq!(result, Err("boom".to_string()));
        assert!(pb.is_finished());
    }

    #[test]
    fn test_spinner_is_cleared_on_success() {
        let pb = ProgressBar::hidden();
        assert_eq!(run_with_spinner(&pb, || 7), 7);
        assert!(pb.is_finished());
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(512), "512 B");
        assert_eq!(format_file_size(1024), "1.0 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(1024 * 1024), "1.0 MB");
    }

    #[test]
    fn test_calculate_compression_ratio() {
        assert_eq!(calculate_compression_ratio(1000, 800), 20.0);
        assert_eq!(calculate_compression_ratio(1000, 1200), -20.0);
        assert_eq!(calculate_compression_ratio(0, 500), 0.0);
    }
}

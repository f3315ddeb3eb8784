use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompressionError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Encoding failure: {0}")]
    EncodingFailure(String),

    #[error("PNG optimization error: {0}")]
    PngOptimization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    ImageProcessing(#[from] image::ImageError),

    #[error("Invalid image dimensions: {0}x{1}. Maximum allowed: {2}x{2}")]
    InvalidDimensions(u32, u32, u32),

    #[error("File too large: {0} bytes. Maximum allowed: {1} bytes")]
    FileTooLarge(u64, u64),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to create output directory: {0}")]
    DirectoryCreationFailed(PathBuf),

    #[error("No image files found in input path: {0}")]
    NoImageFilesFound(String),

    #[error("Walkdir error: {0}")]
    WalkdirError(#[from] walkdir::Error),

    #[error("App registration failed for app id: {0}")]
    NotRegistered(String),

    #[error("Request rejected by transport: {0}")]
    SendRejected(String),

    #[error("Transaction already pending: {0}")]
    DuplicateTransaction(String),
}

pub type Result<T> = std::result::Result<T, CompressionError>;

/// Quality of the first encode attempt.
pub const MAX_QUALITY: u8 = 100;
/// Amount the quality drops after each oversized encode.
pub const QUALITY_STEP: u8 = 10;
/// Lowest quality that is still encoded; the next step would reach zero.
pub const MIN_QUALITY: u8 = QUALITY_STEP;
/// Upper bound on encode calls for one compression.
pub const MAX_ENCODE_ATTEMPTS: u32 = (MAX_QUALITY / QUALITY_STEP) as u32;

pub const BYTES_PER_KB: usize = 1024;

// Thumbnail payload defaults
pub const THUMB_SIZE: u32 = 150;
pub const MINI_PROGRAM_THUMB_MAX_KB: u32 = 128;
pub const IMAGE_DATA_MAX_KB: u32 = 10 * 1024;

// Input limits for files read from disk
pub const MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;
pub const MAX_IMAGE_DIMENSION: u32 = 16_384;

// oxipng tuning
pub const STANDARD_PNG_PRESET: u8 = 2;
pub const MAXIMUM_PNG_PRESET: u8 = 4;
pub const LIBDEFLATER_HIGH_LEVEL: u8 = 12;
pub const ZOPFLI_ITERATIONS: u8 = 15;

// Auth request defaults
pub const AUTH_SCOPE: &str = "snsapi_userinfo";
pub const AUTH_STATE: &str = "thumb_squeeze_login";

pub const PROGRESS_SPINNER_TEMPLATE: &str = "{spinner:.green} {msg}";
pub const PROGRESS_BAR_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}";

pub const SUPPORTED_IMAGE_EXTENSIONS: &[&str] =
    &["jpg", "jpeg", "png", "webp", "bmp", "tiff", "gif"];

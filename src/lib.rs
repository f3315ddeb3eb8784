pub mod logger;

pub mod batch;
pub mod cli;
pub mod compressor;
pub mod constants;
pub mod dispatch;
pub mod error;
pub mod formats;
pub mod info;
pub mod processing;
pub mod share;
pub mod thumbnail;
pub mod utils;

pub use batch::{
    batch_compress_images, collect_image_files, generate_output_path, plan_output_paths,
    BatchSummary,
};
pub use compressor::{
    compress, compress_with_encoder, compress_with_options, CompressOptions, Compressed, Encoder,
    PngOptimization, RasterEncoder,
};
pub use dispatch::{Dispatcher, Response, ResponseCode, Transport};
pub use error::{CompressionError, Result};
pub use formats::Container;
pub use info::{get_image_info, print_image_info, ImageSummary};
pub use processing::{
    compress_file, compress_image, load_image_with_metadata, mini_program_thumbnail_file,
    thumbnail_file, validate_file_exists, FileReport,
};
pub use share::{
    auth_login, payment, share_image, share_mini_program, share_music, share_text, share_video,
    share_web_page, Link, MediaMessage, MediaObject, MiniProgram, MiniProgramType, PaymentParams,
    Request, Scene, ShareRequest, ThumbSize,
};
pub use thumbnail::{crop_square, mini_program_thumbnail, scale_thumbnail, share_thumbnail};

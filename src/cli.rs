use crate::compressor::PngOptimization;
use crate::constants::{MINI_PROGRAM_THUMB_MAX_KB, THUMB_SIZE};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "thumb-squeeze",
    about = "Fit images under a byte budget for share thumbnails and payloads",
    long_about = "thumb-squeeze encodes images as JPEG or PNG and steps JPEG quality down \
                  until the output fits a kilobyte ceiling. It also produces the scaled share \
                  thumbnails and square mini-program thumbnails used by messaging share requests.",
    version,
    after_help = "EXAMPLES:\n  \
    thumb-squeeze compress photo.jpg out.jpg -m 50\n  \
    thumb-squeeze compress logo.png out.png -m 32 --alpha --png-level standard\n  \
    thumb-squeeze thumb cover.jpg thumb.png -w 150 -H 150\n  \
    thumb-squeeze mini-thumb cover.jpg card.jpg -m 128\n  \
    thumb-squeeze batch \"./images/*.jpg\" ./out -m 64 -r\n  \
    thumb-squeeze info photo.png"
)]
pub struct Args {
    #[arg(short = 'q', long, global = true, help = "Only print errors")]
    pub quiet: bool,

    #[arg(short = 'v', long, global = true, help = "Print per-encode details")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PngLevel {
    Off,
    Standard,
    Maximum,
}

impl From<PngLevel> for PngOptimization {
    fn from(level: PngLevel) -> Self {
        match level {
            PngLevel::Off => PngOptimization::Off,
            PngLevel::Standard => PngOptimization::Standard,
            PngLevel::Maximum => PngOptimization::Maximum,
        }
    }
}

/// Settings shared by `compress` and `batch`
#[derive(ClapArgs, Debug, Clone)]
pub struct EncodeArgs {
    #[arg(
        short = 'm',
        long,
        help = "Size ceiling in kilobytes (1 KB = 1024 bytes)",
        long_help = "Target ceiling in kilobytes. JPEG quality starts at 100 and drops by 10 \
                     until the output fits, stopping at quality 10. PNG output is not reduced."
    )]
    pub max_kb: u32,

    #[arg(
        short = 'a',
        long,
        help = "Preserve transparency (PNG output)",
        long_help = "Encode as lossless PNG with an alpha channel instead of JPEG. \
                     The size ceiling is best-effort only in this mode."
    )]
    pub alpha: bool,

    #[arg(
        long,
        value_enum,
        default_value_t = PngLevel::Off,
        help = "Lossless oxipng pass for PNG output"
    )]
    pub png_level: PngLevel,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Compress a single image under a size ceiling")]
    Compress {
        #[arg(help = "Input image file path")]
        input: PathBuf,

        #[arg(help = "Output file path; the container extension is added if missing")]
        output: PathBuf,

        #[command(flatten)]
        encode: EncodeArgs,
    },

    #[command(about = "Write a scaled PNG share thumbnail")]
    Thumb {
        #[arg(help = "Input image file path")]
        input: PathBuf,

        #[arg(help = "Output thumbnail path")]
        output: PathBuf,

        #[arg(short = 'w', long, default_value_t = THUMB_SIZE, help = "Thumbnail width")]
        width: u32,

        #[arg(short = 'H', long, default_value_t = THUMB_SIZE, help = "Thumbnail height")]
        height: u32,
    },

    #[command(about = "Write a square JPEG mini-program thumbnail")]
    MiniThumb {
        #[arg(help = "Input image file path")]
        input: PathBuf,

        #[arg(help = "Output thumbnail path")]
        output: PathBuf,

        #[arg(
            short = 'm',
            long,
            default_value_t = MINI_PROGRAM_THUMB_MAX_KB,
            help = "Size ceiling in kilobytes"
        )]
        max_kb: u32,
    },

    #[command(
        about = "Compress multiple images in parallel",
        long_about = "Process every image under a directory, a single file, or a glob pattern. \
                      Outputs are named after the input stem with the container's extension."
    )]
    Batch {
        #[arg(help = "Input directory, file, or glob pattern")]
        input: String,

        #[arg(help = "Output directory path")]
        output: PathBuf,

        #[command(flatten)]
        encode: EncodeArgs,

        #[arg(short = 'j', long, help = "Number of parallel threads (default: auto)")]
        threads: Option<usize>,

        #[arg(short = 'r', long, help = "Process subdirectories recursively")]
        recursive: bool,
    },

    #[command(about = "Display image properties and thumbnail suggestions")]
    Info {
        #[arg(help = "Image file path to analyze")]
        input: PathBuf,
    },
}

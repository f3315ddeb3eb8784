use anyhow::Context;
use clap::Parser;
use rayon::ThreadPoolBuilder;
use thumb_squeeze::cli::{Args, Commands, EncodeArgs};
use thumb_squeeze::{
    batch_compress_images, compress_image, get_image_info, logger, mini_program_thumbnail_file,
    print_image_info, thumbnail_file, CompressOptions,
};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init(args.quiet, args.verbose);

    match args.command {
        Commands::Compress {
            input,
            output,
            encode,
        } => {
            let options = build_options(&encode)?;
            compress_image(&input, &output, &options)
                .with_context(|| format!("failed to compress {:?}", input))?;
        }
        Commands::Thumb {
            input,
            output,
            width,
            height,
        } => {
            thumbnail_file(&input, &output, width, height)
                .with_context(|| format!("failed to build thumbnail for {:?}", input))?;
        }
        Commands::MiniThumb {
            input,
            output,
            max_kb,
        } => {
            mini_program_thumbnail_file(&input, &output, max_kb)
                .with_context(|| format!("failed to build mini-program thumbnail for {:?}", input))?;
        }
        Commands::Batch {
            input,
            output,
            encode,
            threads,
            recursive,
        } => {
            setup_thread_pool(threads);
            let options = build_options(&encode)?;
            let summary = batch_compress_images(&input, &output, &options, recursive)?;
            if summary.failed > 0 {
                thumb_squeeze::warn!("{} file(s) could not be compressed", summary.failed);
            }
        }
        Commands::Info { input } => {
            thumb_squeeze::info!("📋 Getting info for: {:?}", input);
            let summary = get_image_info(&input)?;
            print_image_info(&summary);
        }
    }

    Ok(())
}

fn build_options(encode: &EncodeArgs) -> anyhow::Result<CompressOptions> {
    let options = CompressOptions::new(encode.max_kb, encode.alpha)?
        .with_png_optimization(encode.png_level.into());
    Ok(options)
}

fn setup_thread_pool(threads: Option<usize>) {
    if let Some(num_threads) = threads {
        if let Err(e) = ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
        {
            thumb_squeeze::warn!("Failed to set thread pool size: {}", e);
        }
    }
}

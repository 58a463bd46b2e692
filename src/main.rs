use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use aov_denoise::image_pipeline::{
    read_file, DenoiseConfig, DenoisePipeline, FilterKind, TiffCompression,
};
use aov_denoise::logger;

use tracing::{info, warn};

/// Denoise packed render buffers and export gamma-encoded previews
#[derive(Parser)]
#[command(name = "aov-denoise")]
#[command(author, version, about)]
struct Cli {
    /// Packed plane buffer written by the renderer
    input: PathBuf,

    /// Filter: raw, box, color_bilinear or depth_bilinear
    #[arg(short, long, default_value = "depth_bilinear")]
    filter: FilterKind,

    /// Channel indices to decode instead of the filter's own (e.g. `-c 4 5 6` for normals)
    #[arg(short, long, num_args = 1..)]
    channels: Option<Vec<usize>>,

    /// Output TIFF preview
    #[arg(short, long, default_value = "output.tiff")]
    output: PathBuf,

    /// Converged reference buffer to score input and output against
    #[arg(short, long)]
    reference: Option<PathBuf>,

    /// Bilateral kernel radius in taps
    #[arg(long, default_value_t = 16)]
    radius: usize,

    /// Pixel spacing between taps
    #[arg(long, default_value_t = 2)]
    spacing: usize,

    /// Width and height of each plane group
    #[arg(long, default_value_t = 512)]
    resolution: usize,

    /// TIFF compression: none, lzw or deflate
    #[arg(long, default_value = "none")]
    compression: TiffCompression,

    /// Filter on a single thread
    #[arg(long)]
    serial: bool,

    /// Log per-step timings
    #[arg(long)]
    timings: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init(cli.verbose)?;

    info!("Starting aov-denoise...");

    let config = DenoiseConfig::builder()
        .filter(cli.filter)
        .channels(cli.channels)
        .tap_radius(cli.radius)
        .tap_spacing(cli.spacing)
        .resolution(cli.resolution)
        .compression(cli.compression)
        .parallel(!cli.serial)
        .build();
    let pipeline = DenoisePipeline::new(config).context("invalid options")?;

    info!("Filter: {}", pipeline.config().filter);
    info!("Channels: {:?}", pipeline.config().channels());
    if pipeline.config().filter != FilterKind::Raw {
        info!("Kernel taps: {}", pipeline.taps().len());
    }

    match &cli.reference {
        None => {
            let timings = pipeline
                .convert_file_with_timings(&cli.input, &cli.output)
                .with_context(|| format!("denoising {}", cli.input.display()))?;
            if cli.timings {
                timings.log_summary();
            }
        }
        Some(reference_path) => {
            let input = read_file(&cli.input)?;
            let reference = read_file(reference_path)?;

            let filtered = pipeline
                .process(&input)
                .with_context(|| format!("denoising {}", cli.input.display()))?;
            let mut output = std::fs::File::create(&cli.output)
                .with_context(|| format!("creating {}", cli.output.display()))?;
            pipeline.write_preview(&filtered, &mut output)?;

            let score = pipeline
                .score_against_reference(&input, &reference, &filtered)
                .with_context(|| format!("comparing against {}", reference_path.display()))?;
            info!("MSE input:  {:.6}", score.input_mse);
            info!("MSE output: {:.6}", score.output_mse);
            if !score.improved() {
                warn!("Filtering did not reduce error against the reference");
            }
        }
    }

    info!("Wrote {}", cli.output.display());
    Ok(())
}

//! One-shot batch mode: detect pedestrians with depth in a single image
//! and write the fused records to a JSON file.

use std::fs::File;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pedfuse_vision::FusionPipeline;
use pedfuse_worker::WorkerConfig;

#[derive(Debug, Parser)]
#[command(name = "detect-image", about = "Detect pedestrians with depth in a single image")]
struct Args {
    /// Input image path (PNG, JPEG, ...)
    #[arg(long)]
    input: PathBuf,

    /// Output JSON path
    #[arg(long)]
    output: PathBuf,

    /// Override the detection model path
    #[arg(long)]
    detector_model: Option<String>,

    /// Override the depth model path
    #[arg(long)]
    depth_model: Option<String>,

    /// Override the minimum detection score
    #[arg(long)]
    score_threshold: Option<f32>,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,ort=warn")),
        )
        .init();

    let args = Args::parse();

    let mut config = WorkerConfig::from_env().pipeline_config();
    if let Some(model) = args.detector_model {
        config.detector_model = model;
    }
    if let Some(model) = args.depth_model {
        config.depth_model = model;
    }
    if let Some(threshold) = args.score_threshold {
        config.score_threshold = threshold;
    }

    let bytes = std::fs::read(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;

    let pipeline = FusionPipeline::load(&config)?;
    let result = pipeline.process(&bytes, None)?;

    let file = File::create(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;
    serde_json::to_writer_pretty(file, &result)?;

    info!(
        input = %args.input.display(),
        output = %args.output.display(),
        pedestrians = result.count(),
        "Wrote fusion result"
    );

    Ok(())
}

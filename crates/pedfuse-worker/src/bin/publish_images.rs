//! Publish a folder of PNG frames onto the image stream in natural order.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pedfuse_queue::{ImageMessage, ImageQueue};
use pedfuse_worker::natsort;

#[derive(Debug, Parser)]
#[command(name = "publish-images", about = "Publish a folder of PNG frames onto the image stream")]
struct Args {
    /// Folder containing .png frames
    #[arg(long)]
    folder: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install rustls crypto provider (required for TLS Redis URLs)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let queue = ImageQueue::from_env()?;

    let mut names = Vec::new();
    for entry in std::fs::read_dir(&args.folder)
        .with_context(|| format!("Failed to read folder {}", args.folder.display()))?
    {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.to_ascii_lowercase().ends_with(".png") {
            names.push(name);
        }
    }

    // Frame order matters downstream: img_2 before img_10.
    names.sort_by(|a, b| natsort::natural_cmp(a, b));

    for name in &names {
        let path = args.folder.join(name);
        let bytes = tokio::fs::read(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let message = ImageMessage::new(bytes).with_file_name(name.clone());
        let message_id = queue.publish_image(&message).await?;
        info!("Published {} as message {}", name, message_id);
    }

    info!("Published {} images from {}", names.len(), args.folder.display());
    Ok(())
}

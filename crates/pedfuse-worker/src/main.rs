//! Streaming pedestrian fusion worker binary.

use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pedfuse_queue::ImageQueue;
use pedfuse_vision::FusionPipeline;
use pedfuse_worker::{StreamRunner, WorkerConfig};

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for TLS Redis URLs)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("pedfuse=info".parse().unwrap())
        .add_directive("ort=warn".parse().unwrap())
        .add_directive("onnxruntime=warn".parse().unwrap());

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    info!("Starting pedfuse-worker");

    // Load configuration
    let config = WorkerConfig::from_env();
    info!("Worker config: {:?}", config);

    // Create queue client
    let queue = match ImageQueue::from_env() {
        Ok(q) => q,
        Err(e) => {
            error!("Failed to create image queue: {}", e);
            std::process::exit(1);
        }
    };

    // Load models once, up front
    let pipeline = match FusionPipeline::load(&config.pipeline_config()) {
        Ok(p) => p,
        Err(e) => {
            error!("Failed to load models: {}", e);
            std::process::exit(1);
        }
    };

    let runner = Arc::new(StreamRunner::new(config, queue, pipeline));

    // Setup signal handlers
    let shutdown_runner = Arc::clone(&runner);
    let shutdown_handle = tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received shutdown signal");
        shutdown_runner.shutdown();
    });

    // Run the consume loop
    if let Err(e) = runner.run().await {
        error!("Runner error: {}", e);
        std::process::exit(1);
    }

    shutdown_handle.abort();

    info!("Worker shutdown complete");
}

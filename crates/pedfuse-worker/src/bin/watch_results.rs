//! Tail the result stream and print each fusion result JSON to stdout.

use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use pedfuse_queue::ImageQueue;

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

    let queue = ImageQueue::from_env()?;
    queue.init_results().await?;

    let consumer = format!("watcher-{}", Uuid::new_v4());
    info!("Watching result stream as '{}'", consumer);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal");
                break;
            }
            result = queue.consume_results(&consumer, 5000, 10) => {
                for (message_id, payload) in result? {
                    println!("{}", payload);
                    queue.ack_result(&message_id).await?;
                }
            }
        }
    }

    Ok(())
}

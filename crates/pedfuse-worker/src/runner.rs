//! Streaming worker loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{error, info, warn};
use uuid::Uuid;

use pedfuse_models::FusionResult;
use pedfuse_queue::{ImageMessage, ImageQueue};
use pedfuse_vision::{DepthBackend, DetectionBackend, FusionPipeline};

use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};

/// Serial worker that consumes images from the stream and publishes
/// fusion results.
///
/// Images are processed strictly one at a time; the expensive model state
/// lives in the pipeline and is reused across every message. The runner is
/// generic over the pipeline's backends: the worker binary wires the ONNX
/// pair, tests plug in stubs.
pub struct StreamRunner<D, E> {
    config: WorkerConfig,
    queue: Arc<ImageQueue>,
    pipeline: Arc<FusionPipeline<D, E>>,
    shutdown: watch::Sender<bool>,
    consumer_name: String,
}

impl<D, E> StreamRunner<D, E>
where
    D: DetectionBackend + 'static,
    E: DepthBackend + 'static,
{
    /// Create a new stream runner.
    pub fn new(config: WorkerConfig, queue: ImageQueue, pipeline: FusionPipeline<D, E>) -> Self {
        let consumer_name = derive_consumer_name(&config);
        let (shutdown, _) = watch::channel(false);

        Self {
            config,
            queue: Arc::new(queue),
            pipeline: Arc::new(pipeline),
            shutdown,
            consumer_name,
        }
    }

    /// This runner's consumer name within the group.
    pub fn consumer_name(&self) -> &str {
        &self.consumer_name
    }

    /// Signal the runner to stop after the in-flight message.
    pub fn shutdown(&self) {
        self.shutdown.send(true).ok();
    }

    /// Run the consume loop until shutdown.
    pub async fn run(&self) -> WorkerResult<()> {
        info!("Starting stream runner '{}'", self.consumer_name);

        // Initialize queue
        self.queue.init().await?;

        let mut shutdown_rx = self.shutdown.subscribe();

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        info!("Shutdown signal received, stopping runner");
                        break;
                    }
                }
                result = self.queue.consume(&self.consumer_name, self.config.block_ms, 1) => {
                    match result {
                        Ok(messages) => {
                            for (message_id, message) in messages {
                                self.handle_message(message_id, message).await;
                            }
                        }
                        Err(e) => {
                            error!("Error consuming images: {}", e);
                            // Back off on error
                            tokio::time::sleep(Duration::from_secs(5)).await;
                        }
                    }
                }
            }
        }

        info!("Stream runner stopped");
        Ok(())
    }

    /// Process one message end to end, then acknowledge it.
    ///
    /// The acknowledgement happens on every path: success, processing
    /// failure and publish failure alike, so a poisoned message can never
    /// wedge the stream.
    async fn handle_message(&self, message_id: String, message: ImageMessage) {
        let file_name = message.display_name().to_string();
        info!(
            message_id = %message_id,
            file_name = %file_name,
            bytes = message.data.len(),
            "Processing image message"
        );

        match self.process_message(&file_name, message.data).await {
            Ok(result) => match self.queue.publish_result(&result).await {
                Ok(result_id) => info!(
                    message_id = %message_id,
                    result_id = %result_id,
                    pedestrians = result.count(),
                    "Published fusion result"
                ),
                Err(e) => error!(message_id = %message_id, "Failed to publish result: {}", e),
            },
            Err(e) => {
                warn!(
                    message_id = %message_id,
                    file_name = %file_name,
                    "Skipping image: {}", e
                );
            }
        }

        if let Err(e) = self.queue.ack(&message_id).await {
            error!(message_id = %message_id, "Failed to ack message: {}", e);
        }
    }

    /// Run the pipeline on a blocking thread.
    async fn process_message(&self, file_name: &str, data: Vec<u8>) -> WorkerResult<FusionResult> {
        let pipeline = Arc::clone(&self.pipeline);
        let name = file_name.to_string();

        let result = tokio::task::spawn_blocking(move || pipeline.process(&data, Some(&name)))
            .await
            .map_err(|e| WorkerError::task_failed(format!("Blocking task join error: {}", e)))?;

        Ok(result?)
    }
}

/// Consumer name from config, or a generated unique one.
fn derive_consumer_name(config: &WorkerConfig) -> String {
    config
        .consumer_name
        .clone()
        .unwrap_or_else(|| format!("worker-{}", Uuid::new_v4()))
}

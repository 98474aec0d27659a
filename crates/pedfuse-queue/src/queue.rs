//! Image and result transport over Redis Streams.

use std::collections::HashMap;

use redis::AsyncCommands;
use tracing::{debug, info, warn};

use pedfuse_models::FusionResult;

use crate::error::{QueueError, QueueResult};
use crate::message::{ImageMessage, DATA_FIELD, FILENAME_FIELD};

/// Stream field holding the serialized fusion result JSON.
pub const RESULT_FIELD: &str = "payload";

/// Queue configuration.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Redis URL
    pub redis_url: String,
    /// Stream name for inbound images
    pub image_stream: String,
    /// Consumer group for workers on the image stream
    pub consumer_group: String,
    /// Stream name for outbound fusion results
    pub result_stream: String,
    /// Consumer group for downstream readers of the result stream
    pub result_group: String,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://localhost:6379".to_string(),
            image_stream: "pedfuse:images".to_string(),
            consumer_group: "pedfuse:workers".to_string(),
            result_stream: "pedfuse:results".to_string(),
            result_group: "pedfuse:watchers".to_string(),
        }
    }
}

impl QueueConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            redis_url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            image_stream: std::env::var("PEDFUSE_IMAGE_STREAM")
                .unwrap_or_else(|_| "pedfuse:images".to_string()),
            consumer_group: std::env::var("PEDFUSE_CONSUMER_GROUP")
                .unwrap_or_else(|_| "pedfuse:workers".to_string()),
            result_stream: std::env::var("PEDFUSE_RESULT_STREAM")
                .unwrap_or_else(|_| "pedfuse:results".to_string()),
            result_group: std::env::var("PEDFUSE_RESULT_GROUP")
                .unwrap_or_else(|_| "pedfuse:watchers".to_string()),
        }
    }
}

/// Image queue client.
///
/// Workers consume from the image stream through a consumer group and
/// publish fusion results to the result stream. Every consumed entry is
/// acknowledged exactly once by the caller, whether processing succeeds
/// or not; this queue deliberately has no retry or dead-letter machinery.
pub struct ImageQueue {
    client: redis::Client,
    config: QueueConfig,
}

impl ImageQueue {
    /// Create a new image queue.
    pub fn new(config: QueueConfig) -> QueueResult<Self> {
        let client = redis::Client::open(config.redis_url.as_str())?;
        Ok(Self { client, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> QueueResult<Self> {
        Self::new(QueueConfig::from_env())
    }

    /// Queue configuration.
    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    /// Initialize the worker side (create the image consumer group if not
    /// exists).
    pub async fn init(&self) -> QueueResult<()> {
        self.create_group(&self.config.image_stream, &self.config.consumer_group)
            .await
    }

    /// Initialize the downstream side (create the result consumer group
    /// if not exists).
    pub async fn init_results(&self) -> QueueResult<()> {
        self.create_group(&self.config.result_stream, &self.config.result_group)
            .await
    }

    async fn create_group(&self, stream: &str, group: &str) -> QueueResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        // Create consumer group (ignore error if already exists)
        let result: Result<(), redis::RedisError> = redis::cmd("XGROUP")
            .arg("CREATE")
            .arg(stream)
            .arg(group)
            .arg("$")
            .arg("MKSTREAM")
            .query_async(&mut conn)
            .await;

        match result {
            Ok(_) => info!("Created consumer group: {}", group),
            Err(e) if e.to_string().contains("BUSYGROUP") => {
                debug!("Consumer group already exists: {}", group);
            }
            Err(e) => return Err(QueueError::Redis(e)),
        }

        Ok(())
    }

    /// Publish an image onto the image stream.
    pub async fn publish_image(&self, message: &ImageMessage) -> QueueResult<String> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let mut cmd = redis::cmd("XADD");
        cmd.arg(&self.config.image_stream)
            .arg("*")
            .arg(DATA_FIELD)
            .arg(message.data.as_slice());
        if let Some(name) = &message.file_name {
            cmd.arg(FILENAME_FIELD).arg(name);
        }

        let message_id: String = cmd.query_async(&mut conn).await?;

        info!(
            "Published image {} as message {}",
            message.display_name(),
            message_id
        );

        Ok(message_id)
    }

    /// Consume images from the stream.
    /// Returns (message_id, message) pairs in stream order.
    ///
    /// Entries without an image payload are acknowledged and skipped so
    /// they cannot wedge the group.
    pub async fn consume(
        &self,
        consumer_name: &str,
        block_ms: u64,
        count: usize,
    ) -> QueueResult<Vec<(String, ImageMessage)>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        // Read from consumer group
        let result: redis::streams::StreamReadReply = redis::cmd("XREADGROUP")
            .arg("GROUP")
            .arg(&self.config.consumer_group)
            .arg(consumer_name)
            .arg("COUNT")
            .arg(count)
            .arg("BLOCK")
            .arg(block_ms)
            .arg("STREAMS")
            .arg(&self.config.image_stream)
            .arg(">") // Only new messages
            .query_async(&mut conn)
            .await?;

        let mut messages = Vec::new();

        for stream_key in result.keys {
            for entry in stream_key.ids {
                let message_id = entry.id.clone();

                match parse_image_fields(&entry.map) {
                    Some(message) => {
                        debug!(
                            "Consumed image {} from message {}",
                            message.display_name(),
                            message_id
                        );
                        messages.push((message_id, message));
                    }
                    None => {
                        warn!("Discarding stream entry {} without image payload", message_id);
                        self.ack(&message_id).await.ok();
                    }
                }
            }
        }

        Ok(messages)
    }

    /// Acknowledge an image message (mark as processed).
    pub async fn ack(&self, message_id: &str) -> QueueResult<()> {
        self.ack_on(
            &self.config.image_stream,
            &self.config.consumer_group,
            message_id,
        )
        .await
    }

    /// Publish a fusion result onto the result stream as JSON.
    pub async fn publish_result(&self, result: &FusionResult) -> QueueResult<String> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let payload = serde_json::to_string(result)?;

        let message_id: String = redis::cmd("XADD")
            .arg(&self.config.result_stream)
            .arg("*")
            .arg(RESULT_FIELD)
            .arg(&payload)
            .query_async(&mut conn)
            .await?;

        debug!(
            "Published result for {} as message {}",
            result.file_name.as_deref().unwrap_or("<unnamed>"),
            message_id
        );

        Ok(message_id)
    }

    /// Consume fusion result payloads from the result stream.
    /// Returns (message_id, json) pairs in stream order.
    pub async fn consume_results(
        &self,
        consumer_name: &str,
        block_ms: u64,
        count: usize,
    ) -> QueueResult<Vec<(String, String)>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let result: redis::streams::StreamReadReply = redis::cmd("XREADGROUP")
            .arg("GROUP")
            .arg(&self.config.result_group)
            .arg(consumer_name)
            .arg("COUNT")
            .arg(count)
            .arg("BLOCK")
            .arg(block_ms)
            .arg("STREAMS")
            .arg(&self.config.result_stream)
            .arg(">")
            .query_async(&mut conn)
            .await?;

        let mut payloads = Vec::new();

        for stream_key in result.keys {
            for entry in stream_key.ids {
                let message_id = entry.id.clone();

                if let Some(redis::Value::BulkString(payload)) = entry.map.get(RESULT_FIELD) {
                    payloads.push((message_id, String::from_utf8_lossy(payload).into_owned()));
                } else {
                    warn!("Discarding result entry {} without payload", message_id);
                    self.ack_result(&message_id).await.ok();
                }
            }
        }

        Ok(payloads)
    }

    /// Acknowledge a result message.
    pub async fn ack_result(&self, message_id: &str) -> QueueResult<()> {
        self.ack_on(
            &self.config.result_stream,
            &self.config.result_group,
            message_id,
        )
        .await
    }

    async fn ack_on(&self, stream: &str, group: &str, message_id: &str) -> QueueResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        redis::cmd("XACK")
            .arg(stream)
            .arg(group)
            .arg(message_id)
            .query_async::<()>(&mut conn)
            .await?;

        // Delete the message from the stream
        redis::cmd("XDEL")
            .arg(stream)
            .arg(message_id)
            .query_async::<()>(&mut conn)
            .await?;

        debug!("Acknowledged message: {}", message_id);
        Ok(())
    }

    /// Number of entries currently on the image stream.
    pub async fn len(&self) -> QueueResult<u64> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let len: u64 = conn.xlen(&self.config.image_stream).await?;
        Ok(len)
    }

    /// Number of entries currently on the result stream.
    pub async fn results_len(&self) -> QueueResult<u64> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let len: u64 = conn.xlen(&self.config.result_stream).await?;
        Ok(len)
    }
}

/// Decode an image message from raw stream entry fields.
///
/// Returns `None` when the mandatory data field is missing or not a byte
/// string; a missing file name is fine.
fn parse_image_fields(map: &HashMap<String, redis::Value>) -> Option<ImageMessage> {
    let data = match map.get(DATA_FIELD) {
        Some(redis::Value::BulkString(bytes)) => bytes.clone(),
        _ => return None,
    };

    let file_name = match map.get(FILENAME_FIELD) {
        Some(redis::Value::BulkString(bytes)) => Some(String::from_utf8_lossy(bytes).into_owned()),
        _ => None,
    };

    Some(ImageMessage { data, file_name })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(fields: &[(&str, &[u8])]) -> HashMap<String, redis::Value> {
        fields
            .iter()
            .map(|(k, v)| (k.to_string(), redis::Value::BulkString(v.to_vec())))
            .collect()
    }

    #[test]
    fn test_parse_image_fields_full_entry() {
        let map = entry(&[(DATA_FIELD, b"\x89PNG..."), (FILENAME_FIELD, b"img_2.png")]);
        let msg = parse_image_fields(&map).unwrap();
        assert_eq!(msg.data, b"\x89PNG...");
        assert_eq!(msg.file_name.as_deref(), Some("img_2.png"));
    }

    #[test]
    fn test_parse_image_fields_without_name() {
        let map = entry(&[(DATA_FIELD, b"bytes")]);
        let msg = parse_image_fields(&map).unwrap();
        assert_eq!(msg.file_name, None);
        assert_eq!(msg.display_name(), "unknown_file");
    }

    #[test]
    fn test_parse_image_fields_missing_data() {
        let map = entry(&[(FILENAME_FIELD, b"orphan.png")]);
        assert!(parse_image_fields(&map).is_none());

        assert!(parse_image_fields(&HashMap::new()).is_none());
    }

    #[test]
    fn test_parse_image_fields_wrong_type() {
        let mut map = HashMap::new();
        map.insert(DATA_FIELD.to_string(), redis::Value::Int(7));
        assert!(parse_image_fields(&map).is_none());
    }

    #[test]
    fn test_config_defaults() {
        let config = QueueConfig::default();
        assert_eq!(config.image_stream, "pedfuse:images");
        assert_eq!(config.consumer_group, "pedfuse:workers");
        assert_eq!(config.result_stream, "pedfuse:results");
        assert_eq!(config.result_group, "pedfuse:watchers");
    }
}

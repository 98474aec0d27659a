//! Worker configuration.

use pedfuse_vision::PipelineConfig;

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Path to the detection ONNX model
    pub detector_model: String,
    /// Path to the depth ONNX model
    pub depth_model: String,
    /// Minimum detection score to keep
    pub score_threshold: f32,
    /// Class label treated as "person"
    pub person_label: i64,
    /// Square input size of the depth model
    pub depth_input_size: u32,
    /// Fixed consumer name; a unique one is generated when unset
    pub consumer_name: Option<String>,
    /// How long one consume call blocks waiting for images, in ms
    pub block_ms: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            detector_model: "models/fasterrcnn_resnet50.onnx".to_string(),
            depth_model: "models/midas_small.onnx".to_string(),
            score_threshold: 0.5,
            person_label: 1,
            depth_input_size: 256,
            consumer_name: None,
            block_ms: 1000,
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            detector_model: std::env::var("PEDFUSE_DETECTOR_MODEL")
                .unwrap_or_else(|_| "models/fasterrcnn_resnet50.onnx".to_string()),
            depth_model: std::env::var("PEDFUSE_DEPTH_MODEL")
                .unwrap_or_else(|_| "models/midas_small.onnx".to_string()),
            score_threshold: std::env::var("PEDFUSE_SCORE_THRESHOLD")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(0.5),
            person_label: std::env::var("PEDFUSE_PERSON_LABEL")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1),
            depth_input_size: std::env::var("PEDFUSE_DEPTH_INPUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(256),
            consumer_name: std::env::var("PEDFUSE_CONSUMER").ok(),
            block_ms: std::env::var("PEDFUSE_BLOCK_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1000),
        }
    }

    /// Pipeline configuration derived from this worker config.
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            detector_model: self.detector_model.clone(),
            depth_model: self.depth_model.clone(),
            score_threshold: self.score_threshold,
            person_label: self.person_label,
            depth_input_size: self.depth_input_size,
        }
    }
}

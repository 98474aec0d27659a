//! The end-to-end detection-depth fusion pipeline.

use tracing::{debug, info};

use pedfuse_models::FusionResult;

use crate::backend::onnx::{OnnxDepth, OnnxDetection};
use crate::backend::{DepthBackend, DetectionBackend};
use crate::decode::decode_image;
use crate::detector::{PersonDetector, DEFAULT_PERSON_LABEL};
use crate::error::VisionResult;
use crate::estimator::DepthEstimator;
use crate::fusion::fuse;

/// Configuration for building a fusion pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Path to the detection ONNX model.
    pub detector_model: String,
    /// Path to the depth ONNX model.
    pub depth_model: String,
    /// Minimum score for a detection to be kept.
    pub score_threshold: f32,
    /// Class label treated as "person".
    pub person_label: i64,
    /// Square input size of the depth model.
    pub depth_input_size: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            detector_model: "models/fasterrcnn_resnet50.onnx".to_string(),
            depth_model: "models/midas_small.onnx".to_string(),
            score_threshold: 0.5,
            person_label: DEFAULT_PERSON_LABEL,
            depth_input_size: 256,
        }
    }
}

impl PipelineConfig {
    /// Set the score threshold.
    pub fn with_score_threshold(mut self, threshold: f32) -> Self {
        self.score_threshold = threshold;
        self
    }

    /// Set the model paths.
    pub fn with_models(mut self, detector: impl Into<String>, depth: impl Into<String>) -> Self {
        self.detector_model = detector.into();
        self.depth_model = depth.into();
        self
    }
}

/// Fusion pipeline wired to the production ONNX backends.
pub type OnnxPipeline = FusionPipeline<OnnxDetection, OnnxDepth>;

/// Decodes an image, runs detection and depth estimation, and fuses the
/// two into per-pedestrian records.
///
/// Loading the models is expensive; a pipeline is built once and reused
/// across images. `process` takes `&self`, so a pipeline shared behind an
/// `Arc` can serve callers without re-initialization.
pub struct FusionPipeline<D, E> {
    detector: PersonDetector<D>,
    estimator: DepthEstimator<E>,
    score_threshold: f32,
}

impl FusionPipeline<OnnxDetection, OnnxDepth> {
    /// Load both ONNX models and assemble the pipeline.
    pub fn load(config: &PipelineConfig) -> VisionResult<Self> {
        let detection = OnnxDetection::load(&config.detector_model)?;
        let depth = OnnxDepth::load(&config.depth_model, config.depth_input_size)?;

        info!(
            detector_model = %config.detector_model,
            depth_model = %config.depth_model,
            score_threshold = config.score_threshold,
            "Fusion pipeline models loaded"
        );

        Ok(Self::from_parts(detection, depth, config))
    }
}

impl<D: DetectionBackend, E: DepthBackend> FusionPipeline<D, E> {
    /// Assemble a pipeline from already-constructed backends.
    pub fn from_parts(detection: D, depth: E, config: &PipelineConfig) -> Self {
        Self {
            detector: PersonDetector::new(detection).with_person_label(config.person_label),
            estimator: DepthEstimator::new(depth),
            score_threshold: config.score_threshold,
        }
    }

    /// Configured score threshold.
    pub fn score_threshold(&self) -> f32 {
        self.score_threshold
    }

    /// Process one encoded image into a fusion result.
    ///
    /// `file_name` is carried through to the result untouched; `None`
    /// leaves the field out of the serialized output.
    pub fn process(&self, bytes: &[u8], file_name: Option<&str>) -> VisionResult<FusionResult> {
        let image = decode_image(bytes)?;
        let (width, height) = image.dimensions();
        debug!(width, height, "Decoded image");

        let detections = self.detector.detect(&image, self.score_threshold)?;
        info!(detections = detections.len(), "Person detection completed");

        let depth = self.estimator.estimate(&image)?;
        let pedestrians = fuse(&detections, &depth, width, height);
        info!(pedestrians = pedestrians.len(), "Fused detection and depth");

        Ok(FusionResult::new(file_name.map(str::to_string), pedestrians))
    }
}

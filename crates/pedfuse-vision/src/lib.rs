//! Image decoding, model inference and detection-depth fusion.
//!
//! This crate hosts the compute core of the pipeline:
//! - Decoding encoded image bytes into RGB buffers
//! - Detection and depth backends behind capability traits, with ONNX
//!   Runtime implementations
//! - Bicubic resampling of depth rasters to image resolution
//! - Fusion of person detections with depth into per-pedestrian records
//!
//! Everything here is synchronous and CPU/GPU bound; callers that live in
//! an async runtime run [`pipeline::FusionPipeline::process`] on a
//! blocking thread.

pub mod backend;
pub mod decode;
pub mod depth;
pub mod detector;
pub mod error;
pub mod estimator;
pub mod fusion;
pub mod pipeline;
pub mod resample;
pub mod tensor;

// Re-export common types
pub use backend::onnx::{OnnxDepth, OnnxDetection};
pub use backend::{DepthBackend, DetectionBackend};
pub use decode::decode_image;
pub use depth::DepthMap;
pub use detector::{PersonDetector, DEFAULT_PERSON_LABEL};
pub use error::{VisionError, VisionResult};
pub use estimator::DepthEstimator;
pub use fusion::fuse;
pub use pipeline::{FusionPipeline, OnnxPipeline, PipelineConfig};

//! ONNX Runtime model backends.
//!
//! Provides the production [`DetectionBackend`] and [`DepthBackend`]
//! implementations with GPU acceleration support:
//! - CUDA on Linux with NVIDIA GPU (when `cuda` feature enabled)
//! - CoreML on macOS
//! - CPU fallback on all platforms

use std::path::Path;
use std::sync::Mutex;

use image::RgbImage;
use ndarray::{Array2, Array3, Array4};
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::{Tensor, Value};
use tracing::{debug, info};

use pedfuse_models::{Detection, RawBox};

use crate::backend::{DepthBackend, DetectionBackend};
use crate::error::{VisionError, VisionResult};
use crate::{resample, tensor};

/// Output tensor names used by torchvision-style detection exports.
const BOXES_OUTPUT: &str = "boxes";
const LABELS_OUTPUT: &str = "labels";
const SCORES_OUTPUT: &str = "scores";

/// Per-channel normalization applied by MiDaS-style depth models.
const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Object detection backend for torchvision-style ONNX exports
/// (Faster R-CNN and friends).
///
/// The model is expected to take a `[3, H, W]` float image scaled to
/// `[0, 1]` and produce `boxes` `[N, 4]`, `labels` `[N]` and `scores`
/// `[N]` tensors.
pub struct OnnxDetection {
    session: Mutex<Session>,
}

impl OnnxDetection {
    /// Load the detection model from an ONNX file.
    ///
    /// Returns an error if the model file doesn't exist or cannot be
    /// loaded.
    pub fn load(model_path: impl AsRef<Path>) -> VisionResult<Self> {
        let model_path = model_path.as_ref();
        if !model_path.exists() {
            return Err(VisionError::model_not_found(model_path.display().to_string()));
        }

        let session = Mutex::new(create_session(model_path)?);
        info!(model_path = %model_path.display(), "Detection model initialized");

        Ok(Self { session })
    }
}

impl DetectionBackend for OnnxDetection {
    fn name(&self) -> &str {
        "onnx-detection"
    }

    fn forward(&self, input: &Array3<f32>) -> VisionResult<Vec<Detection>> {
        let (c, h, w) = input.dim();
        let data = input
            .as_slice()
            .ok_or_else(|| VisionError::internal("Detection input tensor is not contiguous"))?;

        let tensor: Value = Tensor::from_array((vec![c, h, w], data.to_vec().into_boxed_slice()))
            .map(Value::from)
            .map_err(|e| VisionError::internal(format!("Failed to create input tensor: {}", e)))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| VisionError::internal("Session lock poisoned"))?;

        let outputs = session
            .run(ort::inputs![tensor])
            .map_err(|e| VisionError::inference(format!("Detection inference failed: {}", e)))?;

        let boxes = outputs
            .get(BOXES_OUTPUT)
            .ok_or_else(|| VisionError::inference(format!("Missing {} tensor", BOXES_OUTPUT)))?
            .try_extract_tensor::<f32>()
            .map_err(|e| VisionError::inference(format!("Failed to extract {}: {}", BOXES_OUTPUT, e)))?
            .1;
        let scores = outputs
            .get(SCORES_OUTPUT)
            .ok_or_else(|| VisionError::inference(format!("Missing {} tensor", SCORES_OUTPUT)))?
            .try_extract_tensor::<f32>()
            .map_err(|e| VisionError::inference(format!("Failed to extract {}: {}", SCORES_OUTPUT, e)))?
            .1;
        let labels = outputs
            .get(LABELS_OUTPUT)
            .ok_or_else(|| VisionError::inference(format!("Missing {} tensor", LABELS_OUTPUT)))?
            .try_extract_tensor::<i64>()
            .map_err(|e| VisionError::inference(format!("Failed to extract {}: {}", LABELS_OUTPUT, e)))?
            .1;

        let count = scores.len();
        if boxes.len() != count * 4 || labels.len() != count {
            return Err(VisionError::inference(format!(
                "Mismatched detection outputs: {} box values, {} labels, {} scores",
                boxes.len(),
                labels.len(),
                count
            )));
        }

        let mut detections = Vec::with_capacity(count);
        for i in 0..count {
            let b = &boxes[i * 4..i * 4 + 4];
            detections.push(Detection::new(
                RawBox::new(b[0], b[1], b[2], b[3]),
                scores[i],
                labels[i],
            ));
        }

        debug!(count = detections.len(), "Detection inference completed");
        Ok(detections)
    }
}

/// Depth estimation backend for MiDaS-style ONNX exports.
///
/// Input images are bicubically resized to a square `input_size`,
/// normalized with ImageNet statistics and fed as `[1, 3, S, S]`. The
/// model returns a `[1, S, S]` relative depth raster.
pub struct OnnxDepth {
    session: Mutex<Session>,
    input_size: u32,
    output_name: String,
}

impl OnnxDepth {
    /// Load the depth model from an ONNX file.
    ///
    /// `input_size` must be nonzero; a zero-sized model input cannot
    /// produce a depth raster.
    pub fn load(model_path: impl AsRef<Path>, input_size: u32) -> VisionResult<Self> {
        if input_size == 0 {
            return Err(VisionError::internal("Depth input size must be nonzero"));
        }

        let model_path = model_path.as_ref();
        if !model_path.exists() {
            return Err(VisionError::model_not_found(model_path.display().to_string()));
        }

        let session = create_session(model_path)?;
        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| VisionError::internal("Depth model has no outputs"))?;

        info!(
            model_path = %model_path.display(),
            input_size,
            "Depth model initialized"
        );

        Ok(Self {
            session: Mutex::new(session),
            input_size,
            output_name,
        })
    }
}

impl DepthBackend for OnnxDepth {
    fn name(&self) -> &str {
        "onnx-depth"
    }

    fn preprocess(&self, image: &RgbImage) -> VisionResult<Array4<f32>> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(VisionError::internal("Cannot preprocess an empty image"));
        }

        let size = self.input_size as usize;
        let mut input = Array4::<f32>::zeros((1, 3, size, size));

        for c in 0..3 {
            let plane = tensor::channel_plane(image, c);
            let resized =
                resample::resize_bicubic(&plane, width as usize, height as usize, size, size);
            for y in 0..size {
                for x in 0..size {
                    input[[0, c, y, x]] = (resized[y * size + x] - IMAGENET_MEAN[c]) / IMAGENET_STD[c];
                }
            }
        }

        Ok(input)
    }

    fn forward(&self, input: &Array4<f32>) -> VisionResult<Array2<f32>> {
        let shape = input.shape().to_vec();
        let data = input
            .as_slice()
            .ok_or_else(|| VisionError::internal("Depth input tensor is not contiguous"))?;

        let tensor: Value = Tensor::from_array((shape, data.to_vec().into_boxed_slice()))
            .map(Value::from)
            .map_err(|e| VisionError::internal(format!("Failed to create input tensor: {}", e)))?;

        let raster = {
            let mut session = self
                .session
                .lock()
                .map_err(|_| VisionError::internal("Session lock poisoned"))?;

            let outputs = session
                .run(ort::inputs![tensor])
                .map_err(|e| VisionError::inference(format!("Depth inference failed: {}", e)))?;

            let value = outputs
                .get(self.output_name.as_str())
                .ok_or_else(|| VisionError::inference(format!("Missing {} tensor", self.output_name)))?;

            let extracted = value
                .try_extract_tensor::<f32>()
                .map_err(|e| VisionError::inference(format!("Failed to extract depth raster: {}", e)))?;

            extracted.1.to_vec()
        };

        let size = self.input_size as usize;
        if raster.len() != size * size {
            return Err(VisionError::inference(format!(
                "Unexpected depth output size: expected {}, got {}",
                size * size,
                raster.len()
            )));
        }

        Array2::from_shape_vec((size, size), raster)
            .map_err(|e| VisionError::internal(format!("Failed to shape depth raster: {}", e)))
    }
}

/// Create ONNX Runtime session with automatic execution provider selection.
fn create_session(model_path: &Path) -> VisionResult<Session> {
    let model_bytes = std::fs::read(model_path)
        .map_err(|e| VisionError::internal(format!("Failed to read model file: {}", e)))?;

    let builder = Session::builder()
        .map_err(|e| VisionError::internal(format!("Failed to create session builder: {}", e)))?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .map_err(|e| VisionError::internal(format!("Failed to set optimization level: {}", e)))?;

    // Try CUDA on Linux with cuda feature
    #[cfg(all(target_os = "linux", feature = "cuda"))]
    {
        use ort::execution_providers::CUDAExecutionProvider;
        if let Ok(cuda_builder) = builder
            .clone()
            .with_execution_providers([CUDAExecutionProvider::default().build()])
        {
            if let Ok(session) = cuda_builder.commit_from_memory(&model_bytes) {
                info!("Using CUDA execution provider");
                return Ok(session);
            }
        }
        debug!("CUDA execution provider not available, trying alternatives");
    }

    // Try CoreML on macOS
    #[cfg(target_os = "macos")]
    {
        use ort::execution_providers::CoreMLExecutionProvider;
        if let Ok(coreml_builder) = builder
            .clone()
            .with_execution_providers([CoreMLExecutionProvider::default().build()])
        {
            if let Ok(session) = coreml_builder.commit_from_memory(&model_bytes) {
                info!("Using CoreML execution provider");
                return Ok(session);
            }
        }
        debug!("CoreML execution provider not available, using CPU");
    }

    info!("Using CPU execution provider");
    builder
        .commit_from_memory(&model_bytes)
        .map_err(|e| VisionError::internal(format!("Failed to load ONNX model: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_model() {
        let err = OnnxDetection::load("models/does-not-exist.onnx").unwrap_err();
        assert!(matches!(err, VisionError::ModelNotFound(_)));

        let err = OnnxDepth::load("models/does-not-exist.onnx", 256).unwrap_err();
        assert!(matches!(err, VisionError::ModelNotFound(_)));
    }

    #[test]
    fn test_load_zero_input_size() {
        // Rejected before the file check, so no model is needed.
        let err = OnnxDepth::load("models/does-not-exist.onnx", 0).unwrap_err();
        assert!(matches!(err, VisionError::Internal(_)));
    }

    #[test]
    fn test_imagenet_normalization_constants() {
        // Channel order must be RGB to line up with the decoded buffers.
        assert!((IMAGENET_MEAN[0] - 0.485).abs() < 1e-6);
        assert!((IMAGENET_STD[2] - 0.225).abs() < 1e-6);
    }
}

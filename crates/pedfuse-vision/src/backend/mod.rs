//! Model backend traits.
//!
//! The pipeline treats detection and depth estimation as opaque
//! capabilities behind these traits: it hands a backend a tensor and gets
//! structured output back, with no knowledge of the architecture serving
//! the request. The ONNX implementations live in [`onnx`]; tests plug in
//! stubs.

use image::RgbImage;
use ndarray::{Array2, Array3, Array4};
use pedfuse_models::Detection;

use crate::error::VisionResult;

pub mod onnx;

/// A model that finds objects in an image tensor.
///
/// Input is a CHW float tensor at native image resolution with values in
/// `[0.0, 1.0]`. Output boxes are in the same pixel coordinate space as
/// the input, unclamped, in the model's own emission order.
pub trait DetectionBackend: Send + Sync {
    /// Short backend identifier for logs.
    fn name(&self) -> &str;

    /// Run the model on one image tensor.
    fn forward(&self, input: &Array3<f32>) -> VisionResult<Vec<Detection>>;
}

/// A model that predicts a dense depth raster for an image.
///
/// Preprocessing is part of the backend because input geometry and
/// normalization are properties of the model, not of the pipeline.
pub trait DepthBackend: Send + Sync {
    /// Short backend identifier for logs.
    fn name(&self) -> &str;

    /// Convert an RGB image into the model's NCHW input tensor.
    fn preprocess(&self, image: &RgbImage) -> VisionResult<Array4<f32>>;

    /// Run the model, returning the raster at the model's native output
    /// resolution as `(height, width)`-indexed values.
    fn forward(&self, input: &Array4<f32>) -> VisionResult<Array2<f32>>;
}

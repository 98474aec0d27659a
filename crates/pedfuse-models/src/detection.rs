use serde::{Deserialize, Serialize};

use crate::bbox::RawBox;

/// A single detector hit: the unclamped box, the confidence score and the
/// model's class label.
///
/// The box is kept in raw detector coordinates here; clamping to the pixel
/// grid happens only when a detection is fused into a record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Bounding box in continuous image coordinates.
    pub bbox: RawBox,
    /// Detector confidence in `[0.0, 1.0]`.
    pub score: f32,
    /// Integer class label as reported by the model.
    pub label: i64,
}

impl Detection {
    /// Create a new detection.
    pub fn new(bbox: RawBox, score: f32, label: i64) -> Self {
        Self { bbox, score, label }
    }
}

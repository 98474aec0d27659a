//! Pedestrian detection on top of a detection backend.

use image::RgbImage;
use tracing::debug;

use pedfuse_models::Detection;

use crate::backend::DetectionBackend;
use crate::error::VisionResult;
use crate::tensor;

/// Class label for "person" in torchvision detection models.
pub const DEFAULT_PERSON_LABEL: i64 = 1;

/// Runs a detection backend and keeps only confident person hits.
///
/// Emission order of the backend is preserved; filtering never reorders.
pub struct PersonDetector<B> {
    backend: B,
    person_label: i64,
}

impl<B: DetectionBackend> PersonDetector<B> {
    /// Create a detector with the default person label.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            person_label: DEFAULT_PERSON_LABEL,
        }
    }

    /// Override the class label treated as "person".
    pub fn with_person_label(mut self, label: i64) -> Self {
        self.person_label = label;
        self
    }

    /// Detect pedestrians in an image.
    ///
    /// Detections with a score strictly below `score_threshold` or with a
    /// non-person label are discarded. Returned boxes are raw detector
    /// coordinates, unclamped.
    pub fn detect(&self, image: &RgbImage, score_threshold: f32) -> VisionResult<Vec<Detection>> {
        let input = tensor::image_to_chw(image);
        let all = self.backend.forward(&input)?;
        let total = all.len();

        let kept: Vec<Detection> = all
            .into_iter()
            .filter(|d| d.label == self.person_label && d.score >= score_threshold)
            .collect();

        debug!(
            backend = self.backend.name(),
            total,
            kept = kept.len(),
            "Filtered person detections"
        );

        Ok(kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;
    use pedfuse_models::RawBox;

    struct FixedBackend {
        detections: Vec<Detection>,
    }

    impl DetectionBackend for FixedBackend {
        fn name(&self) -> &str {
            "fixed"
        }

        fn forward(&self, _input: &Array3<f32>) -> VisionResult<Vec<Detection>> {
            Ok(self.detections.clone())
        }
    }

    fn det(x1: f32, score: f32, label: i64) -> Detection {
        Detection::new(RawBox::new(x1, 0.0, x1 + 10.0, 20.0), score, label)
    }

    #[test]
    fn test_detect_filters_labels_and_scores() {
        let backend = FixedBackend {
            detections: vec![
                det(0.0, 0.9, 1),
                det(10.0, 0.3, 1),
                det(20.0, 0.95, 3),
                det(30.0, 0.5, 1),
            ],
        };
        let detector = PersonDetector::new(backend);

        let kept = detector.detect(&RgbImage::new(8, 8), 0.5).unwrap();
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].score, 0.9);
        // Score exactly at the threshold survives.
        assert_eq!(kept[1].score, 0.5);
    }

    #[test]
    fn test_detect_preserves_emission_order() {
        let backend = FixedBackend {
            detections: vec![det(30.0, 0.6, 1), det(0.0, 0.99, 1), det(15.0, 0.7, 1)],
        };
        let detector = PersonDetector::new(backend);

        let kept = detector.detect(&RgbImage::new(8, 8), 0.5).unwrap();
        let xs: Vec<f32> = kept.iter().map(|d| d.bbox.x1).collect();
        assert_eq!(xs, vec![30.0, 0.0, 15.0]);
    }

    #[test]
    fn test_detect_with_custom_label() {
        let backend = FixedBackend {
            detections: vec![det(0.0, 0.9, 1), det(10.0, 0.9, 7)],
        };
        let detector = PersonDetector::new(backend).with_person_label(7);

        let kept = detector.detect(&RgbImage::new(8, 8), 0.5).unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].label, 7);
    }
}

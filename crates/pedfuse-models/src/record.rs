use serde::{Deserialize, Serialize};

use crate::bbox::PixelBox;

/// One fused pedestrian: a pixel-grid bounding box paired with the mean
/// depth over that box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PedestrianRecord {
    /// Clamped bounding box, serialized as `[x1, y1, x2, y2]`.
    pub bbox: PixelBox,
    /// Mean of the depth raster over the box region.
    pub average_depth: f32,
}

impl PedestrianRecord {
    /// Create a new pedestrian record.
    pub fn new(bbox: PixelBox, average_depth: f32) -> Self {
        Self { bbox, average_depth }
    }
}

/// The complete result for one processed image.
///
/// `pedestrians` preserves detector emission order. `file_name` is omitted
/// from the JSON entirely when absent, which is the case for batch runs
/// where the caller already knows which file it processed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusionResult {
    /// Originating file name, when one was attached to the input.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub file_name: Option<String>,
    /// Fused records in detector emission order.
    pub pedestrians: Vec<PedestrianRecord>,
}

impl FusionResult {
    /// Create a new fusion result.
    pub fn new(file_name: Option<String>, pedestrians: Vec<PedestrianRecord>) -> Self {
        Self { file_name, pedestrians }
    }

    /// Number of pedestrians in this result.
    pub fn count(&self) -> usize {
        self.pedestrians.len()
    }

    /// True when no pedestrian survived detection and clamping.
    pub fn is_empty(&self) -> bool {
        self.pedestrians.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bbox::RawBox;

    fn boxed(x1: f32, y1: f32, x2: f32, y2: f32) -> PixelBox {
        RawBox::new(x1, y1, x2, y2).clamp(1920, 1080).unwrap()
    }

    #[test]
    fn test_record_json_shape() {
        let record = PedestrianRecord::new(boxed(100.0, 50.0, 301.0, 400.0), 5.0);
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"bbox":[100,50,301,400],"average_depth":5.0}"#);
    }

    #[test]
    fn test_result_with_file_name() {
        let result = FusionResult::new(
            Some("frame_0001.png".to_string()),
            vec![PedestrianRecord::new(boxed(0.0, 0.0, 4.0, 4.0), 2.75)],
        );
        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(
            json,
            r#"{"file_name":"frame_0001.png","pedestrians":[{"bbox":[0,0,4,4],"average_depth":2.75}]}"#
        );
    }

    #[test]
    fn test_result_omits_missing_file_name() {
        let result = FusionResult::new(None, vec![]);
        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(json, r#"{"pedestrians":[]}"#);

        let back: FusionResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.file_name, None);
        assert!(back.is_empty());
    }

    #[test]
    fn test_result_round_trip_preserves_order() {
        let result = FusionResult::new(
            Some("crowd.png".to_string()),
            vec![
                PedestrianRecord::new(boxed(10.0, 10.0, 20.0, 40.0), 1.5),
                PedestrianRecord::new(boxed(30.0, 12.0, 44.0, 50.0), 3.25),
                PedestrianRecord::new(boxed(200.0, 8.0, 260.0, 90.0), 0.5),
            ],
        );

        let json = serde_json::to_string(&result).unwrap();
        let back: FusionResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
        assert_eq!(back.count(), 3);
        assert_eq!(back.pedestrians[1].average_depth, 3.25);
    }
}

//! Fusion of detections with a depth raster.

use tracing::debug;

use pedfuse_models::{Detection, PedestrianRecord};

use crate::depth::DepthMap;

/// Fuse person detections with a full-resolution depth map.
///
/// Each detection box is clamped to the `width` x `height` pixel grid and
/// paired with the mean depth over the clamped region. Detections that
/// clamp to an empty box are dropped; the survivors keep their original
/// order.
pub fn fuse(
    detections: &[Detection],
    depth: &DepthMap,
    width: u32,
    height: u32,
) -> Vec<PedestrianRecord> {
    debug_assert!(depth.width() == width && depth.height() == height);

    let mut records = Vec::with_capacity(detections.len());
    for detection in detections {
        match detection.bbox.clamp(width, height) {
            Some(bbox) => {
                let average_depth = depth.region_mean(&bbox);
                records.push(PedestrianRecord::new(bbox, average_depth));
            }
            None => {
                debug!(
                    score = detection.score,
                    "Dropping detection that clamps to an empty box"
                );
            }
        }
    }

    records
}

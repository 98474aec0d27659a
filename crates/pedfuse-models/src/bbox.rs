use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A bounding box in continuous image coordinates, exactly as emitted by a
/// detector. Coordinates are corner-form (x1, y1) top-left, (x2, y2)
/// bottom-right and may fall outside the image or even be negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawBox {
    /// X coordinate of the top-left corner, in pixels (may be fractional).
    pub x1: f32,
    /// Y coordinate of the top-left corner, in pixels (may be fractional).
    pub y1: f32,
    /// X coordinate of the bottom-right corner, in pixels (may be fractional).
    pub x2: f32,
    /// Y coordinate of the bottom-right corner, in pixels (may be fractional).
    pub y2: f32,
}

impl RawBox {
    /// Create a new raw bounding box.
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Round and clamp this box to the pixel grid of a `width` x `height`
    /// image.
    ///
    /// Each coordinate is rounded half away from zero, then the top-left
    /// corner is clamped to 0 and the bottom-right corner to the image
    /// dimensions. Returns `None` when the clamped box has no area, which
    /// covers boxes entirely outside the image as well as degenerate
    /// detector output.
    pub fn clamp(&self, width: u32, height: u32) -> Option<PixelBox> {
        // Non-finite coordinates cannot be placed on the pixel grid.
        if !(self.x1.is_finite() && self.y1.is_finite() && self.x2.is_finite() && self.y2.is_finite())
        {
            return None;
        }

        let x1 = (self.x1.round() as i64).max(0);
        let y1 = (self.y1.round() as i64).max(0);
        let x2 = (self.x2.round() as i64).min(i64::from(width));
        let y2 = (self.y2.round() as i64).min(i64::from(height));

        if x2 <= x1 || y2 <= y1 {
            return None;
        }

        Some(PixelBox {
            x1: x1 as u32,
            y1: y1 as u32,
            x2: x2 as u32,
            y2: y2 as u32,
        })
    }
}

/// Error returned when a serialized pixel box does not describe a
/// positive-area region.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("degenerate pixel box [{x1}, {y1}, {x2}, {y2}]: requires x1 < x2 and y1 < y2")]
pub struct InvalidBoxError {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

/// An integer bounding box clamped to an image's pixel grid.
///
/// Instances always satisfy `x1 < x2` and `y1 < y2`; they are produced by
/// [`RawBox::clamp`] and never mutated afterwards. Serializes as the JSON
/// array `[x1, y1, x2, y2]`, and deserialization re-checks the ordering
/// invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "[u32; 4]", try_from = "[u32; 4]")]
pub struct PixelBox {
    x1: u32,
    y1: u32,
    x2: u32,
    y2: u32,
}

impl PixelBox {
    /// X coordinate of the left edge.
    pub fn x1(&self) -> u32 {
        self.x1
    }

    /// Y coordinate of the top edge.
    pub fn y1(&self) -> u32 {
        self.y1
    }

    /// X coordinate of the exclusive right edge.
    pub fn x2(&self) -> u32 {
        self.x2
    }

    /// Y coordinate of the exclusive bottom edge.
    pub fn y2(&self) -> u32 {
        self.y2
    }

    /// Box width in pixels, always at least 1.
    pub fn width(&self) -> u32 {
        self.x2 - self.x1
    }

    /// Box height in pixels, always at least 1.
    pub fn height(&self) -> u32 {
        self.y2 - self.y1
    }

    /// Number of pixels covered by the box.
    pub fn area(&self) -> u64 {
        u64::from(self.width()) * u64::from(self.height())
    }
}

impl From<PixelBox> for [u32; 4] {
    fn from(b: PixelBox) -> Self {
        [b.x1, b.y1, b.x2, b.y2]
    }
}

impl TryFrom<[u32; 4]> for PixelBox {
    type Error = InvalidBoxError;

    fn try_from(v: [u32; 4]) -> Result<Self, Self::Error> {
        let [x1, y1, x2, y2] = v;
        if x2 <= x1 || y2 <= y1 {
            return Err(InvalidBoxError { x1, y1, x2, y2 });
        }
        Ok(Self { x1, y1, x2, y2 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_rounds_fractional_coordinates() {
        let raw = RawBox::new(100.4, 50.2, 300.9, 400.1);
        let b = raw.clamp(640, 480).unwrap();
        assert_eq!(<[u32; 4]>::from(b), [100, 50, 301, 400]);
        assert_eq!(b.width(), 201);
        assert_eq!(b.height(), 350);
    }

    #[test]
    fn test_clamp_truncates_to_image_bounds() {
        // Negative corners clamp to zero, overshooting corners clamp to the
        // image dimensions.
        let raw = RawBox::new(-10.0, -5.0, 2.0, 600.0);
        let b = raw.clamp(640, 480).unwrap();
        assert_eq!(<[u32; 4]>::from(b), [0, 0, 2, 480]);
    }

    #[test]
    fn test_clamp_rounds_half_away_from_zero() {
        let raw = RawBox::new(10.5, 20.5, 30.5, 40.5);
        let b = raw.clamp(640, 480).unwrap();
        assert_eq!(<[u32; 4]>::from(b), [11, 21, 31, 41]);
    }

    #[test]
    fn test_clamp_rejects_degenerate_boxes() {
        // Entirely left of the image.
        assert!(RawBox::new(-40.0, 10.0, -1.0, 60.0).clamp(640, 480).is_none());

        // Entirely below the image.
        assert!(RawBox::new(10.0, 500.0, 60.0, 550.0).clamp(640, 480).is_none());

        // Zero width after rounding.
        assert!(RawBox::new(10.2, 10.0, 10.3, 60.0).clamp(640, 480).is_none());

        // Inverted corners.
        assert!(RawBox::new(50.0, 50.0, 20.0, 80.0).clamp(640, 480).is_none());

        // Non-finite coordinates.
        assert!(RawBox::new(f32::NAN, 10.0, 60.0, 60.0).clamp(640, 480).is_none());
        assert!(RawBox::new(10.0, 10.0, f32::INFINITY, 60.0).clamp(640, 480).is_none());
    }

    #[test]
    fn test_clamp_keeps_single_pixel_boxes() {
        let b = RawBox::new(5.0, 5.0, 6.0, 6.0).clamp(640, 480).unwrap();
        assert_eq!(b.area(), 1);
    }

    #[test]
    fn test_pixel_box_serializes_as_array() {
        let b = RawBox::new(1.0, 2.0, 3.0, 4.0).clamp(10, 10).unwrap();
        let json = serde_json::to_string(&b).unwrap();
        assert_eq!(json, "[1,2,3,4]");

        let back: PixelBox = serde_json::from_str(&json).unwrap();
        assert_eq!(back, b);
    }

    #[test]
    fn test_pixel_box_deserialize_rejects_degenerate() {
        let err = serde_json::from_str::<PixelBox>("[5,5,5,9]").unwrap_err();
        assert!(err.to_string().contains("degenerate pixel box"));

        assert!(serde_json::from_str::<PixelBox>("[5,5,9,5]").is_err());
        assert!(serde_json::from_str::<PixelBox>("[9,5,5,9]").is_err());
    }
}

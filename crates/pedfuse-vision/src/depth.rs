//! Dense per-pixel depth rasters.

use pedfuse_models::PixelBox;

use crate::error::{VisionError, VisionResult};
use crate::resample;

/// A row-major raster of relative depth values, one `f32` per pixel.
///
/// Values follow the producing model's convention (larger = closer for the
/// MiDaS family); this type never reinterprets them, it only stores,
/// resizes and averages.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthMap {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl DepthMap {
    /// Create a depth map from row-major data.
    ///
    /// Fails when `data.len()` does not match `width * height`.
    pub fn new(width: u32, height: u32, data: Vec<f32>) -> VisionResult<Self> {
        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(VisionError::internal(format!(
                "Depth raster length mismatch: expected {}, got {}",
                expected,
                data.len()
            )));
        }
        Ok(Self { width, height, data })
    }

    /// Create a depth map filled with a single value.
    pub fn constant(width: u32, height: u32, value: f32) -> Self {
        Self {
            width,
            height,
            data: vec![value; width as usize * height as usize],
        }
    }

    /// Raster width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Raster height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Depth value at pixel `(x, y)`.
    pub fn get(&self, x: u32, y: u32) -> f32 {
        debug_assert!(x < self.width && y < self.height);
        self.data[y as usize * self.width as usize + x as usize]
    }

    /// Row-major view of the raster.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Resize to new dimensions with bicubic interpolation.
    ///
    /// Fails when the raster is empty; there are no samples to
    /// interpolate from.
    pub fn resize(&self, width: u32, height: u32) -> VisionResult<DepthMap> {
        if width == self.width && height == self.height {
            return Ok(self.clone());
        }
        if self.data.is_empty() {
            return Err(VisionError::internal("Cannot resize an empty depth raster"));
        }
        let data = resample::resize_bicubic(
            &self.data,
            self.width as usize,
            self.height as usize,
            width as usize,
            height as usize,
        );
        DepthMap::new(width, height, data)
    }

    /// Mean depth over a box region.
    ///
    /// The box is expected to lie within the raster, which holds for boxes
    /// clamped against the same dimensions. Accumulates in `f64` so the
    /// mean over a constant region reproduces that constant exactly.
    pub fn region_mean(&self, bbox: &PixelBox) -> f32 {
        debug_assert!(bbox.x2() <= self.width && bbox.y2() <= self.height);

        let x1 = bbox.x1().min(self.width) as usize;
        let x2 = bbox.x2().min(self.width) as usize;
        let y1 = bbox.y1().min(self.height) as usize;
        let y2 = bbox.y2().min(self.height) as usize;
        if x2 <= x1 || y2 <= y1 {
            return 0.0;
        }

        let w = self.width as usize;
        let mut sum = 0.0f64;
        for y in y1..y2 {
            for &v in &self.data[y * w + x1..y * w + x2] {
                sum += f64::from(v);
            }
        }

        let count = (x2 - x1) * (y2 - y1);
        (sum / count as f64) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pedfuse_models::RawBox;

    fn boxed(x1: f32, y1: f32, x2: f32, y2: f32, w: u32, h: u32) -> PixelBox {
        RawBox::new(x1, y1, x2, y2).clamp(w, h).unwrap()
    }

    #[test]
    fn test_new_validates_length() {
        assert!(DepthMap::new(3, 2, vec![0.0; 6]).is_ok());
        assert!(DepthMap::new(3, 2, vec![0.0; 5]).is_err());
    }

    #[test]
    fn test_region_mean_constant_is_exact() {
        let map = DepthMap::constant(640, 480, 5.0);
        let bbox = boxed(100.4, 50.2, 300.9, 400.1, 640, 480);
        assert_eq!(map.region_mean(&bbox), 5.0);
    }

    #[test]
    fn test_region_mean_full_raster() {
        let map = DepthMap::new(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let bbox = boxed(0.0, 0.0, 2.0, 2.0, 2, 2);
        assert_eq!(map.region_mean(&bbox), 2.5);
    }

    #[test]
    fn test_region_mean_sub_region() {
        // Right column of a 2x2 raster.
        let map = DepthMap::new(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let bbox = boxed(1.0, 0.0, 2.0, 2.0, 2, 2);
        assert_eq!(map.region_mean(&bbox), 3.0);
    }

    #[test]
    fn test_get_row_major() {
        let map = DepthMap::new(3, 2, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(map.get(0, 0), 0.0);
        assert_eq!(map.get(2, 0), 2.0);
        assert_eq!(map.get(0, 1), 3.0);
        assert_eq!(map.get(2, 1), 5.0);
    }

    #[test]
    fn test_resize_identity() {
        let map = DepthMap::new(3, 2, vec![0.5, 1.5, 2.5, 3.5, 4.5, 5.5]).unwrap();
        assert_eq!(map.resize(3, 2).unwrap(), map);
    }

    #[test]
    fn test_resize_constant() {
        let map = DepthMap::constant(16, 16, 3.75);
        let big = map.resize(33, 21).unwrap();
        assert_eq!(big.width(), 33);
        assert_eq!(big.height(), 21);
        for &v in big.as_slice() {
            assert!((v - 3.75).abs() < 1e-5);
        }
    }

    #[test]
    fn test_resize_empty_raster_errors() {
        // A zero-area raster is constructible, but upsampling it is not.
        let empty = DepthMap::new(0, 0, vec![]).unwrap();
        assert!(empty.resize(4, 4).is_err());
    }
}

//! Depth estimation on top of a depth backend.

use image::RgbImage;
use tracing::debug;

use crate::backend::DepthBackend;
use crate::depth::DepthMap;
use crate::error::VisionResult;

/// Runs a depth backend and upsamples its raster to image resolution.
pub struct DepthEstimator<B> {
    backend: B,
}

impl<B: DepthBackend> DepthEstimator<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Estimate a dense depth map for an image.
    ///
    /// The returned raster always has the same dimensions as the input
    /// image, whatever resolution the backend natively produces.
    pub fn estimate(&self, image: &RgbImage) -> VisionResult<DepthMap> {
        let (width, height) = image.dimensions();

        let input = self.backend.preprocess(image)?;
        let native = self.backend.forward(&input)?;

        let (native_h, native_w) = native.dim();
        let native_map = DepthMap::new(native_w as u32, native_h as u32, native.into_raw_vec())?;
        let full = native_map.resize(width, height)?;

        debug!(
            backend = self.backend.name(),
            native_w,
            native_h,
            width,
            height,
            "Depth raster upsampled to image resolution"
        );

        Ok(full)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, Array4};

    /// Emits a constant raster at a fixed native resolution.
    struct ConstantBackend {
        native: usize,
        value: f32,
    }

    impl DepthBackend for ConstantBackend {
        fn name(&self) -> &str {
            "constant"
        }

        fn preprocess(&self, _image: &RgbImage) -> VisionResult<Array4<f32>> {
            Ok(Array4::zeros((1, 3, self.native, self.native)))
        }

        fn forward(&self, _input: &Array4<f32>) -> VisionResult<Array2<f32>> {
            Ok(Array2::from_elem((self.native, self.native), self.value))
        }
    }

    #[test]
    fn test_estimate_matches_image_dimensions() {
        let estimator = DepthEstimator::new(ConstantBackend { native: 16, value: 4.5 });
        let map = estimator.estimate(&RgbImage::new(40, 30)).unwrap();
        assert_eq!(map.width(), 40);
        assert_eq!(map.height(), 30);
        for &v in map.as_slice() {
            assert!((v - 4.5).abs() < 1e-5);
        }
    }

    #[test]
    fn test_estimate_native_resolution_passthrough() {
        let estimator = DepthEstimator::new(ConstantBackend { native: 8, value: 1.25 });
        let map = estimator.estimate(&RgbImage::new(8, 8)).unwrap();
        assert_eq!(map.as_slice(), vec![1.25f32; 64].as_slice());
    }
}

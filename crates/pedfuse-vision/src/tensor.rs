//! Conversion from RGB pixel buffers to float tensors.

use image::RgbImage;
use ndarray::Array3;

/// Convert an RGB image to a CHW float tensor with values scaled to
/// `[0.0, 1.0]`.
///
/// The output shape is `(3, height, width)` at the image's native
/// resolution; no resizing or normalization beyond the `1/255` scale is
/// applied here.
pub fn image_to_chw(image: &RgbImage) -> Array3<f32> {
    let (width, height) = image.dimensions();
    let mut tensor = Array3::<f32>::zeros((3, height as usize, width as usize));

    for (x, y, pixel) in image.enumerate_pixels() {
        let [r, g, b] = pixel.0;
        let (x, y) = (x as usize, y as usize);
        tensor[[0, y, x]] = r as f32 / 255.0;
        tensor[[1, y, x]] = g as f32 / 255.0;
        tensor[[2, y, x]] = b as f32 / 255.0;
    }

    tensor
}

/// Extract a single channel as a row-major float plane scaled to
/// `[0.0, 1.0]`.
pub fn channel_plane(image: &RgbImage, channel: usize) -> Vec<f32> {
    let (width, height) = image.dimensions();
    let mut plane = Vec::with_capacity(width as usize * height as usize);

    for y in 0..height {
        for x in 0..width {
            plane.push(image.get_pixel(x, y).0[channel] as f32 / 255.0);
        }
    }

    plane
}

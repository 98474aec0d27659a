//! Decoding of raw image bytes into RGB pixel buffers.

use image::RgbImage;

use crate::error::VisionResult;

/// Decode encoded image bytes (PNG, JPEG, ...) into an 8-bit RGB buffer.
///
/// The container format is sniffed from the bytes themselves. Alpha and
/// grayscale inputs are converted to RGB so the rest of the pipeline only
/// ever sees three channels.
pub fn decode_image(bytes: &[u8]) -> VisionResult<RgbImage> {
    let image = image::load_from_memory(bytes)?;
    Ok(image.to_rgb8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageOutputFormat, Rgb};
    use std::io::Cursor;

    fn png_bytes(image: RgbImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(image)
            .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_decode_png_round_trip() {
        let mut img = RgbImage::new(4, 3);
        img.put_pixel(0, 0, Rgb([255, 0, 0]));
        img.put_pixel(3, 2, Rgb([0, 0, 255]));

        let decoded = decode_image(&png_bytes(img.clone())).unwrap();
        assert_eq!(decoded.dimensions(), (4, 3));
        assert_eq!(decoded.get_pixel(0, 0), &Rgb([255, 0, 0]));
        assert_eq!(decoded.get_pixel(3, 2), &Rgb([0, 0, 255]));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let err = decode_image(b"definitely not an image").unwrap_err();
        assert!(matches!(err, crate::error::VisionError::Decode(_)));
    }

    #[test]
    fn test_decode_rejects_truncated_png() {
        let mut bytes = png_bytes(RgbImage::new(16, 16));
        bytes.truncate(bytes.len() / 2);
        assert!(decode_image(&bytes).is_err());
    }
}

// Tone reduction: RGB -> 8-bit grayscale -> packed 1-bit bitonal.

use image::{GrayImage, RgbImage};

use crate::mono::Bitmap;

/// Convert an RGB buffer to 8-bit grayscale using ITU-R BT.601 luma
/// weights in integer arithmetic: `(299*R + 587*G + 114*B + 500) / 1000`.
pub fn to_grayscale(image: &RgbImage) -> GrayImage {
    let (width, height) = image.dimensions();
    let mut gray = GrayImage::new(width, height);

    for (src, dst) in image.pixels().zip(gray.pixels_mut()) {
        let [r, g, b] = src.0;
        let luma =
            (299u32 * u32::from(r) + 587u32 * u32::from(g) + 114u32 * u32::from(b) + 500) / 1000;
        dst.0 = [luma as u8];
    }

    gray
}

/// Reduce a grayscale buffer to 1-bit using a threshold.
///
/// A pixel becomes black when its value is strictly below `threshold`,
/// white otherwise. The boundary value itself maps to white.
pub fn to_bitonal(gray: &GrayImage, threshold: u8) -> Bitmap {
    let (width, height) = gray.dimensions();
    let mut bitmap = Bitmap::new(width, height);

    for (x, y, pixel) in gray.enumerate_pixels() {
        if pixel.0[0] >= threshold {
            bitmap.set_white(x, y);
        }
    }

    bitmap
}

// image crate: grayscale page -> JPEG bytes

use crate::error::PdfMonoError;
use image::GrayImage;
use std::io::Cursor;

/// Encode an 8-bit grayscale image to JPEG bytes.
///
/// Compresses with the specified quality (1 = worst, 100 = best).
/// The input image is not modified.
pub fn encode_gray_to_jpeg(gray: &GrayImage, quality: u8) -> crate::error::Result<Vec<u8>> {
    if !(1..=100).contains(&quality) {
        return Err(PdfMonoError::encode(format!(
            "JPEG quality must be 1-100, got {}",
            quality
        )));
    }

    let mut buf = Cursor::new(Vec::new());
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality);
    gray.write_with_encoder(encoder)?;

    Ok(buf.into_inner())
}

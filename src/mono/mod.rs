pub mod g4;
pub mod jpeg;
pub mod tone;

use image::RgbImage;

use crate::config::ColorMode;

/// Packed 1-bit raster. Rows are MSB-first, padded to a whole byte;
/// bit value 0 is black and 1 is white, matching 1-bit DeviceGray samples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Bitmap {
    /// Create an all-black bitmap.
    pub fn new(width: u32, height: u32) -> Self {
        let stride = (width as usize).div_ceil(8);
        Bitmap {
            width,
            height,
            data: vec![0u8; stride * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per row.
    pub fn row_stride(&self) -> usize {
        (self.width as usize).div_ceil(8)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub fn is_white(&self, x: u32, y: u32) -> bool {
        let idx = y as usize * self.row_stride() + (x / 8) as usize;
        self.data[idx] & (0x80 >> (x % 8)) != 0
    }

    pub fn set_white(&mut self, x: u32, y: u32) {
        let idx = y as usize * self.row_stride() + (x / 8) as usize;
        self.data[idx] |= 0x80 >> (x % 8);
    }
}

/// Codec tag for an encoded page stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    /// CCITT Group 4 (lossless bitonal)
    G4,
    /// JPEG (lossy grayscale)
    Jpeg,
}

/// One page's encoded image stream plus the metadata the assembler needs.
pub struct EncodedPage {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub codec: Codec,
    /// Resolution the page was rendered at; determines physical page size.
    pub dpi: u32,
}

/// Transform and encode one rendered page according to the conversion mode.
///
/// Bitonal: grayscale -> threshold -> CCITT G4. Grayscale: grayscale -> JPEG
/// at the given quality. The input buffer is not modified.
pub fn encode_page(
    image: &RgbImage,
    mode: ColorMode,
    threshold: u8,
    quality: u8,
    dpi: u32,
) -> crate::error::Result<EncodedPage> {
    let gray = tone::to_grayscale(image);

    match mode {
        ColorMode::Bitonal => {
            let bitmap = tone::to_bitonal(&gray, threshold);
            let data = g4::encode(&bitmap);
            Ok(EncodedPage {
                data,
                width: bitmap.width(),
                height: bitmap.height(),
                codec: Codec::G4,
                dpi,
            })
        }
        ColorMode::Grayscale => {
            let data = jpeg::encode_gray_to_jpeg(&gray, quality)?;
            Ok(EncodedPage {
                data,
                width: gray.width(),
                height: gray.height(),
                codec: Codec::Jpeg,
                dpi,
            })
        }
    }
}

pub mod pdfium;

pub use pdfium::{Rasterizer, SourceDocument};

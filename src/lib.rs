//! Batch conversion of PDF files to compact monochrome PDFs.
//!
//! Pages are rendered with pdfium, reduced to bitonal (CCITT G4) or
//! grayscale (JPEG) images, and reassembled into a new PDF per input file.

pub mod config;
pub mod error;
pub mod mono;
pub mod pages;
pub mod pdf;
pub mod pipeline;
pub mod progress;
pub mod render;

pub use error::{PdfMonoError, Result};

// pdfium-render wrapper: source pages -> RgbImage (in-memory only)

use image::RgbImage;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};

use crate::error::PdfMonoError;

/// Resolves the directory holding the pdfium shared library.
///
/// Search order:
/// 1. `PDFIUM_DYNAMIC_LIB_PATH` environment variable
/// 2. `vendor/pdfium/lib/` relative to the project root (for development)
///
/// Returns `None` when neither location exists, in which case the caller
/// falls back to the system library.
fn resolve_pdfium_lib_dir() -> crate::error::Result<Option<PathBuf>> {
    if let Ok(path) = std::env::var("PDFIUM_DYNAMIC_LIB_PATH") {
        let p = PathBuf::from(&path);
        if p.exists() {
            return Ok(Some(p));
        }
        return Err(PdfMonoError::render(format!(
            "PDFIUM_DYNAMIC_LIB_PATH is set to '{}' but the path does not exist",
            path
        )));
    }

    if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
        let vendor_path = PathBuf::from(&manifest_dir).join("vendor/pdfium/lib");
        if vendor_path.exists() {
            return Ok(Some(vendor_path));
        }
    }

    Ok(None)
}

/// Creates a new Pdfium instance by dynamically loading the shared library.
fn create_pdfium() -> crate::error::Result<Pdfium> {
    let bindings = match resolve_pdfium_lib_dir()? {
        Some(lib_dir) => {
            let lib_dir_str = lib_dir.to_str().ok_or_else(|| {
                PdfMonoError::render("pdfium library path contains non-UTF-8 characters")
            })?;
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(lib_dir_str))
                .map_err(|e| PdfMonoError::render(e.to_string()))?
        }
        None => Pdfium::bind_to_system_library().map_err(|e| {
            PdfMonoError::render(format!(
                "pdfium library not found ({e}): set PDFIUM_DYNAMIC_LIB_PATH or place \
                 libpdfium.so in vendor/pdfium/lib/"
            ))
        })?,
    };
    Ok(Pdfium::new(bindings))
}

/// Handle to the dynamically loaded pdfium library.
pub struct Rasterizer {
    pdfium: Pdfium,
}

impl Rasterizer {
    pub fn new() -> crate::error::Result<Self> {
        Ok(Rasterizer {
            pdfium: create_pdfium()?,
        })
    }

    /// Opens a PDF file for rendering.
    pub fn open(&self, path: &Path) -> crate::error::Result<SourceDocument<'_>> {
        let path_str = path.to_str().ok_or_else(|| {
            PdfMonoError::document_open(format!("{}: path is not valid UTF-8", path.display()))
        })?;
        let document = self
            .pdfium
            .load_pdf_from_file(path_str, None)
            .map_err(|e| PdfMonoError::document_open(format!("{}: {e}", path.display())))?;
        Ok(SourceDocument { document })
    }
}

/// An opened source PDF, ready to render individual pages.
pub struct SourceDocument<'a> {
    document: PdfDocument<'a>,
}

impl SourceDocument<'_> {
    pub fn page_count(&self) -> u32 {
        u32::from(self.document.pages().len())
    }

    /// Renders one page at the specified DPI and returns an RGB image.
    ///
    /// The page is rendered to an in-memory bitmap; no intermediate files
    /// are created.
    ///
    /// # Arguments
    /// * `page_index` - 0-indexed page number
    /// * `dpi` - Resolution in dots per inch (72 DPI = 1 point per pixel)
    ///
    /// # Errors
    /// Returns `PdfMonoError::PageOutOfRange` if the page index is beyond
    /// the document, and `PdfMonoError::RenderError` if rendering fails.
    pub fn render_page(&self, page_index: u32, dpi: u32) -> crate::error::Result<RgbImage> {
        let total = self.page_count();
        if page_index >= total {
            return Err(PdfMonoError::PageOutOfRange {
                page: page_index,
                total,
            });
        }

        let page_index_u16 = u16::try_from(page_index)
            .map_err(|_| PdfMonoError::render("page index exceeds u16 range"))?;
        let page = self
            .document
            .pages()
            .get(page_index_u16)
            .map_err(|e| PdfMonoError::render(e.to_string()))?;

        // PDF default user unit: 1 point = 1/72 inch
        // At the given DPI, each point maps to (dpi / 72) pixels
        let width_pts = page.width().value;
        let height_pts = page.height().value;
        let width_px = (width_pts * dpi as f32 / 72.0).round() as i32;
        let height_px = (height_pts * dpi as f32 / 72.0).round() as i32;

        let config = PdfRenderConfig::new()
            .set_target_width(width_px)
            .set_target_height(height_px);

        let bitmap = page
            .render_with_config(&config)
            .map_err(|e| PdfMonoError::render(e.to_string()))?;

        Ok(bitmap.as_image().into_rgb8())
    }
}

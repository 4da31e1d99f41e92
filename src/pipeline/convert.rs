// ファイル単位: 入力検証 -> ページ解決 -> 逐次レンダリング/エンコード -> PDF組立

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;
use tracing::{error, info};

use crate::config::ColorMode;
use crate::error::PdfMonoError;
use crate::mono::encode_page;
use crate::pages::parse_page_range;
use crate::pdf::DocumentAssembler;
use crate::progress::ProgressSink;
use crate::render::Rasterizer;

/// Configuration for converting a single file.
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    pub input: PathBuf,
    pub output: PathBuf,
    pub mode: ColorMode,
    pub threshold: u8,
    pub dpi: u32,
    pub quality: u8,
    pub page_range: String,
}

/// Terminal state of one file conversion.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    Converted {
        pages: usize,
        output_bytes: u64,
        duration_ms: u64,
    },
    Skipped,
    Failed {
        error: String,
    },
}

/// Result of converting a single file.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionResult {
    pub input: PathBuf,
    pub output: PathBuf,
    pub outcome: Outcome,
}

/// Convert one PDF according to the request, reporting progress to `sink`.
///
/// Every failure is captured in the returned result; the input file is
/// never modified and no partial output is left at the final path.
pub fn run_conversion(request: &ConversionRequest, sink: &dyn ProgressSink) -> ConversionResult {
    sink.on_progress(0, &format!("Checking file: {}", request.input.display()));
    info!(
        "Converting {} -> {}",
        request.input.display(),
        request.output.display()
    );

    let started = Instant::now();
    let outcome = match convert_file(request, sink) {
        Ok((pages, output_bytes)) => {
            let duration_ms = started.elapsed().as_millis() as u64;
            info!(
                "Converted {} ({} pages, {} bytes, {} ms)",
                request.output.display(),
                pages,
                output_bytes,
                duration_ms
            );
            sink.on_progress(
                100,
                &format!(
                    "{} -> {} ({} pages, {} KB, {:.1} s)",
                    request.input.display(),
                    request.output.display(),
                    pages,
                    output_bytes / 1024,
                    duration_ms as f64 / 1000.0
                ),
            );
            Outcome::Converted {
                pages,
                output_bytes,
                duration_ms,
            }
        }
        Err(e) => {
            error!("Conversion failed for {}: {e}", request.input.display());
            sink.on_progress(100, &format!("Failed: {}: {e}", request.input.display()));
            Outcome::Failed {
                error: e.to_string(),
            }
        }
    };

    ConversionResult {
        input: request.input.clone(),
        output: request.output.clone(),
        outcome,
    }
}

/// Run the conversion phases for one file.
///
/// Pages are processed strictly in ascending order; at most one rendered
/// page is held in memory at a time. Returns the page count and the size
/// of the written output.
fn convert_file(
    request: &ConversionRequest,
    sink: &dyn ProgressSink,
) -> crate::error::Result<(usize, u64)> {
    if !request.input.is_file() {
        return Err(PdfMonoError::input_not_found(
            request.input.display().to_string(),
        ));
    }

    let rasterizer = Rasterizer::new()?;
    let document = rasterizer.open(&request.input)?;
    let page_count = document.page_count();

    let pages = parse_page_range(&request.page_range, page_count);
    if pages.is_empty() {
        return Err(PdfMonoError::empty_selection(format!(
            "page range '{}' selects no pages (document has {} pages)",
            request.page_range, page_count
        )));
    }

    let total = pages.len();
    let mut assembler = DocumentAssembler::new();
    for (i, &page_index) in pages.iter().enumerate() {
        sink.on_progress(
            (i * 100 / total) as u8,
            &format!("Processing page {}/{}", i + 1, total),
        );
        let rendered = document.render_page(page_index, request.dpi)?;
        let encoded = encode_page(
            &rendered,
            request.mode,
            request.threshold,
            request.quality,
            request.dpi,
        )?;
        assembler.append_page(&encoded)?;
    }

    let pdf_bytes = assembler.finish()?;
    write_atomic(&request.output, &pdf_bytes)?;

    Ok((total, pdf_bytes.len() as u64))
}

/// Write via a sibling temp file and rename. On any failure the temp
/// file is removed and nothing appears at the final path.
fn write_atomic(path: &Path, bytes: &[u8]) -> crate::error::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)
                .map_err(|e| PdfMonoError::write(format!("{}: {e}", parent.display())))?;
        }
    }

    let Some(file_name) = path.file_name() else {
        return Err(PdfMonoError::write(format!(
            "{}: missing file name",
            path.display()
        )));
    };
    let mut tmp_name = file_name.to_os_string();
    tmp_name.push(".part");
    let tmp_path = path.with_file_name(tmp_name);

    if let Err(e) = fs::write(&tmp_path, bytes) {
        let _ = fs::remove_file(&tmp_path);
        return Err(PdfMonoError::write(format!("{}: {e}", tmp_path.display())));
    }
    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(PdfMonoError::write(format!("{}: {e}", path.display())));
    }

    Ok(())
}

// バッチ実行: 出力パス決定 -> 上書きポリシー適用 -> 逐次変換

use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::{OverwritePolicy, Settings};
use crate::pipeline::convert::{ConversionRequest, ConversionResult, Outcome, run_conversion};
use crate::progress::{OverwritePrompt, ProgressSink};

/// Derive the output path for an input file from the settings.
///
/// The name is `<stem><suffix>[_<YYYYMMDD_HHMMSS>].pdf`, placed in the
/// configured output directory or next to the input.
pub fn output_path_for(input: &Path, settings: &Settings) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());

    let mut name = format!("{stem}{}", settings.output_suffix);
    if settings.append_timestamp {
        name = format!("{name}_{}", chrono::Local::now().format("%Y%m%d_%H%M%S"));
    }
    name.push_str(".pdf");

    let dir = match &settings.output_dir {
        Some(dir) => dir.clone(),
        None => match input.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        },
    };
    dir.join(name)
}

/// Convert every input in order, applying the overwrite policy per file.
///
/// A failure on one file never prevents the remaining files from being
/// processed. Skipped files are recorded without opening the input. The
/// returned results are in input order, one per input.
pub fn run_batch(
    inputs: &[PathBuf],
    settings: &Settings,
    sink: &dyn ProgressSink,
    prompt: &dyn OverwritePrompt,
) -> Vec<ConversionResult> {
    let mut results = Vec::with_capacity(inputs.len());

    for input in inputs {
        let output = output_path_for(input, settings);

        if output.exists() {
            let proceed = match settings.overwrite {
                OverwritePolicy::Overwrite => true,
                OverwritePolicy::Skip => false,
                OverwritePolicy::Ask => prompt.confirm_overwrite(&output),
            };
            if !proceed {
                info!(
                    "Skipping {} (output {} exists)",
                    input.display(),
                    output.display()
                );
                sink.on_progress(
                    100,
                    &format!("Skipped (output exists): {}", input.display()),
                );
                results.push(ConversionResult {
                    input: input.clone(),
                    output,
                    outcome: Outcome::Skipped,
                });
                continue;
            }
        }

        let request = ConversionRequest {
            input: input.clone(),
            output,
            mode: settings.mode,
            threshold: settings.threshold,
            dpi: settings.dpi,
            quality: settings.quality,
            page_range: settings.page_range.clone(),
        };
        results.push(run_conversion(&request, sink));
    }

    let converted = results
        .iter()
        .filter(|r| matches!(r.outcome, Outcome::Converted { .. }))
        .count();
    let skipped = results
        .iter()
        .filter(|r| matches!(r.outcome, Outcome::Skipped))
        .count();
    let failed = results.len() - converted - skipped;
    info!("Batch complete: {converted} converted, {skipped} skipped, {failed} failed");

    sink.on_batch_complete(&results);
    results
}

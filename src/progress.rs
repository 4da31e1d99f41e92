//! Progress and confirmation callbacks for conversion runs.
//!
//! Events flow one way, pipeline to sink; a sink cannot pause or cancel a
//! run. The only blocking interaction is [`OverwritePrompt`], consulted
//! before an existing output file is replaced.

use std::path::Path;

use crate::pipeline::convert::ConversionResult;

/// Receives progress events while files are converted.
///
/// `on_progress` is called with a percentage of the current file (0 at the
/// start, once per processed page, 100 on completion) and a short
/// human-readable message. All methods have default no-op implementations
/// so callers only override what they care about.
pub trait ProgressSink: Send + Sync {
    fn on_progress(&self, percent: u8, message: &str) {
        let _ = (percent, message);
    }

    /// Called once after the whole batch, with one result per input file
    /// in input order.
    fn on_batch_complete(&self, results: &[ConversionResult]) {
        let _ = results;
    }
}

/// A no-op sink for callers that don't need progress events.
pub struct NoopProgress;

impl ProgressSink for NoopProgress {}

/// Decides whether an existing output file may be overwritten.
///
/// Consulted only under [`crate::config::OverwritePolicy::Ask`]; returning
/// `false` skips the file.
pub trait OverwritePrompt: Send + Sync {
    fn confirm_overwrite(&self, path: &Path) -> bool;
}

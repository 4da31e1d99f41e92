use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use pdf_mono::config::{self, ColorMode, OverwritePolicy, Settings};
use pdf_mono::error::PdfMonoError;
use pdf_mono::pipeline::convert::{ConversionResult, Outcome};
use pdf_mono::pipeline::run_batch;
use pdf_mono::progress::{NoopProgress, OverwritePrompt, ProgressSink};

const AFTER_HELP: &str = "\
EXAMPLES:
  # Convert to a bitonal PDF next to the input (scan_SW.pdf)
  pdf_mono scan.pdf

  # Grayscale at 150 dpi, pages 2-10, into a separate directory
  pdf_mono --mode grayscale --dpi 150 --pages 2-10 --output-dir out scan.pdf

  # Re-run over existing outputs without asking
  pdf_mono --overwrite overwrite a.pdf b.pdf c.pdf
";

/// Convert PDF files to compact bitonal or grayscale PDFs.
#[derive(Parser, Debug)]
#[command(
    name = "pdf_mono",
    version,
    about = "Convert PDF files to compact bitonal or grayscale PDFs",
    arg_required_else_help = true,
    after_help = AFTER_HELP
)]
struct Cli {
    /// Input PDF files, processed in order.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Settings YAML file (default: pdf_mono.yaml in the current directory).
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Color mode: bitonal, grayscale.
    #[arg(long)]
    mode: Option<ColorMode>,

    /// Black/white threshold 0-255 for bitonal mode.
    #[arg(long)]
    threshold: Option<u8>,

    /// Rendering resolution in dots per inch.
    #[arg(long)]
    dpi: Option<u32>,

    /// JPEG quality 1-100 for grayscale mode.
    #[arg(long)]
    quality: Option<u8>,

    /// Page selection, e.g. "1-3,7" or "5-" (default: all pages).
    #[arg(long)]
    pages: Option<String>,

    /// Directory for output files (default: next to each input).
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Suffix appended to the output file stem.
    #[arg(long)]
    suffix: Option<String>,

    /// Append a YYYYMMDD_HHMMSS timestamp to output names.
    #[arg(long)]
    timestamp: bool,

    /// Existing-output policy: ask, overwrite, skip.
    #[arg(long)]
    overwrite: Option<OverwritePolicy>,

    /// Answer yes to every overwrite prompt.
    #[arg(short = 'y', long)]
    yes: bool,

    /// Open each converted file with the platform default viewer.
    #[arg(long)]
    open: bool,

    /// Print the batch results as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Append logs to this file instead of stderr.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Suppress the progress bar.
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.log_file.as_deref()) {
        eprintln!("ERROR: {e}");
        return ExitCode::from(2);
    }

    let settings = match resolve_settings(&cli) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("ERROR: {e}");
            return ExitCode::from(2);
        }
    };

    let show_progress = !cli.quiet && !cli.json;
    let sink: Box<dyn ProgressSink> = if show_progress {
        Box::new(CliProgress::new())
    } else {
        Box::new(NoopProgress)
    };
    let prompt = StdinPrompt {
        assume_yes: cli.yes,
    };

    let results = run_batch(&cli.inputs, &settings, sink.as_ref(), &prompt);

    report_results(&cli, &settings, &results)
}

/// Load the settings file, then apply command-line overrides on top.
fn resolve_settings(cli: &Cli) -> pdf_mono::Result<Settings> {
    let mut settings = config::load_settings(cli.settings.as_deref())?;

    if let Some(mode) = cli.mode {
        settings.mode = mode;
    }
    if let Some(threshold) = cli.threshold {
        settings.threshold = threshold;
    }
    if let Some(dpi) = cli.dpi {
        settings.dpi = dpi;
    }
    if let Some(quality) = cli.quality {
        settings.quality = quality;
    }
    if let Some(ref pages) = cli.pages {
        settings.page_range = pages.clone();
    }
    if let Some(ref dir) = cli.output_dir {
        settings.output_dir = Some(dir.clone());
    }
    if let Some(ref suffix) = cli.suffix {
        settings.output_suffix = suffix.clone();
    }
    if cli.timestamp {
        settings.append_timestamp = true;
    }
    if let Some(policy) = cli.overwrite {
        settings.overwrite = policy;
    }
    if cli.open {
        settings.open_after = true;
    }

    settings.validate()?;
    Ok(settings)
}

/// Route logs to stderr, or append to `--log-file` with ANSI disabled.
///
/// The filter defaults to `info`; `RUST_LOG` overrides it.
fn init_logging(log_file: Option<&Path>) -> pdf_mono::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| {
                    PdfMonoError::config(format!("Cannot open log file {}: {e}", path.display()))
                })?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Arc::new(file))
                .with_ansi(false)
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::stderr)
                .init();
        }
    }
    Ok(())
}

/// Terminal progress sink: one bar reused across files.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let bar = ProgressBar::new(100);
        let style = ProgressStyle::with_template("[{bar:40.green/238}] {pos:>3}%  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");
        bar.set_style(style);
        Self { bar }
    }
}

impl ProgressSink for CliProgress {
    fn on_progress(&self, percent: u8, message: &str) {
        self.bar.set_position(u64::from(percent));
        self.bar.set_message(message.to_string());
    }

    fn on_batch_complete(&self, _results: &[ConversionResult]) {
        self.bar.finish_and_clear();
    }
}

/// Interactive yes/no prompt; EOF or anything but y/yes declines.
struct StdinPrompt {
    assume_yes: bool,
}

impl OverwritePrompt for StdinPrompt {
    fn confirm_overwrite(&self, path: &Path) -> bool {
        if self.assume_yes {
            return true;
        }
        eprint!("Overwrite {}? [y/N] ", path.display());
        let _ = io::stderr().flush();
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => false,
            Ok(_) => matches!(line.trim().to_lowercase().as_str(), "y" | "yes"),
        }
    }
}

fn report_results(cli: &Cli, settings: &Settings, results: &[ConversionResult]) -> ExitCode {
    let mut converted = 0usize;
    let mut skipped = 0usize;
    let mut failed = 0usize;

    for result in results {
        match &result.outcome {
            Outcome::Converted {
                pages,
                output_bytes,
                duration_ms,
            } => {
                converted += 1;
                eprintln!(
                    "OK: {} -> {} ({} pages, {} KB, {:.1} s)",
                    result.input.display(),
                    result.output.display(),
                    pages,
                    output_bytes / 1024,
                    *duration_ms as f64 / 1000.0
                );
                if settings.open_after {
                    open_with_default_app(&result.output);
                }
            }
            Outcome::Skipped => {
                skipped += 1;
                eprintln!(
                    "SKIP: {} (output {} exists)",
                    result.input.display(),
                    result.output.display()
                );
            }
            Outcome::Failed { error } => {
                failed += 1;
                eprintln!("ERROR: {}: {error}", result.input.display());
            }
        }
    }

    eprintln!("{converted} converted, {skipped} skipped, {failed} failed");

    if cli.json {
        match serde_json::to_string_pretty(results) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("ERROR: Failed to serialize results: {e}");
                return ExitCode::FAILURE;
            }
        }
    }

    if failed > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Open a file with the platform default application.
fn open_with_default_app(path: &Path) {
    #[cfg(target_os = "windows")]
    let result = std::process::Command::new("cmd")
        .args(["/C", "start", ""])
        .arg(path)
        .spawn();
    #[cfg(target_os = "macos")]
    let result = std::process::Command::new("open").arg(path).spawn();
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    let result = std::process::Command::new("xdg-open").arg(path).spawn();

    if let Err(e) = result {
        warn!("Failed to open {}: {e}", path.display());
    }
}

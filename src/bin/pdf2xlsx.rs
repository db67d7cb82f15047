//! CLI binary for pdf2xlsx.
//!
//! A thin shim over the library crate: the input path is the "dropped" file,
//! a spinner stands in for the processing screen, and the archive is saved
//! to disk on completion.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf2xlsx::{
    CancellationToken, ClientConfig, ModelId, SharedObserver, StatusObserver, UploadController,
    UploadError, UploadFile, UploadStatus, View,
};
use serde::Serialize;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI observer using indicatif ─────────────────────────────────────────────

/// Terminal observer: a spinner while the request is in flight, one line
/// per outcome.
struct CliObserver {
    bar: ProgressBar,
    started: std::sync::Mutex<Option<Instant>>,
}

impl CliObserver {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Waiting");

        Arc::new(Self {
            bar,
            started: std::sync::Mutex::new(None),
        })
    }

    fn elapsed_secs(&self) -> f64 {
        self.started
            .lock()
            .ok()
            .and_then(|g| *g)
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

impl StatusObserver for CliObserver {
    fn on_submission_start(&self, file_name: &str, size: usize, model: ModelId) {
        if let Ok(mut g) = self.started.lock() {
            *g = Some(Instant::now());
        }
        self.bar.println(format!(
            "{} {} {}",
            cyan("◆"),
            bold(&format!("Uploading {file_name}")),
            dim(&format!("({size} bytes, {model})"))
        ));
    }

    fn on_status_change(&self, _from: UploadStatus, to: UploadStatus) {
        match to {
            UploadStatus::Processing => {
                self.bar.set_prefix("Processing");
                self.bar.set_message("AI is analysing the document…");
                self.bar.enable_steady_tick(Duration::from_millis(80));
            }
            UploadStatus::Complete | UploadStatus::Error | UploadStatus::Idle => {
                self.bar.finish_and_clear();
            }
        }
    }

    fn on_complete(&self, archive_len: usize) {
        eprintln!(
            "{} Conversion complete  {}  {}",
            green("✔"),
            dim(&format!("{archive_len} bytes")),
            dim(&format!("{:.1}s", self.elapsed_secs())),
        );
    }

    fn on_error(&self, message: &str) {
        self.bar.finish_and_clear();
        eprintln!("{} {}", red("✘"), red(message));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert with the recommended model, save ./results.zip
  pdf2xlsx orders.pdf

  # Pick a model and an output location
  pdf2xlsx --model gemini-2.5-pro orders.pdf -o out/june.zip

  # Save into an existing directory (file is named results.zip)
  pdf2xlsx orders.pdf -o ~/Downloads

  # Talk to a deployed endpoint
  pdf2xlsx --endpoint https://convert.example.com/api/process orders.pdf

  # Machine-readable summary
  pdf2xlsx --json orders.pdf

MODELS:
  gemini-2.0-flash
  gemini-2.5-flash-lite
  gemini-2.5-flash       (default, recommended)
  gemini-2.5-pro
  gemini-3-pro

ENVIRONMENT VARIABLES:
  PDF2XLSX_ENDPOINT   Processing endpoint URL
  PDF2XLSX_MODEL      Model identifier
  PDF2XLSX_OUTPUT     Output file or directory
  PDF2XLSX_TIMEOUT    Request timeout in seconds
  RUST_LOG            Override log filter (e.g. pdf2xlsx=debug)

Press Ctrl-C while processing to cancel the request.
"#;

/// Convert a PDF into an Excel bundle through an AI extraction endpoint.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2xlsx",
    version,
    about = "Convert a PDF into an Excel bundle through an AI extraction endpoint",
    long_about = "Upload a PDF and a model identifier to the processing endpoint and save the \
returned archive (results.zip) of Excel files.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF file to convert.
    #[arg(required_unless_present = "list_models")]
    input: Option<PathBuf>,

    /// Where to save the archive: a file path or an existing directory.
    #[arg(short, long, env = "PDF2XLSX_OUTPUT")]
    output: Option<PathBuf>,

    /// Model identifier.
    #[arg(short, long, env = "PDF2XLSX_MODEL", default_value = "gemini-2.5-flash")]
    model: String,

    /// Processing endpoint URL.
    #[arg(
        short,
        long,
        env = "PDF2XLSX_ENDPOINT",
        default_value = pdf2xlsx::DEFAULT_ENDPOINT_URL
    )]
    endpoint: String,

    /// Request timeout in seconds (default: no client-side limit).
    #[arg(long, env = "PDF2XLSX_TIMEOUT")]
    timeout: Option<u64>,

    /// Print the allowed model identifiers and exit.
    #[arg(long)]
    list_models: bool,

    /// Print a JSON summary on stdout instead of text.
    #[arg(long)]
    json: bool,

    /// Disable the spinner.
    #[arg(long)]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long)]
    quiet: bool,
}

/// `--json` output.
#[derive(Serialize)]
struct Summary<'a> {
    status: UploadStatus,
    model: ModelId,
    input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bytes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_kind: Option<pdf2xlsx::ErrorKind>,
    duration_ms: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // While the spinner is active it carries the feedback; library logs are
    // limited to errors so they don't tear the spinner line.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    if cli.list_models {
        for m in ModelId::ALL {
            if m.is_recommended() {
                println!("{m}  (default)");
            } else {
                println!("{m}");
            }
        }
        return Ok(());
    }

    let input = cli
        .input
        .clone()
        .context("an input PDF is required")?;

    // ── Build controller ─────────────────────────────────────────────────
    let config = build_config(&cli)?;
    let mut controller = UploadController::new(config).context("Invalid configuration")?;
    if show_progress {
        controller = controller.with_observer(CliObserver::new() as SharedObserver);
    }

    // ── Read input ───────────────────────────────────────────────────────
    let file = UploadFile::from_path(&input)
        .await
        .with_context(|| format!("Failed to read {}", input.display()))?;
    if file.is_pdf_typed() && !file.looks_like_pdf() && !cli.quiet {
        eprintln!(
            "{} {} has a .pdf name but no PDF header; sending it anyway",
            cyan("⚠"),
            input.display()
        );
    }

    // ── Submit, cancelling on Ctrl-C ─────────────────────────────────────
    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    let start = Instant::now();
    let outcome = controller
        .accept_dropped_files_with_cancel(vec![file], cancel)
        .await;
    let duration_ms = start.elapsed().as_millis() as u64;

    let saved = match &outcome {
        Ok(artifact) => {
            let target = cli
                .output
                .clone()
                .unwrap_or_else(|| PathBuf::from(artifact.suggested_name()));
            let path = artifact
                .save_to(&target)
                .context("Failed to save archive")?;
            if !artifact.looks_like_zip() && !cli.quiet {
                eprintln!(
                    "{} response is not a ZIP archive ({})",
                    cyan("⚠"),
                    artifact.content_type().unwrap_or("no content type")
                );
            }
            Some(path)
        }
        Err(_) => None,
    };

    // ── Report ───────────────────────────────────────────────────────────
    let state = controller.snapshot();
    if cli.json {
        let err = outcome.as_ref().err();
        let summary = Summary {
            status: state.status(),
            model: state.model,
            input: input.display().to_string(),
            output: saved.as_ref().map(|p| p.display().to_string()),
            bytes: state.artifact().map(|a| a.len()),
            error: err.map(|_| state.error_message()),
            error_kind: err.map(UploadError::kind),
            duration_ms,
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("Failed to serialise summary")?
        );
    } else if !cli.quiet {
        if let Some(ref path) = saved {
            if !show_progress {
                eprint!("{}", View::from_state(&state).render());
            }
            eprintln!("   →  {}", bold(&path.display().to_string()));
        } else if !show_progress {
            eprint!("{}", controller.view().render());
        }
    }

    match outcome {
        Ok(_) => Ok(()),
        Err(e) => Err(anyhow::Error::new(e).context("Conversion failed")),
    }
}

/// Map CLI args to `ClientConfig`.
fn build_config(cli: &Cli) -> Result<ClientConfig> {
    let default_model: ModelId = cli.model.parse().context("Invalid --model")?;
    let mut builder = ClientConfig::builder()
        .endpoint_url(cli.endpoint.clone())
        .default_model(default_model);
    if let Some(secs) = cli.timeout {
        builder = builder.request_timeout_secs(secs);
    }
    builder.build().context("Invalid configuration")
}

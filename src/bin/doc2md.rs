//! CLI binary for doc2md.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ConversionConfig`, then either converts one URL or runs the HTTP service.

use anyhow::{Context, Result};
use clap::Parser;
use doc2md::server::{self, AppState, DEFAULT_BIND_ADDR};
use doc2md::{
    write_markdown, ConversionConfig, ConversionError, ConversionObserver, ConversionRequest,
    Converter, FileType, Observer, PdfiumDecoder, PipelineStage,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
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
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI observer using indicatif ─────────────────────────────────────────────

/// Terminal observer: a spinner that follows the pipeline stages, with
/// conversion errors printed above it as they are recorded.
struct CliObserver {
    bar: ProgressBar,
    started: Instant,
    warnings: AtomicUsize,
}

impl CliObserver {
    fn new() -> Arc<Self> {
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        let bar = ProgressBar::new(100);
        bar.set_style(style);
        bar.set_prefix("Preparing");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            started: Instant::now(),
            warnings: AtomicUsize::new(0),
        })
    }
}

fn stage_label(stage: PipelineStage) -> &'static str {
    match stage {
        PipelineStage::Start => "Starting",
        PipelineStage::TypeDetected => "Classified",
        PipelineStage::Resolved => "Resolved export URL",
        PipelineStage::Skipped => "Using URL as-is",
        PipelineStage::Fetched => "Downloaded",
        PipelineStage::Extracted => "Extracted text",
        PipelineStage::Formatted => "Formatted",
        PipelineStage::Done => "Done",
        PipelineStage::Errored => "Failed",
    }
}

impl ConversionObserver for CliObserver {
    fn on_conversion_start(&self, url: &str) {
        self.bar.set_prefix("Converting");
        self.bar.set_message(url.to_string());
    }

    fn on_stage(&self, stage: PipelineStage, progress: u8) {
        self.bar.set_position(progress as u64);
        self.bar
            .set_message(format!("{:>3}%  {}", progress, stage_label(stage)));
    }

    fn on_conversion_error(&self, error: &ConversionError) {
        self.warnings.fetch_add(1, Ordering::SeqCst);
        self.bar.println(format!(
            "  {} {}  {}",
            yellow("⚠"),
            bold(&error.section),
            dim(&error.reason)
        ));
    }

    fn on_conversion_complete(&self, file_type: FileType, markdown_len: usize, error_count: usize) {
        self.bar.finish_and_clear();
        let mark = if error_count == 0 {
            green("✔")
        } else {
            yellow("⚠")
        };
        eprintln!(
            "{} {}  {}  {}",
            mark,
            bold(file_type.as_str()),
            dim(&format!("{markdown_len} chars")),
            dim(&format!("{:.1}s", self.started.elapsed().as_secs_f64())),
        );
        let warnings = self.warnings.load(Ordering::SeqCst);
        if warnings > 0 {
            eprintln!("   {} conversion warning(s)", yellow(&warnings.to_string()));
        }
    }

    fn on_conversion_failed(&self, error: &str) {
        self.bar.finish_and_clear();
        eprintln!("{} {}", red("✘"), error);
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert a PDF (stdout)
  doc2md https://example.com/report.pdf

  # Convert a Google Doc to a file
  doc2md "https://docs.google.com/document/d/1AbC-xyz_123/edit" -o notes.md

  # Force the file type when the URL has no usable extension
  doc2md --type pdf "https://example.com/download?id=42"

  # JSON output (markdown, fileType, conversionErrors)
  doc2md --json https://example.com/slides.pdf > result.json

  # Run the HTTP service
  doc2md --serve --bind 0.0.0.0:8080
  curl -X POST localhost:8080/convert -H 'content-type: application/json' \
       -d '{"url":"https://example.com/report.pdf"}'

SUPPORTED SOURCES:
  pdf           *.pdf
  google-doc    docs.google.com/document/d/{id}/...      (exported as PDF)
  google-slide  docs.google.com/presentation/d/{id}/...  (exported as PDF)
  markdown      *.md, *.markdown                         (passed through)

  Sheets, Word, Excel, PowerPoint and images are recognised but rejected.

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH         Path to an existing libpdfium; skips the download
  PDFIUM_AUTO_CACHE_DIR   Override the pdfium download cache directory
  RUST_LOG                Overrides the log filter chosen by -v / -q
"#;

/// Convert PDF, Google Docs/Slides and Markdown URLs to Markdown.
#[derive(Parser, Debug)]
#[command(
    name = "doc2md",
    version,
    about = "Convert PDF, Google Docs/Slides and Markdown URLs to Markdown",
    long_about = "Convert documents referenced by URL into Markdown. PDFs are decoded with \
pdfium, Google Docs and Slides are fetched through their PDF export, Markdown files are \
passed through. Run with --serve to expose the same pipeline as an HTTP API.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// HTTP/HTTPS URL of the document.
    #[arg(required_unless_present = "serve")]
    url: Option<String>,

    /// Write Markdown to this file instead of stdout.
    #[arg(short, long, env = "DOC2MD_OUTPUT")]
    output: Option<PathBuf>,

    /// Output structured JSON (ConversionResult) instead of Markdown.
    #[arg(long, env = "DOC2MD_JSON")]
    json: bool,

    /// Skip detection: pdf, google-doc, google-slide, markdown, ...
    #[arg(long = "type", env = "DOC2MD_TYPE")]
    file_type: Option<FileType>,

    /// Run the HTTP service instead of converting a single URL.
    #[arg(long, env = "DOC2MD_SERVE", conflicts_with_all = ["url", "output", "json"])]
    serve: bool,

    /// Listen address for --serve.
    #[arg(long, env = "DOC2MD_BIND", default_value = DEFAULT_BIND_ADDR)]
    bind: SocketAddr,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "DOC2MD_DOWNLOAD_TIMEOUT", default_value_t = 120,
          value_parser = clap::value_parser!(u64).range(1..))]
    download_timeout: u64,

    /// Path to the pdfium shared library.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,

    /// User-Agent header for downloads.
    #[arg(long, env = "DOC2MD_USER_AGENT")]
    user_agent: Option<String>,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DOC2MD_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "DOC2MD_QUIET", conflicts_with = "verbose")]
    quiet: bool,

    /// Disable the progress spinner.
    #[arg(long, env = "DOC2MD_NO_PROGRESS")]
    no_progress: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner replaces INFO-level library logs in one-shot mode; the
    // service always logs at INFO so requests are visible.
    let show_progress = !cli.serve && !cli.quiet && !cli.no_progress && !cli.json;
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

    // ── Ensure PDFium engine is available ───────────────────────────────
    // Without --pdfium-lib, pdfium-auto downloads the library (~30 MB) on
    // first use. Do it here with a visible bar instead of silently inside
    // the first conversion.
    if cli.pdfium_lib.is_none() && !cli.quiet && !pdfium_auto::is_pdfium_cached() {
        download_pdfium()?;
    }

    // ── Build converter ──────────────────────────────────────────────────
    let observer: Option<Observer> = if show_progress {
        Some(CliObserver::new() as Arc<dyn ConversionObserver>)
    } else {
        None
    };
    let config = build_config(&cli, observer)?;
    let converter = Converter::new(config).context("Failed to initialise converter")?;

    // ── Service mode ─────────────────────────────────────────────────────
    if cli.serve {
        PdfiumDecoder::new(cli.pdfium_lib.clone())
            .warm_up()
            .await
            .context("Failed to load the PDF engine")?;
        if !cli.quiet {
            eprintln!(
                "{} doc2md listening on {}",
                green("◆"),
                bold(&format!("http://{}", cli.bind))
            );
        }
        server::serve(cli.bind, AppState::new(converter))
            .await
            .with_context(|| format!("HTTP service on {} failed", cli.bind))?;
        return Ok(());
    }

    // ── One-shot conversion ──────────────────────────────────────────────
    let url = cli.url.clone().unwrap_or_default();
    let mut request = ConversionRequest::new(url);
    if let Some(file_type) = cli.file_type {
        request = request.with_file_type(file_type);
    }

    let result = converter
        .convert(&request)
        .await
        .context("Conversion failed")?;

    if let Some(ref output_path) = cli.output {
        write_markdown(&result.markdown, output_path)
            .await
            .context("Failed to write output")?;
        if !cli.quiet {
            eprintln!("   →  {}", bold(&output_path.display().to_string()));
        }
    } else if cli.json {
        let json = serde_json::to_string_pretty(&result).context("Failed to serialise output")?;
        println!("{json}");
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(result.markdown.as_bytes())
            .context("Failed to write to stdout")?;
        if !result.markdown.ends_with('\n') {
            handle.write_all(b"\n").ok();
        }
    }

    // Without the spinner nothing has reported the conversion errors yet.
    if !cli.quiet && !show_progress && !cli.json {
        for e in &result.conversion_errors {
            eprintln!("{} {}  {}", yellow("⚠"), bold(&e.section), dim(&e.reason));
        }
    }

    Ok(())
}

/// Fetch libpdfium into the pdfium-auto cache, showing download progress.
fn download_pdfium() -> Result<()> {
    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {bytes}/{total_bytes}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
    );
    bar.set_prefix("PDF engine");
    bar.enable_steady_tick(Duration::from_millis(80));

    let progress = bar.clone();
    tokio::task::block_in_place(|| {
        pdfium_auto::ensure_pdfium_library(Some(&|downloaded, total| {
            if let Some(t) = total {
                progress.set_length(t);
            }
            progress.set_position(downloaded);
        }))
    })
    .context("Failed to download PDFium engine")?;

    bar.finish_and_clear();
    eprintln!("{} PDF engine ready", green("✔"));
    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, observer: Option<Observer>) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder().download_timeout_secs(cli.download_timeout);

    if let Some(ref path) = cli.pdfium_lib {
        builder = builder.pdfium_lib_path(path);
    }
    if let Some(ref ua) = cli.user_agent {
        builder = builder.user_agent(ua);
    }
    if let Some(observer) = observer {
        builder = builder.observer(observer);
    }

    builder.build().context("Invalid configuration")
}

//! # doc2md
//!
//! Convert documents referenced by URL (PDFs, Google Docs, Google Slides and
//! Markdown files) into Markdown.
//!
//! ## Pipeline Overview
//!
//! ```text
//! URL
//!  │
//!  ├─ 1. Classify  infer the file type from the URL shape (or take an override)
//!  ├─ 2. Resolve   Google Docs/Slides link → direct PDF export URL
//!  ├─ 3. Fetch     download the bytes (reqwest, no retries)
//!  ├─ 4. Extract   PDF text via pdfium (spawn_blocking), Markdown as UTF-8
//!  ├─ 5. Format    paragraphs, heading heuristic, figure/table detection
//!  └─ 6. Output    Markdown + file type + non-fatal conversion errors
//! ```
//!
//! Content problems never abort a run. A PDF the decoder cannot read yields a
//! placeholder document, and suspected figures or tables are flagged; both
//! are reported in [`ConversionResult::conversion_errors`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use doc2md::{convert, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::default();
//!     let result = convert("https://example.com/report.pdf", &config).await?;
//!     println!("{}", result.markdown);
//!     for e in &result.conversion_errors {
//!         eprintln!("warning: {e}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature  | Default | Description |
//! |----------|---------|-------------|
//! | `cli`    | on      | Enables the `doc2md` binary (clap, indicatif, tracing-subscriber) |
//! | `server` | on      | Enables [`server`]: the `POST /convert` HTTP API (axum + tower-http) |
//!
//! Disable both when using only the library:
//! ```toml
//! doc2md = { version = "0.1", default-features = false }
//! ```
//!
//! ## pdfium
//!
//! PDF decoding binds to the pdfium shared library at runtime, once per
//! process. [`ConversionConfig::pdfium_lib_path`] (or `--pdfium-lib` /
//! `PDFIUM_LIB_PATH`) names an existing `libpdfium`; otherwise `pdfium-auto`
//! uses its cached copy, downloading it on first use. A library that cannot
//! be bound fails the request with [`Doc2MdError::PdfiumBindingFailed`]; only
//! documents pdfium itself rejects degrade to a placeholder.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod report;
#[cfg(feature = "server")]
pub mod server;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder};
pub use convert::{convert, convert_sync, convert_to_file, write_markdown, Converter};
pub use error::{ConversionError, Doc2MdError};
pub use output::{ConversionRequest, ConversionResult};
pub use pipeline::classify::{classify, FileType};
pub use pipeline::export::{resolve_export_url, GoogleExportKind};
pub use pipeline::extract::{PdfDecoder, PdfiumDecoder};
pub use pipeline::fetch::{ByteFetcher, HttpFetcher};
pub use pipeline::format::format_markdown;
pub use pipeline::PipelineStage;
pub use progress::{
    calculate_progress, ConversionObserver, NoopObserver, Observer, TracingObserver,
};
pub use report::ConversionErrorLog;

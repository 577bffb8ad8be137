//! Pipeline orchestration and the public conversion entry points.
//!
//! A [`Converter`] owns the two I/O collaborators (fetcher and PDF decoder)
//! behind `Arc`s, so one instance can be cloned into every HTTP handler and
//! serve concurrent requests. Each call to [`Converter::convert`] is a
//! strictly sequential run with its own error log; nothing is shared between
//! runs except the read-only config and collaborators.
//!
//! ## Failure policy
//!
//! Plumbing errors (no URL, unsupported type, bad Google link, download
//! failure) abort the run with `Err(Doc2MdError)`. Content problems (decoder
//! failure, suspected figures/tables) are appended to the error log and the
//! run still returns a [`ConversionResult`].

use crate::config::ConversionConfig;
use crate::error::Doc2MdError;
use crate::output::{ConversionRequest, ConversionResult};
use crate::pipeline::classify::classify;
use crate::pipeline::export::{resolve_export_url, GoogleExportKind, DEFAULT_EXPORT_FORMAT};
use crate::pipeline::extract::{extract, Extracted, PdfDecoder, PdfiumDecoder};
use crate::pipeline::fetch::{ByteFetcher, HttpFetcher};
use crate::pipeline::format::{detect_figures_and_tables, format_markdown};
use crate::pipeline::PipelineStage;
use crate::progress::{Observer, TracingObserver};
use crate::report::{ConversionErrorLog, REASON_FIGURES_TABLES, SECTION_FIGURES_TABLES};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Runs the conversion pipeline.
#[derive(Clone)]
pub struct Converter {
    config: ConversionConfig,
    fetcher: Arc<dyn ByteFetcher>,
    decoder: Arc<dyn PdfDecoder>,
    observer: Observer,
}

impl std::fmt::Debug for Converter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Converter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Converter {
    /// Build a converter with the reqwest fetcher and the pdfium decoder.
    pub fn new(config: ConversionConfig) -> Result<Self, Doc2MdError> {
        let fetcher = Arc::new(HttpFetcher::new(&config)?);
        let decoder = Arc::new(PdfiumDecoder::new(config.pdfium_lib_path.clone()));
        Ok(Self::with_components(config, fetcher, decoder))
    }

    /// Build a converter from explicit collaborators.
    pub fn with_components(
        config: ConversionConfig,
        fetcher: Arc<dyn ByteFetcher>,
        decoder: Arc<dyn PdfDecoder>,
    ) -> Self {
        let observer = config
            .observer
            .clone()
            .unwrap_or_else(|| Arc::new(TracingObserver));
        Self {
            config,
            fetcher,
            decoder,
            observer,
        }
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    /// Convert one request.
    ///
    /// # Errors
    /// Returns `Err(Doc2MdError)` only for structural failures:
    /// - [`Doc2MdError::MissingInput`]: blank URL
    /// - [`Doc2MdError::UnsupportedType`]: no converter for the file type
    /// - [`Doc2MdError::InvalidSourceUrl`]: Google URL without `/d/{id}`
    /// - [`Doc2MdError::DownloadFailed`] / [`Doc2MdError::DownloadTimeout`]
    pub async fn convert(
        &self,
        request: &ConversionRequest,
    ) -> Result<ConversionResult, Doc2MdError> {
        let result = self.run(request).await;
        if let Err(ref e) = result {
            self.enter(PipelineStage::Errored);
            self.observer.on_conversion_failed(&e.to_string());
        }
        result
    }

    async fn run(&self, request: &ConversionRequest) -> Result<ConversionResult, Doc2MdError> {
        let start = Instant::now();
        let url = request.url.trim();
        if url.is_empty() {
            return Err(Doc2MdError::MissingInput);
        }

        info!("Starting conversion: {}", url);
        self.observer.on_conversion_start(url);
        self.enter(PipelineStage::Start);

        // ── Step 1: Classify ─────────────────────────────────────────────────
        let file_type = request.file_type.unwrap_or_else(|| classify(url));
        debug!(%file_type, overridden = request.file_type.is_some(), "File type detected");
        self.enter(PipelineStage::TypeDetected);

        if !file_type.is_convertible() {
            return Err(Doc2MdError::UnsupportedType { file_type });
        }

        // ── Step 2: Resolve Google export URL ────────────────────────────────
        let fetch_url = match GoogleExportKind::try_from(file_type) {
            Ok(kind) => {
                let export_url = resolve_export_url(url, kind, DEFAULT_EXPORT_FORMAT)?;
                debug!(%export_url, "Resolved export URL");
                self.enter(PipelineStage::Resolved);
                export_url
            }
            Err(_) => {
                self.enter(PipelineStage::Skipped);
                url.to_string()
            }
        };

        // ── Step 3: Fetch ────────────────────────────────────────────────────
        let bytes = self.fetcher.fetch(&fetch_url).await?;
        self.enter(PipelineStage::Fetched);

        // ── Step 4: Extract ──────────────────────────────────────────────────
        let mut log = ConversionErrorLog::new(Arc::clone(&self.observer));
        let extracted = extract(bytes, file_type, self.decoder.as_ref(), &mut log).await?;
        self.enter(PipelineStage::Extracted);

        // ── Step 5: Format ───────────────────────────────────────────────────
        let markdown = match extracted {
            Extracted::PdfText(text) => {
                if detect_figures_and_tables(&text, &self.config.figure_table_markers) {
                    log.record(SECTION_FIGURES_TABLES, REASON_FIGURES_TABLES);
                }
                format_markdown(&text)
            }
            Extracted::Markdown(text) | Extracted::Degraded(text) => text,
        };
        self.enter(PipelineStage::Formatted);

        // ── Step 6: Done ─────────────────────────────────────────────────────
        let conversion_errors = log.into_errors();
        info!(
            "Conversion complete: {} ({} chars, {} conversion errors) in {}ms",
            file_type,
            markdown.len(),
            conversion_errors.len(),
            start.elapsed().as_millis()
        );
        self.observer
            .on_conversion_complete(file_type, markdown.len(), conversion_errors.len());
        self.enter(PipelineStage::Done);

        Ok(ConversionResult {
            markdown,
            file_type,
            conversion_errors,
        })
    }

    fn enter(&self, stage: PipelineStage) {
        debug!(?stage, "Pipeline transition");
        self.observer.on_stage(stage, stage.progress());
    }
}

/// Convert a URL to Markdown with a default-component [`Converter`].
///
/// # Errors
/// See [`Converter::convert`].
pub async fn convert(
    url: impl AsRef<str>,
    config: &ConversionConfig,
) -> Result<ConversionResult, Doc2MdError> {
    Converter::new(config.clone())?
        .convert(&ConversionRequest::new(url.as_ref()))
        .await
}

/// Convert a URL and write the Markdown directly to a file.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn convert_to_file(
    url: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionResult, Doc2MdError> {
    let result = convert(url, config).await?;
    write_markdown(&result.markdown, output_path.as_ref()).await?;
    Ok(result)
}

/// Atomically write `markdown` to `path`, creating parent directories.
pub async fn write_markdown(markdown: &str, path: &Path) -> Result<(), Doc2MdError> {
    let write_err = |e| Doc2MdError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
        }
    }

    let tmp_path = path.with_extension("md.tmp");
    tokio::fs::write(&tmp_path, markdown)
        .await
        .map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)?;
    Ok(())
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    url: impl AsRef<str>,
    config: &ConversionConfig,
) -> Result<ConversionResult, Doc2MdError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Doc2MdError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert(url, config))
}

//! Text extraction: raw bytes → flat text.
//!
//! PDF-family content (plain PDFs and PDF exports of Docs/Slides) goes
//! through a [`PdfDecoder`]; Markdown sources are decoded as UTF-8 and passed
//! through untouched.
//!
//! ## Decoder failures
//!
//! A document that pdfium cannot read is a content problem: the failure is
//! recorded in the [`ConversionErrorLog`] and the caller still gets a
//! (placeholder) result. A pdfium library that cannot be bound at all is a
//! deployment problem and fails the conversion with
//! [`Doc2MdError::PdfiumBindingFailed`].
//!
//! ## Why spawn_blocking?
//!
//! `pdfium-render` wraps the pdfium C++ library, which is CPU-bound and not
//! async-aware. Decoding runs on Tokio's blocking pool so request handling
//! threads never stall on a large document.

use crate::error::Doc2MdError;
use crate::pipeline::classify::FileType;
use crate::report::{
    ConversionErrorLog, REASON_INVALID_UTF8, REASON_PARSE_FAILURE, SECTION_MARKDOWN,
    SECTION_PDF_PARSE,
};
use async_trait::async_trait;
use once_cell::sync::OnceCell;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Markdown returned in place of the document when the PDF cannot be decoded.
pub const DEGRADED_PLACEHOLDER: &str =
    "# PDF変換エラー\n\nPDFの変換中にエラーが発生しました。別のファイルを試してください。";

/// Decodes a PDF byte buffer to plain text in document order.
#[async_trait]
pub trait PdfDecoder: Send + Sync {
    async fn decode(&self, bytes: Vec<u8>) -> Result<String, Doc2MdError>;
}

/// Outcome of the extraction stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extracted {
    /// Flat text from a PDF; still needs formatting.
    PdfText(String),
    /// Markdown source, used as-is.
    Markdown(String),
    /// The decoder failed; carries ready-to-return placeholder Markdown.
    Degraded(String),
}

/// Run the extractor for `file_type`.
///
/// Callers must only pass convertible types (see
/// [`FileType::is_convertible`]); anything else is an internal error.
pub async fn extract(
    bytes: Vec<u8>,
    file_type: FileType,
    decoder: &dyn PdfDecoder,
    log: &mut ConversionErrorLog,
) -> Result<Extracted, Doc2MdError> {
    if file_type.is_pdf_family() {
        return match decoder.decode(bytes).await {
            Ok(text) => {
                debug!(chars = text.len(), "PDF text extracted");
                Ok(Extracted::PdfText(text))
            }
            Err(e @ Doc2MdError::PdfiumBindingFailed(_)) => Err(e),
            Err(e) => {
                warn!("PDF decode failed: {}", e);
                log.record(SECTION_PDF_PARSE, REASON_PARSE_FAILURE);
                Ok(Extracted::Degraded(DEGRADED_PLACEHOLDER.to_string()))
            }
        };
    }

    if file_type == FileType::Markdown {
        return Ok(Extracted::Markdown(decode_utf8(bytes, log)));
    }

    Err(Doc2MdError::Internal(format!(
        "no extractor for file type '{file_type}'"
    )))
}

fn decode_utf8(bytes: Vec<u8>, log: &mut ConversionErrorLog) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            log.record(SECTION_MARKDOWN, REASON_INVALID_UTF8);
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    }
}

/// Join per-page texts in document order, one blank line between pages,
/// with line endings normalised to `\n`.
pub fn join_pages<I, S>(pages: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    pages
        .into_iter()
        .map(|p| p.as_ref().replace("\r\n", "\n").replace('\r', "\n"))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// [`PdfDecoder`] backed by pdfium.
///
/// Binds to `library_path` when set. Otherwise `pdfium-auto` resolves the
/// library: `PDFIUM_LIB_PATH`, then its cache, then a one-time download.
#[derive(Debug, Clone, Default)]
pub struct PdfiumDecoder {
    library_path: Option<PathBuf>,
}

impl PdfiumDecoder {
    pub fn new(library_path: Option<PathBuf>) -> Self {
        Self { library_path }
    }

    /// Bind pdfium now instead of on the first decode.
    pub async fn warm_up(&self) -> Result<(), Doc2MdError> {
        let library_path = self.library_path.clone();
        tokio::task::spawn_blocking(move || pdfium(library_path.as_deref()).map(|_| ()))
            .await
            .map_err(|e| Doc2MdError::Internal(format!("pdfium bind task panicked: {}", e)))?
    }
}

#[async_trait]
impl PdfDecoder for PdfiumDecoder {
    async fn decode(&self, bytes: Vec<u8>) -> Result<String, Doc2MdError> {
        let library_path = self.library_path.clone();
        tokio::task::spawn_blocking(move || decode_blocking(library_path, &bytes))
            .await
            .map_err(|e| Doc2MdError::Internal(format!("Decode task panicked: {}", e)))?
    }
}

/// The pdfium library is loaded once per process; the first successful
/// bind wins. A failed bind is not cached, so a later call may still succeed.
static PDFIUM: OnceCell<Pdfium> = OnceCell::new();

fn pdfium(library_path: Option<&Path>) -> Result<&'static Pdfium, Doc2MdError> {
    PDFIUM.get_or_try_init(|| {
        let pdfium = match library_path {
            Some(path) => pdfium_auto::bind_pdfium_from_path(path),
            None => pdfium_auto::bind_pdfium_silent(),
        }
        .map_err(|e| Doc2MdError::PdfiumBindingFailed(e.to_string()))?;
        debug!(?library_path, "pdfium bound");
        Ok(pdfium)
    })
}

/// Blocking implementation of text extraction.
fn decode_blocking(library_path: Option<PathBuf>, bytes: &[u8]) -> Result<String, Doc2MdError> {
    let pdfium = pdfium(library_path.as_deref())?;

    let document = pdfium
        .load_pdf_from_byte_slice(bytes, None)
        .map_err(|e| Doc2MdError::Internal(format!("PDF load failed: {:?}", e)))?;

    let pages = document.pages();
    info!("PDF loaded: {} pages", pages.len());

    let mut texts = Vec::with_capacity(pages.len() as usize);
    for (idx, page) in pages.iter().enumerate() {
        let text = page.text().map_err(|e| {
            Doc2MdError::Internal(format!("text extraction failed on page {}: {:?}", idx + 1, e))
        })?;
        texts.push(text.all());
    }

    Ok(join_pages(texts))
}

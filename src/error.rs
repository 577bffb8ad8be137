//! Error types for the doc2md library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`Doc2MdError`]: **Fatal**: the conversion cannot proceed at all
//!   (no URL, unsupported file type, bad Google link, download failed).
//!   Returned as `Err(Doc2MdError)` from [`crate::Converter::convert`] and
//!   the top-level `convert*` functions.
//!
//! * [`ConversionError`]: **Non-fatal**: part of the document could not be
//!   represented faithfully (decoder failure, suspected figures or tables),
//!   but a Markdown result is still produced. Stored inside
//!   [`crate::output::ConversionResult`] so callers see the partial result
//!   together with what went wrong.

use crate::pipeline::classify::FileType;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the doc2md library.
///
/// Content-quality problems use [`ConversionError`] and are stored in
/// [`crate::output::ConversionResult`] rather than propagated here.
#[derive(Debug, Error)]
pub enum Doc2MdError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The request carried no URL (absent, empty or whitespace only).
    #[error("no URL was provided")]
    MissingInput,

    /// The URL classified to a type this pipeline cannot convert.
    #[error("unsupported file type: {file_type}")]
    UnsupportedType { file_type: FileType },

    /// A Google Docs/Slides URL without a `/d/{id}` segment.
    #[error("invalid Google Docs/Slides URL '{url}': no document identifier found")]
    InvalidSourceUrl { url: String },

    // ── Download errors ───────────────────────────────────────────────────
    /// Transport error or non-success HTTP status.
    #[error("failed to download '{url}': {reason}")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("download timed out after {secs}s for '{url}'")]
    DownloadTimeout { url: String, secs: u64 },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output Markdown file.
    #[error("failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "failed to bind to pdfium library: {0}\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium or allow pdfium-auto to download it."
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl Doc2MdError {
    /// True for errors caused by the request itself rather than by the
    /// network or the host. The HTTP layer maps these to `400`.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Doc2MdError::MissingInput
                | Doc2MdError::UnsupportedType { .. }
                | Doc2MdError::InvalidSourceUrl { .. }
        )
    }
}

/// A non-fatal, content-quality annotation for one section of a document.
///
/// Created once and never mutated; the pipeline only ever appends these to
/// a [`crate::report::ConversionErrorLog`].
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{section}: {reason}")]
pub struct ConversionError {
    /// Which part of the document is affected.
    pub section: String,
    /// Why it could not be converted faithfully.
    pub reason: String,
}

impl ConversionError {
    pub fn new(section: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            section: section.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_type_display() {
        let e = Doc2MdError::UnsupportedType {
            file_type: FileType::Unknown,
        };
        assert_eq!(e.to_string(), "unsupported file type: unknown");
    }

    #[test]
    fn unsupported_type_display_uses_kebab_tag() {
        let e = Doc2MdError::UnsupportedType {
            file_type: FileType::GoogleSheet,
        };
        assert_eq!(e.to_string(), "unsupported file type: google-sheet");
    }

    #[test]
    fn download_timeout_display() {
        let e = Doc2MdError::DownloadTimeout {
            url: "https://example.com/a.pdf".into(),
            secs: 30,
        };
        assert!(e.to_string().contains("30s"));
        assert!(e.to_string().contains("example.com"));
    }

    #[test]
    fn client_errors_are_classified() {
        assert!(Doc2MdError::MissingInput.is_client_error());
        assert!(Doc2MdError::InvalidSourceUrl { url: "x".into() }.is_client_error());
        assert!(!Doc2MdError::DownloadFailed {
            url: "x".into(),
            reason: "HTTP 404".into()
        }
        .is_client_error());
        assert!(!Doc2MdError::Internal("boom".into()).is_client_error());
    }

    #[test]
    fn conversion_error_serialises_section_and_reason() {
        let e = ConversionError::new("図表", "may not convert accurately");
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["section"], "図表");
        assert_eq!(json["reason"], "may not convert accurately");
        assert_eq!(e.to_string(), "図表: may not convert accurately");
    }
}

//! Export URL resolution for Google Docs and Google Slides.
//!
//! A viewing URL (`…/document/d/{id}/edit`) is rewritten into the direct
//! download URL of Google's export service. The two URL shapes differ
//! (query parameter for documents, path segment for presentations); both are
//! dictated by Google and reproduced verbatim.

use crate::error::Doc2MdError;
use crate::pipeline::classify::FileType;
use once_cell::sync::Lazy;
use regex::Regex;

/// Format requested from the export service when none is given.
pub const DEFAULT_EXPORT_FORMAT: &str = "pdf";

static RE_DOCUMENT_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/d/([a-zA-Z0-9_-]+)").unwrap());

/// Which Google export endpoint to target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoogleExportKind {
    Document,
    Presentation,
}

impl TryFrom<FileType> for GoogleExportKind {
    type Error = FileType;

    fn try_from(file_type: FileType) -> Result<Self, Self::Error> {
        match file_type {
            FileType::GoogleDoc => Ok(GoogleExportKind::Document),
            FileType::GoogleSlide => Ok(GoogleExportKind::Presentation),
            other => Err(other),
        }
    }
}

/// Extract the document identifier from the first `/d/{id}` path segment.
pub fn document_id(url: &str) -> Option<&str> {
    RE_DOCUMENT_ID
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Build the export URL for `url`.
///
/// # Errors
/// [`Doc2MdError::InvalidSourceUrl`] when `url` has no `/d/{id}` segment.
pub fn resolve_export_url(
    url: &str,
    kind: GoogleExportKind,
    format: &str,
) -> Result<String, Doc2MdError> {
    let id = document_id(url).ok_or_else(|| Doc2MdError::InvalidSourceUrl {
        url: url.to_string(),
    })?;

    Ok(match kind {
        GoogleExportKind::Document => {
            format!("https://docs.google.com/document/d/{id}/export?format={format}")
        }
        GoogleExportKind::Presentation => {
            format!("https://docs.google.com/presentation/d/{id}/export/{format}")
        }
    })
}

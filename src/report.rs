//! The per-conversion error log.
//!
//! Every conversion owns one [`ConversionErrorLog`]. Records are only ever
//! appended; each one is forwarded to the configured observer at the moment
//! it is recorded and the full list is returned inside the result.

use crate::error::ConversionError;
use crate::progress::Observer;

/// Section recorded when the PDF decoder fails.
pub const SECTION_PDF_PARSE: &str = "PDF解析相当";
/// Reason recorded when the PDF decoder fails.
pub const REASON_PARSE_FAILURE: &str = "document parse failure";

/// Section recorded when figure/table markers are found.
pub const SECTION_FIGURES_TABLES: &str = "図表";
/// Reason recorded when figure/table markers are found.
pub const REASON_FIGURES_TABLES: &str = "may not convert accurately";

/// Section recorded when a Markdown source is not valid UTF-8.
pub const SECTION_MARKDOWN: &str = "Markdown";
/// Reason recorded when a Markdown source is not valid UTF-8.
pub const REASON_INVALID_UTF8: &str = "invalid UTF-8 sequences were replaced";

/// Append-only list of [`ConversionError`]s for a single conversion.
pub struct ConversionErrorLog {
    errors: Vec<ConversionError>,
    observer: Observer,
}

impl ConversionErrorLog {
    pub fn new(observer: Observer) -> Self {
        Self {
            errors: Vec::new(),
            observer,
        }
    }

    /// Append a record and notify the observer.
    pub fn record(&mut self, section: impl Into<String>, reason: impl Into<String>) {
        let error = ConversionError::new(section, reason);
        self.observer.on_conversion_error(&error);
        self.errors.push(error);
    }

    pub fn errors(&self) -> &[ConversionError] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Consume the log, yielding records in the order they were recorded.
    pub fn into_errors(self) -> Vec<ConversionError> {
        self.errors
    }
}

impl std::fmt::Debug for ConversionErrorLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversionErrorLog")
            .field("errors", &self.errors)
            .field("observer", &"<dyn ConversionObserver>")
            .finish()
    }
}

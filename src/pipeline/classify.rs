//! URL classification: map a URL string to a [`FileType`] tag.
//!
//! Google Docs-family links are recognised by host and path; everything else
//! goes by the text after the last `.` in the URL. This is a string heuristic,
//! not URL parsing: a query string after the extension (`doc.pdf?dl=1`)
//! classifies as `unknown`, which callers can override with an explicit type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Host that identifies a Google Docs-family URL.
const GOOGLE_DOCS_HOST: &str = "docs.google.com";

/// Every file type the classifier can report.
///
/// Classification covers more types than the pipeline converts; see
/// [`FileType::is_convertible`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FileType {
    Pdf,
    GoogleDoc,
    GoogleSlide,
    GoogleSheet,
    Word,
    Excel,
    Powerpoint,
    Markdown,
    Image,
    Unknown,
}

impl FileType {
    /// All variants, in declaration order.
    pub const ALL: [FileType; 10] = [
        FileType::Pdf,
        FileType::GoogleDoc,
        FileType::GoogleSlide,
        FileType::GoogleSheet,
        FileType::Word,
        FileType::Excel,
        FileType::Powerpoint,
        FileType::Markdown,
        FileType::Image,
        FileType::Unknown,
    ];

    /// The wire tag, e.g. `"google-doc"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Pdf => "pdf",
            FileType::GoogleDoc => "google-doc",
            FileType::GoogleSlide => "google-slide",
            FileType::GoogleSheet => "google-sheet",
            FileType::Word => "word",
            FileType::Excel => "excel",
            FileType::Powerpoint => "powerpoint",
            FileType::Markdown => "markdown",
            FileType::Image => "image",
            FileType::Unknown => "unknown",
        }
    }

    /// Content arrives as PDF bytes (directly, or as a Google export).
    pub fn is_pdf_family(&self) -> bool {
        matches!(
            self,
            FileType::Pdf | FileType::GoogleDoc | FileType::GoogleSlide
        )
    }

    /// The pipeline has an extractor for this type.
    pub fn is_convertible(&self) -> bool {
        self.is_pdf_family() || *self == FileType::Markdown
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FileType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown file type tag '{s}'"))
    }
}

/// Classify a URL. Never fails: anything unrecognised is [`FileType::Unknown`].
pub fn classify(url: &str) -> FileType {
    if url.is_empty() {
        return FileType::Unknown;
    }

    if url.contains(GOOGLE_DOCS_HOST) {
        if url.contains("/document/") {
            return FileType::GoogleDoc;
        }
        if url.contains("/presentation/") {
            return FileType::GoogleSlide;
        }
        if url.contains("/spreadsheets/") {
            return FileType::GoogleSheet;
        }
    }

    // rsplit always yields at least one item; without a '.' that is the whole URL.
    let extension = url.rsplit('.').next().unwrap_or_default();
    from_extension(&extension.to_ascii_lowercase())
}

fn from_extension(extension: &str) -> FileType {
    match extension {
        "pdf" => FileType::Pdf,
        "ppt" | "pptx" => FileType::Powerpoint,
        "doc" | "docx" => FileType::Word,
        "xls" | "xlsx" => FileType::Excel,
        "md" | "markdown" => FileType::Markdown,
        "jpg" | "jpeg" | "png" | "gif" | "webp" => FileType::Image,
        _ => FileType::Unknown,
    }
}

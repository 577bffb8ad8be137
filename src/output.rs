//! Request and result types.
//!
//! Both serialise with the camelCase field names used on the wire
//! (`fileType`, `conversionErrors`), so the HTTP layer and `--json` CLI output
//! share one representation.

use crate::error::ConversionError;
use crate::pipeline::classify::FileType;
use serde::{Deserialize, Deserializer, Serialize};

/// Input to one conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionRequest {
    /// URL of the PDF, Google Docs/Slides document or Markdown file.
    #[serde(default)]
    pub url: String,

    /// Explicit file type; skips classification when set.
    ///
    /// An empty tag counts as absent. An unrecognised tag becomes
    /// [`FileType::Unknown`], which the pipeline rejects as unsupported.
    #[serde(
        default,
        rename = "type",
        deserialize_with = "lenient_file_type",
        skip_serializing_if = "Option::is_none"
    )]
    pub file_type: Option<FileType>,
}

fn lenient_file_type<'de, D>(deserializer: D) -> Result<Option<FileType>, D::Error>
where
    D: Deserializer<'de>,
{
    let tag: Option<String> = Option::deserialize(deserializer)?;
    Ok(match tag.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(tag) => Some(tag.parse().unwrap_or(FileType::Unknown)),
    })
}

impl ConversionRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            file_type: None,
        }
    }

    /// Override classification.
    pub fn with_file_type(mut self, file_type: FileType) -> Self {
        self.file_type = Some(file_type);
        self
    }
}

/// Output of a successful conversion.
///
/// `conversion_errors` may be non-empty: content-quality problems never
/// abort the pipeline, they are reported here alongside the best-effort
/// Markdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResult {
    pub markdown: String,
    pub file_type: FileType,
    pub conversion_errors: Vec<ConversionError>,
}

impl ConversionResult {
    /// True when nothing was flagged during conversion.
    pub fn is_clean(&self) -> bool {
        self.conversion_errors.is_empty()
    }
}

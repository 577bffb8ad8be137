//! Configuration types for URL-to-Markdown conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. One config is shared by every request
//! a [`crate::Converter`] serves.

use crate::error::Doc2MdError;
use crate::pipeline::format::DEFAULT_FIGURE_TABLE_MARKERS;
use crate::progress::Observer;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Configuration for a conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use doc2md::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .download_timeout_secs(30)
///     .user_agent("my-viewer/1.0")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Whole-request download timeout in seconds. Default: 120.
    ///
    /// Nothing is retried; a download that exceeds this fails with
    /// [`Doc2MdError::DownloadTimeout`].
    pub download_timeout_secs: u64,

    /// `User-Agent` header for downloads. If None, `doc2md/{version}`.
    pub user_agent: Option<String>,

    /// Path to the pdfium shared library. If None, the system library is used.
    pub pdfium_lib_path: Option<PathBuf>,

    /// Substrings that flag possible figures or tables.
    /// Default: [`DEFAULT_FIGURE_TABLE_MARKERS`].
    pub figure_table_markers: Vec<String>,

    /// Event sink for stages and conversion errors.
    /// If None, [`crate::progress::TracingObserver`] is used.
    pub observer: Option<Observer>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            download_timeout_secs: 120,
            user_agent: None,
            pdfium_lib_path: None,
            figure_table_markers: DEFAULT_FIGURE_TABLE_MARKERS
                .iter()
                .map(|m| m.to_string())
                .collect(),
            observer: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("pdfium_lib_path", &self.pdfium_lib_path)
            .field("figure_table_markers", &self.figure_table_markers)
            .field(
                "observer",
                &self.observer.as_ref().map(|_| "<dyn ConversionObserver>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config.user_agent = Some(ua.into());
        self
    }

    pub fn pdfium_lib_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_lib_path = Some(path.into());
        self
    }

    /// Replace the figure/table marker list.
    pub fn figure_table_markers<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.figure_table_markers = markers.into_iter().map(Into::into).collect();
        self
    }

    pub fn observer(mut self, observer: Arc<dyn crate::progress::ConversionObserver>) -> Self {
        self.config.observer = Some(observer);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Doc2MdError> {
        let c = &self.config;
        if c.download_timeout_secs == 0 {
            return Err(Doc2MdError::InvalidConfig(
                "download timeout must be ≥ 1 second".into(),
            ));
        }
        if c.user_agent.as_deref().is_some_and(|ua| ua.trim().is_empty()) {
            return Err(Doc2MdError::InvalidConfig(
                "user agent must not be blank".into(),
            ));
        }
        Ok(self.config)
    }
}

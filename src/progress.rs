//! Observer trait for pipeline events.
//!
//! Inject an [`Arc<dyn ConversionObserver>`] via
//! [`crate::config::ConversionConfigBuilder::observer`] to receive events as
//! a conversion moves through its stages. Content-quality problems
//! ([`ConversionError`]) are reported here as they are recorded, so the host
//! decides where they go: the default [`TracingObserver`] turns them into
//! structured `tracing` events, the CLI prints them next to its spinner.
//!
//! # Example
//!
//! ```rust
//! use doc2md::{ConversionConfig, ConversionError, ConversionObserver};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingObserver {
//!     errors: AtomicUsize,
//! }
//!
//! impl ConversionObserver for CountingObserver {
//!     fn on_conversion_error(&self, error: &ConversionError) {
//!         self.errors.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{}: {}", error.section, error.reason);
//!     }
//! }
//!
//! let observer = Arc::new(CountingObserver { errors: AtomicUsize::new(0) });
//!
//! let config = ConversionConfig::builder()
//!     .observer(observer as Arc<dyn ConversionObserver>)
//!     .build()
//!     .unwrap();
//! ```

use crate::error::ConversionError;
use crate::pipeline::classify::FileType;
use crate::pipeline::PipelineStage;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Called by the pipeline as a conversion progresses.
///
/// Implementations must be `Send + Sync`: one observer is shared by every
/// request a [`crate::Converter`] serves. All methods default to no-ops.
pub trait ConversionObserver: Send + Sync {
    /// Called once before classification.
    fn on_conversion_start(&self, url: &str) {
        let _ = url;
    }

    /// Called on every state transition.
    ///
    /// # Arguments
    /// * `stage`   : the state just entered
    /// * `progress`: 0–100, see [`PipelineStage::progress`]
    fn on_stage(&self, stage: PipelineStage, progress: u8) {
        let _ = (stage, progress);
    }

    /// Called each time a content-quality problem is recorded.
    fn on_conversion_error(&self, error: &ConversionError) {
        let _ = error;
    }

    /// Called when a result is produced.
    fn on_conversion_complete(&self, file_type: FileType, markdown_len: usize, error_count: usize) {
        let _ = (file_type, markdown_len, error_count);
    }

    /// Called when the pipeline aborts with a fatal error.
    fn on_conversion_failed(&self, error: &str) {
        let _ = error;
    }
}

/// Ignores every event.
pub struct NoopObserver;

impl ConversionObserver for NoopObserver {}

/// Forwards events to `tracing`. The default when no observer is configured.
pub struct TracingObserver;

impl ConversionObserver for TracingObserver {
    fn on_stage(&self, stage: PipelineStage, progress: u8) {
        debug!(?stage, progress, "Pipeline stage");
    }

    fn on_conversion_error(&self, error: &ConversionError) {
        warn!(section = %error.section, reason = %error.reason, "Conversion error");
    }

    fn on_conversion_complete(&self, file_type: FileType, markdown_len: usize, error_count: usize) {
        info!(%file_type, markdown_len, error_count, "Conversion complete");
    }

    fn on_conversion_failed(&self, error: &str) {
        warn!(error, "Conversion failed");
    }
}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type Observer = Arc<dyn ConversionObserver>;

/// Percentage of `current` out of `total`, rounded; 0 when `total` is 0.
pub fn calculate_progress(current: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let pct = (current.min(total) as f64 / total as f64 * 100.0).round();
    pct as u8
}

//! Pipeline stages for URL-to-Markdown conversion.
//!
//! Each submodule implements exactly one transformation step, so each is
//! independently testable and the two I/O-bound collaborators (fetcher and
//! PDF decoder) can be swapped behind traits.
//!
//! ## Data Flow
//!
//! ```text
//! classify ──▶ export ──▶ fetch ──▶ extract ──▶ format
//! (FileType)  (Google)   (HTTP)    (pdfium)    (headings)
//! ```
//!
//! 1. [`classify`]: URL → [`classify::FileType`]; pure and infallible
//! 2. [`export`]  : Google Docs/Slides URL → direct PDF export URL
//! 3. [`fetch`]   : GET the bytes; the only stage with network I/O
//! 4. [`extract`] : PDF → text via pdfium on the blocking pool, or UTF-8
//!    passthrough for Markdown sources
//! 5. [`format`]  : paragraph/heading heuristic and figure/table detection

pub mod classify;
pub mod export;
pub mod extract;
pub mod fetch;
pub mod format;

use crate::progress::calculate_progress;
use serde::Serialize;

/// States of a single conversion.
///
/// ```text
/// Start → TypeDetected → {Resolved | Skipped} → Fetched → Extracted → Formatted → Done
/// ```
///
/// `Errored` is terminal and reachable from every state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PipelineStage {
    Start,
    TypeDetected,
    /// A Google export URL was derived.
    Resolved,
    /// The original URL is fetched as-is.
    Skipped,
    Fetched,
    Extracted,
    /// Heuristic formatting ran (or was bypassed for Markdown sources).
    Formatted,
    Done,
    Errored,
}

impl PipelineStage {
    const STEPS: usize = 6;

    fn step(&self) -> Option<usize> {
        match self {
            PipelineStage::Start => Some(0),
            PipelineStage::TypeDetected => Some(1),
            PipelineStage::Resolved | PipelineStage::Skipped => Some(2),
            PipelineStage::Fetched => Some(3),
            PipelineStage::Extracted => Some(4),
            PipelineStage::Formatted => Some(5),
            PipelineStage::Done => Some(6),
            PipelineStage::Errored => None,
        }
    }

    /// Percentage of the pipeline completed on entering this state.
    /// `Errored` reports 100: nothing further will run.
    pub fn progress(&self) -> u8 {
        self.step()
            .map(|s| calculate_progress(s, Self::STEPS))
            .unwrap_or(100)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineStage::Done | PipelineStage::Errored)
    }
}

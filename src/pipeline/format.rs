//! Markdown formatting: turn flat extracted text into paragraphs and headings.
//!
//! ## This is a heuristic
//!
//! PDF text extraction loses all layout. The rules below guess structure from
//! the text alone and will sometimes promote a short sentence to a heading or
//! miss a real one. That is accepted behaviour; output stability matters more
//! than accuracy, so the rules must not be "improved" in place.
//!
//! 1. Split the text on blank lines (`"\n\n"`).
//! 2. Trim each paragraph and drop the empty ones.
//! 3. A paragraph shorter than [`HEADING_MAX_CHARS`] characters becomes a
//!    level-2 heading when it is all upper case (text that has no case, such
//!    as CJK, counts) or starts with a number followed by a period.
//! 4. Rejoin with blank lines, in the original order.
//!
//! Figure/table detection is equally shallow: plain substring presence of a
//! marker such as `図` or `Table`.

use once_cell::sync::Lazy;
use regex::Regex;

/// Paragraphs must be strictly shorter than this (in chars) to be promoted.
pub const HEADING_MAX_CHARS: usize = 50;

/// Markers whose presence suggests figures or tables in the source.
pub const DEFAULT_FIGURE_TABLE_MARKERS: [&str; 4] = ["図", "表", "Figure", "Table"];

const PARAGRAPH_SEPARATOR: &str = "\n\n";

static RE_NUMBERED_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+\.").unwrap());

/// Apply the heading/paragraph heuristic to raw extracted text.
///
/// Pure: the same input always yields the same output.
pub fn format_markdown(raw_text: &str) -> String {
    raw_text
        .split(PARAGRAPH_SEPARATOR)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| {
            if looks_like_heading(p) {
                format!("## {p}")
            } else {
                p.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(PARAGRAPH_SEPARATOR)
}

/// The heading rule for one already-trimmed paragraph.
pub fn looks_like_heading(paragraph: &str) -> bool {
    paragraph.chars().count() < HEADING_MAX_CHARS
        && (paragraph == paragraph.to_uppercase() || RE_NUMBERED_HEADING.is_match(paragraph))
}

/// True when `raw_text` contains any of `markers`.
pub fn detect_figures_and_tables<S: AsRef<str>>(raw_text: &str, markers: &[S]) -> bool {
    markers
        .iter()
        .map(AsRef::as_ref)
        .any(|m| !m.is_empty() && raw_text.contains(m))
}

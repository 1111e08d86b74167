//! Evidence linking for extracted fields.
//!
//! Every extracted value points back to the span of scanned text it came
//! from, so audits and reviewers can check the extraction.

use serde::{Deserialize, Serialize};

use crate::types::FieldKind;

/// Maximum characters kept in an evidence excerpt.
const EXCERPT_MAX_CHARS: usize = 160;

/// A piece of evidence supporting an extracted value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Evidence {
    /// Which field this evidence supports
    pub field: FieldKind,

    /// Name of the strategy that matched
    pub strategy: String,

    /// Pointer to the location (e.g., "text[47:72]")
    pub pointer: String,

    /// The matched text, shortened for display
    pub excerpt: String,

    /// Byte offset where the match starts
    #[serde(skip)]
    pub start: usize,
}

impl Evidence {
    /// Create evidence from a span of the scanned text.
    ///
    /// `start..end` must lie on char boundaries of `text`; out-of-range spans
    /// produce an empty excerpt rather than panicking.
    pub fn from_text(
        field: FieldKind,
        strategy: impl Into<String>,
        text: &str,
        start: usize,
        end: usize,
    ) -> Self {
        Self {
            field,
            strategy: strategy.into(),
            pointer: pointer(start, end),
            excerpt: excerpt(text, start, end),
            start,
        }
    }
}

/// Pointer string for a byte span of the scanned text.
pub fn pointer(start: usize, end: usize) -> String {
    format!("text[{}:{}]", start, end)
}

/// Shortened excerpt of `text[start..end]`; empty when the span is invalid.
pub fn excerpt(text: &str, start: usize, end: usize) -> String {
    text.get(start..end)
        .map(|s| shorten(s.trim()))
        .unwrap_or_default()
}

fn shorten(s: &str) -> String {
    let collapsed: String = s.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= EXCERPT_MAX_CHARS {
        return collapsed;
    }
    let mut out: String = collapsed.chars().take(EXCERPT_MAX_CHARS).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evidence_from_text() {
        let text = "governed by the laws of the State of California.";
        let evidence = Evidence::from_text(FieldKind::GoverningLaw, "governed_by", text, 0, 47);
        assert_eq!(evidence.pointer, "text[0:47]");
        assert_eq!(evidence.strategy, "governed_by");
        assert!(evidence.excerpt.ends_with("California"));
    }

    #[test]
    fn test_out_of_range_span_is_empty_excerpt() {
        let evidence = Evidence::from_text(FieldKind::Parties, "s", "short", 3, 99);
        assert_eq!(evidence.excerpt, "");
        assert_eq!(evidence.pointer, "text[3:99]");
    }

    #[test]
    fn test_long_excerpt_is_shortened() {
        let text = "word ".repeat(100);
        let evidence = Evidence::from_text(FieldKind::Signatures, "s", &text, 0, text.len());
        assert!(evidence.excerpt.ends_with("..."));
        assert!(evidence.excerpt.chars().count() <= EXCERPT_MAX_CHARS + 3);
    }
}

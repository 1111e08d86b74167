//! Bounded-cost truncation for oversized documents.
//!
//! Parties and dates cluster at the top of a contract and signatures at the
//! bottom, so truncation keeps a head slice and a tail slice and drops the
//! middle.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Separator inserted where the middle of a document was dropped.
pub const ELISION_MARKER: &str = "\n[...]\n";

/// How oversized input is cut down before pattern scanning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TruncationPolicy {
    /// Maximum characters scanned (excluding the elision marker)
    pub max_chars: usize,

    /// Share of `max_chars` taken from the head; the rest comes from the tail
    pub head_fraction: f64,
}

impl Default for TruncationPolicy {
    fn default() -> Self {
        Self {
            max_chars: 50_000,
            head_fraction: 0.75,
        }
    }
}

impl TruncationPolicy {
    /// Create a policy with the given limit and the default head share.
    pub fn new(max_chars: usize) -> Self {
        Self {
            max_chars,
            ..Default::default()
        }
    }

    /// Apply the policy. Returns borrowed input when no cut is needed.
    pub fn apply<'a>(&self, text: &'a str) -> Cow<'a, str> {
        let total = text.chars().count();
        if total <= self.max_chars {
            return Cow::Borrowed(text);
        }

        let fraction = if self.head_fraction.is_finite() {
            self.head_fraction.clamp(0.0, 1.0)
        } else {
            1.0
        };
        let head_chars = ((self.max_chars as f64) * fraction).round() as usize;
        let head_chars = head_chars.min(self.max_chars);
        let tail_chars = self.max_chars - head_chars;

        let head_end = byte_offset(text, head_chars);
        let tail_start = byte_offset(text, total - tail_chars);

        let mut out = String::with_capacity(head_end + (text.len() - tail_start) + ELISION_MARKER.len());
        out.push_str(&text[..head_end]);
        out.push_str(ELISION_MARKER);
        out.push_str(&text[tail_start..]);
        Cow::Owned(out)
    }
}

/// Byte offset of the `n`th char, or the end of the string.
fn byte_offset(text: &str, n: usize) -> usize {
    text.char_indices()
        .nth(n)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len())
}

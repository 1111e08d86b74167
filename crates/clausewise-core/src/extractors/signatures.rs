//! Signature block extraction.
//!
//! Signatures live near the end of a contract, so strategies only scan the
//! trailing lines.

use std::collections::HashSet;

use crate::evidence::Evidence;
use crate::patterns::{collapse_whitespace, LABEL_COMPANY, LABEL_NAME, LABEL_TITLE, SIGNATURE_LINE};
use crate::types::{FieldKind, Signature};

use super::{Candidate, Cascade, FieldStrategy};

/// Number of trailing lines treated as the signature block.
pub const SIGNATURE_TAIL_LINES: usize = 40;

/// How many lines after `Name:` may hold its `Title:`/`Company:`.
const LABEL_LOOKAHEAD: usize = 4;

/// `John Smith, CEO, Acme Corporation`
pub struct CommaLineStrategy;

impl FieldStrategy<Signature> for CommaLineStrategy {
    fn name(&self) -> &'static str {
        "comma_line"
    }

    fn attempt(&self, text: &str) -> Vec<Candidate<Signature>> {
        let offset = tail_offset(text, SIGNATURE_TAIL_LINES);
        let tail = &text[offset..];

        SIGNATURE_LINE
            .captures_iter(tail)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let signature = Signature {
                    name: collapse_whitespace(caps.name("name")?.as_str()),
                    title: non_empty(caps.name("title").map(|m| m.as_str())),
                    company: non_empty(caps.name("company").map(|m| m.as_str())),
                };
                Some(Candidate::new(
                    signature,
                    Evidence::from_text(
                        FieldKind::Signatures,
                        self.name(),
                        text,
                        offset + whole.start(),
                        offset + whole.end(),
                    ),
                ))
            })
            .collect()
    }
}

/// Labelled blocks:
///
/// ```text
/// Name: John Smith
/// Title: CEO
/// Company: Acme Corporation
/// ```
pub struct LabeledBlockStrategy;

impl FieldStrategy<Signature> for LabeledBlockStrategy {
    fn name(&self) -> &'static str {
        "labeled_block"
    }

    fn attempt(&self, text: &str) -> Vec<Candidate<Signature>> {
        let offset = tail_offset(text, SIGNATURE_TAIL_LINES);
        let lines = lines_with_offsets(&text[offset..], offset);

        let mut found = Vec::new();
        for (idx, (line_start, line)) in lines.iter().enumerate() {
            let Some(name) = LABEL_NAME
                .captures(line)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str())
                .filter(|n| is_plausible_name(n))
            else {
                continue;
            };

            let mut title = None;
            let mut company = None;
            let mut block_end = line_start + line.len();

            for (next_start, next) in lines.iter().skip(idx + 1).take(LABEL_LOOKAHEAD) {
                if LABEL_NAME.is_match(next) {
                    break;
                }
                if let Some(caps) = LABEL_TITLE.captures(next) {
                    title = non_empty(caps.get(1).map(|m| m.as_str()));
                    block_end = next_start + next.len();
                } else if let Some(caps) = LABEL_COMPANY.captures(next) {
                    company = non_empty(caps.get(1).map(|m| m.as_str()));
                    block_end = next_start + next.len();
                }
            }

            found.push(Candidate::new(
                Signature {
                    name: collapse_whitespace(name),
                    title,
                    company,
                },
                Evidence::from_text(FieldKind::Signatures, self.name(), text, *line_start, block_end),
            ));
        }
        found
    }
}

/// The default signature cascade.
pub fn cascade() -> Cascade<Signature> {
    Cascade::new(FieldKind::Signatures)
        .with(CommaLineStrategy)
        .with(LabeledBlockStrategy)
}

/// Deduplicate position-ordered signatures by case-folded name.
pub fn dedupe(candidates: Vec<Candidate<Signature>>) -> Vec<Candidate<Signature>> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|c| seen.insert(c.value.name.to_lowercase()))
        .collect()
}

/// Byte offset where the last `n` lines begin.
fn tail_offset(text: &str, n: usize) -> usize {
    if n == 0 {
        return text.len();
    }
    let trimmed = text.trim_end_matches(['\n', '\r']);
    trimmed
        .match_indices('\n')
        .rev()
        .nth(n - 1)
        .map(|(idx, _)| idx + 1)
        .unwrap_or(0)
}

fn lines_with_offsets(text: &str, base: usize) -> Vec<(usize, &str)> {
    let mut out = Vec::new();
    let mut start = 0;
    for line in text.split('\n') {
        out.push((base + start, line.trim_end_matches('\r')));
        start += line.len() + 1;
    }
    out
}

/// Blank signature lines (`Name: ________`) are not signers.
fn is_plausible_name(name: &str) -> bool {
    name.chars().any(|c| c.is_alphabetic()) && name.chars().count() <= 80
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(collapse_whitespace)
        .filter(|v| !v.is_empty() && v.chars().any(|c| c.is_alphanumeric()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signers(text: &str) -> Vec<Signature> {
        dedupe(cascade().collect(text))
            .into_iter()
            .map(|c| c.value)
            .collect()
    }

    #[test]
    fn test_comma_lines() {
        let text = "
    Signed:
    John Smith, CEO, Acme Corporation
    Jane Doe, CTO, Tech Solutions Inc
    ";
        let found = signers(text);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].name, "John Smith");
        assert_eq!(found[0].title.as_deref(), Some("CEO"));
        assert_eq!(found[0].company.as_deref(), Some("Acme Corporation"));
        assert_eq!(found[1].name, "Jane Doe");
    }

    #[test]
    fn test_labeled_block() {
        let text = "IN WITNESS WHEREOF\nName: Alice Walker\nTitle: General Counsel\nCompany: Globex LLC\n\nName: ________\n";
        let found = signers(text);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Alice Walker");
        assert_eq!(found[0].title.as_deref(), Some("General Counsel"));
        assert_eq!(found[0].company.as_deref(), Some("Globex LLC"));
    }

    #[test]
    fn test_only_tail_is_scanned() {
        let mut text = String::from("Bob Stone, Director, Early Corp\n");
        text.push_str(&"filler line\n".repeat(SIGNATURE_TAIL_LINES + 5));
        assert!(signers(&text).is_empty());
    }

    #[test]
    fn test_tail_offset() {
        assert_eq!(tail_offset("a\nb\nc\n", 2), 2);
        assert_eq!(tail_offset("a\nb", 5), 0);
        assert_eq!(tail_offset("", 3), 0);
    }

    #[test]
    fn test_no_signatures() {
        assert!(signers("").is_empty());
        assert!(signers("This agreement has no signature block.").is_empty());
    }
}

//! Governing law extraction.

use regex::Regex;

use crate::evidence::Evidence;
use crate::patterns::{
    collapse_whitespace, GOVERNED_BY, GOVERNING_LAW_HEADING, LAWS_SHALL_GOVERN, SECTION_BREAK,
};
use crate::types::FieldKind;

use super::{Candidate, Cascade, FieldStrategy};

/// Longest jurisdiction phrase accepted.
const MAX_JURISDICTION_CHARS: usize = 80;

/// Qualifiers that follow the jurisdiction and are not part of it.
const TRAILING_QUALIFIERS: &[&str] = &[
    ", without regard",
    " without regard",
    ", without giving effect",
    " without giving effect",
    ", excluding",
    " excluding its",
    ", and the federal",
    " and the federal",
    ", including",
    " (",
    ", as applied",
    " as applied",
];

/// Words that show a heading captured prose instead of a jurisdiction.
const PROSE_MARKERS: &[&str] = &["agreement", "shall", "governed", "construed", "interpreted"];

/// `governed by the laws of the State of California`
pub struct GovernedByStrategy;

impl FieldStrategy<String> for GovernedByStrategy {
    fn name(&self) -> &'static str {
        "governed_by"
    }

    fn attempt(&self, text: &str) -> Vec<Candidate<String>> {
        capture_jurisdictions(&GOVERNED_BY, self.name(), text)
    }
}

/// `The laws of Delaware shall govern`
pub struct ShallGovernStrategy;

impl FieldStrategy<String> for ShallGovernStrategy {
    fn name(&self) -> &'static str {
        "shall_govern"
    }

    fn attempt(&self, text: &str) -> Vec<Candidate<String>> {
        capture_jurisdictions(&LAWS_SHALL_GOVERN, self.name(), text)
    }
}

/// `Governing Law: England and Wales`
pub struct HeadingStrategy;

impl FieldStrategy<String> for HeadingStrategy {
    fn name(&self) -> &'static str {
        "heading"
    }

    fn attempt(&self, text: &str) -> Vec<Candidate<String>> {
        capture_jurisdictions(&GOVERNING_LAW_HEADING, self.name(), text)
            .into_iter()
            .filter(|c| {
                let lower = c.value.to_lowercase();
                !PROSE_MARKERS.iter().any(|w| lower.contains(w))
            })
            .collect()
    }
}

/// The default governing-law cascade.
pub fn cascade() -> Cascade<String> {
    Cascade::new(FieldKind::GoverningLaw)
        .with(GovernedByStrategy)
        .with(ShallGovernStrategy)
        .with(HeadingStrategy)
}

fn capture_jurisdictions(pattern: &Regex, strategy: &'static str, text: &str) -> Vec<Candidate<String>> {
    pattern
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let group = caps.get(1)?;

            // Unterminated clauses stop at the next section rather than running into it.
            let (raw, end) = match SECTION_BREAK.find(group.as_str()) {
                Some(brk) => (&group.as_str()[..brk.start()], group.start() + brk.start()),
                None => (group.as_str(), whole.end()),
            };
            let phrase = clean_jurisdiction(raw)?;
            Some(Candidate::new(
                phrase,
                Evidence::from_text(FieldKind::GoverningLaw, strategy, text, whole.start(), end),
            ))
        })
        .collect()
}

/// Strip qualifiers, a leading article and trailing punctuation.
pub fn clean_jurisdiction(raw: &str) -> Option<String> {
    let mut phrase = collapse_whitespace(raw);

    let lower = phrase.to_ascii_lowercase();
    if let Some(cut) = TRAILING_QUALIFIERS
        .iter()
        .filter_map(|q| lower.find(q))
        .min()
    {
        phrase.truncate(cut);
    }

    let phrase = phrase
        .strip_prefix("the ")
        .or_else(|| phrase.strip_prefix("The "))
        .unwrap_or(&phrase)
        .trim_end_matches(|c: char| matches!(c, ',' | '.' | ':' | ';'))
        .trim();

    if phrase.is_empty() || phrase.chars().count() > MAX_JURISDICTION_CHARS {
        return None;
    }
    Some(phrase.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn law(text: &str) -> Option<String> {
        cascade().first(text).map(|c| c.value)
    }

    #[test]
    fn test_state_of_california() {
        let text = "2. Governing Law: This Agreement shall be governed by the laws of the State of California.";
        assert_eq!(law(text).as_deref(), Some("State of California"));
    }

    #[test]
    fn test_conflict_of_laws_qualifier_removed() {
        let text = "This Agreement is governed by and construed in accordance with the laws of the State of New York, without regard to its conflict of laws principles.";
        assert_eq!(law(text).as_deref(), Some("State of New York"));
    }

    #[test]
    fn test_wrapped_line() {
        let text = "shall be governed by the laws of the\nState of Delaware.";
        assert_eq!(law(text).as_deref(), Some("State of Delaware"));
    }

    #[test]
    fn test_unterminated_clause_stops_at_next_section() {
        let text = "2. Governing Law: This Agreement shall be governed by the laws of the State of California\n\n3. Liability: In no event shall liability exceed $100,000 USD.";
        assert_eq!(law(text).as_deref(), Some("State of California"));

        let found = cascade().first(text).unwrap();
        assert!(found.evidence.excerpt.ends_with("State of California"));
    }

    #[test]
    fn test_unterminated_clause_stops_at_label_line() {
        let text = "Governing Law: governed by the laws of Delaware\nSigned:\nJohn Smith, CEO, Acme Corporation\n";
        assert_eq!(law(text).as_deref(), Some("Delaware"));
    }

    #[test]
    fn test_shall_govern() {
        let text = "The laws of England and Wales shall govern this Agreement.";
        assert_eq!(law(text).as_deref(), Some("England and Wales"));
    }

    #[test]
    fn test_heading_with_jurisdiction() {
        assert_eq!(law("12. Governing Law: Ontario\n").as_deref(), Some("Ontario"));
        assert_eq!(law("Governing Law: This Agreement is subject to review\n"), None);
    }

    #[test]
    fn test_no_clause() {
        assert_eq!(law("No jurisdiction is mentioned here."), None);
        assert_eq!(law(""), None);
    }
}

//! Party extraction.
//!
//! Parties are capitalized names adjacent to role markers. All strategies
//! contribute; results are deduplicated by normalized name in order of first
//! appearance.

use std::collections::HashSet;

use crate::evidence::Evidence;
use crate::patterns::{
    collapse_whitespace, PARTIES_BETWEEN, PARTY_LABEL_LINE, PARTY_LETTER, PARTY_WITH_ROLE,
};
use crate::types::FieldKind;

use super::{Candidate, Cascade, FieldStrategy};

/// Leading words that the name pattern can pick up but are not part of a name.
const LEADING_CONNECTORS: &[&str] = &["between", "and", "by", "with", "among", "of"];

/// Words that on their own never form a party name.
const GENERIC_WORDS: &[&str] = &[
    "the", "this", "that", "agreement", "parties", "party", "effective", "date", "non-disclosure",
    "nda", "contract",
];

/// Corporate suffixes written with a closing period.
const ABBREVIATIONS: &[&str] = &["inc", "corp", "co", "ltd", "bros", "jr", "sr", "plc"];

/// `Acme Corporation ("Disclosing Party")`
pub struct RoleMarkerStrategy;

impl FieldStrategy<String> for RoleMarkerStrategy {
    fn name(&self) -> &'static str {
        "role_marker"
    }

    fn attempt(&self, text: &str) -> Vec<Candidate<String>> {
        PARTY_WITH_ROLE
            .captures_iter(text)
            .filter_map(|caps| {
                let m = caps.get(1)?;
                candidate(self.name(), text, m.start(), m.end(), m.as_str())
            })
            .collect()
    }
}

/// `between Acme Corporation and Tech Solutions Inc`
pub struct BetweenStrategy;

impl FieldStrategy<String> for BetweenStrategy {
    fn name(&self) -> &'static str {
        "between_and"
    }

    fn attempt(&self, text: &str) -> Vec<Candidate<String>> {
        let mut found = Vec::new();
        for caps in PARTIES_BETWEEN.captures_iter(text) {
            for group in [1, 2] {
                if let Some(m) = caps.get(group) {
                    found.extend(candidate(self.name(), text, m.start(), m.end(), m.as_str()));
                }
            }
        }
        found
    }
}

/// `Receiving Party: Tech Solutions Inc`
pub struct LabelLineStrategy;

impl FieldStrategy<String> for LabelLineStrategy {
    fn name(&self) -> &'static str {
        "label_line"
    }

    fn attempt(&self, text: &str) -> Vec<Candidate<String>> {
        PARTY_LABEL_LINE
            .captures_iter(text)
            .filter_map(|caps| {
                let m = caps.get(1)?;
                candidate(self.name(), text, m.start(), m.end(), m.as_str())
            })
            .collect()
    }
}

/// Bare `Party A` / `Party B` placeholders.
pub struct PartyLetterStrategy;

impl FieldStrategy<String> for PartyLetterStrategy {
    fn name(&self) -> &'static str {
        "party_letter"
    }

    fn attempt(&self, text: &str) -> Vec<Candidate<String>> {
        PARTY_LETTER
            .find_iter(text)
            .filter_map(|m| candidate(self.name(), text, m.start(), m.end(), m.as_str()))
            .collect()
    }
}

/// The default party cascade.
pub fn cascade() -> Cascade<String> {
    Cascade::new(FieldKind::Parties)
        .with(RoleMarkerStrategy)
        .with(BetweenStrategy)
        .with(LabelLineStrategy)
        .with(PartyLetterStrategy)
}

/// Deduplicate position-ordered candidates by normalized name.
pub fn dedupe(candidates: Vec<Candidate<String>>) -> Vec<Candidate<String>> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|c| seen.insert(normalize(&c.value)))
        .collect()
}

/// Comparison key: case-folded, single-spaced, without trailing periods.
pub fn normalize(name: &str) -> String {
    collapse_whitespace(name)
        .trim_end_matches('.')
        .to_lowercase()
}

fn candidate(
    strategy: &'static str,
    text: &str,
    start: usize,
    end: usize,
    raw: &str,
) -> Option<Candidate<String>> {
    let name = clean_name(raw)?;
    Some(Candidate::new(
        name,
        Evidence::from_text(FieldKind::Parties, strategy, text, start, end),
    ))
}

/// Trim connectors and punctuation; reject generic phrases.
fn clean_name(raw: &str) -> Option<String> {
    let collapsed = collapse_whitespace(raw);
    let mut words: Vec<&str> = collapsed.split(' ').collect();

    while let Some(first) = words.first() {
        if LEADING_CONNECTORS.contains(&first.to_lowercase().as_str()) {
            words.remove(0);
        } else {
            break;
        }
    }

    let name = words
        .join(" ")
        .trim_matches(|c: char| matches!(c, ',' | ';' | ':' | '"' | '\'' | '“' | '”'))
        .to_string();

    // A trailing period is sentence punctuation unless it closes an abbreviation.
    let name = match name.strip_suffix('.') {
        Some(stripped) if !ends_with_abbreviation(stripped) => stripped.to_string(),
        _ => name,
    };

    if name.is_empty() {
        return None;
    }

    let all_generic = name
        .split(' ')
        .all(|w| GENERIC_WORDS.contains(&w.trim_end_matches('.').to_lowercase().as_str()));
    if all_generic {
        return None;
    }

    Some(name)
}

fn ends_with_abbreviation(name: &str) -> bool {
    let last = name.rsplit(' ').next().unwrap_or_default();
    last.contains('.') || ABBREVIATIONS.contains(&last.to_lowercase().as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(text: &str) -> Vec<String> {
        dedupe(cascade().collect(text))
            .into_iter()
            .map(|c| c.value)
            .collect()
    }

    #[test]
    fn test_role_markers_in_nda() {
        let text = r#"This Agreement is entered into by and between Acme Corporation ("Disclosing Party") and Tech Solutions Inc ("Receiving Party")."#;
        assert_eq!(names(text), vec!["Acme Corporation", "Tech Solutions Inc"]);
    }

    #[test]
    fn test_formal_preamble_with_descriptors() {
        let text = r#"This Consulting Agreement is made by and between Acme Corporation, a Delaware corporation ("Company"), and Beta LLC, a New York limited liability company ("Consultant")."#;
        assert_eq!(names(text), vec!["Acme Corporation", "Beta LLC"]);
    }

    #[test]
    fn test_non_ascii_names() {
        let text = r#"Société Générale ("Disclosing Party") and Müller GmbH ("Receiving Party")"#;
        assert_eq!(names(text), vec!["Société Générale", "Müller GmbH"]);
    }

    #[test]
    fn test_party_letters() {
        assert_eq!(
            names("Simple agreement between Party A and Party B."),
            vec!["Party A", "Party B"]
        );
    }

    #[test]
    fn test_label_lines() {
        let text = "Disclosing Party: Globex LLC\nReceiving Party: Initech Inc.\n";
        assert_eq!(names(text), vec!["Globex LLC", "Initech Inc."]);
    }

    #[test]
    fn test_dedupe_is_case_and_period_insensitive() {
        let text = r#"between ACME Corp. (the "Company") and Beta LLC. Acme Corp ("Company") agrees."#;
        assert_eq!(names(text), vec!["ACME Corp.", "Beta LLC"]);
    }

    #[test]
    fn test_generic_phrases_rejected() {
        assert!(clean_name("This Agreement").is_none());
        assert!(clean_name("between The Parties").is_none());
        assert_eq!(clean_name("between Globex").as_deref(), Some("Globex"));
    }

    #[test]
    fn test_no_parties() {
        assert!(names("").is_empty());
        assert!(names("lorem ipsum dolor sit amet").is_empty());
    }
}

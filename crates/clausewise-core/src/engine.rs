//! Extraction engine: runs every field cascade over the (possibly truncated)
//! text and assembles the typed record.
//!
//! The engine applies fixed assembly rules:
//! 1. Oversized input is truncated first (head + tail kept)
//! 2. Each field cascade runs independently of the others
//! 3. Single-valued fields take the first candidate of the highest-priority
//!    strategy that matched
//! 4. Multi-valued fields merge all strategies, ordered by position and
//!    deduplicated

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use crate::evidence::Evidence;
use crate::extractors::{
    dates, governing_law, liability, parties, signatures, Candidate, Cascade,
};
use crate::truncate::TruncationPolicy;
use crate::types::{ExtractedFields, LiabilityCap, Signature};

/// Result of an extraction with its supporting evidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    /// The extracted fields
    pub fields: ExtractedFields,

    /// One evidence record per extracted value, in field order
    pub evidence: Vec<Evidence>,

    /// Whether the input was truncated before scanning
    pub truncated: bool,
}

/// The extraction engine.
///
/// Holds one cascade per field. Construct once and reuse; extraction takes
/// `&self` and keeps no state between calls.
pub struct ExtractionEngine {
    policy: TruncationPolicy,
    parties: Cascade<String>,
    effective_date: Cascade<NaiveDate>,
    governing_law: Cascade<String>,
    liability_cap: Cascade<LiabilityCap>,
    signatures: Cascade<Signature>,
}

impl ExtractionEngine {
    /// Create an engine with the default strategies and truncation policy.
    pub fn new() -> Self {
        Self::with_policy(TruncationPolicy::default())
    }

    /// Create an engine with the default strategies and a custom policy.
    pub fn with_policy(policy: TruncationPolicy) -> Self {
        Self {
            policy,
            parties: parties::cascade(),
            effective_date: dates::cascade(),
            governing_law: governing_law::cascade(),
            liability_cap: liability::cascade(),
            signatures: signatures::cascade(),
        }
    }

    pub fn policy(&self) -> TruncationPolicy {
        self.policy
    }

    /// Mutable access to the party cascade for adding strategies.
    pub fn parties_mut(&mut self) -> &mut Cascade<String> {
        &mut self.parties
    }

    pub fn effective_date_mut(&mut self) -> &mut Cascade<NaiveDate> {
        &mut self.effective_date
    }

    /// Mutable access to the governing-law cascade for adding strategies.
    pub fn governing_law_mut(&mut self) -> &mut Cascade<String> {
        &mut self.governing_law
    }

    pub fn liability_cap_mut(&mut self) -> &mut Cascade<LiabilityCap> {
        &mut self.liability_cap
    }

    pub fn signatures_mut(&mut self) -> &mut Cascade<Signature> {
        &mut self.signatures
    }

    /// Extract fields. Never fails; missing fields are `None` or empty.
    pub fn extract(&self, text: &str) -> ExtractedFields {
        self.extract_with_evidence(text).fields
    }

    /// Extract fields along with evidence for every value found.
    pub fn extract_with_evidence(&self, text: &str) -> Extraction {
        let scanned = self.policy.apply(text);
        let truncated = matches!(scanned, Cow::Owned(_));
        if truncated {
            tracing::debug!(
                original_chars = text.chars().count(),
                max_chars = self.policy.max_chars,
                "Input truncated before extraction"
            );
        }
        let scanned = scanned.as_ref();

        let mut evidence = Vec::new();

        let parties = parties::dedupe(self.parties.collect(scanned));
        let effective_date = self.effective_date.first(scanned);
        let governing_law = self.governing_law.first(scanned);
        let liability_cap = self.liability_cap.first(scanned);
        let signatures = signatures::dedupe(self.signatures.collect(scanned));

        let fields = ExtractedFields {
            parties: take_all(parties, &mut evidence),
            effective_date: take_one(effective_date, &mut evidence),
            governing_law: take_one(governing_law, &mut evidence),
            liability_cap: take_one(liability_cap, &mut evidence),
            signatures: take_all(signatures, &mut evidence),
        };

        tracing::debug!(
            parties = fields.parties.len(),
            effective_date = fields.effective_date.is_some(),
            governing_law = fields.governing_law.is_some(),
            liability_cap = fields.liability_cap.is_some(),
            signatures = fields.signatures.len(),
            "Extraction complete"
        );

        Extraction {
            fields,
            evidence,
            truncated,
        }
    }
}

impl Default for ExtractionEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn take_one<T>(candidate: Option<Candidate<T>>, evidence: &mut Vec<Evidence>) -> Option<T> {
    candidate.map(|c| {
        evidence.push(c.evidence);
        c.value
    })
}

fn take_all<T>(candidates: Vec<Candidate<T>>, evidence: &mut Vec<Evidence>) -> Vec<T> {
    candidates
        .into_iter()
        .map(|c| {
            evidence.push(c.evidence);
            c.value
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::FieldStrategy;
    use crate::types::FieldKind;

    const SAMPLE_NDA: &str = r#"
    NON-DISCLOSURE AGREEMENT

    This Agreement is entered into as of January 15, 2024 (the "Effective Date")
    by and between Acme Corporation ("Disclosing Party") and Tech Solutions Inc ("Receiving Party").

    1. Term: This Agreement shall remain in effect for a period of two (2) years from the Effective Date.

    2. Governing Law: This Agreement shall be governed by the laws of the State of California.

    3. Liability: In no event shall either party's liability exceed $100,000 USD.

    Signed:
    John Smith, CEO, Acme Corporation
    Jane Doe, CTO, Tech Solutions Inc
    "#;

    #[test]
    fn test_sample_nda() {
        let fields = ExtractionEngine::new().extract(SAMPLE_NDA);

        assert_eq!(fields.parties, vec!["Acme Corporation", "Tech Solutions Inc"]);
        assert_eq!(fields.effective_date, NaiveDate::from_ymd_opt(2024, 1, 15));
        assert_eq!(fields.governing_law.as_deref(), Some("State of California"));
        let cap = fields.liability_cap.unwrap();
        assert_eq!(cap.amount, 100_000.0);
        assert_eq!(cap.currency, "USD");
        assert_eq!(fields.signatures.len(), 2);
        assert_eq!(fields.signatures[1].company.as_deref(), Some("Tech Solutions Inc"));
    }

    #[test]
    fn test_evidence_per_value() {
        let extraction = ExtractionEngine::new().extract_with_evidence(SAMPLE_NDA);
        // 2 parties + date + law + cap + 2 signatures
        assert_eq!(extraction.evidence.len(), 7);
        assert!(!extraction.truncated);
        assert!(extraction
            .evidence
            .iter()
            .any(|e| e.field == FieldKind::GoverningLaw && e.strategy == "governed_by"));
    }

    #[test]
    fn test_empty_input() {
        let extraction = ExtractionEngine::new().extract_with_evidence("");
        assert_eq!(extraction.fields, ExtractedFields::default());
        assert!(extraction.evidence.is_empty());
    }

    #[test]
    fn test_truncation_keeps_head_and_tail() {
        let mut text = String::from(
            "This Agreement is dated 2024-01-15 between Acme Corporation and Beta LLC.\n",
        );
        text.push_str(&"Lorem ipsum dolor sit amet. ".repeat(5_000));
        text.push_str("\nJohn Smith, CEO, Acme Corporation\n");

        let engine = ExtractionEngine::with_policy(TruncationPolicy::new(2_000));
        let extraction = engine.extract_with_evidence(&text);

        assert!(extraction.truncated);
        assert_eq!(extraction.fields.parties, vec!["Acme Corporation", "Beta LLC"]);
        assert!(extraction.fields.effective_date.is_some());
        assert_eq!(extraction.fields.signatures.len(), 1);
    }

    #[test]
    fn test_custom_strategy_extends_cascade() {
        struct Jurisdiction;

        impl FieldStrategy<String> for Jurisdiction {
            fn name(&self) -> &'static str {
                "venue"
            }

            fn attempt(&self, text: &str) -> Vec<Candidate<String>> {
                text.find("courts of Ontario")
                    .map(|start| {
                        Candidate::new(
                            "Ontario".to_string(),
                            Evidence::from_text(FieldKind::GoverningLaw, "venue", text, start, start + 17),
                        )
                    })
                    .into_iter()
                    .collect()
            }
        }

        let mut engine = ExtractionEngine::new();
        engine.governing_law_mut().push(Box::new(Jurisdiction));
        let fields = engine.extract("Disputes go to the courts of Ontario.");
        assert_eq!(fields.governing_law.as_deref(), Some("Ontario"));
    }

    #[test]
    fn test_every_cascade_is_extensible() {
        struct Commencement;

        impl FieldStrategy<NaiveDate> for Commencement {
            fn name(&self) -> &'static str {
                "commencement"
            }

            fn attempt(&self, text: &str) -> Vec<Candidate<NaiveDate>> {
                let Some(start) = text.find("commences 2025-03-01") else {
                    return Vec::new();
                };
                NaiveDate::from_ymd_opt(2025, 3, 1)
                    .map(|date| {
                        Candidate::new(
                            date,
                            Evidence::from_text(FieldKind::EffectiveDate, "commencement", text, start, start + 20),
                        )
                    })
                    .into_iter()
                    .collect()
            }
        }

        struct Uncapped;

        impl FieldStrategy<LiabilityCap> for Uncapped {
            fn name(&self) -> &'static str {
                "uncapped"
            }

            fn attempt(&self, _text: &str) -> Vec<Candidate<LiabilityCap>> {
                Vec::new()
            }
        }

        struct NoSignatures;

        impl FieldStrategy<Signature> for NoSignatures {
            fn name(&self) -> &'static str {
                "none"
            }

            fn attempt(&self, _text: &str) -> Vec<Candidate<Signature>> {
                Vec::new()
            }
        }

        let mut engine = ExtractionEngine::new();
        engine.effective_date_mut().push(Box::new(Commencement));
        engine.liability_cap_mut().push(Box::new(Uncapped));
        engine.signatures_mut().push(Box::new(NoSignatures));

        let fields = engine.extract("The service commences 2025-03-01 at noon.");
        assert_eq!(fields.effective_date, NaiveDate::from_ymd_opt(2025, 3, 1));
        assert!(fields.liability_cap.is_none());
        assert!(fields.signatures.is_empty());
    }
}

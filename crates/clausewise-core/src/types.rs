//! Core types for contract field extraction.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Structured fields extracted from a contract.
///
/// Every field degrades independently: a missing clause yields `None` or an
/// empty list, never an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedFields {
    /// Named parties in order of first appearance
    #[serde(default)]
    pub parties: Vec<String>,

    /// Normalized effective date (serialized as `YYYY-MM-DD`)
    #[serde(default)]
    pub effective_date: Option<NaiveDate>,

    /// Jurisdiction named by the governing-law clause
    #[serde(default)]
    pub governing_law: Option<String>,

    /// Liability cap, if a limitation clause carries an amount
    #[serde(default)]
    pub liability_cap: Option<LiabilityCap>,

    /// Signature block entries in document order
    #[serde(default)]
    pub signatures: Vec<Signature>,
}

impl ExtractedFields {
    /// True when no field was found at all.
    pub fn is_empty(&self) -> bool {
        self.parties.is_empty()
            && self.effective_date.is_none()
            && self.governing_law.is_none()
            && self.liability_cap.is_none()
            && self.signatures.is_empty()
    }
}

/// A monetary cap on liability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiabilityCap {
    /// Numeric amount with magnitude words applied (e.g. "$2 million" -> 2000000)
    pub amount: f64,

    /// ISO 4217 currency code
    pub currency: String,
}

impl fmt::Display for LiabilityCap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:.2}", self.currency, self.amount)
    }
}

/// One signer from the signature block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signature {
    pub name: String,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub company: Option<String>,
}

/// The extractable fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Parties,
    EffectiveDate,
    GoverningLaw,
    LiabilityCap,
    Signatures,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Parties => "parties",
            FieldKind::EffectiveDate => "effective_date",
            FieldKind::GoverningLaw => "governing_law",
            FieldKind::LiabilityCap => "liability_cap",
            FieldKind::Signatures => "signatures",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_empty() {
        let fields = ExtractedFields::default();
        assert!(fields.is_empty());
        assert!(fields.parties.is_empty());
    }

    #[test]
    fn test_serializes_date_as_iso() {
        let fields = ExtractedFields {
            effective_date: NaiveDate::from_ymd_opt(2024, 1, 15),
            ..Default::default()
        };
        let json = serde_json::to_value(&fields).unwrap();
        assert_eq!(json["effective_date"], "2024-01-15");
        assert!(json["governing_law"].is_null());
        assert_eq!(json["parties"], serde_json::json!([]));
    }

    #[test]
    fn test_deserializes_partial_payload() {
        let fields: ExtractedFields =
            serde_json::from_str(r#"{"parties": ["Acme Corporation"]}"#).unwrap();
        assert_eq!(fields.parties, vec!["Acme Corporation"]);
        assert!(fields.effective_date.is_none());
    }
}

//! Contract audit: risk rules evaluated over the text and its extraction.
//!
//! Each rule is independent and answers one question about the contract.
//! The auditor aggregates with a single rule: overall risk is the highest
//! severity among the findings, and a contract with no findings is `Low`.

mod language;
mod missing;

pub use language::{AutoRenewalRule, BroadIndemnityRule, UnlimitedLiabilityRule};
pub use missing::{
    FewPartiesRule, MissingEffectiveDateRule, MissingGoverningLawRule, MissingLiabilityCapRule,
    MissingSignaturesRule,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::engine::Extraction;

/// Finding severity. Ordered `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A span of the audited text that triggered a finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    /// Pointer into the audited text (e.g., "text[120:161]")
    pub pointer: String,
    pub excerpt: String,
}

impl Citation {
    pub fn from_span(text: &str, start: usize, end: usize) -> Self {
        Self {
            pointer: crate::evidence::pointer(start, end),
            excerpt: crate::evidence::excerpt(text, start, end),
        }
    }
}

/// One issue raised by a rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditFinding {
    pub rule_id: String,
    pub title: String,
    pub severity: Severity,
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citation: Option<Citation>,
}

/// The result of auditing one contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    /// Stored document id, when the audit ran through a library
    #[serde(default)]
    pub document_id: Option<String>,

    /// Findings in rule order
    pub findings: Vec<AuditFinding>,

    /// Highest finding severity, `Low` when there are none
    pub risk: Severity,

    pub summary: String,

    pub audited_at: DateTime<Utc>,
}

impl AuditReport {
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }
}

/// What a rule sees: the full text and the extraction made from it.
#[derive(Debug, Clone, Copy)]
pub struct AuditContext<'a> {
    pub text: &'a str,
    pub extraction: &'a Extraction,
}

/// Trait implemented by all audit rules.
pub trait AuditRule: Send + Sync {
    /// Stable rule identifier (e.g., "GL-1")
    fn id(&self) -> &'static str;

    /// Short human-readable title
    fn title(&self) -> &'static str;

    fn severity(&self) -> Severity;

    /// Check the contract. `None` means the rule found nothing to report.
    fn check(&self, ctx: &AuditContext<'_>) -> Option<AuditFinding>;

    /// Build a finding attributed to this rule.
    fn finding(&self, message: impl Into<String>, citation: Option<Citation>) -> AuditFinding
    where
        Self: Sized,
    {
        AuditFinding {
            rule_id: self.id().to_string(),
            title: self.title().to_string(),
            severity: self.severity(),
            message: message.into(),
            citation,
        }
    }
}

/// Runs every registered rule and aggregates the findings.
pub struct Auditor {
    rules: Vec<Box<dyn AuditRule>>,
}

impl Auditor {
    /// Create an auditor with the default rule set.
    pub fn new() -> Self {
        Self::empty()
            .with(MissingGoverningLawRule)
            .with(MissingLiabilityCapRule)
            .with(UnlimitedLiabilityRule)
            .with(MissingSignaturesRule)
            .with(MissingEffectiveDateRule)
            .with(FewPartiesRule)
            .with(AutoRenewalRule)
            .with(BroadIndemnityRule)
    }

    /// Create an auditor with no rules.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn with(mut self, rule: impl AuditRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn rule_ids(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.id()).collect()
    }

    /// Extract and audit a raw contract text.
    pub fn audit(&self, text: &str) -> AuditReport {
        let extraction = crate::extract_with_evidence(text);
        self.audit_extraction(None, text, &extraction)
    }

    /// Audit a contract whose extraction has already been made.
    pub fn audit_extraction(
        &self,
        document_id: Option<&str>,
        text: &str,
        extraction: &Extraction,
    ) -> AuditReport {
        let ctx = AuditContext { text, extraction };

        let findings: Vec<AuditFinding> = self
            .rules
            .iter()
            .filter_map(|rule| {
                let finding = rule.check(&ctx);
                if finding.is_some() {
                    tracing::debug!(rule_id = rule.id(), "Audit rule raised a finding");
                }
                finding
            })
            .collect();

        let risk = findings
            .iter()
            .map(|f| f.severity)
            .max()
            .unwrap_or(Severity::Low);
        let summary = self.build_summary(&findings, risk);

        tracing::info!(
            document_id = document_id.unwrap_or("-"),
            findings = findings.len(),
            risk = %risk,
            "Audit complete"
        );

        AuditReport {
            document_id: document_id.map(str::to_string),
            findings,
            risk,
            summary,
            audited_at: Utc::now(),
        }
    }

    fn build_summary(&self, findings: &[AuditFinding], risk: Severity) -> String {
        if findings.is_empty() {
            return format!("No issues found. {} rules checked.", self.rules.len());
        }
        let titles: Vec<&str> = findings.iter().map(|f| f.title.as_str()).collect();
        format!(
            "{} issue(s) found, overall risk {}: {}.",
            findings.len(),
            risk,
            titles.join("; ")
        )
    }
}

impl Default for Auditor {
    fn default() -> Self {
        Self::new()
    }
}

//! Rules raised by risky clause language in the text itself.

use regex::Regex;

use crate::patterns::{AUTO_RENEWAL, BROAD_INDEMNITY, UNLIMITED_LIABILITY};

use super::{AuditContext, AuditFinding, AuditRule, Citation, Severity};

fn cite(pattern: &Regex, text: &str) -> Option<Citation> {
    pattern
        .find(text)
        .map(|m| Citation::from_span(text, m.start(), m.end()))
}

/// LC-2: liability expressly left unlimited.
pub struct UnlimitedLiabilityRule;

impl AuditRule for UnlimitedLiabilityRule {
    fn id(&self) -> &'static str {
        "LC-2"
    }

    fn title(&self) -> &'static str {
        "Unlimited liability"
    }

    fn severity(&self) -> Severity {
        Severity::High
    }

    fn check(&self, ctx: &AuditContext<'_>) -> Option<AuditFinding> {
        let citation = cite(&UNLIMITED_LIABILITY, ctx.text)?;
        Some(self.finding(
            "The contract contains language leaving liability unlimited.",
            Some(citation),
        ))
    }
}

/// AR-1: evergreen renewal.
pub struct AutoRenewalRule;

impl AuditRule for AutoRenewalRule {
    fn id(&self) -> &'static str {
        "AR-1"
    }

    fn title(&self) -> &'static str {
        "Automatic renewal"
    }

    fn severity(&self) -> Severity {
        Severity::Low
    }

    fn check(&self, ctx: &AuditContext<'_>) -> Option<AuditFinding> {
        let citation = cite(&AUTO_RENEWAL, ctx.text)?;
        Some(self.finding(
            "The term renews automatically unless a party gives notice.",
            Some(citation),
        ))
    }
}

/// IN-1: indemnity covering "any and all" claims.
pub struct BroadIndemnityRule;

impl AuditRule for BroadIndemnityRule {
    fn id(&self) -> &'static str {
        "IN-1"
    }

    fn title(&self) -> &'static str {
        "Broad indemnity"
    }

    fn severity(&self) -> Severity {
        Severity::Medium
    }

    fn check(&self, ctx: &AuditContext<'_>) -> Option<AuditFinding> {
        let citation = cite(&BROAD_INDEMNITY, ctx.text)?;
        Some(self.finding(
            "The indemnity extends to any and all claims.",
            Some(citation),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Extraction;
    use crate::types::ExtractedFields;

    fn check(rule: &dyn AuditRule, text: &str) -> Option<AuditFinding> {
        let extraction = Extraction {
            fields: ExtractedFields::default(),
            evidence: vec![],
            truncated: false,
        };
        rule.check(&AuditContext { text, extraction: &extraction })
    }

    #[test]
    fn test_unlimited_liability_cites_span() {
        let text = "Notwithstanding the above, the Supplier accepts unlimited liability for breach.";
        let finding = check(&UnlimitedLiabilityRule, text).unwrap();
        let citation = finding.citation.unwrap();
        assert_eq!(citation.excerpt, "unlimited liability");
        assert_eq!(citation.pointer, "text[48:67]");
    }

    #[test]
    fn test_auto_renewal() {
        assert!(check(&AutoRenewalRule, "This Agreement will automatically renew each year.").is_some());
        assert!(check(&AutoRenewalRule, "This Agreement expires after two years.").is_none());
    }

    #[test]
    fn test_broad_indemnity_within_sentence() {
        assert!(check(
            &BroadIndemnityRule,
            "Customer shall indemnify Vendor from any and all losses."
        )
        .is_some());
        assert!(check(
            &BroadIndemnityRule,
            "Customer shall indemnify Vendor for direct losses. Any and all notices go by email."
        )
        .is_none());
    }
}

//! Rules raised by fields the extraction could not find.

use super::{AuditContext, AuditFinding, AuditRule, Severity};

/// GL-1: no governing law clause.
pub struct MissingGoverningLawRule;

impl AuditRule for MissingGoverningLawRule {
    fn id(&self) -> &'static str {
        "GL-1"
    }

    fn title(&self) -> &'static str {
        "Missing governing law"
    }

    fn severity(&self) -> Severity {
        Severity::Medium
    }

    fn check(&self, ctx: &AuditContext<'_>) -> Option<AuditFinding> {
        ctx.extraction.fields.governing_law.is_none().then(|| {
            self.finding(
                "No governing law clause was found; the applicable jurisdiction is unclear.",
                None,
            )
        })
    }
}

/// LC-1: no liability cap.
pub struct MissingLiabilityCapRule;

impl AuditRule for MissingLiabilityCapRule {
    fn id(&self) -> &'static str {
        "LC-1"
    }

    fn title(&self) -> &'static str {
        "No liability cap"
    }

    fn severity(&self) -> Severity {
        Severity::High
    }

    fn check(&self, ctx: &AuditContext<'_>) -> Option<AuditFinding> {
        ctx.extraction.fields.liability_cap.is_none().then(|| {
            self.finding("No monetary limit on liability was detected.", None)
        })
    }
}

/// SG-1: no signature block.
pub struct MissingSignaturesRule;

impl AuditRule for MissingSignaturesRule {
    fn id(&self) -> &'static str {
        "SG-1"
    }

    fn title(&self) -> &'static str {
        "No signature block"
    }

    fn severity(&self) -> Severity {
        Severity::Medium
    }

    fn check(&self, ctx: &AuditContext<'_>) -> Option<AuditFinding> {
        ctx.extraction.fields.signatures.is_empty().then(|| {
            self.finding("No signers were found at the end of the document.", None)
        })
    }
}

/// ED-1: no effective date.
pub struct MissingEffectiveDateRule;

impl AuditRule for MissingEffectiveDateRule {
    fn id(&self) -> &'static str {
        "ED-1"
    }

    fn title(&self) -> &'static str {
        "No effective date"
    }

    fn severity(&self) -> Severity {
        Severity::Low
    }

    fn check(&self, ctx: &AuditContext<'_>) -> Option<AuditFinding> {
        ctx.extraction.fields.effective_date.is_none().then(|| {
            self.finding("No labelled effective date was found.", None)
        })
    }
}

/// PT-1: fewer than two parties.
pub struct FewPartiesRule;

impl AuditRule for FewPartiesRule {
    fn id(&self) -> &'static str {
        "PT-1"
    }

    fn title(&self) -> &'static str {
        "Fewer than two parties"
    }

    fn severity(&self) -> Severity {
        Severity::Medium
    }

    fn check(&self, ctx: &AuditContext<'_>) -> Option<AuditFinding> {
        let count = ctx.extraction.fields.parties.len();
        (count < 2).then(|| {
            self.finding(
                format!("Only {count} party identified; a contract needs at least two."),
                None,
            )
        })
    }
}

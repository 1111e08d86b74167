//! # clausewise-core
//!
//! Deterministic contract field extraction and risk audit.
//!
//! This crate answers, for a plain-text contract:
//! - Who are the parties, and who signed?
//! - When does it take effect, and under which law?
//! - Is liability capped?
//!
//! ## Key Guarantees
//!
//! 1. **Total**: extraction never fails; missing fields are `None` or empty
//! 2. **Deterministic**: same text always produces the same fields
//! 3. **Traceable**: every extracted value carries a pointer into the text
//! 4. **Independent**: each field is extracted without reference to the others
//!
//! ## Example
//!
//! ```rust,ignore
//! use clausewise_core::{extract_fields, Auditor};
//!
//! let fields = extract_fields(&text);
//! println!("{:?} governed by {:?}", fields.parties, fields.governing_law);
//!
//! let report = Auditor::new().audit(&text);
//! println!("risk: {}", report.risk);
//! ```

pub mod audit;
pub mod engine;
pub mod evidence;
pub mod extractors;
pub mod library;
pub mod patterns;
pub mod store;
pub mod truncate;
pub mod types;

// Re-export main types at crate root
pub use audit::{AuditFinding, AuditReport, AuditRule, Auditor, Citation, Severity};
pub use engine::{Extraction, ExtractionEngine};
pub use evidence::Evidence;
pub use extractors::{parse_date, Candidate, Cascade, DateFormat, FieldStrategy};
pub use library::{DocumentLibrary, LibraryError, LibraryMetrics};
pub use store::{DocumentStore, MemoryStore, StoredDocument};
pub use truncate::TruncationPolicy;
pub use types::{ExtractedFields, FieldKind, LiabilityCap, Signature};

use lazy_static::lazy_static;

lazy_static! {
    static ref DEFAULT_ENGINE: ExtractionEngine = ExtractionEngine::new();
}

/// Extract structured fields from contract text.
///
/// This is the main entry point. It accepts any text, including empty or
/// adversarial input, and never fails.
pub fn extract_fields(text: &str) -> ExtractedFields {
    DEFAULT_ENGINE.extract(text)
}

/// Extract structured fields along with the evidence for each value.
pub fn extract_with_evidence(text: &str) -> Extraction {
    DEFAULT_ENGINE.extract_with_evidence(text)
}

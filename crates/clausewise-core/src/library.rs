//! Document library: ingest, extract and audit against an injected store.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::audit::{AuditReport, Auditor};
use crate::engine::{Extraction, ExtractionEngine};
use crate::store::{DocumentStore, MemoryStore, StoredDocument};
use crate::types::ExtractedFields;

/// Errors from library operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LibraryError {
    #[error("Document '{filename}' has no text")]
    EmptyDocument { filename: String },

    #[error("Document not found: {0}")]
    NotFound(String),
}

/// Operation counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryMetrics {
    pub total_documents: u64,
    pub total_ingests: u64,
    pub total_extractions: u64,
    pub total_audits: u64,
}

#[derive(Debug, Default)]
struct Counters {
    ingests: AtomicU64,
    extractions: AtomicU64,
    audits: AtomicU64,
}

/// Owns a store, the extraction engine and the auditor.
pub struct DocumentLibrary<S: DocumentStore = MemoryStore> {
    store: S,
    engine: ExtractionEngine,
    auditor: Auditor,
    counters: Counters,
}

impl DocumentLibrary<MemoryStore> {
    /// A library backed by a fresh in-memory store.
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }
}

impl<S: DocumentStore> DocumentLibrary<S> {
    pub fn new(store: S) -> Self {
        Self::with_parts(store, ExtractionEngine::new(), Auditor::new())
    }

    pub fn with_parts(store: S, engine: ExtractionEngine, auditor: Auditor) -> Self {
        Self {
            store,
            engine,
            auditor,
            counters: Counters::default(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Store a document and return its id. Blank text is rejected.
    pub fn ingest(&self, filename: &str, text: &str) -> Result<String, LibraryError> {
        if text.trim().is_empty() {
            return Err(LibraryError::EmptyDocument {
                filename: filename.to_string(),
            });
        }

        let document = StoredDocument::new(filename, text);
        let id = document.id.clone();
        self.store.insert(document);
        self.counters.ingests.fetch_add(1, Ordering::Relaxed);

        tracing::info!(document_id = %id, filename, chars = text.chars().count(), "Document ingested");
        Ok(id)
    }

    /// Ingest several documents. Stops at the first rejected document;
    /// documents before it stay ingested.
    pub fn ingest_many<'a, I>(&self, files: I) -> Result<Vec<String>, LibraryError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        files
            .into_iter()
            .map(|(filename, text)| self.ingest(filename, text))
            .collect()
    }

    pub fn get(&self, id: &str) -> Result<StoredDocument, LibraryError> {
        self.store
            .get(id)
            .ok_or_else(|| LibraryError::NotFound(id.to_string()))
    }

    /// Extract fields from a stored document.
    pub fn extract(&self, id: &str) -> Result<ExtractedFields, LibraryError> {
        self.extract_with_evidence(id).map(|e| e.fields)
    }

    pub fn extract_with_evidence(&self, id: &str) -> Result<Extraction, LibraryError> {
        let document = self.get(id)?;
        let extraction = self.engine.extract_with_evidence(&document.text);
        self.counters.extractions.fetch_add(1, Ordering::Relaxed);
        Ok(extraction)
    }

    /// Audit a stored document.
    pub fn audit(&self, id: &str) -> Result<AuditReport, LibraryError> {
        let document = self.get(id)?;
        let extraction = self.engine.extract_with_evidence(&document.text);
        let report = self
            .auditor
            .audit_extraction(Some(&document.id), &document.text, &extraction);
        self.counters.audits.fetch_add(1, Ordering::Relaxed);
        Ok(report)
    }

    pub fn metrics(&self) -> LibraryMetrics {
        LibraryMetrics {
            total_documents: self.store.len() as u64,
            total_ingests: self.counters.ingests.load(Ordering::Relaxed),
            total_extractions: self.counters.extractions.load(Ordering::Relaxed),
            total_audits: self.counters.audits.load(Ordering::Relaxed),
        }
    }

    /// Clear the store and zero every counter.
    pub fn reset(&self) {
        self.store.reset();
        self.counters.ingests.store(0, Ordering::Relaxed);
        self.counters.extractions.store(0, Ordering::Relaxed);
        self.counters.audits.store(0, Ordering::Relaxed);
        tracing::info!("Document library reset");
    }
}

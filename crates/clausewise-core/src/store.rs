//! Document storage.
//!
//! Stores are owned values injected into a [`DocumentLibrary`](crate::DocumentLibrary);
//! there is no process-wide store. `reset` is the only lifecycle operation.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// An ingested contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    /// UUID v4 assigned at ingest
    pub id: String,
    pub filename: String,
    pub text: String,
    pub ingested_at: DateTime<Utc>,
}

impl StoredDocument {
    /// Create a document with a fresh id.
    pub fn new(filename: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            filename: filename.into(),
            text: text.into(),
            ingested_at: Utc::now(),
        }
    }
}

/// Storage backend for ingested documents.
pub trait DocumentStore: Send + Sync {
    /// Insert a document, replacing any document with the same id.
    fn insert(&self, document: StoredDocument);

    fn get(&self, id: &str) -> Option<StoredDocument>;

    /// All documents, ordered by id.
    fn list(&self) -> Vec<StoredDocument>;

    fn remove(&self, id: &str) -> Option<StoredDocument>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every document.
    fn reset(&self);
}

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: RwLock<BTreeMap<String, StoredDocument>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for MemoryStore {
    fn insert(&self, document: StoredDocument) {
        self.documents.write().insert(document.id.clone(), document);
    }

    fn get(&self, id: &str) -> Option<StoredDocument> {
        self.documents.read().get(id).cloned()
    }

    fn list(&self) -> Vec<StoredDocument> {
        self.documents.read().values().cloned().collect()
    }

    fn remove(&self, id: &str) -> Option<StoredDocument> {
        self.documents.write().remove(id)
    }

    fn len(&self) -> usize {
        self.documents.read().len()
    }

    fn reset(&self) {
        self.documents.write().clear();
    }
}

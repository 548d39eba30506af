//! # Document Store Interface
//!
//! The persistence contract the editing service is programmed against.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  DocumentService<S: DocumentStore>                                      │
//! │        │                                                                │
//! │        ├── S = DocumentRepository   → SQLite (production)               │
//! │        └── S = MemoryDocumentStore  → HashMap (tests)                   │
//! │                                                                         │
//! │  The engine holds no ambient or global persistence state; whatever      │
//! │  store it should write through is passed in explicitly.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use devis_core::{Document, DocumentTotals, LineItem};

// =============================================================================
// Store Trait
// =============================================================================

/// Read/write access to documents and their ordered line items.
///
/// `save_document` is the "save pending changes" operation: it must persist
/// the document record (including its cached totals) together with the FULL
/// ordered line set atomically, or fail as a unit with a reportable error.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetches a document by id.
    async fn fetch_document(&self, id: Uuid) -> DbResult<Option<Document>>;

    /// Fetches a document's line items ordered by `position`.
    async fn fetch_line_items(&self, document_id: Uuid) -> DbResult<Vec<LineItem>>;

    /// Atomically saves the document and its complete line set.
    async fn save_document(&self, document: &Document, lines: &[LineItem]) -> DbResult<()>;

    /// Writes only the cached totals columns; the lighter path for a
    /// recompute that changed no line structure.
    async fn save_totals(&self, document_id: Uuid, totals: &DocumentTotals) -> DbResult<()>;

    /// Deletes a document and, cascading, its line items.
    async fn delete_document(&self, id: Uuid) -> DbResult<()>;
}

// =============================================================================
// In-Memory Store
// =============================================================================

/// HashMap-backed [`DocumentStore`] for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    documents: Mutex<HashMap<Uuid, (Document, Vec<LineItem>)>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.documents.lock().expect("store mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn fetch_document(&self, id: Uuid) -> DbResult<Option<Document>> {
        let documents = self.documents.lock().expect("store mutex poisoned");
        Ok(documents.get(&id).map(|(doc, _)| doc.clone()))
    }

    async fn fetch_line_items(&self, document_id: Uuid) -> DbResult<Vec<LineItem>> {
        let documents = self.documents.lock().expect("store mutex poisoned");
        let mut lines = documents
            .get(&document_id)
            .map(|(_, lines)| lines.clone())
            .unwrap_or_default();
        lines.sort_by_key(|l| l.position);
        Ok(lines)
    }

    async fn save_document(&self, document: &Document, lines: &[LineItem]) -> DbResult<()> {
        let mut documents = self.documents.lock().expect("store mutex poisoned");
        documents.insert(document.id, (document.clone(), lines.to_vec()));
        Ok(())
    }

    async fn save_totals(&self, document_id: Uuid, totals: &DocumentTotals) -> DbResult<()> {
        let mut documents = self.documents.lock().expect("store mutex poisoned");
        let (document, _) = documents
            .get_mut(&document_id)
            .ok_or_else(|| DbError::not_found("Document", document_id.to_string()))?;
        document.subtotal = totals.subtotal;
        document.tax_total = totals.tax_total;
        document.total = totals.total;
        Ok(())
    }

    async fn delete_document(&self, id: Uuid) -> DbResult<()> {
        let mut documents = self.documents.lock().expect("store mutex poisoned");
        documents
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| DbError::not_found("Document", id.to_string()))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use devis_core::{Document, DocumentKind};

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemoryDocumentStore::new();
        let doc = Document::new(DocumentKind::Invoice, "F2026-0001");
        let id = doc.id;

        store.save_document(&doc, &[]).await.unwrap();
        assert_eq!(store.len(), 1);

        let loaded = store.fetch_document(id).await.unwrap().unwrap();
        assert_eq!(loaded.number, "F2026-0001");
        assert!(store.fetch_line_items(id).await.unwrap().is_empty());

        store.delete_document(id).await.unwrap();
        assert!(store.is_empty());
        assert!(store.delete_document(id).await.is_err());
    }
}

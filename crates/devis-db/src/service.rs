//! # Document Service
//!
//! Persistence-aware editing session: a [`DocumentEditor`] plus an injected
//! [`DocumentStore`].
//!
//! ## Command Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Caller                      DocumentService              DocumentStore │
//! │  ──────                      ───────────────              ───────────── │
//! │                                                                         │
//! │  add_line_item() ──────────► editor mutation                            │
//! │                              (sync recompute) ──────────► save_document │
//! │         ◄────────────────── TotalsSnapshot                              │
//! │                                                                         │
//! │  recalculate(persist=false)► recompute only               (no write)    │
//! │  recalculate(persist=true) ► recompute ─────────────────► save_totals   │
//! │  recalculate_deferred() ───► recompute, return now;                     │
//! │                              tokio::spawn ──────────────► save_document │
//! │                                                                         │
//! │  A failed write is reported (Err / error! log) but never rolls back     │
//! │  the in-memory totals; the next successful write reconciles the store.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use crate::error::DbError;
use crate::store::DocumentStore;
use devis_core::{
    CatalogItem, CoreError, Document, DocumentEditor, DocumentKind, DocumentStatus, LineItem,
    LineItemUpdate, Money, NewLineItem, TotalsSnapshot,
};

// =============================================================================
// Service Error
// =============================================================================

/// What editing callers see: store failures and editor misuse, unified.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("document not found: {0}")]
    DocumentNotFound(Uuid),

    #[error(transparent)]
    Store(#[from] DbError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

// =============================================================================
// Document Service
// =============================================================================

/// Editing session over one persisted document.
///
/// One service instance per open document; the single-writer assumption of
/// the editor carries over. The store is injected, never ambient.
pub struct DocumentService<S: DocumentStore> {
    store: Arc<S>,
    editor: DocumentEditor,
}

impl<S: DocumentStore + 'static> DocumentService<S> {
    /// Wraps an in-memory document that has not been persisted yet.
    pub fn new(store: Arc<S>, document: Document, lines: Vec<LineItem>) -> Self {
        DocumentService {
            store,
            editor: DocumentEditor::new(document, lines),
        }
    }

    /// Creates a fresh draft and persists it immediately.
    pub async fn create(
        store: Arc<S>,
        kind: DocumentKind,
        number: impl Into<String>,
    ) -> ServiceResult<Self> {
        let service = Self::new(store, Document::new(kind, number), Vec::new());
        service.persist().await?;
        info!(id = %service.editor.document().id, "Document created");
        Ok(service)
    }

    /// Loads an existing document into an editing session.
    pub async fn open(store: Arc<S>, id: Uuid) -> ServiceResult<Self> {
        let document = store
            .fetch_document(id)
            .await?
            .ok_or(ServiceError::DocumentNotFound(id))?;
        let lines = store.fetch_line_items(id).await?;
        Ok(Self::new(store, document, lines))
    }

    /// Read access to the underlying editor (totals, lines, findings).
    pub fn editor(&self) -> &DocumentEditor {
        &self.editor
    }

    // -------------------------------------------------------------------------
    // Line Mutations (mutate → recompute → persist)
    // -------------------------------------------------------------------------

    pub async fn add_line_item(&mut self, input: NewLineItem) -> ServiceResult<TotalsSnapshot> {
        let snapshot = self.editor.add_line_item(input)?;
        self.persist().await?;
        Ok(snapshot)
    }

    pub async fn add_line_from_catalog(
        &mut self,
        item: &CatalogItem,
    ) -> ServiceResult<TotalsSnapshot> {
        let snapshot = self.editor.add_line_from_catalog(item)?;
        self.persist().await?;
        Ok(snapshot)
    }

    pub async fn update_line_item(
        &mut self,
        index: usize,
        update: LineItemUpdate,
    ) -> ServiceResult<TotalsSnapshot> {
        let snapshot = self.editor.update_line_item(index, update)?;
        self.persist().await?;
        Ok(snapshot)
    }

    pub async fn remove_line_items(&mut self, indices: &[usize]) -> ServiceResult<TotalsSnapshot> {
        let snapshot = self.editor.remove_line_items(indices);
        self.persist().await?;
        Ok(snapshot)
    }

    pub async fn move_line_item(
        &mut self,
        from: usize,
        to: usize,
    ) -> ServiceResult<TotalsSnapshot> {
        let snapshot = self.editor.move_line_item(from, to)?;
        self.persist().await?;
        Ok(snapshot)
    }

    pub async fn duplicate_line_item(&mut self, index: usize) -> ServiceResult<TotalsSnapshot> {
        let snapshot = self.editor.duplicate_line_item(index)?;
        self.persist().await?;
        Ok(snapshot)
    }

    pub async fn move_line_up(&mut self, index: usize) -> ServiceResult<TotalsSnapshot> {
        let snapshot = self.editor.move_line_up(index)?;
        self.persist().await?;
        Ok(snapshot)
    }

    pub async fn move_line_down(&mut self, index: usize) -> ServiceResult<TotalsSnapshot> {
        let snapshot = self.editor.move_line_down(index)?;
        self.persist().await?;
        Ok(snapshot)
    }

    // -------------------------------------------------------------------------
    // Document Field Mutations
    // -------------------------------------------------------------------------

    pub async fn set_discount(&mut self, discount: Money) -> ServiceResult<TotalsSnapshot> {
        let snapshot = self.editor.set_discount(discount);
        self.persist().await?;
        Ok(snapshot)
    }

    pub async fn set_number(
        &mut self,
        number: impl Into<String>,
    ) -> ServiceResult<TotalsSnapshot> {
        let snapshot = self.editor.set_number(number);
        self.persist().await?;
        Ok(snapshot)
    }

    pub async fn set_client_name(
        &mut self,
        client_name: Option<String>,
    ) -> ServiceResult<TotalsSnapshot> {
        let snapshot = self.editor.set_client_name(client_name);
        self.persist().await?;
        Ok(snapshot)
    }

    /// Marks the document as sent, refusing while validation findings are
    /// open. This is the one place an incomplete document blocks.
    pub async fn mark_sent(&mut self) -> ServiceResult<TotalsSnapshot> {
        if let Some(finding) = self.editor.validation_errors().first() {
            return Err(ServiceError::Core(CoreError::Validation(finding.clone())));
        }
        let snapshot = self.editor.set_status(DocumentStatus::Sent);
        self.persist().await?;
        info!(id = %self.editor.document().id, "Document marked sent");
        Ok(snapshot)
    }

    // -------------------------------------------------------------------------
    // Recomputation & Persistence
    // -------------------------------------------------------------------------

    /// Recomputes totals; with `persist`, writes the cached totals columns
    /// back through the store.
    pub async fn recalculate(&mut self, persist: bool) -> ServiceResult<TotalsSnapshot> {
        let snapshot = self.editor.recalculate();
        if persist {
            let document = self.editor.document();
            self.store
                .save_totals(document.id, &self.editor.totals())
                .await?;
        }
        Ok(snapshot)
    }

    /// Recomputes now, saves later.
    ///
    /// The snapshot is available synchronously; the full save runs on the
    /// Tokio runtime off the calling path. A failed write is logged and the
    /// in-memory state stands — the next successful save reconciles.
    pub fn recalculate_deferred(&mut self) -> TotalsSnapshot {
        let snapshot = self.editor.recalculate();

        let store = Arc::clone(&self.store);
        let document = self.editor.document().clone();
        let lines = self.editor.lines().to_vec();
        tokio::spawn(async move {
            if let Err(error) = store.save_document(&document, &lines).await {
                error!(id = %document.id, %error, "Deferred save failed");
            }
        });

        snapshot
    }

    /// Writes the document and its full line set through the store.
    pub async fn persist(&self) -> ServiceResult<()> {
        self.store
            .save_document(self.editor.document(), self.editor.lines())
            .await?;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

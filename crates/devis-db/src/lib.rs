//! # devis-db: Database Layer for the Devis BTP Engine
//!
//! SQLite persistence for documents and the price catalog, plus the
//! persistence-aware document editing service.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Devis BTP Data Flow                                │
//! │                                                                         │
//! │  Caller (editor UI, API)                                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                     devis-db (THIS CRATE)                       │    │
//! │  │                                                                 │    │
//! │  │   ┌──────────────┐   ┌───────────────┐   ┌──────────────┐       │    │
//! │  │   │   service    │   │  repositories │   │  migrations  │       │    │
//! │  │   │ DocumentSvc  │──►│ DocumentRepo  │   │  (embedded)  │       │    │
//! │  │   │ (devis-core  │   │ CatalogRepo   │   │ 001_init.sql │       │    │
//! │  │   │   editor)    │   │               │   │              │       │    │
//! │  │   └──────────────┘   └───────┬───────┘   └──────────────┘       │    │
//! │  │                              │                                  │    │
//! │  └──────────────────────────────┼──────────────────────────────────┘    │
//! │                                 ▼                                       │
//! │                         SQLite Database                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`store`] - The `DocumentStore` trait + in-memory implementation
//! - [`repository`] - SQLite repositories (documents, catalog)
//! - [`service`] - `DocumentService`: editor + injected store
//!
//! ## Usage
//!
//! ```rust,ignore
//! use devis_db::{Database, DbConfig, DocumentService};
//! use devis_core::DocumentKind;
//! use std::sync::Arc;
//!
//! let db = Database::new(DbConfig::new("path/to/devis.db")).await?;
//! let store = Arc::new(db.documents());
//!
//! let mut session = DocumentService::create(store, DocumentKind::Quote, "D2026-0001").await?;
//! let snapshot = session.add_line_item(line).await?;
//! println!("total: {}", snapshot.total);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod service;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use service::{DocumentService, ServiceError, ServiceResult};
pub use store::{DocumentStore, MemoryDocumentStore};

// Repository re-exports for convenience
pub use repository::catalog::CatalogRepository;
pub use repository::document::DocumentRepository;

//! # Repository Module
//!
//! Database repository implementations for the Devis BTP engine.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  The Repository pattern keeps SQL behind a typed API.                   │
//! │                                                                         │
//! │  DocumentService / caller                                               │
//! │       │                                                                 │
//! │       │  db.documents().get_by_id(id)                                   │
//! │       ▼                                                                 │
//! │  DocumentRepository ── SQL ──► SQLite                                   │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • SQL is isolated in one place per entity                              │
//! │  • The service is tested against DocumentStore, not against SQLite      │
//! │  • Decimal TEXT conversion happens at exactly one boundary              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`document::DocumentRepository`] - documents + line items, implements
//!   the `DocumentStore` trait
//! - [`catalog::CatalogRepository`] - the BTP price library

pub mod catalog;
pub mod document;

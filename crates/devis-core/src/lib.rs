//! # devis-core: Pure Business Logic for the Devis BTP Engine
//!
//! This crate is the **heart** of the document engine. It contains all
//! business logic as pure functions and value types with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Devis BTP Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                 Caller (editor UI, API, CLI)                    │    │
//! │  │   add line ──► move/duplicate ──► set discount ──► read totals  │    │
//! │  └─────────────────────────────┬───────────────────────────────────┘    │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐    │
//! │  │               ★ devis-core (THIS CRATE) ★                       │    │
//! │  │                                                                 │    │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐    │    │
//! │  │   │   types   │  │   money   │  │  totals   │  │  editor   │    │    │
//! │  │   │ Document  │  │   Money   │  │ discount  │  │ mutations │    │    │
//! │  │   │ LineItem  │  │  TaxRate  │  │   ratio   │  │ positions │    │    │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘    │    │
//! │  │                                                                 │    │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS            │    │
//! │  └─────────────────────────────┬───────────────────────────────────┘    │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐    │
//! │  │                  devis-db (Database Layer)                      │    │
//! │  │        SQLite store, catalog, persistence-aware service         │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Document, LineItem, CatalogItem, ...)
//! - [`money`] - Decimal money and VAT rates (no floating point!)
//! - [`totals`] - The discount-ratio totals engine
//! - [`editor`] - Line-item mutation commands with dense positions
//! - [`validation`] - Accumulated document-completeness findings
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same lines + same discount → same totals
//! 2. **No I/O**: database, network, file system access is FORBIDDEN here
//! 3. **Decimal Money**: exact base-10 arithmetic, rounding only at the edge
//! 4. **Explicit Errors**: all errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use devis_core::editor::DocumentEditor;
//! use devis_core::money::{Money, TaxRate};
//! use devis_core::types::{Document, DocumentKind, NewLineItem};
//! use rust_decimal::Decimal;
//!
//! let document = Document::new(DocumentKind::Quote, "D2026-0007");
//! let mut editor = DocumentEditor::new(document, vec![]);
//!
//! editor
//!     .add_line_item(NewLineItem {
//!         description: "Cloison placo BA13".to_string(),
//!         quantity: Decimal::from(12),
//!         unit: Some("m²".to_string()),
//!         unit_price: Money::from_major(35),
//!         tax_rate: TaxRate::intermediate(),
//!     })
//!     .unwrap();
//!
//! let snapshot = editor.set_discount(Money::from_major(20));
//! assert_eq!(snapshot.subtotal, Money::from_major(400));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod editor;
pub mod error;
pub mod money;
pub mod totals;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use devis_core::Money` instead of
// `use devis_core::money::Money`

pub use editor::{DocumentEditor, TotalsSnapshot};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{Money, TaxRate};
pub use totals::{DocumentTotals, TaxLine};
pub use types::*;
pub use validation::AmountPolicy;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default currency for new documents.
///
/// Single-currency runtime for now; the field is already carried per
/// document so multi-currency stays a data change, not a schema change.
pub const DEFAULT_CURRENCY: &str = "EUR";

/// Maximum line items on a single document.
///
/// Real construction documents run to a few hundred lines at most; the cap
/// keeps a runaway import from degrading the editor.
pub const MAX_LINE_ITEMS: usize = 500;

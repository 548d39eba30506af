//! # Domain Types
//!
//! Core domain types for the Devis BTP engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Document     │   │    LineItem     │   │   CatalogItem   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  number         │   │  description    │   │  code (business)│       │
//! │  │  kind, status   │   │  qty, unit_price│   │  name, unit     │       │
//! │  │  discount       │   │  tax_rate       │   │  unit_price     │       │
//! │  │  cached totals  │   │  position       │   │  tax_rate       │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID: (`number` for documents, `code` for catalog items) -
//!   human-readable, potentially mutable

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::money::{Money, TaxRate};

// =============================================================================
// Document Kind
// =============================================================================

/// What kind of commercial document this is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// A binding invoice ("facture").
    #[default]
    Invoice,
    /// An estimate/quote ("devis").
    Quote,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Invoice => "invoice",
            DocumentKind::Quote => "quote",
        }
    }

    pub fn from_str_or_default(s: &str) -> Self {
        match s {
            "quote" => DocumentKind::Quote,
            _ => DocumentKind::Invoice,
        }
    }
}

// =============================================================================
// Document Status
// =============================================================================

/// Lifecycle status of a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    /// Being edited; totals recomputed on every change.
    #[default]
    Draft,
    /// Sent to the client.
    Sent,
    /// Settled.
    Paid,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Draft => "draft",
            DocumentStatus::Sent => "sent",
            DocumentStatus::Paid => "paid",
        }
    }

    pub fn from_str_or_default(s: &str) -> Self {
        match s {
            "sent" => DocumentStatus::Sent,
            "paid" => DocumentStatus::Paid,
            _ => DocumentStatus::Draft,
        }
    }
}

// =============================================================================
// Line Item
// =============================================================================

/// A single priced entry on a document.
///
/// `position` is a dense zero-based ordering key, unique within a document.
/// The editor renumbers positions after every structural mutation so the
/// sequence always matches list order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: Uuid,
    pub description: String,
    /// May be fractional (2.5 m², 0.75 h). Decimal, never a float.
    pub quantity: Decimal,
    /// BTP unit of measure: "m²", "ml", "h", "u", "forfait", ...
    pub unit: Option<String>,
    pub unit_price: Money,
    /// Per-line VAT rate; lines on one document may carry different rates.
    pub tax_rate: TaxRate,
    /// Dense zero-based index within the document.
    pub position: i64,
    pub created_at: DateTime<Utc>,
}

impl LineItem {
    /// Creates a line item at the given position.
    pub fn new(input: NewLineItem, position: i64) -> Self {
        LineItem {
            id: Uuid::new_v4(),
            description: input.description,
            quantity: input.quantity,
            unit: input.unit,
            unit_price: input.unit_price,
            tax_rate: input.tax_rate,
            position,
            created_at: Utc::now(),
        }
    }

    /// Creates a line item from a catalog entry, quantity 1.
    ///
    /// ## Snapshot Pattern
    /// The catalog item's name, unit, price and rate are copied onto the
    /// line. Later catalog edits do not rewrite existing documents.
    pub fn from_catalog(item: &CatalogItem, position: i64) -> Self {
        LineItem {
            id: Uuid::new_v4(),
            description: item.name.clone(),
            quantity: Decimal::ONE,
            unit: Some(item.unit.clone()),
            unit_price: item.unit_price,
            tax_rate: item.tax_rate,
            position,
            created_at: Utc::now(),
        }
    }

    /// Clones the value fields into a fresh line with its own identity.
    pub fn duplicated(&self, position: i64) -> Self {
        LineItem {
            id: Uuid::new_v4(),
            description: self.description.clone(),
            quantity: self.quantity,
            unit: self.unit.clone(),
            unit_price: self.unit_price,
            tax_rate: self.tax_rate,
            position,
            created_at: Utc::now(),
        }
    }

    /// Pre-tax line amount (quantity × unit price), unrounded.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price * self.quantity
    }
}

/// Value fields for a new line item; identity and position are assigned by
/// the editor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLineItem {
    pub description: String,
    pub quantity: Decimal,
    pub unit: Option<String>,
    pub unit_price: Money,
    pub tax_rate: TaxRate,
}

impl Default for NewLineItem {
    /// A blank editable row: "New line", quantity 1, zero price.
    fn default() -> Self {
        NewLineItem {
            description: "New line".to_string(),
            quantity: Decimal::ONE,
            unit: None,
            unit_price: Money::zero(),
            tax_rate: TaxRate::zero(),
        }
    }
}

/// Partial in-place update of a line item; `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LineItemUpdate {
    pub description: Option<String>,
    pub quantity: Option<Decimal>,
    pub unit: Option<Option<String>>,
    pub unit_price: Option<Money>,
    pub tax_rate: Option<TaxRate>,
}

// =============================================================================
// Document
// =============================================================================

/// An invoice or estimate.
///
/// `subtotal`, `tax_total` and `total` are a persisted cache of the last
/// totals computation; the engine is the only writer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub kind: DocumentKind,
    /// Business identifier, e.g. "F2026-0042". Required for a document to
    /// be ready to send; see validation.
    pub number: String,
    pub status: DocumentStatus,
    pub client_name: Option<String>,
    /// ISO 4217, e.g. "EUR".
    pub currency_code: String,
    pub issue_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    /// Absolute document-level discount, subtracted from the pre-tax
    /// subtotal before VAT is computed.
    pub discount: Money,
    pub subtotal: Money,
    pub tax_total: Money,
    pub total: Money,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Creates an empty draft document.
    pub fn new(kind: DocumentKind, number: impl Into<String>) -> Self {
        let now = Utc::now();
        Document {
            id: Uuid::new_v4(),
            kind,
            number: number.into(),
            status: DocumentStatus::Draft,
            client_name: None,
            currency_code: crate::DEFAULT_CURRENCY.to_string(),
            issue_date: None,
            due_date: None,
            discount: Money::zero(),
            subtotal: Money::zero(),
            tax_total: Money::zero(),
            total: Money::zero(),
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }
}

// =============================================================================
// Catalog Item
// =============================================================================

/// An entry in the BTP price library ("bibliothèque de prix").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: Uuid,
    /// Business code, unique: "GO-BET-001".
    pub code: String,
    pub name: String,
    pub unit: String,
    pub unit_price: Money,
    pub tax_rate: TaxRate,
    /// Trade category: "Gros œuvre", "Plomberie", ...
    pub category: Option<String>,
    /// Soft delete flag.
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

//! # Document Repository
//!
//! Database operations for documents and their line items.
//!
//! ## Persistence Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  documents                         line_items                           │
//! │  ─────────                         ──────────                           │
//! │  id (uuid TEXT)          1 ──── N  document_id (FK, cascade)            │
//! │  number, kind, status              position (dense 0..N-1, UNIQUE       │
//! │  discount (decimal TEXT)                     per document)              │
//! │  subtotal/tax_total/total          quantity, unit_price, tax_rate       │
//! │  (cached engine outputs)                    (decimal TEXT)              │
//! │                                                                         │
//! │  save_document(): one transaction = upsert document, delete old lines,  │
//! │  insert the full new line set. The dense-position unique index can      │
//! │  never observe a half-applied save.                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Decimals cross the boundary as canonical strings; see `parse_decimal`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, SqlitePool};
use std::str::FromStr;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::store::DocumentStore;
use devis_core::{
    Document, DocumentKind, DocumentStatus, DocumentTotals, LineItem, Money, TaxRate,
};

// =============================================================================
// Row Types
// =============================================================================

/// Raw `documents` row; decimal and uuid columns come back as TEXT.
#[derive(Debug, FromRow)]
struct DocumentRow {
    id: String,
    kind: String,
    number: String,
    status: String,
    client_name: Option<String>,
    currency_code: String,
    issue_date: Option<NaiveDate>,
    due_date: Option<NaiveDate>,
    discount: String,
    subtotal: String,
    tax_total: String,
    total: String,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<DocumentRow> for Document {
    type Error = DbError;

    fn try_from(row: DocumentRow) -> DbResult<Document> {
        Ok(Document {
            id: parse_uuid("documents.id", &row.id)?,
            kind: DocumentKind::from_str_or_default(&row.kind),
            number: row.number,
            status: DocumentStatus::from_str_or_default(&row.status),
            client_name: row.client_name,
            currency_code: row.currency_code,
            issue_date: row.issue_date,
            due_date: row.due_date,
            discount: Money::new(parse_decimal("documents.discount", &row.discount)?),
            subtotal: Money::new(parse_decimal("documents.subtotal", &row.subtotal)?),
            tax_total: Money::new(parse_decimal("documents.tax_total", &row.tax_total)?),
            total: Money::new(parse_decimal("documents.total", &row.total)?),
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Raw `line_items` row.
#[derive(Debug, FromRow)]
struct LineItemRow {
    id: String,
    position: i64,
    description: String,
    unit: Option<String>,
    quantity: String,
    unit_price: String,
    tax_rate: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<LineItemRow> for LineItem {
    type Error = DbError;

    fn try_from(row: LineItemRow) -> DbResult<LineItem> {
        Ok(LineItem {
            id: parse_uuid("line_items.id", &row.id)?,
            description: row.description,
            quantity: parse_decimal("line_items.quantity", &row.quantity)?,
            unit: row.unit,
            unit_price: Money::new(parse_decimal("line_items.unit_price", &row.unit_price)?),
            tax_rate: TaxRate::from_percent(parse_decimal("line_items.tax_rate", &row.tax_rate)?),
            position: row.position,
            created_at: row.created_at,
        })
    }
}

pub(crate) fn parse_decimal(column: &'static str, value: &str) -> DbResult<Decimal> {
    Decimal::from_str(value).map_err(|_| DbError::corrupt_decimal(column, value))
}

pub(crate) fn parse_uuid(column: &'static str, value: &str) -> DbResult<Uuid> {
    Uuid::parse_str(value).map_err(|_| DbError::Internal(format!("bad uuid in {column}: {value}")))
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for document database operations.
#[derive(Debug, Clone)]
pub struct DocumentRepository {
    pool: SqlitePool,
}

impl DocumentRepository {
    /// Creates a new DocumentRepository.
    pub fn new(pool: SqlitePool) -> Self {
        DocumentRepository { pool }
    }

    /// Gets a document by ID.
    pub async fn get_by_id(&self, id: Uuid) -> DbResult<Option<Document>> {
        let row = sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT id, kind, number, status, client_name, currency_code,
                   issue_date, due_date, discount, subtotal, tax_total, total,
                   notes, created_at, updated_at
            FROM documents
            WHERE id = ?1
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Document::try_from).transpose()
    }

    /// Gets a document's line items, ordered by position.
    pub async fn get_items(&self, document_id: Uuid) -> DbResult<Vec<LineItem>> {
        let rows = sqlx::query_as::<_, LineItemRow>(
            r#"
            SELECT id, position, description, unit, quantity, unit_price,
                   tax_rate, created_at
            FROM line_items
            WHERE document_id = ?1
            ORDER BY position
            "#,
        )
        .bind(document_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(LineItem::try_from).collect()
    }

    /// Lists documents most recently touched first.
    pub async fn list_recent(&self, limit: u32) -> DbResult<Vec<Document>> {
        let rows = sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT id, kind, number, status, client_name, currency_code,
                   issue_date, due_date, discount, subtotal, tax_total, total,
                   notes, created_at, updated_at
            FROM documents
            ORDER BY updated_at DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Document::try_from).collect()
    }

    /// Updates only the cached totals columns.
    ///
    /// ## When To Call
    /// After a recompute that changed no line structure; the full
    /// `save_document` path is for structural saves.
    pub async fn update_totals(&self, document_id: Uuid, totals: &DocumentTotals) -> DbResult<()> {
        debug!(id = %document_id, total = %totals.total, "Updating document totals");

        let result = sqlx::query(
            r#"
            UPDATE documents SET
                subtotal = ?2,
                tax_total = ?3,
                total = ?4,
                updated_at = ?5
            WHERE id = ?1
            "#,
        )
        .bind(document_id.to_string())
        .bind(totals.subtotal.amount().to_string())
        .bind(totals.tax_total.amount().to_string())
        .bind(totals.total.amount().to_string())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Document", document_id.to_string()));
        }

        Ok(())
    }
}

// =============================================================================
// DocumentStore Implementation
// =============================================================================

#[async_trait]
impl DocumentStore for DocumentRepository {
    async fn fetch_document(&self, id: Uuid) -> DbResult<Option<Document>> {
        self.get_by_id(id).await
    }

    async fn fetch_line_items(&self, document_id: Uuid) -> DbResult<Vec<LineItem>> {
        self.get_items(document_id).await
    }

    /// Saves the document and its FULL line set in one transaction.
    async fn save_document(&self, document: &Document, lines: &[LineItem]) -> DbResult<()> {
        debug!(
            id = %document.id,
            number = %document.number,
            lines = lines.len(),
            "Saving document"
        );

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO documents (
                id, kind, number, status, client_name, currency_code,
                issue_date, due_date, discount, subtotal, tax_total, total,
                notes, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6,
                ?7, ?8, ?9, ?10, ?11, ?12,
                ?13, ?14, ?15
            )
            ON CONFLICT (id) DO UPDATE SET
                kind = excluded.kind,
                number = excluded.number,
                status = excluded.status,
                client_name = excluded.client_name,
                currency_code = excluded.currency_code,
                issue_date = excluded.issue_date,
                due_date = excluded.due_date,
                discount = excluded.discount,
                subtotal = excluded.subtotal,
                tax_total = excluded.tax_total,
                total = excluded.total,
                notes = excluded.notes,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(document.id.to_string())
        .bind(document.kind.as_str())
        .bind(&document.number)
        .bind(document.status.as_str())
        .bind(&document.client_name)
        .bind(&document.currency_code)
        .bind(document.issue_date)
        .bind(document.due_date)
        .bind(document.discount.amount().to_string())
        .bind(document.subtotal.amount().to_string())
        .bind(document.tax_total.amount().to_string())
        .bind(document.total.amount().to_string())
        .bind(&document.notes)
        .bind(document.created_at)
        .bind(document.updated_at)
        .execute(&mut *tx)
        .await?;

        // Replace the line set wholesale; positions are dense and unique, so
        // in-place UPDATEs could collide mid-flight.
        sqlx::query("DELETE FROM line_items WHERE document_id = ?1")
            .bind(document.id.to_string())
            .execute(&mut *tx)
            .await?;

        for line in lines {
            sqlx::query(
                r#"
                INSERT INTO line_items (
                    id, document_id, position, description, unit,
                    quantity, unit_price, tax_rate, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
            )
            .bind(line.id.to_string())
            .bind(document.id.to_string())
            .bind(line.position)
            .bind(&line.description)
            .bind(&line.unit)
            .bind(line.quantity.to_string())
            .bind(line.unit_price.amount().to_string())
            .bind(line.tax_rate.percent().to_string())
            .bind(line.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn save_totals(&self, document_id: Uuid, totals: &DocumentTotals) -> DbResult<()> {
        self.update_totals(document_id, totals).await
    }

    async fn delete_document(&self, id: Uuid) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM documents WHERE id = ?1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Document", id.to_string()));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

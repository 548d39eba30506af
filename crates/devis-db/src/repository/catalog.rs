//! # Catalog Repository
//!
//! Database operations for the BTP price library.
//!
//! ## Key Operations
//! - Substring search across code and name (the library is a few thousand
//!   rows at most; a LIKE scan over an indexed table is plenty)
//! - CRUD with soft delete (`is_active`)
//!
//! Documents never reference catalog rows: picking a catalog item snapshots
//! its fields onto a new line, so later price changes leave issued
//! documents untouched.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use devis_core::{CatalogItem, Money, TaxRate};

use super::document::{parse_decimal, parse_uuid};

// =============================================================================
// Row Type
// =============================================================================

#[derive(Debug, FromRow)]
struct CatalogItemRow {
    id: String,
    code: String,
    name: String,
    unit: String,
    unit_price: String,
    tax_rate: String,
    category: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CatalogItemRow> for CatalogItem {
    type Error = DbError;

    fn try_from(row: CatalogItemRow) -> DbResult<CatalogItem> {
        Ok(CatalogItem {
            id: parse_uuid("catalog_items.id", &row.id)?,
            code: row.code,
            name: row.name,
            unit: row.unit,
            unit_price: Money::new(parse_decimal("catalog_items.unit_price", &row.unit_price)?),
            tax_rate: TaxRate::from_percent(parse_decimal(
                "catalog_items.tax_rate",
                &row.tax_rate,
            )?),
            category: row.category,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT id, code, name, unit, unit_price, tax_rate, category, is_active,
           created_at, updated_at
    FROM catalog_items
"#;

// =============================================================================
// Repository
// =============================================================================

/// Repository for catalog database operations.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    /// Creates a new CatalogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    /// Searches active items whose code or name contains the query.
    ///
    /// Empty query returns active items sorted by code.
    pub async fn search(&self, query: &str, limit: u32) -> DbResult<Vec<CatalogItem>> {
        let query = query.trim();
        debug!(query = %query, limit = %limit, "Searching catalog");

        if query.is_empty() {
            return self.list_active(limit).await;
        }

        let pattern = format!("%{}%", query);
        let rows = sqlx::query_as::<_, CatalogItemRow>(&format!(
            "{SELECT_COLUMNS} WHERE is_active = 1 AND (code LIKE ?1 OR name LIKE ?1) ORDER BY code LIMIT ?2"
        ))
        .bind(pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(CatalogItem::try_from).collect()
    }

    /// Lists active items sorted by code.
    pub async fn list_active(&self, limit: u32) -> DbResult<Vec<CatalogItem>> {
        let rows = sqlx::query_as::<_, CatalogItemRow>(&format!(
            "{SELECT_COLUMNS} WHERE is_active = 1 ORDER BY code LIMIT ?1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(CatalogItem::try_from).collect()
    }

    /// Gets an item by its ID.
    pub async fn get_by_id(&self, id: Uuid) -> DbResult<Option<CatalogItem>> {
        let row = sqlx::query_as::<_, CatalogItemRow>(&format!("{SELECT_COLUMNS} WHERE id = ?1"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(CatalogItem::try_from).transpose()
    }

    /// Gets an item by its business code.
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<CatalogItem>> {
        let row = sqlx::query_as::<_, CatalogItemRow>(&format!("{SELECT_COLUMNS} WHERE code = ?1"))
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;

        row.map(CatalogItem::try_from).transpose()
    }

    /// Inserts a new catalog item. Duplicate codes are rejected by the
    /// UNIQUE index and surface as `DbError::UniqueViolation`.
    pub async fn insert(&self, item: &CatalogItem) -> DbResult<()> {
        debug!(code = %item.code, "Inserting catalog item");

        sqlx::query(
            r#"
            INSERT INTO catalog_items (
                id, code, name, unit, unit_price, tax_rate, category,
                is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(item.id.to_string())
        .bind(&item.code)
        .bind(&item.name)
        .bind(&item.unit)
        .bind(item.unit_price.amount().to_string())
        .bind(item.tax_rate.percent().to_string())
        .bind(&item.category)
        .bind(item.is_active)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Soft-deletes an item.
    pub async fn deactivate(&self, id: Uuid) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE catalog_items SET is_active = 0, updated_at = ?2 WHERE id = ?1",
        )
        .bind(id.to_string())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("CatalogItem", id.to_string()));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use rust_decimal_macros::dec;

    fn item(code: &str, name: &str, category: &str) -> CatalogItem {
        let now = Utc::now();
        CatalogItem {
            id: Uuid::new_v4(),
            code: code.to_string(),
            name: name.to_string(),
            unit: "m²".to_string(),
            unit_price: Money::new(dec!(35.80)),
            tax_rate: TaxRate::intermediate(),
            category: Some(category.to_string()),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_and_search() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.catalog();

        repo.insert(&item("PLA-BA13-001", "Cloison placo BA13", "Plâtrerie"))
            .await
            .unwrap();
        repo.insert(&item("CAR-SOL-001", "Carrelage sol 60x60", "Carrelage"))
            .await
            .unwrap();

        let hits = repo.search("placo", 10).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].code, "PLA-BA13-001");
        assert_eq!(hits[0].unit_price.amount(), dec!(35.80));

        // Empty query lists everything active.
        let all = repo.search("  ", 10).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_code_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.catalog();

        repo.insert(&item("GO-BET-001", "Béton C25/30", "Gros œuvre"))
            .await
            .unwrap();
        let dup = repo
            .insert(&item("GO-BET-001", "Béton C30/37", "Gros œuvre"))
            .await;

        assert!(matches!(dup, Err(DbError::UniqueViolation { .. })));
    }

    #[tokio::test]
    async fn test_deactivate_hides_from_search() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.catalog();

        let entry = item("ELE-TAB-001", "Tableau électrique 13 modules", "Électricité");
        repo.insert(&entry).await.unwrap();
        repo.deactivate(entry.id).await.unwrap();

        assert!(repo.search("tableau", 10).await.unwrap().is_empty());
        // Still reachable by direct lookup.
        let direct = repo.get_by_code("ELE-TAB-001").await.unwrap().unwrap();
        assert!(!direct.is_active);
    }
}

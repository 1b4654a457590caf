//! Postgres-backed catalog store.
//!
//! ## Round trips
//!
//! `search` and `find_product` each run exactly one statement: products
//! `INNER JOIN` categories. The category columns come back on the same row,
//! so result size never changes the number of queries.
//!
//! ## Error Mapping
//!
//! | SQLx Error | StoreError |
//! |------------|------------|
//! | Database | `Database { operation, message }` |
//! | PoolClosed | `PoolClosed` |
//! | PoolTimedOut / Io / Tls | `Unavailable` |
//! | ColumnDecode / ColumnNotFound / Decode | `Decode` |
//! | Other | `Database` |

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{FromRow, PgPool, Row};
use tracing::{instrument, Span};

use catalog_core::{CategoryId, ProductId};
use catalog_products::{Category, Price, Product, ProductFilter};

use super::query;
use super::r#trait::{CatalogStore, ProductRow, StoreError};

/// Schema and indexes for the catalog tables (idempotent).
pub const SCHEMA_SQL: &str = include_str!("../../sql/schema.sql");

/// Postgres-backed catalog store.
///
/// Cheap to clone; the SQLx pool is shared.
#[derive(Debug, Clone)]
pub struct PostgresCatalogStore {
    pool: Arc<PgPool>,
}

impl PostgresCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Open a pool against `database_url`.
    #[instrument(skip(database_url), err)]
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create tables and indexes if they do not exist yet.
    #[instrument(skip(self), err)]
    pub async fn apply_schema(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA_SQL)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("apply_schema", e))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl CatalogStore for PostgresCatalogStore {
    #[instrument(
        skip(self, filter),
        fields(
            category_id = ?filter.category_id,
            min_price = ?filter.price.min,
            max_price = ?filter.price.max,
            row_count = tracing::field::Empty
        ),
        err
    )]
    async fn search(&self, filter: &ProductFilter) -> Result<Vec<ProductRow>, StoreError> {
        let rows = query::search_query(filter)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("search_products", e))?;

        Span::current().record("row_count", rows.len());

        rows.iter().map(decode_row).collect()
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn find_product(&self, id: ProductId) -> Result<Option<ProductRow>, StoreError> {
        let row = query::product_by_id_query(id)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_product", e))?;

        row.as_ref().map(decode_row).transpose()
    }
}

fn decode_row(row: &PgRow) -> Result<ProductRow, StoreError> {
    let raw = JoinedProductRow::from_row(row).map_err(|e| map_sqlx_error("decode_product_row", e))?;
    raw.try_into()
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => StoreError::Database {
            operation: operation.to_string(),
            message: match db_err.code() {
                Some(code) => format!("{} (sqlstate {})", db_err.message(), code),
                None => db_err.message().to_string(),
            },
        },
        sqlx::Error::PoolClosed => StoreError::PoolClosed(operation.to_string()),
        sqlx::Error::PoolTimedOut => {
            StoreError::Unavailable(format!("timed out acquiring a connection in {operation}"))
        }
        sqlx::Error::Io(e) => StoreError::Unavailable(format!("io error in {operation}: {e}")),
        sqlx::Error::Tls(e) => StoreError::Unavailable(format!("tls error in {operation}: {e}")),
        sqlx::Error::ColumnNotFound(column) => {
            StoreError::Decode(format!("column {column} missing in {operation}"))
        }
        e @ (sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_)) => {
            StoreError::Decode(format!("{operation}: {e}"))
        }
        other => StoreError::Database {
            operation: operation.to_string(),
            message: other.to_string(),
        },
    }
}

// SQLx row types

#[derive(Debug)]
struct JoinedProductRow {
    id: i64,
    sku: String,
    name: String,
    description: String,
    price: Decimal,
    is_active: bool,
    category_id: i64,
    created_at: DateTime<Utc>,
    category_name: String,
    category_description: String,
    category_is_active: bool,
    category_created_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for JoinedProductRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(JoinedProductRow {
            id: row.try_get("id")?,
            sku: row.try_get("sku")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            price: row.try_get("price")?,
            is_active: row.try_get("is_active")?,
            category_id: row.try_get("category_id")?,
            created_at: row.try_get("created_at")?,
            category_name: row.try_get("category_name")?,
            category_description: row.try_get("category_description")?,
            category_is_active: row.try_get("category_is_active")?,
            category_created_at: row.try_get("category_created_at")?,
        })
    }
}

impl TryFrom<JoinedProductRow> for ProductRow {
    type Error = StoreError;

    fn try_from(row: JoinedProductRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let decode = |e: catalog_core::DomainError| StoreError::Decode(format!("product {id}: {e}"));

        let category_id = CategoryId::new(row.category_id).map_err(decode)?;
        let product = Product {
            id: ProductId::new(id).map_err(decode)?,
            sku: row.sku,
            name: row.name,
            description: row.description,
            price: Price::new(row.price).map_err(decode)?,
            category_id,
            is_active: row.is_active,
            created_at: row.created_at,
        };
        let category = Category {
            id: category_id,
            name: row.category_name,
            description: row.category_description,
            is_active: row.category_is_active,
            created_at: row.category_created_at,
        };
        Ok(ProductRow { product, category })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn joined(id: i64, price: &str) -> JoinedProductRow {
        JoinedProductRow {
            id,
            sku: "PHONE001".to_string(),
            name: "Smartphone".to_string(),
            description: String::new(),
            price: price.parse().unwrap(),
            is_active: true,
            category_id: 1,
            created_at: Utc::now(),
            category_name: "Electronics".to_string(),
            category_description: "Phones, laptops, gadgets".to_string(),
            category_is_active: true,
            category_created_at: Utc::now(),
        }
    }

    #[test]
    fn joined_row_carries_category() {
        let row = ProductRow::try_from(joined(1, "599.99")).unwrap();
        assert_eq!(row.product.category_id, row.category.id);
        assert_eq!(row.category.name, "Electronics");
        assert_eq!(row.product.price.to_string(), "599.99");
    }

    #[test]
    fn corrupt_rows_surface_as_decode_errors() {
        assert!(matches!(
            ProductRow::try_from(joined(0, "1.00")),
            Err(StoreError::Decode(_))
        ));
        assert!(matches!(
            ProductRow::try_from(joined(1, "-1.00")),
            Err(StoreError::Decode(_))
        ));
    }

    #[test]
    fn pool_errors_map_to_unavailable() {
        assert!(matches!(
            map_sqlx_error("search_products", sqlx::Error::PoolTimedOut),
            StoreError::Unavailable(_)
        ));
        assert!(matches!(
            map_sqlx_error("search_products", sqlx::Error::PoolClosed),
            StoreError::PoolClosed(op) if op == "search_products"
        ));
    }

    #[test]
    fn schema_defines_search_indexes() {
        for index in [
            "idx_category_active_name",
            "idx_product_category_sort",
            "idx_product_full_search",
            "idx_product_price_range",
            "idx_product_sku",
            "idx_product_name",
        ] {
            assert!(SCHEMA_SQL.contains(index), "schema is missing {index}");
        }
    }
}

use std::sync::Arc;

use thiserror::Error;

use catalog_core::ProductId;
use catalog_products::{Category, Product, ProductFilter};

/// A product joined with its category.
///
/// Stores always return the category alongside the product so callers never
/// issue a per-row follow-up lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRow {
    pub product: Product,
    pub category: Category,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error in {operation}: {message}")]
    Database { operation: String, message: String },

    #[error("connection pool closed in {0}")]
    PoolClosed(String),

    #[error("failed to decode row: {0}")]
    Decode(String),

    #[error("integrity violation: {0}")]
    Integrity(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("invalid seed data: {0}")]
    Seed(String),
}

/// Read-only access to the product catalog.
///
/// Each call is one round trip to the backing store, regardless of how many
/// rows it returns.
#[async_trait::async_trait]
pub trait CatalogStore: Send + Sync {
    /// Products matching `filter`, joined with their category, newest first
    /// (ties broken by descending id), with the filter's page applied.
    async fn search(&self, filter: &ProductFilter) -> Result<Vec<ProductRow>, StoreError>;

    /// A single product by id, active or not.
    async fn find_product(&self, id: ProductId) -> Result<Option<ProductRow>, StoreError>;
}

#[async_trait::async_trait]
impl<S> CatalogStore for Arc<S>
where
    S: CatalogStore + ?Sized,
{
    async fn search(&self, filter: &ProductFilter) -> Result<Vec<ProductRow>, StoreError> {
        (**self).search(filter).await
    }

    async fn find_product(&self, id: ProductId) -> Result<Option<ProductRow>, StoreError> {
        (**self).find_product(id).await
    }
}

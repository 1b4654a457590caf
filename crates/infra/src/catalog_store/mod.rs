//! Catalog store boundary.
//!
//! The store receives a fully validated `ProductFilter` and returns products
//! with their category already resolved. Two backends:
//! - `InMemoryCatalogStore` for dev/tests (seedable from JSON)
//! - `PostgresCatalogStore` for production (single JOIN per call)

pub mod in_memory;
pub mod postgres;
pub mod query;
pub mod r#trait;

pub use in_memory::{CatalogSeed, InMemoryCatalogStore};
pub use postgres::PostgresCatalogStore;
pub use r#trait::{CatalogStore, ProductRow, StoreError};

//! Infrastructure layer: catalog stores, query execution, configuration.

pub mod catalog_store;
pub mod config;
pub mod executor;

pub use catalog_store::{CatalogSeed, CatalogStore, InMemoryCatalogStore, PostgresCatalogStore, ProductRow, StoreError};
pub use config::{ConfigError, Settings};
pub use executor::{CatalogError, CatalogQueryExecutor, ProductRecord};

//! Catalog query execution: run a predicate once, shape the rows for output.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{field, instrument, Span};

use catalog_core::{CategoryId, ProductId};
use catalog_products::{Price, ProductFilter};

use crate::catalog_store::{CatalogStore, ProductRow, StoreError};

/// Product as returned to API clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductRecord {
    pub id: ProductId,
    pub sku: String,
    pub name: String,
    pub description: String,
    pub price: Price,
    /// Category name, resolved in the same query as the product.
    pub category: String,
    pub category_id: CategoryId,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<ProductRow> for ProductRecord {
    fn from(row: ProductRow) -> Self {
        let ProductRow { product, category } = row;
        Self {
            id: product.id,
            sku: product.sku,
            name: product.name,
            description: product.description,
            price: product.price,
            category: category.name,
            category_id: category.id,
            active: product.is_active,
            created_at: product.created_at,
        }
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("product not found")]
    NotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Executes product predicates against a [`CatalogStore`].
#[derive(Debug, Clone)]
pub struct CatalogQueryExecutor<S> {
    store: S,
}

impl<S> CatalogQueryExecutor<S>
where
    S: CatalogStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Run `filter` with one store call and map each row to a record.
    #[instrument(
        skip(self, filter),
        fields(
            category_id = ?filter.category_id,
            min_price = ?filter.price.min,
            max_price = ?filter.price.max,
            results = field::Empty
        )
    )]
    pub async fn search(&self, filter: &ProductFilter) -> Result<Vec<ProductRecord>, CatalogError> {
        let rows = self.store.search(filter).await?;
        Span::current().record("results", rows.len());
        Ok(rows.into_iter().map(ProductRecord::from).collect())
    }

    /// Look up one product, active or not. Errors are left to the caller to
    /// log: a missing id is a client error, not a fault.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn detail(&self, id: ProductId) -> Result<ProductRecord, CatalogError> {
        self.store
            .find_product(id)
            .await?
            .map(ProductRecord::from)
            .ok_or(CatalogError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use catalog_products::{Category, FilterResolver, Product, SearchParams};
    use chrono::Duration;
    use rust_decimal::Decimal;

    use crate::catalog_store::InMemoryCatalogStore;

    fn seeded(products: usize) -> Arc<InMemoryCatalogStore> {
        let store = InMemoryCatalogStore::new();
        for (id, name) in [(1, "Electronics"), (2, "Clothing")] {
            store
                .insert_category(Category {
                    id: CategoryId::new(id).unwrap(),
                    name: name.to_string(),
                    description: String::new(),
                    is_active: true,
                    created_at: Utc::now(),
                })
                .unwrap();
        }
        let now = Utc::now();
        for i in 1..=products as i64 {
            store
                .insert_product(Product {
                    id: ProductId::new(i).unwrap(),
                    sku: format!("SKU{i:05}"),
                    name: format!("Product {i}"),
                    description: String::new(),
                    price: Price::new(Decimal::new(i * 250, 2)).unwrap(),
                    category_id: CategoryId::new(1 + i % 2).unwrap(),
                    is_active: i % 5 != 0,
                    created_at: now - Duration::seconds(i),
                })
                .unwrap();
        }
        Arc::new(store)
    }

    fn resolve(pairs: &[(&str, &str)]) -> ProductFilter {
        let mut params = SearchParams::default();
        for (k, v) in pairs {
            let v = Some((*v).to_string());
            match *k {
                "category_id" => params.category_id = v,
                "min_price" => params.min_price = v,
                "max_price" => params.max_price = v,
                other => panic!("unknown param {other}"),
            }
        }
        FilterResolver::default().resolve(&params).unwrap()
    }

    #[tokio::test]
    async fn round_trips_do_not_grow_with_result_size() {
        for n in [1usize, 10, 100, 500] {
            let store = seeded(n);
            let executor = CatalogQueryExecutor::new(store.clone());

            let before = store.round_trips();
            let records = executor.search(&ProductFilter::active()).await.unwrap();

            assert!(!records.is_empty());
            assert!(records.iter().all(|r| !r.category.is_empty()));
            assert_eq!(store.round_trips() - before, 1, "n = {n}");
        }
    }

    #[tokio::test]
    async fn unfiltered_search_returns_exactly_the_active_products() {
        let executor = CatalogQueryExecutor::new(seeded(20));
        let records = executor.search(&ProductFilter::active()).await.unwrap();

        let mut ids: Vec<i64> = records.iter().map(|r| r.id.get()).collect();
        ids.sort();
        let expected: Vec<i64> = (1..=20).filter(|i| i % 5 != 0).collect();
        assert_eq!(ids, expected);
        assert!(records.iter().all(|r| r.active));
    }

    #[tokio::test]
    async fn filtered_search_respects_category_and_price_bounds() {
        let executor = CatalogQueryExecutor::new(seeded(40));
        let filter = resolve(&[("category_id", "2"), ("min_price", "10"), ("max_price", "50")]);

        let records = executor.search(&filter).await.unwrap();
        assert!(!records.is_empty());
        for r in &records {
            assert_eq!(r.category_id.get(), 2);
            assert_eq!(r.category, "Clothing");
            assert!(r.price.amount() >= Decimal::from(10));
            assert!(r.price.amount() <= Decimal::from(50));
        }
    }

    #[tokio::test]
    async fn detail_maps_row_and_reports_missing_ids() {
        let executor = CatalogQueryExecutor::new(seeded(5));

        let record = executor.detail(ProductId::new(5).unwrap()).await.unwrap();
        assert_eq!(record.sku, "SKU00005");
        assert!(!record.active);
        assert_eq!(record.category, "Clothing");

        let err = executor.detail(ProductId::new(99_999).unwrap()).await.unwrap_err();
        assert!(matches!(err, CatalogError::NotFound));
    }

    struct BrokenStore;

    #[async_trait::async_trait]
    impl CatalogStore for BrokenStore {
        async fn search(&self, _filter: &ProductFilter) -> Result<Vec<ProductRow>, StoreError> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }

        async fn find_product(&self, _id: ProductId) -> Result<Option<ProductRow>, StoreError> {
            Err(StoreError::PoolClosed("find_product".to_string()))
        }
    }

    #[tokio::test]
    async fn store_failures_propagate_as_store_errors() {
        let executor = CatalogQueryExecutor::new(BrokenStore);
        assert!(matches!(
            executor.search(&ProductFilter::active()).await,
            Err(CatalogError::Store(StoreError::Unavailable(_)))
        ));
        assert!(matches!(
            executor.detail(ProductId::new(1).unwrap()).await,
            Err(CatalogError::Store(StoreError::PoolClosed(_)))
        ));
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[tokio::test]
    async fn missing_product_is_not_logged_as_an_error() {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::TRACE)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let executor = CatalogQueryExecutor::new(seeded(3));
        let err = executor.detail(ProductId::new(99_999).unwrap()).await.unwrap_err();
        assert!(matches!(err, CatalogError::NotFound));

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(!output.contains("ERROR"), "unexpected error log: {output}");
    }

    #[test]
    fn record_serializes_price_as_string_and_category_as_name() {
        let record = ProductRecord {
            id: ProductId::new(1).unwrap(),
            sku: "PHONE001".to_string(),
            name: "Smartphone".to_string(),
            description: String::new(),
            price: Price::new(Decimal::new(59999, 2)).unwrap(),
            category: "Electronics".to_string(),
            category_id: CategoryId::new(1).unwrap(),
            active: true,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["price"], "599.99");
        assert_eq!(json["category"], "Electronics");
        assert_eq!(json["active"], true);
    }
}

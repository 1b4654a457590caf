use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Deserialize;

use catalog_core::{CategoryId, Entity, ProductId};
use catalog_products::{Category, Product, ProductFilter};

use super::r#trait::{CatalogStore, ProductRow, StoreError};

/// Catalog contents for seeding an in-memory store.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogSeed {
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub products: Vec<Product>,
}

impl CatalogSeed {
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        serde_json::from_str(json).map_err(|e| StoreError::Seed(e.to_string()))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| StoreError::Seed(format!("failed to read {}: {e}", path.display())))?;
        Self::from_json(&json)
    }
}

#[derive(Debug, Default)]
struct Catalog {
    categories: HashMap<CategoryId, Category>,
    products: HashMap<ProductId, Product>,
}

impl Catalog {
    fn join(&self, product: &Product) -> Result<ProductRow, StoreError> {
        let category = self.categories.get(&product.category_id).ok_or_else(|| {
            StoreError::Integrity(format!(
                "product {} references missing category {}",
                product.id, product.category_id
            ))
        })?;
        Ok(ProductRow {
            product: product.clone(),
            category: category.clone(),
        })
    }
}

/// In-memory catalog store for tests/dev.
///
/// Every `search`/`find_product` call counts as one round trip, which lets
/// tests check that result size never drives extra lookups.
#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    inner: RwLock<Catalog>,
    round_trips: AtomicU64,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_seed(seed: CatalogSeed) -> Result<Self, StoreError> {
        let store = Self::new();
        for category in seed.categories {
            store.insert_category(category)?;
        }
        for product in seed.products {
            store.insert_product(product)?;
        }
        Ok(store)
    }

    pub fn insert_category(&self, category: Category) -> Result<(), StoreError> {
        let mut catalog = self.write()?;
        if catalog
            .categories
            .values()
            .any(|c| c.id != category.id && c.name == category.name)
        {
            return Err(StoreError::Integrity(format!(
                "duplicate category name {:?}",
                category.name
            )));
        }
        catalog.categories.insert(category.id(), category);
        Ok(())
    }

    /// Insert or replace a product. Its category must already exist.
    pub fn insert_product(&self, product: Product) -> Result<(), StoreError> {
        let mut catalog = self.write()?;
        if !catalog.categories.contains_key(&product.category_id) {
            return Err(StoreError::Integrity(format!(
                "product {} references missing category {}",
                product.id, product.category_id
            )));
        }
        if catalog
            .products
            .values()
            .any(|p| p.id != product.id && p.sku == product.sku)
        {
            return Err(StoreError::Integrity(format!("duplicate sku {:?}", product.sku)));
        }
        catalog.products.insert(product.id(), product);
        Ok(())
    }

    /// Number of store calls served so far.
    pub fn round_trips(&self) -> u64 {
        self.round_trips.load(Ordering::SeqCst)
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Catalog>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::Unavailable("catalog lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Catalog>, StoreError> {
        self.inner
            .write()
            .map_err(|_| StoreError::Unavailable("catalog lock poisoned".to_string()))
    }
}

#[async_trait::async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn search(&self, filter: &ProductFilter) -> Result<Vec<ProductRow>, StoreError> {
        self.round_trips.fetch_add(1, Ordering::SeqCst);
        let catalog = self.read()?;

        let mut matched: Vec<&Product> = catalog
            .products
            .values()
            .filter(|p| filter.matches(p))
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let limit = filter.page.limit.map_or(usize::MAX, |l| l as usize);
        matched
            .into_iter()
            .skip(filter.page.offset as usize)
            .take(limit)
            .map(|p| catalog.join(p))
            .collect()
    }

    async fn find_product(&self, id: ProductId) -> Result<Option<ProductRow>, StoreError> {
        self.round_trips.fetch_add(1, Ordering::SeqCst);
        let catalog = self.read()?;
        catalog.products.get(&id).map(|p| catalog.join(p)).transpose()
    }
}

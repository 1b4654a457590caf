use std::sync::Arc;

use anyhow::Context;

use catalog_infra::{
    CatalogQueryExecutor, CatalogSeed, CatalogStore, InMemoryCatalogStore, PostgresCatalogStore, Settings,
};
use catalog_products::FilterResolver;

/// Store handle shared by all requests.
pub type SharedStore = Arc<dyn CatalogStore>;

/// Per-process services handed to handlers via `Extension<Arc<AppServices>>`.
///
/// Read-only after construction; requests share it without locking.
pub struct AppServices {
    resolver: FilterResolver,
    executor: CatalogQueryExecutor<SharedStore>,
}

impl AppServices {
    pub fn new(store: SharedStore, resolver: FilterResolver) -> Self {
        Self {
            resolver,
            executor: CatalogQueryExecutor::new(store),
        }
    }

    pub fn resolver(&self) -> &FilterResolver {
        &self.resolver
    }

    pub fn executor(&self) -> &CatalogQueryExecutor<SharedStore> {
        &self.executor
    }
}

/// Select and open the catalog store described by `settings`.
///
/// `DATABASE_URL` set: Postgres (optionally applying the schema).
/// Otherwise: in-memory, seeded from `CATALOG_SEED_PATH` when present.
pub async fn build_services(settings: &Settings) -> anyhow::Result<AppServices> {
    let resolver = FilterResolver::new(settings.max_page_size);

    let store: SharedStore = match &settings.database_url {
        Some(url) => {
            let store = PostgresCatalogStore::connect(
                url,
                settings.db_max_connections,
                settings.db_acquire_timeout,
            )
            .await
            .context("failed to connect to Postgres")?;

            if settings.apply_schema {
                store.apply_schema().await.context("failed to apply catalog schema")?;
                tracing::info!("catalog schema applied");
            }
            tracing::info!(max_connections = settings.db_max_connections, "using postgres catalog store");
            Arc::new(store)
        }
        None => {
            let store = match &settings.seed_path {
                Some(path) => {
                    let seed = CatalogSeed::from_path(path)
                        .with_context(|| format!("failed to load seed {}", path.display()))?;
                    tracing::info!(
                        categories = seed.categories.len(),
                        products = seed.products.len(),
                        "seeding in-memory catalog"
                    );
                    InMemoryCatalogStore::from_seed(seed).context("invalid seed catalog")?
                }
                None => InMemoryCatalogStore::new(),
            };
            tracing::warn!("DATABASE_URL not set; using in-memory catalog store");
            Arc::new(store)
        }
    };

    Ok(AppServices::new(store, resolver))
}

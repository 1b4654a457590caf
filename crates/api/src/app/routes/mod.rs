use axum::Router;

pub mod products;
pub mod system;

/// Router for catalog endpoints (requires the `AppServices` extension).
pub fn router() -> Router {
    Router::new().nest("/products", products::router())
}

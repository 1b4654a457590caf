use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use catalog_core::ProductId;
use catalog_products::SearchParams;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/search", get(search_products))
        .route("/search/", get(search_products))
        .route("/:id", get(get_product))
        .route("/:id/", get(get_product))
}

pub async fn search_products(
    Extension(services): Extension<Arc<AppServices>>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> axum::response::Response {
    let Query(params) = match params {
        Ok(p) => p,
        Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, "validation_error", e.body_text()),
    };

    let filter = match services.resolver().resolve(&params) {
        Ok(f) => f,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.executor().search(&filter).await {
        Ok(products) => (StatusCode::OK, Json(dto::search_to_json(&filter, products))).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let product_id: ProductId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "product id must be a positive integer"),
    };

    match services.executor().detail(product_id).await {
        Ok(product) => (StatusCode::OK, Json(dto::product_to_json(product))).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

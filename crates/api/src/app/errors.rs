use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use catalog_core::DomainError;
use catalog_infra::CatalogError;

/// Message returned for any persistence failure; details stay in the logs.
pub const STORE_ERROR_MESSAGE: &str = "database error occurred";

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
    }
}

pub fn catalog_error_to_response(err: CatalogError) -> axum::response::Response {
    match err {
        CatalogError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "product not found"),
        CatalogError::Store(e) => {
            tracing::error!(error = %e, "catalog store failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", STORE_ERROR_MESSAGE)
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "success": false,
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_infra::StoreError;

    #[test]
    fn validation_maps_to_bad_request() {
        let res = domain_error_to_response(DomainError::validation("min_price must be a valid non-negative amount"));
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn store_failures_map_to_internal_error() {
        let res = catalog_error_to_response(CatalogError::Store(StoreError::Database {
            operation: "search_products".to_string(),
            message: "relation \"products\" does not exist".to_string(),
        }));
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn missing_product_maps_to_not_found() {
        assert_eq!(
            catalog_error_to_response(CatalogError::NotFound).status(),
            StatusCode::NOT_FOUND
        );
    }
}

use std::time::Instant;

use axum::{middleware::Next, response::Response};

/// Log one line per request: method, path, status, latency.
///
/// 5xx responses log at `error`, 4xx at `warn`, everything else at `info`.
pub async fn log_requests(req: axum::http::Request<axum::body::Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let started = Instant::now();

    let response = next.run(req).await;

    let status = response.status().as_u16();
    let latency_ms = started.elapsed().as_millis() as u64;

    if response.status().is_server_error() {
        tracing::error!(%method, %path, status, latency_ms, "request failed");
    } else if response.status().is_client_error() {
        tracing::warn!(%method, %path, status, latency_ms, "request rejected");
    } else {
        tracing::info!(%method, %path, status, latency_ms, "request served");
    }

    response
}

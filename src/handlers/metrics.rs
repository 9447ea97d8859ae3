use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::error;

use crate::error::AppError;
use crate::utils::metrics::encode_metrics;

/// Prometheus scrape endpoint.
pub async fn metrics_handler() -> Result<Response, AppError> {
    let body = encode_metrics().map_err(|e| {
        error!("Failed to encode metrics: {}", e);
        e
    })?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
        .into_response())
}

use alloy::rpc::types::Log;
use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::Json,
    routing::post,
    Router,
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::CuratedProtocol;
use crate::services::IngestSummary;
use crate::AppState;

pub const INGEST_TOKEN_HEADER: &str = "x-ingest-token";

/// Logs in delivery order, as returned by `eth_getLogs` plus `blockTimestamp`.
#[derive(Debug, Serialize, Deserialize)]
pub struct IngestRequest {
    pub logs: Vec<Log>,
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), AppError> {
    let Some(expected) = state.settings.ingest.token.as_deref() else {
        return Ok(());
    };

    match headers.get(INGEST_TOKEN_HEADER).and_then(|v| v.to_str().ok()) {
        Some(token) if token == expected => Ok(()),
        _ => Err(AppError::AuthenticationError("Invalid ingest token".to_string())),
    }
}

/// POST /api/v1/subgraphs/:protocol/logs
pub async fn ingest_logs(
    State(state): State<AppState>,
    Path(protocol): Path<String>,
    headers: HeaderMap,
    Json(request): Json<IngestRequest>,
) -> Result<Json<IngestSummary>, AppError> {
    authorize(&state, &headers)?;

    let protocol: CuratedProtocol = protocol
        .parse()
        .map_err(|e: crate::models::UnknownProtocol| AppError::NotFound(e.to_string()))?;

    let summary = state.indexing.ingest(protocol, &request.logs).await?;
    Ok(Json(summary))
}

pub fn create_ingest_routes() -> Router<AppState> {
    Router::new().route("/subgraphs/:protocol/logs", post(ingest_logs))
}

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info};

use crate::services::ChatError;
use crate::AppState;

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub protocol_slug: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

/// POST /api/chat
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, (StatusCode, Json<Value>)> {
    let Json(request) = payload.map_err(|rejection| {
        error!("Chat API error: {}", rejection.body_text());
        failed_request()
    })?;

    let message = match request.message {
        Some(message) if !message.is_empty() => message,
        _ => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Message is required" })),
            ))
        }
    };

    let protocol_slug = request.protocol_slug.as_deref().filter(|s| !s.is_empty());
    info!(protocol = ?protocol_slug, "Chat request");

    match state.chat.chat(&message, protocol_slug).await {
        Ok(response) => Ok(Json(ChatResponse { response })),
        Err(ChatError::EmptyResponse) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "No response from AI" })),
        )),
        Err(e) => {
            error!("Chat API error: {}", e);
            Err(failed_request())
        }
    }
}

fn failed_request() -> (StatusCode, Json<Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Failed to process chat request" })),
    )
}

use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AppError;
use crate::models::{CuratedProtocol, EntityId};
use crate::AppState;

pub const DEFAULT_FIRST: usize = 10;
pub const MAX_FIRST: usize = 100;

#[derive(Debug, Deserialize)]
pub struct EntityListQuery {
    pub first: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EntityListResponse {
    pub entity_type: String,
    pub entities: Vec<Value>,
    pub total: u64,
}

fn resolve(state: &AppState, protocol: &str, entity_type: &str) -> Result<CuratedProtocol, AppError> {
    let protocol: CuratedProtocol = protocol
        .parse()
        .map_err(|e: crate::models::UnknownProtocol| AppError::NotFound(e.to_string()))?;

    let known = state
        .registry
        .get(protocol)
        .is_some_and(|subgraph| subgraph.has_entity_type(entity_type));
    if !known {
        return Err(AppError::NotFound(format!(
            "{} has no entity type {}",
            protocol, entity_type
        )));
    }

    Ok(protocol)
}

/// GET /api/v1/subgraphs/:protocol/entities/:entity_type?first=N
pub async fn list_entities(
    State(state): State<AppState>,
    Path((protocol, entity_type)): Path<(String, String)>,
    Query(query): Query<EntityListQuery>,
) -> Result<Json<EntityListResponse>, AppError> {
    let protocol = resolve(&state, &protocol, &entity_type)?;

    let first = query.first.unwrap_or(DEFAULT_FIRST);
    if first > MAX_FIRST {
        return Err(AppError::ValidationError(format!(
            "first must be at most {}",
            MAX_FIRST
        )));
    }

    let entities = state.entity_store.latest(protocol, &entity_type, first).await?;
    let total = state.entity_store.count(protocol, &entity_type).await?;

    Ok(Json(EntityListResponse {
        entity_type,
        entities: entities.iter().map(|e| e.to_json()).collect(),
        total,
    }))
}

/// GET /api/v1/subgraphs/:protocol/entities/:entity_type/:id
pub async fn get_entity(
    State(state): State<AppState>,
    Path((protocol, entity_type, id)): Path<(String, String, String)>,
) -> Result<Json<Value>, AppError> {
    let protocol = resolve(&state, &protocol, &entity_type)?;
    let id: EntityId = id
        .parse()
        .map_err(|e: crate::models::InvalidEntityId| AppError::ValidationError(e.to_string()))?;

    let entity = state
        .entity_store
        .load(protocol, &entity_type, &id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} {} not found", entity_type, id)))?;

    Ok(Json(entity.to_json()))
}

pub fn create_entity_routes() -> Router<AppState> {
    Router::new()
        .route("/subgraphs/:protocol/entities/:entity_type", get(list_entities))
        .route("/subgraphs/:protocol/entities/:entity_type/:id", get(get_entity))
}

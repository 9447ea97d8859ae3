pub mod chat_handlers;
pub mod entity_handlers;
pub mod health;
pub mod ingest_handlers;
pub mod metrics;
pub mod protocol_handlers;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::AppState;

pub use entity_handlers::create_entity_routes;
pub use ingest_handlers::create_ingest_routes;
pub use protocol_handlers::create_protocol_routes;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/metrics", get(metrics::metrics_handler))
        .route("/api/chat", post(chat_handlers::chat))
        .nest(
            "/api/v1",
            create_protocol_routes()
                .merge(create_ingest_routes())
                .merge(create_entity_routes()),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

use defipunk::{
    config::Settings,
    database::{establish_connection, run_migrations, DatabaseConfig, EntityStore, InMemoryEntityStore, PgEntityStore},
    handlers::create_router,
    utils::logging::init_logging,
    AppState,
};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let settings = Settings::new()?;
    init_logging(&settings.logging);
    info!("Starting DeFiPunk API");

    let entity_store: Arc<dyn EntityStore> = match settings.database.url.as_deref() {
        Some(url) => {
            let config = DatabaseConfig {
                max_connections: settings.database.max_connections,
                ..DatabaseConfig::default()
            };
            let pool = establish_connection(url, config).await?;
            run_migrations(&pool).await?;
            Arc::new(PgEntityStore::new(pool))
        }
        None => {
            warn!("DATABASE_URL not set, entities are kept in memory");
            Arc::new(InMemoryEntityStore::new())
        }
    };

    let addr = settings.bind_address();
    let state = AppState::new(settings, entity_store)?;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("API server listening on {}", addr);
    info!("  GET    /api/v1/protocols");
    info!("  GET    /api/v1/protocols/:slug");
    info!("  GET    /api/v1/protocols/:slug/subgraph");
    info!("  GET    /api/v1/protocols/liquity-v1/active-pool");
    info!("  POST   /api/chat");
    info!("  POST   /api/v1/subgraphs/:protocol/logs");
    info!("  GET    /api/v1/subgraphs/:protocol/entities/:entity_type");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutdown signal received");
            }
        })
        .await?;

    info!("DeFiPunk API stopped");
    Ok(())
}

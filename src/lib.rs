pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod subgraphs;
pub mod utils;

pub use error::types::*;

use std::sync::Arc;

use config::Settings;
use database::EntityStore;
use services::{ChatService, DefiLlamaService, IndexingService, SubgraphService};
use subgraphs::SubgraphRegistry;

/// Shared handler state. Services are cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub registry: Arc<SubgraphRegistry>,
    pub entity_store: Arc<dyn EntityStore>,
    pub indexing: IndexingService,
    pub defillama: DefiLlamaService,
    pub subgraphs: SubgraphService,
    pub chat: ChatService,
}

impl AppState {
    pub fn new(settings: Settings, entity_store: Arc<dyn EntityStore>) -> Result<Self, AppError> {
        let registry = Arc::new(SubgraphRegistry::new());
        let defillama = DefiLlamaService::new(&settings.defillama)?;
        let subgraphs = SubgraphService::new(settings.subgraphs.clone())?;
        let chat = ChatService::new(settings.openai.clone(), defillama.clone(), subgraphs.clone())?;

        Ok(Self {
            indexing: IndexingService::new(registry.clone(), entity_store.clone()),
            settings: Arc::new(settings),
            registry,
            entity_store,
            defillama,
            subgraphs,
            chat,
        })
    }
}

pub mod chat_service;
pub mod defillama;
pub mod defipunk_score;
pub mod indexing_service;
pub mod subgraph_service;

pub use chat_service::{ChatError, ChatService};
pub use defillama::DefiLlamaService;
pub use defipunk_score::*;
pub use indexing_service::{IndexingService, IngestSummary};
pub use subgraph_service::SubgraphService;

use alloy::rpc::types::Log;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::database::EntityStore;
use crate::error::AppError;
use crate::models::{CuratedProtocol, Entity};
use crate::subgraphs::SubgraphRegistry;
use crate::utils::metrics::{ENTITIES_INDEXED_COUNT, LOGS_SKIPPED_COUNT};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestSummary {
    /// New entities written.
    pub indexed: usize,
    /// Logs whose entity already existed; the stored record was kept.
    pub duplicates: usize,
    /// Logs no data source or handler claimed.
    pub skipped: usize,
}

/// Runs delivered logs through a protocol's mappings and persists the entities.
#[derive(Clone)]
pub struct IndexingService {
    registry: Arc<SubgraphRegistry>,
    store: Arc<dyn EntityStore>,
}

impl IndexingService {
    pub fn new(registry: Arc<SubgraphRegistry>, store: Arc<dyn EntityStore>) -> Self {
        Self { registry, store }
    }

    /// Maps a single log without persisting it.
    pub fn map_log(&self, protocol: CuratedProtocol, log: &Log) -> Result<Option<Entity>, AppError> {
        let subgraph = self
            .registry
            .get(protocol)
            .ok_or_else(|| AppError::NotFound(format!("No subgraph for {}", protocol)))?;

        Ok(subgraph.process_log(log)?)
    }

    /// Processes logs in delivery order and stops at the first mapping failure.
    /// Entities saved before the failure stay; re-delivering the batch is safe.
    pub async fn ingest(&self, protocol: CuratedProtocol, logs: &[Log]) -> Result<IngestSummary, AppError> {
        let mut summary = IngestSummary::default();

        for (position, log) in logs.iter().enumerate() {
            let entity = match self.map_log(protocol, log) {
                Ok(Some(entity)) => entity,
                Ok(None) => {
                    debug!(%protocol, address = %log.address(), "No handler for log");
                    LOGS_SKIPPED_COUNT.with_label_values(&[protocol.slug()]).inc();
                    summary.skipped += 1;
                    continue;
                }
                Err(e) => {
                    warn!(%protocol, position, "Mapping failed: {}", e);
                    return Err(match e {
                        AppError::MappingError(msg) => {
                            AppError::MappingError(format!("log {}: {}", position, msg))
                        }
                        other => other,
                    });
                }
            };

            if self.store.save(protocol, &entity).await? {
                ENTITIES_INDEXED_COUNT
                    .with_label_values(&[protocol.slug(), entity.entity_type.as_str()])
                    .inc();
                summary.indexed += 1;
            } else {
                summary.duplicates += 1;
            }
        }

        info!(
            %protocol,
            indexed = summary.indexed,
            duplicates = summary.duplicates,
            skipped = summary.skipped,
            "Ingested log batch"
        );
        Ok(summary)
    }
}

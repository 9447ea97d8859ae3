use alloy::primitives::hex;
use async_trait::async_trait;
use sqlx::{postgres::PgRow, types::Json, PgPool, Row};
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::error::AppError;
use crate::models::{CuratedProtocol, Entity, EntityId, FieldValue};

/// Append-only storage for mapped entities.
///
/// Entities are immutable: saving an id that already exists keeps the stored
/// record and reports `false`.
#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn save(&self, protocol: CuratedProtocol, entity: &Entity) -> Result<bool, AppError>;

    async fn load(
        &self,
        protocol: CuratedProtocol,
        entity_type: &str,
        id: &EntityId,
    ) -> Result<Option<Entity>, AppError>;

    async fn count(&self, protocol: CuratedProtocol, entity_type: &str) -> Result<u64, AppError>;

    /// Most recent first: block timestamp, then block number, then log index.
    async fn latest(
        &self,
        protocol: CuratedProtocol,
        entity_type: &str,
        first: usize,
    ) -> Result<Vec<Entity>, AppError>;
}

#[derive(Debug, Clone)]
pub struct PgEntityStore {
    pool: PgPool,
}

impl PgEntityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn entity_from_row(row: &PgRow) -> Result<Entity, AppError> {
        let raw_id: String = row.try_get("id")?;
        let id: EntityId = raw_id
            .parse()
            .map_err(|e: crate::models::InvalidEntityId| AppError::DatabaseError(e.to_string()))?;
        let block_number: i64 = row.try_get("block_number")?;
        let block_timestamp: i64 = row.try_get("block_timestamp")?;
        let Json(fields): Json<BTreeMap<String, FieldValue>> = row.try_get("fields")?;

        Ok(Entity {
            entity_type: row.try_get("entity_type")?,
            transaction_hash: id.transaction_hash,
            id,
            fields,
            block_number: block_number as u64,
            block_timestamp: block_timestamp as u64,
        })
    }
}

#[async_trait]
impl EntityStore for PgEntityStore {
    async fn save(&self, protocol: CuratedProtocol, entity: &Entity) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO subgraph_entities
                (protocol, entity_type, id, block_number, block_timestamp, transaction_hash, log_index, fields)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (protocol, entity_type, id) DO NOTHING
            "#,
        )
        .bind(protocol.slug())
        .bind(&entity.entity_type)
        .bind(entity.id.to_string())
        .bind(entity.block_number as i64)
        .bind(entity.block_timestamp as i64)
        .bind(hex::encode_prefixed(entity.transaction_hash))
        .bind(entity.id.log_index as i64)
        .bind(Json(&entity.fields))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn load(
        &self,
        protocol: CuratedProtocol,
        entity_type: &str,
        id: &EntityId,
    ) -> Result<Option<Entity>, AppError> {
        let row = sqlx::query(
            r#"
            SELECT entity_type, id, block_number, block_timestamp, fields
            FROM subgraph_entities
            WHERE protocol = $1 AND entity_type = $2 AND id = $3
            "#,
        )
        .bind(protocol.slug())
        .bind(entity_type)
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::entity_from_row).transpose()
    }

    async fn count(&self, protocol: CuratedProtocol, entity_type: &str) -> Result<u64, AppError> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS count FROM subgraph_entities WHERE protocol = $1 AND entity_type = $2",
        )
        .bind(protocol.slug())
        .bind(entity_type)
        .fetch_one(&self.pool)
        .await?;

        let count: i64 = row.try_get("count")?;
        Ok(count as u64)
    }

    async fn latest(
        &self,
        protocol: CuratedProtocol,
        entity_type: &str,
        first: usize,
    ) -> Result<Vec<Entity>, AppError> {
        let rows = sqlx::query(
            r#"
            SELECT entity_type, id, block_number, block_timestamp, fields
            FROM subgraph_entities
            WHERE protocol = $1 AND entity_type = $2
            ORDER BY block_timestamp DESC, block_number DESC, log_index DESC
            LIMIT $3
            "#,
        )
        .bind(protocol.slug())
        .bind(entity_type)
        .bind(first as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::entity_from_row).collect()
    }
}

type EntityKey = (CuratedProtocol, String, EntityId);

/// Process-local store, used when no database is configured and in tests.
#[derive(Debug, Default)]
pub struct InMemoryEntityStore {
    entities: RwLock<BTreeMap<EntityKey, Entity>>,
}

impl InMemoryEntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entities.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entities.read().await.is_empty()
    }

    /// True when the stored entity has `field` rendered as `expected`.
    pub async fn field_equals(
        &self,
        protocol: CuratedProtocol,
        entity_type: &str,
        id: &EntityId,
        field: &str,
        expected: &str,
    ) -> bool {
        let key = (protocol, entity_type.to_string(), *id);
        self.entities
            .read()
            .await
            .get(&key)
            .and_then(|entity| entity.field_string(field))
            .is_some_and(|value| value == expected)
    }
}

#[async_trait]
impl EntityStore for InMemoryEntityStore {
    async fn save(&self, protocol: CuratedProtocol, entity: &Entity) -> Result<bool, AppError> {
        let key = (protocol, entity.entity_type.clone(), entity.id);
        let mut entities = self.entities.write().await;
        if entities.contains_key(&key) {
            return Ok(false);
        }
        entities.insert(key, entity.clone());
        Ok(true)
    }

    async fn load(
        &self,
        protocol: CuratedProtocol,
        entity_type: &str,
        id: &EntityId,
    ) -> Result<Option<Entity>, AppError> {
        let key = (protocol, entity_type.to_string(), *id);
        Ok(self.entities.read().await.get(&key).cloned())
    }

    async fn count(&self, protocol: CuratedProtocol, entity_type: &str) -> Result<u64, AppError> {
        let entities = self.entities.read().await;
        let count = entities
            .iter()
            .filter(|((p, t, _), _)| *p == protocol && t == entity_type)
            .count();
        Ok(count as u64)
    }

    async fn latest(
        &self,
        protocol: CuratedProtocol,
        entity_type: &str,
        first: usize,
    ) -> Result<Vec<Entity>, AppError> {
        let entities = self.entities.read().await;
        let mut matching: Vec<&Entity> = entities
            .iter()
            .filter(|((p, t, _), _)| *p == protocol && t == entity_type)
            .map(|(_, entity)| entity)
            .collect();

        matching.sort_by(|a, b| {
            (b.block_timestamp, b.block_number, b.id.log_index)
                .cmp(&(a.block_timestamp, a.block_number, a.id.log_index))
        });

        Ok(matching.into_iter().take(first).cloned().collect())
    }
}

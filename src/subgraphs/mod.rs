//! Event to entity mappings for the curated subgraphs.
//!
//! Every handler is a field copy: the log is decoded into its ABI event, each
//! parameter is stored under its ABI name, and the entity is keyed by
//! `transactionHash-logIndex`. Delivery, ordering and retries belong to the
//! runtime that hands the logs over.

use alloy::primitives::{Address, B256};
use alloy::rpc::types::Log;
use alloy::sol_types::SolEvent;
use std::collections::BTreeMap;
use std::fmt;

use crate::models::{CuratedProtocol, Entity, EntityId, FieldValue};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MappingError {
    #[error("log is missing {0}")]
    MissingLogField(&'static str),

    #[error("failed to decode {event}: {reason}")]
    Decode { event: &'static str, reason: String },
}

/// Parameters of a decoded event, in ABI order, under their ABI names.
pub trait EntityFields {
    fn entity_fields(&self) -> Vec<(&'static str, FieldValue)>;
}

/// Implements [`EntityFields`] for ABI events by listing the parameters to copy.
macro_rules! entity_fields {
    ($($event:ty { $($field:ident),* $(,)? })*) => {
        $(
            impl $crate::subgraphs::EntityFields for $event {
                fn entity_fields(&self) -> Vec<(&'static str, $crate::models::FieldValue)> {
                    vec![
                        $((
                            stringify!($field),
                            $crate::models::IntoFieldValue::into_field_value(self.$field.clone()),
                        )),*
                    ]
                }
            }
        )*
    };
}

pub mod aave_v3;
pub mod compound_v3;
pub mod dyad;
pub mod liquity;
pub mod morpho;
pub mod proxy;
pub mod sky;

/// Decodes `log` as `E` and copies its parameters into a new entity.
pub fn map_event<E>(entity_type: &'static str, log: &Log) -> Result<Entity, MappingError>
where
    E: SolEvent + EntityFields,
{
    let transaction_hash = log
        .transaction_hash
        .ok_or(MappingError::MissingLogField("transactionHash"))?;
    let log_index = log.log_index.ok_or(MappingError::MissingLogField("logIndex"))?;
    let block_number = log.block_number.ok_or(MappingError::MissingLogField("blockNumber"))?;
    let block_timestamp = log
        .block_timestamp
        .ok_or(MappingError::MissingLogField("blockTimestamp"))?;

    let event = E::decode_log_data(&log.inner.data, true).map_err(|e| MappingError::Decode {
        event: E::SIGNATURE,
        reason: e.to_string(),
    })?;

    let fields = event
        .entity_fields()
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect::<BTreeMap<_, _>>();

    Ok(Entity {
        entity_type: entity_type.to_string(),
        id: EntityId::new(transaction_hash, log_index),
        fields,
        block_number,
        block_timestamp,
        transaction_hash,
    })
}

fn decodes_as<E: SolEvent>(log: &Log) -> bool {
    E::decode_log_data(&log.inner.data, true).is_ok()
}

/// `Transfer(address,address,uint256)` -> `Transfer`
fn event_name(signature: &'static str) -> &'static str {
    signature.split('(').next().unwrap_or(signature)
}

type HandleFn = fn(&'static str, &Log) -> Result<Entity, MappingError>;
type MatchFn = fn(&Log) -> bool;

/// One event handler of a data source.
#[derive(Clone)]
pub struct EventHandler {
    pub entity_type: &'static str,
    pub signature: &'static str,
    /// `None` for anonymous events, which carry no signature topic.
    pub topic0: Option<B256>,
    handle: HandleFn,
    matches: MatchFn,
}

impl EventHandler {
    pub fn new<E: SolEvent + EntityFields>(entity_type: &'static str) -> Self {
        Self {
            entity_type,
            signature: E::SIGNATURE,
            topic0: (!E::ANONYMOUS).then_some(E::SIGNATURE_HASH),
            handle: map_event::<E>,
            matches: decodes_as::<E>,
        }
    }

    pub fn handle(&self, log: &Log) -> Result<Entity, MappingError> {
        (self.handle)(self.entity_type, log)
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHandler")
            .field("entity_type", &self.entity_type)
            .field("signature", &self.signature)
            .field("topic0", &self.topic0)
            .finish()
    }
}

/// A contract whose logs are mapped by a fixed set of handlers.
#[derive(Debug, Clone)]
pub struct DataSource {
    pub name: &'static str,
    pub address: Address,
    pub handlers: Vec<EventHandler>,
}

impl DataSource {
    pub fn new(name: &'static str, address: Address) -> Self {
        Self { name, address, handlers: Vec::new() }
    }

    /// Registers `E` under its event name as the entity type.
    pub fn on<E: SolEvent + EntityFields>(self) -> Self {
        self.on_as::<E>(event_name(E::SIGNATURE))
    }

    pub fn on_as<E: SolEvent + EntityFields>(mut self, entity_type: &'static str) -> Self {
        self.handlers.push(EventHandler::new::<E>(entity_type));
        self
    }

    /// Named events are routed by topic0; anonymous events only when nothing named matched.
    pub fn handler_for(&self, log: &Log) -> Option<&EventHandler> {
        let topic0 = log.topics().first();
        self.handlers
            .iter()
            .find(|h| h.topic0.is_some() && h.topic0.as_ref() == topic0)
            .or_else(|| {
                self.handlers
                    .iter()
                    .filter(|h| h.topic0.is_none())
                    .find(|h| (h.matches)(log))
            })
    }
}

/// All data sources indexed for one protocol.
#[derive(Debug, Clone)]
pub struct Subgraph {
    pub protocol: CuratedProtocol,
    pub data_sources: Vec<DataSource>,
}

impl Subgraph {
    pub fn new(protocol: CuratedProtocol) -> Self {
        Self { protocol, data_sources: Vec::new() }
    }

    pub fn with_data_source(mut self, data_source: DataSource) -> Self {
        self.data_sources.push(data_source);
        self
    }

    pub fn data_source_for(&self, address: Address) -> Option<&DataSource> {
        self.data_sources.iter().find(|ds| ds.address == address)
    }

    pub fn handler_for(&self, log: &Log) -> Option<&EventHandler> {
        self.data_source_for(log.address())?.handler_for(log)
    }

    /// Maps one log. `Ok(None)` means no data source or handler claims it.
    pub fn process_log(&self, log: &Log) -> Result<Option<Entity>, MappingError> {
        match self.handler_for(log) {
            Some(handler) => handler.handle(log).map(Some),
            None => Ok(None),
        }
    }

    pub fn entity_types(&self) -> Vec<&'static str> {
        let mut types: Vec<&'static str> = self
            .data_sources
            .iter()
            .flat_map(|ds| ds.handlers.iter().map(|h| h.entity_type))
            .collect();
        types.sort_unstable();
        types.dedup();
        types
    }

    pub fn has_entity_type(&self, entity_type: &str) -> bool {
        self.data_sources
            .iter()
            .any(|ds| ds.handlers.iter().any(|h| h.entity_type == entity_type))
    }
}

/// The six curated subgraphs.
#[derive(Debug, Clone)]
pub struct SubgraphRegistry {
    subgraphs: BTreeMap<CuratedProtocol, Subgraph>,
}

impl SubgraphRegistry {
    pub fn new() -> Self {
        let subgraphs = [
            liquity::subgraph(),
            aave_v3::subgraph(),
            morpho::subgraph(),
            compound_v3::subgraph(),
            sky::subgraph(),
            dyad::subgraph(),
        ]
        .into_iter()
        .map(|subgraph| (subgraph.protocol, subgraph))
        .collect();

        Self { subgraphs }
    }

    pub fn get(&self, protocol: CuratedProtocol) -> Option<&Subgraph> {
        self.subgraphs.get(&protocol)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Subgraph> {
        self.subgraphs.values()
    }
}

impl Default for SubgraphRegistry {
    fn default() -> Self {
        Self::new()
    }
}

use alloy::primitives::{hex, Address, Bytes, FixedBytes, B256, U256};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Entity key: the transaction hash and the position of the log inside it.
///
/// Rendered as `0x<hash>-<logIndex>`, which is also the form accepted by `FromStr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId {
    pub transaction_hash: B256,
    pub log_index: u64,
}

impl EntityId {
    pub fn new(transaction_hash: B256, log_index: u64) -> Self {
        Self { transaction_hash, log_index }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", hex::encode_prefixed(self.transaction_hash), self.log_index)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid entity id '{0}', expected <txHash>-<logIndex>")]
pub struct InvalidEntityId(pub String);

impl FromStr for EntityId {
    type Err = InvalidEntityId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidEntityId(s.to_string());
        let (hash, index) = s.rsplit_once('-').ok_or_else(invalid)?;
        let transaction_hash = B256::from_str(hash).map_err(|_| invalid())?;
        let log_index = index.parse::<u64>().map_err(|_| invalid())?;
        Ok(Self { transaction_hash, log_index })
    }
}

impl Serialize for EntityId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Scalar values an entity field can hold, following the indexer's schema types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum FieldValue {
    Bytes(Bytes),
    BigInt(U256),
    Int(i32),
    Boolean(bool),
}

impl FieldValue {
    /// Same textual form the subgraph GraphQL API uses.
    pub fn to_display_string(&self) -> String {
        match self {
            FieldValue::Bytes(bytes) => hex::encode_prefixed(bytes),
            FieldValue::BigInt(value) => value.to_string(),
            FieldValue::Int(value) => value.to_string(),
            FieldValue::Boolean(value) => value.to_string(),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Int(value) => json!(value),
            FieldValue::Boolean(value) => json!(value),
            other => Value::String(other.to_display_string()),
        }
    }
}

/// Conversion from decoded ABI values into entity fields.
pub trait IntoFieldValue {
    fn into_field_value(self) -> FieldValue;
}

impl IntoFieldValue for Address {
    fn into_field_value(self) -> FieldValue {
        FieldValue::Bytes(Bytes::copy_from_slice(self.as_slice()))
    }
}

impl<const N: usize> IntoFieldValue for FixedBytes<N> {
    fn into_field_value(self) -> FieldValue {
        FieldValue::Bytes(Bytes::copy_from_slice(self.as_slice()))
    }
}

impl IntoFieldValue for Bytes {
    fn into_field_value(self) -> FieldValue {
        FieldValue::Bytes(self)
    }
}

impl IntoFieldValue for U256 {
    fn into_field_value(self) -> FieldValue {
        FieldValue::BigInt(self)
    }
}

impl IntoFieldValue for u128 {
    fn into_field_value(self) -> FieldValue {
        FieldValue::BigInt(U256::from(self))
    }
}

impl IntoFieldValue for u64 {
    fn into_field_value(self) -> FieldValue {
        FieldValue::BigInt(U256::from(self))
    }
}

impl IntoFieldValue for u32 {
    fn into_field_value(self) -> FieldValue {
        FieldValue::BigInt(U256::from(self))
    }
}

impl IntoFieldValue for u16 {
    fn into_field_value(self) -> FieldValue {
        FieldValue::Int(i32::from(self))
    }
}

impl IntoFieldValue for u8 {
    fn into_field_value(self) -> FieldValue {
        FieldValue::Int(i32::from(self))
    }
}

impl IntoFieldValue for bool {
    fn into_field_value(self) -> FieldValue {
        FieldValue::Boolean(self)
    }
}

/// One immutable record created from one on-chain log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub entity_type: String,
    pub id: EntityId,
    pub fields: BTreeMap<String, FieldValue>,
    pub block_number: u64,
    pub block_timestamp: u64,
    pub transaction_hash: B256,
}

impl Entity {
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// String form of any attribute, including `id` and the block metadata.
    pub fn field_string(&self, name: &str) -> Option<String> {
        match name {
            "id" => Some(self.id.to_string()),
            "blockNumber" => Some(self.block_number.to_string()),
            "blockTimestamp" => Some(self.block_timestamp.to_string()),
            "transactionHash" => Some(hex::encode_prefixed(self.transaction_hash)),
            other => self.fields.get(other).map(FieldValue::to_display_string),
        }
    }

    /// Flattened record in the shape a subgraph query returns.
    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        object.insert("id".to_string(), Value::String(self.id.to_string()));
        for (name, value) in &self.fields {
            object.insert(name.clone(), value.to_json());
        }
        object.insert("blockNumber".to_string(), Value::String(self.block_number.to_string()));
        object.insert(
            "blockTimestamp".to_string(),
            Value::String(self.block_timestamp.to_string()),
        );
        object.insert(
            "transactionHash".to_string(),
            Value::String(hex::encode_prefixed(self.transaction_hash)),
        );
        Value::Object(object)
    }
}

use serde::{Deserialize, Serialize};

/// Protocol record as returned by the DefiLlama `/protocols` endpoint.
///
/// DefiLlama omits or nulls many of these for smaller listings, so everything
/// beyond the identifiers is defaulted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Protocol {
    pub id: String,
    pub name: String,
    pub slug: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tvl: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub logo: String,
    #[serde(default, rename = "change_1d", deserialize_with = "null_as_default")]
    pub change_1d: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub chains: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub twitter: Option<String>,
    #[serde(default)]
    pub listed_at: Option<i64>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProtocolStatus {
    #[serde(rename = "High Score")]
    HighScore,
    #[serde(rename = "Medium Score")]
    MediumScore,
    #[serde(rename = "Low Score")]
    LowScore,
}

/// A DefiLlama protocol annotated with its DeFiPunk alignment score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeFiPunkProtocol {
    pub id: String,
    pub name: String,
    pub href: String,
    pub status: ProtocolStatus,
    pub alignment_score: u32,
    pub category: String,
    pub tvl: f64,
    pub logo: String,
    #[serde(rename = "change_1d")]
    pub change_1d: f64,
    pub chains: Vec<String>,
    pub description: String,
}

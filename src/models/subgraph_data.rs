//! Response shapes of the hosted subgraph queries. Numeric values arrive as
//! strings because the GraphQL `BigInt` scalar is serialized that way.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivePoolETHBalanceUpdated {
    pub id: String,
    #[serde(rename = "_ETH")]
    pub eth: String,
    pub block_number: String,
    pub block_timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivePoolAddressChanged {
    pub id: String,
    #[serde(rename = "_newActivePoolAddress")]
    pub new_active_pool_address: String,
    pub block_number: String,
    pub block_timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiquitySubgraphData {
    pub active_pool_address_changeds: Vec<ActivePoolAddressChanged>,
    #[serde(rename = "activePoolETHBalanceUpdateds")]
    pub active_pool_eth_balance_updateds: Vec<ActivePoolETHBalanceUpdated>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Upgraded {
    pub id: String,
    pub implementation: String,
    pub block_number: String,
    pub block_timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackUnbacked {
    pub id: String,
    pub reserve: String,
    pub backer: String,
    pub amount: String,
    #[serde(default)]
    pub fee: Option<String>,
    #[serde(default)]
    pub block_number: Option<String>,
    #[serde(default)]
    pub block_timestamp: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AaveSubgraphData {
    pub upgradeds: Vec<Upgraded>,
    pub back_unbackeds: Vec<BackUnbacked>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MorphoSubgraphData {
    pub upgradeds: Vec<Upgraded>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminChanged {
    pub id: String,
    pub previous_admin: String,
    pub new_admin: String,
    pub block_number: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeaconUpgraded {
    pub id: String,
    pub beacon: String,
    pub block_number: String,
    pub block_timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompoundSubgraphData {
    pub admin_changeds: Vec<AdminChanged>,
    pub beacon_upgradeds: Vec<BeaconUpgraded>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkyApproval {
    pub id: String,
    pub src: String,
    pub guy: String,
    pub wad: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogNote {
    pub id: String,
    pub sig: String,
    pub usr: String,
    pub arg1: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkySubgraphData {
    pub approvals: Vec<SkyApproval>,
    pub log_notes: Vec<LogNote>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DyadApproval {
    pub id: String,
    pub owner: String,
    pub spender: String,
    pub amount: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transfer {
    pub id: String,
    pub from: String,
    pub to: String,
    pub amount: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DyadSubgraphData {
    pub approvals: Vec<DyadApproval>,
    pub transfers: Vec<Transfer>,
}

/// Live data of any curated subgraph, serialized without a wrapper tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SubgraphData {
    Liquity(LiquitySubgraphData),
    Aave(AaveSubgraphData),
    Morpho(MorphoSubgraphData),
    Compound(CompoundSubgraphData),
    Sky(SkySubgraphData),
    Dyad(DyadSubgraphData),
}

use axum::{
    extract::{Path, State},
    response::Json,
    routing::get,
    Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::PublicError;
use crate::models::{get_defiscan_url, CuratedProtocol, DeFiPunkProtocol, LiquitySubgraphData, SubgraphData};
use crate::services::{filter_and_sort_protocols, transform_protocol};
use crate::utils::format::{format_address, format_date, format_eth, format_tvl, time_ago_at};
use crate::AppState;

const VISIBLE_CHAINS: usize = 5;
const PROTOCOL_NOT_FOUND: &str = "Protocol not found";
const ON_CHAIN_FAILURE: &str = "Failed to fetch on-chain data";

#[derive(Debug, Serialize, Deserialize)]
pub struct ProtocolListResponse {
    pub protocols: Vec<DeFiPunkProtocol>,
    pub total: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProtocolDetailResponse {
    pub protocol: DeFiPunkProtocol,
    pub tvl_formatted: String,
    pub listed_date: Option<String>,
    pub website: Option<String>,
    pub twitter_url: Option<String>,
    pub defillama_url: String,
    pub defiscan_url: String,
    /// First five chains; the rest are summarised in `more_chains`.
    pub chains: Vec<String>,
    pub more_chains: Option<String>,
    pub has_subgraph: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivePoolUpdate {
    pub id: String,
    pub eth: String,
    pub block_number: String,
    pub time_ago: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivePoolAddressUpdate {
    pub id: String,
    pub address: String,
    pub block_number: String,
    pub time_ago: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivePoolSummary {
    pub current_eth: String,
    /// `up`, `down` or `neutral`.
    pub trend: String,
    pub last_updated: Option<String>,
    pub recent_updates: Vec<ActivePoolUpdate>,
    pub address_changes: Vec<ActivePoolAddressUpdate>,
}

fn timestamp_ago(raw: &str, now: chrono::DateTime<Utc>) -> String {
    raw.parse::<i64>()
        .map(|ts| time_ago_at(ts, now))
        .unwrap_or_else(|_| "N/A".to_string())
}

/// Latest balance, direction against the previous update and the five newest updates.
pub fn summarize_active_pool(data: &LiquitySubgraphData, now: chrono::DateTime<Utc>) -> ActivePoolSummary {
    let updates = &data.active_pool_eth_balance_updateds;

    let trend = match (updates.first(), updates.get(1)) {
        (Some(latest), Some(previous)) => {
            let latest = latest.eth.parse::<f64>().unwrap_or(0.0);
            let previous = previous.eth.parse::<f64>().unwrap_or(0.0);
            if latest > previous { "up" } else { "down" }
        }
        _ => "neutral",
    };

    ActivePoolSummary {
        current_eth: updates
            .first()
            .map(|u| format_eth(&u.eth))
            .unwrap_or_else(|| "N/A".to_string()),
        trend: trend.to_string(),
        last_updated: updates.first().map(|u| timestamp_ago(&u.block_timestamp, now)),
        recent_updates: updates
            .iter()
            .take(5)
            .map(|u| ActivePoolUpdate {
                id: u.id.clone(),
                eth: format_eth(&u.eth),
                block_number: u.block_number.clone(),
                time_ago: timestamp_ago(&u.block_timestamp, now),
            })
            .collect(),
        address_changes: data
            .active_pool_address_changeds
            .iter()
            .map(|c| ActivePoolAddressUpdate {
                id: c.id.clone(),
                address: format_address(&c.new_active_pool_address),
                block_number: c.block_number.clone(),
                time_ago: timestamp_ago(&c.block_timestamp, now),
            })
            .collect(),
    }
}

/// GET /api/v1/protocols
pub async fn list_protocols(State(state): State<AppState>) -> Result<Json<ProtocolListResponse>, PublicError> {
    let protocols = state
        .defillama
        .get_protocols_with_cache()
        .await
        .map_err(|e| e.public("Failed to fetch protocols. Please try again later."))?;
    let scored = filter_and_sort_protocols(&protocols);
    info!(count = scored.len(), "Serving scored protocols");

    Ok(Json(ProtocolListResponse {
        total: scored.len(),
        protocols: scored,
    }))
}

/// GET /api/v1/protocols/:slug
pub async fn get_protocol(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ProtocolDetailResponse>, PublicError> {
    let raw = state
        .defillama
        .find_protocol(&slug)
        .await
        .map_err(|e| e.public("Failed to fetch protocol data"))?
        .ok_or(PublicError::not_found(PROTOCOL_NOT_FOUND))?;

    let chains: Vec<String> = raw.chains.iter().take(VISIBLE_CHAINS).cloned().collect();
    let more_chains = (raw.chains.len() > VISIBLE_CHAINS)
        .then(|| format!("+{} more", raw.chains.len() - VISIBLE_CHAINS));

    Ok(Json(ProtocolDetailResponse {
        tvl_formatted: format_tvl(raw.tvl),
        listed_date: raw.listed_at.map(format_date),
        website: raw.url.clone(),
        twitter_url: raw.twitter.as_ref().map(|handle| format!("https://twitter.com/{}", handle)),
        defillama_url: format!("https://defillama.com/protocol/{}", raw.slug),
        defiscan_url: get_defiscan_url(&raw.slug),
        chains,
        more_chains,
        has_subgraph: raw.slug.parse::<CuratedProtocol>().is_ok(),
        protocol: transform_protocol(&raw),
    }))
}

fn curated(slug: &str) -> Result<CuratedProtocol, PublicError> {
    slug.parse::<CuratedProtocol>()
        .map_err(|_| PublicError::not_found(PROTOCOL_NOT_FOUND))
}

/// GET /api/v1/protocols/:slug/subgraph
pub async fn get_protocol_subgraph(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<SubgraphData>, PublicError> {
    let protocol = curated(&slug)?;
    let data = state
        .subgraphs
        .get_protocol_data(protocol)
        .await
        .map_err(|e| e.public(ON_CHAIN_FAILURE))?;
    Ok(Json(data))
}

/// GET /api/v1/protocols/:slug/active-pool, Liquity V1 only
pub async fn get_active_pool(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ActivePoolSummary>, PublicError> {
    if curated(&slug)? != CuratedProtocol::LiquityV1 {
        return Err(PublicError::not_found(PROTOCOL_NOT_FOUND));
    }

    let data = state
        .subgraphs
        .get_liquity_data()
        .await
        .map_err(|e| e.public(ON_CHAIN_FAILURE))?;
    Ok(Json(summarize_active_pool(&data, Utc::now())))
}

pub fn create_protocol_routes() -> Router<AppState> {
    Router::new()
        .route("/protocols", get(list_protocols))
        .route("/protocols/:slug", get(get_protocol))
        .route("/protocols/:slug/subgraph", get(get_protocol_subgraph))
        .route("/protocols/:slug/active-pool", get(get_active_pool))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActivePoolAddressChanged, ActivePoolETHBalanceUpdated};
    use chrono::TimeZone;

    fn update(id: &str, eth: &str, timestamp: i64) -> ActivePoolETHBalanceUpdated {
        ActivePoolETHBalanceUpdated {
            id: id.to_string(),
            eth: eth.to_string(),
            block_number: "19000000".to_string(),
            block_timestamp: timestamp.to_string(),
        }
    }

    #[test]
    fn test_active_pool_trend_and_formatting() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let data = LiquitySubgraphData {
            active_pool_address_changeds: vec![ActivePoolAddressChanged {
                id: "0xabc-1".to_string(),
                new_active_pool_address: "0xdf9eb223bafbe5c5271415c75aecd68c21fe3d7f".to_string(),
                block_number: "12178551".to_string(),
                block_timestamp: "1617611537".to_string(),
            }],
            active_pool_eth_balance_updateds: vec![
                update("0x02-1", "1500000000000000000000", 1_700_000_000 - 7_200),
                update("0x01-1", "1400000000000000000000", 1_700_000_000 - 86_400),
            ],
        };

        let summary = summarize_active_pool(&data, now);
        assert_eq!(summary.current_eth, "1.50K ETH");
        assert_eq!(summary.trend, "up");
        assert_eq!(summary.last_updated.as_deref(), Some("2h ago"));
        assert_eq!(summary.recent_updates.len(), 2);
        assert_eq!(summary.recent_updates[1].time_ago, "1d ago");
        assert_eq!(summary.address_changes[0].address, "0xdf9e...3d7f");
    }

    #[test]
    fn test_active_pool_equal_balances_trend_down() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let data = LiquitySubgraphData {
            active_pool_address_changeds: vec![],
            active_pool_eth_balance_updateds: vec![
                update("0x02-1", "100", 1_699_999_000),
                update("0x01-1", "100", 1_699_998_000),
            ],
        };
        assert_eq!(summarize_active_pool(&data, now).trend, "down");
    }

    #[test]
    fn test_active_pool_without_updates() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let data = LiquitySubgraphData {
            active_pool_address_changeds: vec![],
            active_pool_eth_balance_updateds: vec![],
        };

        let summary = summarize_active_pool(&data, now);
        assert_eq!(summary.current_eth, "N/A");
        assert_eq!(summary.trend, "neutral");
        assert!(summary.last_updated.is_none());
    }
}

use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::SubgraphSettings;
use crate::error::AppError;
use crate::models::{
    AaveSubgraphData, CompoundSubgraphData, CuratedProtocol, DyadSubgraphData, LiquitySubgraphData,
    MorphoSubgraphData, SkySubgraphData, SubgraphData,
};
use crate::utils::metrics::record_external_request;

const LIQUITY_QUERY: &str = r#"
{
  activePoolETHBalanceUpdateds(first: 10, orderBy: blockTimestamp, orderDirection: desc) {
    id
    _ETH
    blockNumber
    blockTimestamp
  }
  activePoolAddressChangeds(first: 5, orderBy: blockTimestamp, orderDirection: desc) {
    id
    _newActivePoolAddress
    blockNumber
    blockTimestamp
  }
}
"#;

const AAVE_QUERY: &str = r#"
{
  upgradeds(first: 10, orderBy: blockTimestamp, orderDirection: desc) {
    id
    implementation
    blockNumber
    blockTimestamp
  }
  backUnbackeds(first: 10, orderBy: blockTimestamp, orderDirection: desc) {
    id
    reserve
    backer
    amount
    fee
    blockNumber
    blockTimestamp
  }
}
"#;

const MORPHO_QUERY: &str = r#"
{
  upgradeds(first: 10, orderBy: blockTimestamp, orderDirection: desc) {
    id
    implementation
    blockNumber
    blockTimestamp
  }
}
"#;

const COMPOUND_QUERY: &str = r#"
{
  adminChangeds(first: 10, orderBy: blockNumber, orderDirection: desc) {
    id
    previousAdmin
    newAdmin
    blockNumber
  }
  beaconUpgradeds(first: 10, orderBy: blockTimestamp, orderDirection: desc) {
    id
    beacon
    blockNumber
    blockTimestamp
  }
}
"#;

const SKY_QUERY: &str = r#"
{
  approvals(first: 10, orderBy: id, orderDirection: desc) {
    id
    src
    guy
    wad
  }
  logNotes(first: 10, orderBy: id, orderDirection: desc) {
    id
    sig
    usr
    arg1
  }
}
"#;

const DYAD_QUERY: &str = r#"
{
  approvals(first: 10, orderBy: id, orderDirection: desc) {
    id
    owner
    spender
    amount
  }
  transfers(first: 10, orderBy: id, orderDirection: desc) {
    id
    from
    to
    amount
  }
}
"#;

#[derive(Debug, Serialize)]
struct GraphQuery<'a> {
    query: &'a str,
}

#[derive(Debug, Deserialize)]
struct GraphResponse<T> {
    data: Option<T>,
    errors: Option<serde_json::Value>,
}

/// Reads the hosted subgraphs' GraphQL endpoints.
#[derive(Clone)]
pub struct SubgraphService {
    client: Client,
    settings: SubgraphSettings,
}

impl SubgraphService {
    pub fn new(settings: SubgraphSettings) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()?;

        Ok(Self { client, settings })
    }

    pub async fn query<T: DeserializeOwned>(
        &self,
        protocol: CuratedProtocol,
        query: &str,
    ) -> Result<T, AppError> {
        let endpoint = self.settings.endpoints.get(&protocol).ok_or_else(|| {
            AppError::ConfigError(format!("No subgraph configuration found for {}", protocol))
        })?;

        debug!(%protocol, url = %endpoint.url, "Querying subgraph");

        let mut request = self.client.post(&endpoint.url).json(&GraphQuery { query });
        if let Some(api_key) = &endpoint.api_key {
            request = request.bearer_auth(api_key);
        }

        let result = async {
            let response = request
                .send()
                .await
                .map_err(|e| AppError::ExternalApiError(format!("Subgraph request failed: {}", e)))?;

            if !response.status().is_success() {
                return Err(AppError::ExternalApiError(format!(
                    "Subgraph query failed: {}",
                    response.status()
                )));
            }

            let body: GraphResponse<T> = response.json().await.map_err(|e| {
                AppError::ExternalApiError(format!("Failed to parse subgraph response: {}", e))
            })?;

            if let Some(errors) = body.errors {
                return Err(AppError::ExternalApiError(format!("GraphQL errors: {}", errors)));
            }

            body.data
                .ok_or_else(|| AppError::ExternalApiError("Subgraph returned no data".to_string()))
        }
        .await;

        record_external_request("subgraph", result.is_ok());
        if let Err(e) = &result {
            warn!(%protocol, "Subgraph query failed: {}", e);
        }
        result
    }

    pub async fn get_liquity_data(&self) -> Result<LiquitySubgraphData, AppError> {
        self.query(CuratedProtocol::LiquityV1, LIQUITY_QUERY).await
    }

    pub async fn get_aave_data(&self) -> Result<AaveSubgraphData, AppError> {
        self.query(CuratedProtocol::AaveV3, AAVE_QUERY).await
    }

    pub async fn get_morpho_data(&self) -> Result<MorphoSubgraphData, AppError> {
        self.query(CuratedProtocol::MorphoBlue, MORPHO_QUERY).await
    }

    pub async fn get_compound_data(&self) -> Result<CompoundSubgraphData, AppError> {
        self.query(CuratedProtocol::CompoundV3, COMPOUND_QUERY).await
    }

    pub async fn get_sky_data(&self) -> Result<SkySubgraphData, AppError> {
        self.query(CuratedProtocol::SkyLending, SKY_QUERY).await
    }

    pub async fn get_dyad_data(&self) -> Result<DyadSubgraphData, AppError> {
        self.query(CuratedProtocol::Dyad, DYAD_QUERY).await
    }

    pub async fn get_protocol_data(&self, protocol: CuratedProtocol) -> Result<SubgraphData, AppError> {
        Ok(match protocol {
            CuratedProtocol::LiquityV1 => SubgraphData::Liquity(self.get_liquity_data().await?),
            CuratedProtocol::AaveV3 => SubgraphData::Aave(self.get_aave_data().await?),
            CuratedProtocol::MorphoBlue => SubgraphData::Morpho(self.get_morpho_data().await?),
            CuratedProtocol::CompoundV3 => SubgraphData::Compound(self.get_compound_data().await?),
            CuratedProtocol::SkyLending => SubgraphData::Sky(self.get_sky_data().await?),
            CuratedProtocol::Dyad => SubgraphData::Dyad(self.get_dyad_data().await?),
        })
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The six lending protocols that ship a subgraph and a DeFiScan review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CuratedProtocol {
    #[serde(rename = "liquity-v1")]
    LiquityV1,
    #[serde(rename = "aave-v3")]
    AaveV3,
    #[serde(rename = "morpho-blue")]
    MorphoBlue,
    #[serde(rename = "compound-v3")]
    CompoundV3,
    #[serde(rename = "sky-lending")]
    SkyLending,
    #[serde(rename = "dyad")]
    Dyad,
}

impl CuratedProtocol {
    pub const ALL: [CuratedProtocol; 6] = [
        CuratedProtocol::LiquityV1,
        CuratedProtocol::AaveV3,
        CuratedProtocol::MorphoBlue,
        CuratedProtocol::CompoundV3,
        CuratedProtocol::SkyLending,
        CuratedProtocol::Dyad,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            CuratedProtocol::LiquityV1 => "liquity-v1",
            CuratedProtocol::AaveV3 => "aave-v3",
            CuratedProtocol::MorphoBlue => "morpho-blue",
            CuratedProtocol::CompoundV3 => "compound-v3",
            CuratedProtocol::SkyLending => "sky-lending",
            CuratedProtocol::Dyad => "dyad",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            CuratedProtocol::LiquityV1 => "Liquity V1",
            CuratedProtocol::AaveV3 => "Aave V3",
            CuratedProtocol::MorphoBlue => "Morpho Blue",
            CuratedProtocol::CompoundV3 => "Compound V3",
            CuratedProtocol::SkyLending => "Sky Lending",
            CuratedProtocol::Dyad => "DYAD",
        }
    }

    /// Suffix used for per-protocol environment variables, e.g. `SUBGRAPH_AAVE_V3_URL`.
    pub fn env_key(&self) -> String {
        self.slug().replace('-', "_").to_uppercase()
    }

    /// Hosted Subgraph Studio endpoint the mappings are deployed to.
    pub fn default_subgraph_url(&self) -> &'static str {
        match self {
            CuratedProtocol::LiquityV1 => {
                "https://api.studio.thegraph.com/query/113928/defiscan-liquity/version/latest"
            }
            CuratedProtocol::AaveV3 => {
                "https://api.studio.thegraph.com/query/113928/defiscan-aave-v-3/version/latest"
            }
            CuratedProtocol::MorphoBlue => {
                "https://api.studio.thegraph.com/query/113928/defiscan-morpho/version/latest"
            }
            CuratedProtocol::CompoundV3 => {
                "https://api.studio.thegraph.com/query/113929/defiscan-compound-v-3/version/latest"
            }
            CuratedProtocol::SkyLending => {
                "https://api.studio.thegraph.com/query/113929/defiscan-sky/version/latest"
            }
            CuratedProtocol::Dyad => {
                "https://api.studio.thegraph.com/query/113929/defiscan-dyad/version/latest"
            }
        }
    }

    pub fn defiscan_url(&self) -> String {
        let review = match self {
            CuratedProtocol::LiquityV1 => "liquity",
            CuratedProtocol::AaveV3 => "aave",
            CuratedProtocol::MorphoBlue => "morpho",
            CuratedProtocol::CompoundV3 => "compound-v3",
            CuratedProtocol::SkyLending => "sky",
            CuratedProtocol::Dyad => "dyad",
        };
        format!("https://www.defiscan.info/protocols/{}/ethereum", review)
    }
}

impl fmt::Display for CuratedProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown protocol: {0}")]
pub struct UnknownProtocol(pub String);

impl FromStr for CuratedProtocol {
    type Err = UnknownProtocol;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CuratedProtocol::ALL
            .into_iter()
            .find(|p| p.slug() == s)
            .ok_or_else(|| UnknownProtocol(s.to_string()))
    }
}

/// DeFiScan overview page; curated slugs link to their review, anything else to the index.
pub fn get_defiscan_url(slug: &str) -> String {
    slug.parse::<CuratedProtocol>()
        .map(|p| p.defiscan_url())
        .unwrap_or_else(|_| "https://www.defiscan.info".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_round_trip() {
        for protocol in CuratedProtocol::ALL {
            assert_eq!(protocol.slug().parse::<CuratedProtocol>(), Ok(protocol));
        }
        assert!("uniswap".parse::<CuratedProtocol>().is_err());
    }

    #[test]
    fn test_env_key() {
        assert_eq!(CuratedProtocol::SkyLending.env_key(), "SKY_LENDING");
        assert_eq!(CuratedProtocol::Dyad.env_key(), "DYAD");
    }

    #[test]
    fn test_serde_uses_slug() {
        let json = serde_json::to_string(&CuratedProtocol::MorphoBlue).unwrap();
        assert_eq!(json, "\"morpho-blue\"");
    }

    #[test]
    fn test_defiscan_url_fallback() {
        assert_eq!(
            get_defiscan_url("liquity-v1"),
            "https://www.defiscan.info/protocols/liquity/ethereum"
        );
        assert_eq!(get_defiscan_url("curve"), "https://www.defiscan.info");
    }
}

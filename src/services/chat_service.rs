use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

use crate::config::OpenAISettings;
use crate::models::{CuratedProtocol, DeFiPunkProtocol};
use crate::services::defillama::DefiLlamaService;
use crate::services::defipunk_score::filter_and_sort_protocols;
use crate::services::subgraph_service::SubgraphService;
use crate::utils::metrics::record_external_request;

pub const SYSTEM_PROMPT: &str = r#"You are DeFiPunk AI, an expert assistant for the DeFiPunk Subgraph application - a cypherpunk scorecard for DeFi protocols. You have comprehensive knowledge about 6 curated DeFi protocols and their alignment with cypherpunk values.

## Your Knowledge Base:

### LIQUITY V1 (DeFiPunk Score: 91/100 - Stage 2)
- Website: https://www.liquity.org
- Twitter: https://x.com/LiquityProtocol
- GitHub: https://github.com/liquity
- Stage 2 (Low centralization risk across all dimensions)
- Interest-free loans against ETH collateral (110% minimum ratio)
- LUSD stablecoin (USD pegged)
- Completely immutable - all permissions renounced (0x0 owners)
- Multiple independent frontends available
- Robust oracle fallback system (Chainlink primary, Tellor fallback, "last good price")
- 17 core contracts all with renounced permissions

### AAVE V3 (DeFiPunk Score: 58/100 - Stage 0)
- Website: https://aave.com
- Twitter: https://x.com/aave
- GitHub: https://github.com/aave-dao/aave-v3-origin
- Stage 0 (High centralization risk across upgradeability, autonomy, exit window)
- Lending protocol for ERC20 assets with collateralized borrowing
- Native stablecoin GHO with 1:1 USDC/USDT backing
- Fully upgradeable contracts through Aave Governance
- Emergency Admin multisig can pause markets and disable liquidation grace period
- High upgradeability, autonomy, and exit window risks

### MORPHO BLUE (DeFiPunk Score: 79/100 - Stage 1)
- Website: https://morpho.org/
- Twitter: https://x.com/MorphoLabs
- GitHub: https://github.com/morpho-org
- Stage 1 (Medium centralization risk in upgradeability, autonomy, exit window)
- Permissionless lending market creation with isolated markets
- Core protocol is non-upgradeable and immutable
- MORPHO token upgradeable, can impact rewards
- 35%+ markets use Chainlink oracles (centralized dependency)

### COMPOUND V3 (DeFiPunk Score: 54/100 - Stage 0)
- Website: https://compound.finance/
- Twitter: https://x.com/compoundfinance
- GitHub: https://github.com/compound-finance/compound-protocol
- Stage 0 (High centralization risk across upgradeability, autonomy, exit window)
- Lending protocol with base asset liquidity (USDC, WETH, USDT, wstETH, USDS)
- Fully upgradeable protocol (Governance + Comet contracts)
- ProposalGuardian can censor proposals, PauseGuardian can freeze markets
- Guardian multisigs don't meet security council requirements

### SKY LENDING (DeFiPunk Score: 49/100 - Stage 0)
- Website: https://sky.money/
- Twitter: https://x.com/SkyEcosystem
- GitHub: https://github.com/makerdao
- Stage 0 (High centralization risk across upgradeability, autonomy, exit window)
- Stablecoin protocol for minting USDS through Collateralized Debt Positions
- Built on Maker protocol, replaces DAI with 1:1 DAI<->USDS conversion
- USDS directly pegged to USDC (centralized) instead of USD
- Emergency Shutdown Module can irreversibly shutdown protocol

### DYAD (DeFiPunk Score: 44/100 - Stage 0)
- Website: https://dyadstable.xyz
- Twitter: https://x.com/0xDYAD
- GitHub: https://github.com/DyadStablecoin
- Stage 0 (High centralization risk across upgradeability, autonomy, exit window)
- Interest-free stablecoin minting against collateral (ETH, stETH, TBTC, sUSDe)
- VaultManagerV4 upgradeable, enables arbitrary DYAD minting
- Team multisig (2/3) can remove vaults and freeze collateral permanently
- Critical flaw: If Chainlink feed discontinued, corresponding collateral permanently lost

## DeFiPunk Scoring Criteria:
- Decentralization (25%): Governance structure, admin controls, multisig dependencies
- Open Source (20%): Code availability, transparency, auditability
- Self-Custody (20%): Non-custodial design, user control over assets
- Privacy (15%): KYC requirements, transaction privacy, anonymity
- Immutability (10%): Upgradeability risks, contract immutability
- Permissionless (10%): Access restrictions, censorship resistance

## Your Role:
- Answer questions about protocol security, decentralization, and cypherpunk alignment
- Explain DeFiScan stage ratings and what they mean
- Compare protocols across different dimensions
- Provide insights about on-chain analytics and subgraph data
- Help users understand risks and benefits of each protocol
- Always cite specific data points and scores when relevant

Be helpful, accurate, and focus on the cypherpunk values of privacy, decentralization, and trustlessness."#;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChatError {
    #[error("completion API key is not configured")]
    MissingApiKey,

    #[error("completion request failed: {0}")]
    Request(String),

    #[error("completion returned no content")]
    EmptyResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    fn new(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: Option<CompletionMessage>,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

/// Appends the live DefiLlama lines and, when present, the subgraph snapshot.
pub fn build_context(protocols: Option<&[DeFiPunkProtocol]>, subgraph: Option<(&str, &str)>) -> String {
    let mut context = String::new();

    if let Some(protocols) = protocols {
        context.push_str("\n## Current Protocol Data (Live from DeFiLlama):\n");
        for protocol in protocols {
            context.push_str(&format!(
                "- {}: TVL ${:.2}M, 24h change: {:.2}%, Category: {}\n",
                protocol.name,
                protocol.tvl / 1e6,
                protocol.change_1d,
                protocol.category
            ));
        }
    }

    if let Some((slug, data)) = subgraph {
        context.push_str(&format!("\n## Live Subgraph Data for {}:\n", slug));
        context.push_str(data);
    }

    context
}

/// Grounded chat over an OpenAI-compatible completions endpoint.
#[derive(Clone)]
pub struct ChatService {
    client: Client,
    settings: OpenAISettings,
    defillama: DefiLlamaService,
    subgraphs: SubgraphService,
}

impl ChatService {
    pub fn new(
        settings: OpenAISettings,
        defillama: DefiLlamaService,
        subgraphs: SubgraphService,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            settings,
            defillama,
            subgraphs,
        })
    }

    /// Context sources are best effort: a failing source is left out of the prompt.
    pub async fn gather_context(&self, protocol_slug: Option<&str>) -> String {
        let protocols = match self.defillama.get_protocols_with_cache().await {
            Ok(protocols) => Some(filter_and_sort_protocols(&protocols)),
            Err(e) => {
                warn!("Error fetching context data: {}", e);
                None
            }
        };

        let mut subgraph_json = None;
        if let Some(protocol) = protocol_slug.and_then(|s| s.parse::<CuratedProtocol>().ok()) {
            match self.subgraphs.get_protocol_data(protocol).await {
                Ok(data) => match serde_json::to_string_pretty(&data) {
                    Ok(json) => subgraph_json = Some((protocol.slug(), json)),
                    Err(e) => warn!("Failed to serialize subgraph data: {}", e),
                },
                Err(_) => info!("Subgraph data not available for {}", protocol),
            }
        }

        build_context(
            protocols.as_deref(),
            subgraph_json.as_ref().map(|(slug, json)| (*slug, json.as_str())),
        )
    }

    pub async fn chat(&self, message: &str, protocol_slug: Option<&str>) -> Result<String, ChatError> {
        let api_key = self.settings.api_key.as_deref().ok_or(ChatError::MissingApiKey)?;
        let context = self.gather_context(protocol_slug).await;

        let request = CompletionRequest {
            model: &self.settings.model,
            messages: vec![
                ChatMessage::new("system", format!("{}{}", SYSTEM_PROMPT, context)),
                ChatMessage::new("user", message),
            ],
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        };

        let url = format!("{}/chat/completions", self.settings.base_url.trim_end_matches('/'));
        let result = self.complete(&url, api_key, &request).await;
        record_external_request("openai", result.is_ok());
        result
    }

    async fn complete(
        &self,
        url: &str,
        api_key: &str,
        request: &CompletionRequest<'_>,
    ) -> Result<String, ChatError> {
        let response = self
            .client
            .post(url)
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| ChatError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ChatError::Request(format!("{}: {}", status, body)));
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| ChatError::Request(format!("Failed to parse completion: {}", e)))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .filter(|content| !content.is_empty())
            .ok_or(ChatError::EmptyResponse)
    }
}

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use url::Url;

use crate::models::CuratedProtocol;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    pub api: ApiSettings,
    pub database: DatabaseSettings,
    pub defillama: DefiLlamaSettings,
    pub subgraphs: SubgraphSettings,
    pub openai: OpenAISettings,
    pub ingest: IngestSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    pub host: String,
    pub port: u16,
}

/// Without a URL the entity store is kept in memory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    pub url: Option<String>,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefiLlamaSettings {
    pub base_url: String,
    pub cache_ttl_seconds: u64,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubgraphEndpoint {
    pub url: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubgraphSettings {
    pub endpoints: BTreeMap<CuratedProtocol, SubgraphEndpoint>,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAISettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestSettings {
    /// Shared secret expected in the `x-ingest-token` header.
    pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
    /// `json`, `pretty` or `compact`.
    pub format: String,
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            url: None,
            max_connections: 10,
        }
    }
}

impl Default for DefiLlamaSettings {
    fn default() -> Self {
        DefiLlamaSettings {
            base_url: "https://api.llama.fi".to_string(),
            cache_ttl_seconds: 300,
            timeout_seconds: 30,
        }
    }
}

impl Default for SubgraphSettings {
    fn default() -> Self {
        let endpoints = CuratedProtocol::ALL
            .into_iter()
            .map(|protocol| {
                (
                    protocol,
                    SubgraphEndpoint {
                        url: protocol.default_subgraph_url().to_string(),
                        api_key: None,
                    },
                )
            })
            .collect();

        SubgraphSettings {
            endpoints,
            timeout_seconds: 30,
        }
    }
}

impl Default for OpenAISettings {
    fn default() -> Self {
        OpenAISettings {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            max_tokens: 1000,
            timeout_seconds: 60,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Settings {
    /// Reads settings from the process environment (after `.env` has been loaded).
    pub fn new() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::Environment::default())
            .build()?;

        Self::from_config(&config)
    }

    /// Keys are the lowercased environment variable names, e.g. `database_url`.
    pub fn from_config(config: &config::Config) -> Result<Self, config::ConfigError> {
        let defaults = Settings::default();

        let thegraph_api_key = optional_string(config, "thegraph_api_key")?;
        let mut endpoints = BTreeMap::new();
        for protocol in CuratedProtocol::ALL {
            let key = protocol.env_key().to_lowercase();
            let url = optional_string(config, &format!("subgraph_{}_url", key))?
                .unwrap_or_else(|| protocol.default_subgraph_url().to_string());
            let api_key = optional_string(config, &format!("subgraph_{}_api_key", key))?
                .or_else(|| thegraph_api_key.clone());
            endpoints.insert(protocol, SubgraphEndpoint { url, api_key });
        }

        let settings = Settings {
            api: ApiSettings {
                host: string_or(config, "api_host", defaults.api.host)?,
                port: parsed_or(config, "api_port", defaults.api.port)?,
            },
            database: DatabaseSettings {
                url: optional_string(config, "database_url")?,
                max_connections: parsed_or(
                    config,
                    "database_max_connections",
                    defaults.database.max_connections,
                )?,
            },
            defillama: DefiLlamaSettings {
                base_url: string_or(config, "defillama_base_url", defaults.defillama.base_url)?,
                cache_ttl_seconds: parsed_or(
                    config,
                    "defillama_cache_ttl_seconds",
                    defaults.defillama.cache_ttl_seconds,
                )?,
                timeout_seconds: parsed_or(
                    config,
                    "defillama_timeout_seconds",
                    defaults.defillama.timeout_seconds,
                )?,
            },
            subgraphs: SubgraphSettings {
                endpoints,
                timeout_seconds: parsed_or(
                    config,
                    "subgraph_timeout_seconds",
                    defaults.subgraphs.timeout_seconds,
                )?,
            },
            openai: OpenAISettings {
                api_key: optional_string(config, "openai_api_key")?,
                base_url: string_or(config, "openai_base_url", defaults.openai.base_url)?,
                model: string_or(config, "openai_model", defaults.openai.model)?,
                temperature: parsed_or(config, "openai_temperature", defaults.openai.temperature)?,
                max_tokens: parsed_or(config, "openai_max_tokens", defaults.openai.max_tokens)?,
                timeout_seconds: parsed_or(
                    config,
                    "openai_timeout_seconds",
                    defaults.openai.timeout_seconds,
                )?,
            },
            ingest: IngestSettings {
                token: optional_string(config, "ingest_token")?,
            },
            logging: LoggingSettings {
                level: string_or(config, "log_level", defaults.logging.level)?,
                format: string_or(config, "log_format", defaults.logging.format)?,
            },
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Rejects endpoint URLs that are not http(s) and database URLs that are not Postgres.
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        let mut http_urls = vec![
            ("defillama_base_url", self.defillama.base_url.as_str()),
            ("openai_base_url", self.openai.base_url.as_str()),
        ];
        for endpoint in self.subgraphs.endpoints.values() {
            http_urls.push(("subgraph url", endpoint.url.as_str()));
        }

        for (field, raw) in http_urls {
            let scheme = parse_url(field, raw)?.scheme().to_string();
            if scheme != "http" && scheme != "https" {
                return Err(config::ConfigError::Message(format!(
                    "{} must be http(s), got {}",
                    field, raw
                )));
            }
        }

        if let Some(raw) = &self.database.url {
            let scheme = parse_url("database_url", raw)?.scheme().to_string();
            if scheme != "postgres" && scheme != "postgresql" {
                return Err(config::ConfigError::Message(format!(
                    "Unsupported database scheme: {}",
                    scheme
                )));
            }
        }

        Ok(())
    }

    pub fn subgraph_endpoint(&self, protocol: CuratedProtocol) -> SubgraphEndpoint {
        self.subgraphs
            .endpoints
            .get(&protocol)
            .cloned()
            .unwrap_or_else(|| SubgraphEndpoint {
                url: protocol.default_subgraph_url().to_string(),
                api_key: None,
            })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

fn parse_url(field: &str, raw: &str) -> Result<Url, config::ConfigError> {
    Url::parse(raw).map_err(|e| config::ConfigError::Message(format!("invalid {}: {}", field, e)))
}

/// Empty values count as unset.
fn optional_string(config: &config::Config, key: &str) -> Result<Option<String>, config::ConfigError> {
    match config.get_string(key) {
        Ok(value) if value.trim().is_empty() => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(config::ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

fn string_or(config: &config::Config, key: &str, default: String) -> Result<String, config::ConfigError> {
    Ok(optional_string(config, key)?.unwrap_or(default))
}

fn parsed_or<T>(config: &config::Config, key: &str, default: T) -> Result<T, config::ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match optional_string(config, key)? {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| config::ConfigError::Message(format!("invalid {}: {}", key, e))),
        None => Ok(default),
    }
}

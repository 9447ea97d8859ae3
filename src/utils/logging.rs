use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingSettings;

fn env_filter(level: &str) -> EnvFilter {
    let level = level.parse::<tracing::Level>().unwrap_or(tracing::Level::INFO);
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("defipunk={},tower_http={}", level, level).into())
}

/// Installs the global subscriber. `RUST_LOG` overrides the configured level.
pub fn init_logging(settings: &LoggingSettings) {
    let registry = tracing_subscriber::registry().with(env_filter(&settings.level));

    match settings.format.as_str() {
        "json" => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        "compact" => registry.with(tracing_subscriber::fmt::layer().compact()).init(),
        _ => registry.with(tracing_subscriber::fmt::layer().pretty()).init(),
    }

    info!(level = %settings.level, format = %settings.format, "Logging initialized");
}

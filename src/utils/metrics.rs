use once_cell::sync::Lazy;
use prometheus::{register_int_counter_vec, Encoder, IntCounterVec, TextEncoder};

use crate::error::AppError;

/// Entities written by the mapping handlers
pub static ENTITIES_INDEXED_COUNT: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "defipunk_entities_indexed_total",
        "Number of entities created from ingested logs",
        &["protocol", "entity_type"]
    )
    .unwrap()
});

/// Logs no data source or handler claimed
pub static LOGS_SKIPPED_COUNT: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "defipunk_logs_skipped_total",
        "Number of ingested logs that matched no handler",
        &["protocol"]
    )
    .unwrap()
});

pub static EXTERNAL_REQUESTS_COUNT: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "defipunk_external_requests_total",
        "Requests to DefiLlama, subgraph and completion endpoints",
        &["service", "outcome"]
    )
    .unwrap()
});

pub fn record_external_request(service: &str, success: bool) {
    let outcome = if success { "success" } else { "error" };
    EXTERNAL_REQUESTS_COUNT.with_label_values(&[service, outcome]).inc();
}

/// Renders the default registry in the Prometheus text format.
pub fn encode_metrics() -> Result<String, AppError> {
    // Touch the statics so they are registered even before first use.
    Lazy::force(&ENTITIES_INDEXED_COUNT);
    Lazy::force(&LOGS_SKIPPED_COUNT);
    Lazy::force(&EXTERNAL_REQUESTS_COUNT);

    let mut buffer = Vec::new();
    TextEncoder::new().encode(&prometheus::gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| AppError::InternalError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoded_metrics_contain_counters() {
        record_external_request("defillama", true);
        let text = encode_metrics().unwrap();
        assert!(text.contains("defipunk_external_requests_total"));
    }
}

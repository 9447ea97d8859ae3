mod common;

use alloy::primitives::U256;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use defipunk::{
    config::{Settings, SubgraphEndpoint},
    handlers::create_router,
    models::CuratedProtocol,
    subgraphs::liquity,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::{
    matchers::{body_string_contains, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

use common::{entity_id, mock_log, test_state};

fn settings_for(server: &MockServer) -> Settings {
    let mut settings = Settings::default();
    settings.defillama.base_url = server.uri();
    settings.openai.base_url = server.uri();
    for protocol in CuratedProtocol::ALL {
        settings.subgraphs.endpoints.insert(
            protocol,
            SubgraphEndpoint {
                url: format!("{}/subgraphs/{}", server.uri(), protocol.slug()),
                api_key: Some("graph-key".to_string()),
            },
        );
    }
    settings
}

fn app(settings: Settings) -> Router {
    let (state, _store) = test_state(settings);
    create_router(state)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_raw(uri: &str, body: &'static str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap()
}

fn defillama_protocols() -> Value {
    json!([
        {
            "id": "1", "name": "Uniswap", "slug": "uniswap", "category": "Dexes",
            "tvl": 4.2e9, "logo": "u.png", "change_1d": 1.5,
            "chains": ["Ethereum", "Arbitrum", "Base", "Optimism", "Polygon", "BSC", "Avalanche"],
            "description": "AMM", "url": "https://uniswap.org", "twitter": "Uniswap",
            "listedAt": 1617753600
        },
        {
            "id": "2", "name": "Binance", "slug": "binance-cex", "category": "CEX",
            "tvl": 9.0e10, "chains": ["Ethereum"]
        },
        {
            "id": "3", "name": "Liquity V1", "slug": "liquity-v1", "category": "CDP",
            "tvl": 2.5e8, "change_1d": null, "chains": ["Ethereum"], "description": null
        },
        {
            "id": "4", "name": "Small", "slug": "small", "category": "Dexes", "tvl": 5.0e5
        }
    ])
}

async fn mount_defillama(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/protocols"))
        .respond_with(ResponseTemplate::new(200).set_body_json(defillama_protocols()))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_health() {
    let server = MockServer::start().await;
    let app = app(settings_for(&server));

    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["subgraphs"], 6);
}

#[tokio::test]
async fn test_metrics_are_exposed() {
    let server = MockServer::start().await;
    let app = app(settings_for(&server));

    let response = app.clone().oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        "text/plain; version=0.0.4; charset=utf-8"
    );
}

#[tokio::test]
async fn test_protocol_list_is_scored_and_filtered() {
    let server = MockServer::start().await;
    mount_defillama(&server).await;
    let app = app(settings_for(&server));

    let (status, body) = send(&app, get("/api/v1/protocols")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    assert_eq!(body["protocols"][0]["name"], "Uniswap");
    assert_eq!(body["protocols"][0]["alignmentScore"], 87);
    assert_eq!(body["protocols"][0]["status"], "High Score");
    assert_eq!(body["protocols"][0]["href"], "/protocol/uniswap");
    assert_eq!(body["protocols"][1]["alignmentScore"], 59);
    assert_eq!(body["protocols"][1]["status"], "Low Score");
}

#[tokio::test]
async fn test_protocol_list_is_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/protocols"))
        .respond_with(ResponseTemplate::new(200).set_body_json(defillama_protocols()))
        .expect(1)
        .mount(&server)
        .await;
    let app = app(settings_for(&server));

    for _ in 0..3 {
        let (status, _) = send(&app, get("/api/v1/protocols")).await;
        assert_eq!(status, StatusCode::OK);
    }
}

#[tokio::test]
async fn test_defillama_failure_is_bad_gateway() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/protocols"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    let app = app(settings_for(&server));

    let (status, body) = send(&app, get("/api/v1/protocols")).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(
        body,
        json!({ "error": "Failed to fetch protocols. Please try again later.", "status": 502 })
    );

    let (status, body) = send(&app, get("/api/v1/protocols/uniswap")).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "Failed to fetch protocol data");
}

#[tokio::test]
async fn test_subgraph_failure_hides_upstream_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/subgraphs/liquity-v1"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let app = app(settings_for(&server));

    let (status, body) = send(&app, get("/api/v1/protocols/liquity-v1/active-pool")).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body, json!({ "error": "Failed to fetch on-chain data", "status": 502 }));

    let (status, body) = send(&app, get("/api/v1/protocols/liquity-v1/subgraph")).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "Failed to fetch on-chain data");
}

#[tokio::test]
async fn test_protocol_detail() {
    let server = MockServer::start().await;
    mount_defillama(&server).await;
    let app = app(settings_for(&server));

    let (status, body) = send(&app, get("/api/v1/protocols/uniswap")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tvl_formatted"], "$4.20B");
    assert_eq!(body["listed_date"], "April 7, 2021");
    assert_eq!(body["twitter_url"], "https://twitter.com/Uniswap");
    assert_eq!(body["defillama_url"], "https://defillama.com/protocol/uniswap");
    assert_eq!(body["defiscan_url"], "https://www.defiscan.info");
    assert_eq!(body["chains"].as_array().map(Vec::len), Some(5));
    assert_eq!(body["more_chains"], "+2 more");
    assert_eq!(body["has_subgraph"], false);

    let (status, body) = send(&app, get("/api/v1/protocols/liquity-v1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["defiscan_url"], "https://www.defiscan.info/protocols/liquity/ethereum");
    assert_eq!(body["has_subgraph"], true);
    assert!(body["more_chains"].is_null());
}

#[tokio::test]
async fn test_unknown_protocol_is_not_found() {
    let server = MockServer::start().await;
    mount_defillama(&server).await;
    let app = app(settings_for(&server));

    let (status, body) = send(&app, get("/api/v1/protocols/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Protocol not found", "status": 404 }));
}

#[tokio::test]
async fn test_active_pool_summary_from_subgraph() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/subgraphs/liquity-v1"))
        .and(header("authorization", "Bearer graph-key"))
        .and(body_string_contains("activePoolETHBalanceUpdateds"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "activePoolETHBalanceUpdateds": [
                    {"id": "0x02-1", "_ETH": "2000000000000000000000000", "blockNumber": "20", "blockTimestamp": "1700000000"},
                    {"id": "0x01-1", "_ETH": "3000000000000000000000000", "blockNumber": "10", "blockTimestamp": "1690000000"}
                ],
                "activePoolAddressChangeds": []
            }
        })))
        .mount(&server)
        .await;
    let app = app(settings_for(&server));

    let (status, body) = send(&app, get("/api/v1/protocols/liquity-v1/active-pool")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["current_eth"], "2.00M ETH");
    assert_eq!(body["trend"], "down");
    assert_eq!(body["recent_updates"].as_array().map(Vec::len), Some(2));

    let (status, body) = send(&app, get("/api/v1/protocols/aave-v3/active-pool")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Protocol not found");
}

#[tokio::test]
async fn test_subgraph_graphql_errors_are_bad_gateway() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/subgraphs/dyad"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": [{"message": "indexing error"}]
        })))
        .mount(&server)
        .await;
    let app = app(settings_for(&server));

    let (status, body) = send(&app, get("/api/v1/protocols/dyad/subgraph")).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "Failed to fetch on-chain data");
}

#[tokio::test]
async fn test_subgraph_data_passthrough() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/subgraphs/sky-lending"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "approvals": [{"id": "0xaa-1", "src": "0x01", "guy": "0x02", "wad": "10"}],
                "logNotes": []
            }
        })))
        .mount(&server)
        .await;
    let app = app(settings_for(&server));

    let (status, body) = send(&app, get("/api/v1/protocols/sky-lending/subgraph")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["approvals"][0]["wad"], "10");
    assert_eq!(body["logNotes"], json!([]));

    let (status, _) = send(&app, get("/api/v1/protocols/uniswap/subgraph")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_chat_requires_message() {
    let server = MockServer::start().await;
    let app = app(settings_for(&server));

    let (status, body) = send(&app, post_json("/api/chat", &json!({ "message": "" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Message is required" }));

    let (status, body) = send(&app, post_json("/api/chat", &json!({ "protocolSlug": "dyad" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Message is required" }));
}

#[tokio::test]
async fn test_chat_whitespace_message_is_forwarded() {
    let server = MockServer::start().await;
    let app = app(settings_for(&server));

    // Reaches the chat service, which has no API key configured here.
    let (status, body) = send(&app, post_json("/api/chat", &json!({ "message": "   " }))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to process chat request" }));
}

#[tokio::test]
async fn test_chat_malformed_body_is_json_error() {
    let server = MockServer::start().await;
    let app = app(settings_for(&server));

    for raw in ["{not json", r#"{"message":42}"#] {
        let (status, body) = send(&app, post_raw("/api/chat", raw)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "body {}", raw);
        assert_eq!(body, json!({ "error": "Failed to process chat request" }));
    }
}

#[tokio::test]
async fn test_chat_includes_live_context() {
    let server = MockServer::start().await;
    mount_defillama(&server).await;
    Mock::given(method("POST"))
        .and(path("/subgraphs/dyad"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"approvals": [], "transfers": []}
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_string_contains("gpt-4o-mini"))
        .and(body_string_contains("Uniswap: TVL $4200.00M, 24h change: 1.50%, Category: Dexes"))
        .and(body_string_contains("Live Subgraph Data for dyad"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "Liquity scores 91."}}]
        })))
        .mount(&server)
        .await;

    let mut settings = settings_for(&server);
    settings.openai.api_key = Some("sk-test".to_string());
    let app = app(settings);

    let (status, body) = send(
        &app,
        post_json("/api/chat", &json!({ "message": "Which is safest?", "protocolSlug": "dyad" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "response": "Liquity scores 91." }));
}

#[tokio::test]
async fn test_chat_survives_context_failures() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": "ok"}}]
        })))
        .mount(&server)
        .await;

    let mut settings = settings_for(&server);
    settings.openai.api_key = Some("sk-test".to_string());
    let app = app(settings);

    let (status, body) = send(
        &app,
        post_json("/api/chat", &json!({ "message": "hi", "protocolSlug": "aave-v3" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], "ok");
}

#[tokio::test]
async fn test_chat_empty_completion() {
    let server = MockServer::start().await;
    mount_defillama(&server).await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let mut settings = settings_for(&server);
    settings.openai.api_key = Some("sk-test".to_string());
    let app = app(settings);

    let (status, body) = send(&app, post_json("/api/chat", &json!({ "message": "hi" }))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "No response from AI" }));
}

#[tokio::test]
async fn test_chat_without_api_key_fails_generically() {
    let server = MockServer::start().await;
    let app = app(settings_for(&server));

    let (status, body) = send(&app, post_json("/api/chat", &json!({ "message": "hi" }))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to process chat request" }));
}

#[tokio::test]
async fn test_ingest_then_query_entities() {
    let server = MockServer::start().await;
    let app = app(settings_for(&server));

    let log = mock_log(
        liquity::ACTIVE_POOL,
        &liquity::IActivePool::ActivePoolETHBalanceUpdated { _ETH: U256::from(123u64) },
    );
    let payload = json!({ "logs": [serde_json::to_value(&log).unwrap()] });

    let (status, body) = send(&app, post_json("/api/v1/subgraphs/liquity-v1/logs", &payload)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "indexed": 1, "duplicates": 0, "skipped": 0 }));

    let (status, body) = send(&app, post_json("/api/v1/subgraphs/liquity-v1/logs", &payload)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["duplicates"], 1);

    let (status, body) = send(
        &app,
        get("/api/v1/subgraphs/liquity-v1/entities/ActivePoolETHBalanceUpdated?first=5"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["entities"][0]["_ETH"], "123");
    assert_eq!(body["entities"][0]["id"], entity_id());

    let uri = format!(
        "/api/v1/subgraphs/liquity-v1/entities/ActivePoolETHBalanceUpdated/{}",
        entity_id()
    );
    let (status, body) = send(&app, get(&uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["blockNumber"], "1");
}

#[tokio::test]
async fn test_entity_query_validation() {
    let server = MockServer::start().await;
    let app = app(settings_for(&server));

    let (status, _) = send(&app, get("/api/v1/subgraphs/liquity-v1/entities/Transfer")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, get("/api/v1/subgraphs/uniswap/entities/Swap")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, get("/api/v1/subgraphs/dyad/entities/Transfer?first=101")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, get("/api/v1/subgraphs/dyad/entities/Transfer/not-an-id")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let uri = format!("/api/v1/subgraphs/dyad/entities/Transfer/{}", entity_id());
    let (status, _) = send(&app, get(&uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_ingest_token_is_enforced() {
    let server = MockServer::start().await;
    let mut settings = settings_for(&server);
    settings.ingest.token = Some("secret".to_string());
    let app = app(settings);
    let payload = json!({ "logs": [] });

    let (status, _) = send(&app, post_json("/api/v1/subgraphs/dyad/logs", &payload)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/subgraphs/dyad/logs")
        .header("content-type", "application/json")
        .header("x-ingest-token", "secret")
        .body(Body::from(payload.to_string()))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["indexed"], 0);
}

#[tokio::test]
async fn test_ingest_unknown_protocol() {
    let server = MockServer::start().await;
    let app = app(settings_for(&server));

    let (status, _) = send(&app, post_json("/api/v1/subgraphs/uniswap/logs", &json!({ "logs": [] }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

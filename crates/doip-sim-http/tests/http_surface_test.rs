//! Integration tests for the HTTP control surface
//!
//! Each test starts a server on an ephemeral port against a mock
//! simulation manager and exercises the wire surface with reqwest.

use std::net::SocketAddr;
use std::sync::Arc;

use doip_sim_core::mock::{MockEcu, MockGateway, MockPlatform, MockSimulationManager};
use doip_sim_core::{LookupEntry, ServiceState};
use doip_sim_http::{DoipHttpServer, DoipHttpServerBuilder};
use serde_json::Value;

struct TestServer {
    server: DoipHttpServer,
    base_url: String,
}

impl TestServer {
    async fn start(manager: MockSimulationManager) -> Self {
        let server = DoipHttpServerBuilder::new(Arc::new(manager))
            .addr(SocketAddr::from(([127, 0, 0, 1], 0)))
            .server_name("http://testhost")
            .build()
            .await;
        server.start().await.expect("server should bind");

        let addr = server.local_addr().await.expect("server should be running");
        Self {
            server,
            base_url: format!("http://{addr}"),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn shutdown(self) {
        self.server.stop().await;
    }
}

fn sample_manager() -> MockSimulationManager {
    let mut manager = MockSimulationManager::new();
    manager.add_platform(
        MockPlatform::new("X2024")
            .with_state(ServiceState::Running)
            .with_gateway(
                MockGateway::new("GW")
                    .with_state(ServiceState::Running)
                    .with_ecu(MockEcu::new("EMS").with_lookup_entry(
                        LookupEntry::new("10 03", "50 03 00 32 01 F4")
                            .with_modifier("22 F1 86", "62 F1 86 03"),
                    )),
            ),
    );
    manager.add_platform(MockPlatform::new("X2025"));
    manager
}

#[tokio::test]
async fn overview_lists_platforms_with_request_scoped_urls() {
    let ts = TestServer::start(sample_manager()).await;

    let resp = reqwest::get(ts.url("/doip-simulation/")).await.unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers()["content-type"].to_str().unwrap(),
        "application/json"
    );

    let body: Value = resp.json().await.unwrap();
    let platforms = body["platforms"].as_array().unwrap();
    assert_eq!(platforms.len(), 2);

    // links are computed from the request's Host header, not the config
    let url = platforms[0]["url"].as_str().unwrap();
    assert_eq!(
        url,
        format!("{}/doip-simulation/platform/X2024", ts.base_url)
    );

    ts.shutdown().await;
}

#[tokio::test]
async fn overview_status_filter() {
    let ts = TestServer::start(sample_manager()).await;

    let resp = reqwest::get(ts.url("/doip-simulation/?status=RUNNING"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let platforms = body["platforms"].as_array().unwrap();
    assert_eq!(platforms.len(), 1);
    assert_eq!(platforms[0]["name"], "X2024");

    let resp = reqwest::get(ts.url("/doip-simulation/?status=SLEEPING"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    ts.shutdown().await;
}

#[tokio::test]
async fn platform_read() {
    let ts = TestServer::start(sample_manager()).await;

    let resp = reqwest::get(ts.url("/doip-simulation/platform/X2024"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["name"], "X2024");
    assert_eq!(body["status"], "RUNNING");
    assert!(body["url"]
        .as_str()
        .unwrap()
        .ends_with("/doip-simulation/platform/X2024"));
    assert_eq!(body["gateways"][0]["name"], "GW");

    ts.shutdown().await;
}

#[tokio::test]
async fn unknown_platform_yields_error_envelope() {
    let ts = TestServer::start(sample_manager()).await;

    let resp = reqwest::get(ts.url("/doip-simulation/platform/Unknown"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("Unknown"));

    ts.shutdown().await;
}

#[tokio::test]
async fn gateway_read_includes_lookup_tables() {
    let ts = TestServer::start(sample_manager()).await;

    let resp = reqwest::get(ts.url("/doip-simulation/platform/X2024/gateway/GW"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["name"], "GW");
    let ecu = &body["ecus"][0];
    assert_eq!(ecu["name"], "EMS");
    assert_eq!(ecu["configuredLookupTable"][0]["regex"], "10 03");
    assert_eq!(ecu["runtimeLookupTable"][0]["modifiers"][0]["regex"], "22 F1 86");

    ts.shutdown().await;
}

#[tokio::test]
async fn gateway_read_with_missing_segment_is_bad_request() {
    let ts = TestServer::start(sample_manager()).await;

    let resp = reqwest::get(ts.url("/doip-simulation/platform/X2024/gateway/"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    ts.shutdown().await;
}

#[tokio::test]
async fn action_via_get_starts_the_platform() {
    let ts = TestServer::start(sample_manager()).await;

    let resp = reqwest::get(ts.url("/doip-simulation/platform/X2025?action=start"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // the response is the refreshed representation
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["name"], "X2025");
    assert_eq!(body["status"], "RUNNING");

    let resp = reqwest::get(ts.url("/doip-simulation/platform/X2025?action=halt"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    ts.shutdown().await;
}

#[tokio::test]
async fn action_via_post_round_trips() {
    let ts = TestServer::start(sample_manager()).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(ts.url("/doip-simulation/platform/X2025"))
        .header("content-type", "application/json")
        .body(r#"{"action":"start"}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "RUNNING");

    let resp = client
        .post(ts.url("/doip-simulation/platform/X2025"))
        .header("content-type", "application/json")
        .body(r#"{"action":"stop"}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "STOPPED");

    ts.shutdown().await;
}

#[tokio::test]
async fn post_with_empty_body_reads_current_representation() {
    let ts = TestServer::start(sample_manager()).await;

    let resp = reqwest::Client::new()
        .post(ts.url("/doip-simulation/platform/X2024"))
        .header("content-type", "application/json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["name"], "X2024");

    ts.shutdown().await;
}

#[tokio::test]
async fn post_with_bogus_action_is_bad_request() {
    let ts = TestServer::start(sample_manager()).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(ts.url("/doip-simulation/platform/X2024"))
        .header("content-type", "application/json")
        .body(r#"{"action":"bogus"}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let resp = client
        .post(ts.url("/doip-simulation/platform/X2024"))
        .header("content-type", "application/json")
        .body(r#"{"action": not json"#)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    ts.shutdown().await;
}

#[tokio::test]
async fn failing_domain_start_surfaces_as_error_not_crash() {
    let mut manager = MockSimulationManager::new();
    manager.add_platform(
        MockPlatform::new("X2024")
            .fail_start_with("Can't bind to port 13400 because it is already used"),
    );
    let ts = TestServer::start(manager).await;

    let resp = reqwest::Client::new()
        .post(ts.url("/doip-simulation/platform/X2024"))
        .header("content-type", "application/json")
        .body(r#"{"action":"start"}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 409);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("13400"));

    // the server is still alive afterwards
    let resp = reqwest::get(ts.url("/doip-simulation/")).await.unwrap();
    assert_eq!(resp.status(), 200);

    ts.shutdown().await;
}

#[tokio::test]
async fn method_and_prefix_fallthroughs() {
    let ts = TestServer::start(sample_manager()).await;
    let client = reqwest::Client::new();

    // non-matching method on a matched prefix
    let resp = client
        .delete(ts.url("/doip-simulation/platform/X2024"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 405);

    let resp = client
        .post(ts.url("/doip-simulation/"))
        .body("{}")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 405);

    // unregistered prefix
    let resp = reqwest::get(ts.url("/something-else")).await.unwrap();
    assert_eq!(resp.status(), 404);

    ts.shutdown().await;
}

//! Registration paths across host registry instances.

use mcp_bridge::config::BridgeConfig;
use mcp_bridge::tool_bridge::services::RegistrationOutcome;
use rstest::{fixture, rstest};
use serde_json::json;

use super::helpers::{BridgeHarness, invoke, name, stdio_server, transport_with};

#[fixture]
fn harness() -> BridgeHarness {
    let transport = transport_with(&[("alpha", "query"), ("alpha", "index"), ("gamma", "fetch")]);
    transport
        .fail_connect(name("beta"), "connection refused")
        .expect("failure setup should succeed");
    let config = BridgeConfig::new(vec![
        stdio_server("alpha"),
        stdio_server("beta"),
        stdio_server("gamma"),
    ]);
    BridgeHarness::new(config, transport)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn cold_path_registers_reachable_providers_in_order(harness: BridgeHarness) {
    let (host, outcome) = harness.register();
    assert!(matches!(outcome, RegistrationOutcome::ColdPath { .. }));
    assert!(host.tool_names().expect("names should be readable").is_empty());

    host.start_services().await.expect("services should start");

    assert_eq!(
        host.tool_names().expect("names should be readable"),
        ["alpha_query", "alpha_index", "gamma_fetch"]
    );
    let pool = harness
        .coordinator
        .active_pool()
        .expect("pool should be published");
    assert_eq!(pool.connected_servers(), [name("alpha"), name("gamma")]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn later_instances_replay_identical_entries_without_connecting(harness: BridgeHarness) {
    let first = harness.register_and_start().await;
    let attempts = harness.connect_attempts();

    let (second, outcome) = harness.register();

    assert_eq!(outcome, RegistrationOutcome::FastPath { tools: 3 });
    assert_eq!(harness.connect_attempts(), attempts);
    assert_eq!(second.service_count().expect("count should be readable"), 0);
    let cold = first.tools().expect("tools should be readable");
    let fast = second.tools().expect("tools should be readable");
    assert_eq!(cold.len(), fast.len());
    for (original, replayed) in cold.iter().zip(&fast) {
        assert_eq!(original.name, replayed.name);
        assert_eq!(original.description, replayed.description);
        assert_eq!(original.parameters, replayed.parameters);
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn fast_path_tools_use_the_shared_pool(harness: BridgeHarness) {
    harness.register_and_start().await;
    let (second, _) = harness.register();

    let response = invoke(&second, "gamma_fetch", json!({"id": 7}))
        .await
        .expect("invocation should succeed");

    assert_eq!(response.first_text(), Some(r#"{"id":7}"#));
    let calls = harness.transport.calls().expect("calls should be readable");
    let call = calls.last().expect("one call recorded");
    assert_eq!(call.server, name("gamma"));
    assert_eq!(call.tool, "fetch");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stop_resets_state_and_next_registration_is_cold(harness: BridgeHarness) {
    let host = harness.register_and_start().await;

    host.stop_services().await.expect("services should stop");

    assert!(!harness.coordinator.is_live());
    assert!(harness.coordinator.cached_entries().is_empty());
    assert!(
        !harness
            .transport
            .is_connected(&name("alpha"))
            .expect("state should be readable")
    );

    let attempts = harness.connect_attempts();
    let restarted = harness.register_and_start().await;
    assert!(harness.connect_attempts() > attempts);
    assert_eq!(
        restarted.tool_names().expect("names should be readable"),
        ["alpha_query", "alpha_index", "gamma_fetch"]
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stop_without_start_is_harmless(harness: BridgeHarness) {
    let (host, _) = harness.register();

    host.stop_services().await.expect("stop should succeed");

    assert!(!harness.coordinator.is_live());
    assert_eq!(
        harness
            .transport
            .close_all_calls()
            .expect("count should be readable"),
        0
    );
}

#[rstest]
fn empty_configuration_registers_nothing() {
    let harness = BridgeHarness::new(BridgeConfig::default(), transport_with(&[]));

    let (host, outcome) = harness.register();

    assert_eq!(outcome, RegistrationOutcome::Skipped);
    assert_eq!(host.service_count().expect("count should be readable"), 0);
    assert_eq!(harness.connect_attempts(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn providers_without_tools_keep_cold_path() {
    let harness = BridgeHarness::new(
        BridgeConfig::new(vec![stdio_server("alpha")]),
        transport_with(&[]),
    );
    harness.register_and_start().await;

    let (_, outcome) = harness.register();

    assert!(matches!(outcome, RegistrationOutcome::ColdPath { .. }));
}

#[tokio::test(flavor = "multi_thread")]
async fn unprefixed_names_use_original_capability_names() {
    let harness = BridgeHarness::new(
        BridgeConfig::new(vec![stdio_server("search")]).with_tool_prefix(false),
        transport_with(&[("search", "query")]),
    );

    let host = harness.register_and_start().await;

    assert_eq!(host.tool_names().expect("names should be readable"), ["query"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn all_providers_failing_still_starts() {
    let transport = transport_with(&[]);
    for provider in ["alpha", "beta"] {
        transport
            .fail_connect(name(provider), "unreachable")
            .expect("failure setup should succeed");
    }
    let harness = BridgeHarness::new(
        BridgeConfig::new(vec![stdio_server("alpha"), stdio_server("beta")]),
        transport,
    );

    let host = harness.register_and_start().await;

    assert!(host.tool_names().expect("names should be readable").is_empty());
    let pool = harness
        .coordinator
        .active_pool()
        .expect("pool should be published");
    assert!(pool.connected_servers().is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stopping_a_replaced_service_keeps_the_active_pool_working(harness: BridgeHarness) {
    let (replaced, first) = harness.register();
    let (active, second) = harness.register();
    assert!(matches!(first, RegistrationOutcome::ColdPath { .. }));
    assert!(matches!(second, RegistrationOutcome::ColdPath { .. }));
    replaced.start_services().await.expect("services should start");
    active.start_services().await.expect("services should start");

    replaced.stop_services().await.expect("services should stop");

    assert!(harness.coordinator.is_live());
    assert_eq!(
        harness
            .transport
            .close_all_calls()
            .expect("count should be readable"),
        0
    );
    let (later, outcome) = harness.register();
    assert_eq!(outcome, RegistrationOutcome::FastPath { tools: 3 });
    let response = invoke(&later, "alpha_query", json!({"q": "rust"}))
        .await
        .expect("invocation should succeed");
    assert_eq!(response.first_text(), Some(r#"{"q":"rust"}"#));
    assert!(!response.is_error());
}

#[tokio::test(flavor = "multi_thread")]
async fn provider_failing_discovery_is_skipped_at_start() {
    let transport = transport_with(&[("alpha", "query"), ("gamma", "fetch")]);
    transport
        .fail_list(name("alpha"), "listing unsupported")
        .expect("failure setup should succeed");
    let harness = BridgeHarness::new(
        BridgeConfig::new(vec![stdio_server("alpha"), stdio_server("gamma")]),
        transport,
    );

    let host = harness.register_and_start().await;

    assert_eq!(
        host.tool_names().expect("names should be readable"),
        ["gamma_fetch"]
    );
    assert_eq!(harness.coordinator.cached_entries().len(), 1);
}

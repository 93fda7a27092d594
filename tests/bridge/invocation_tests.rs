//! Routing, normalization, and concurrency of tool invocations.

use std::time::Duration;

use mcp_bridge::config::{BridgeConfig, InvocationMode, TimeoutSettings};
use mcp_bridge::tool_bridge::{
    adapters::memory::InMemoryToolHost,
    domain::{ContentItem, ToolCallOutcome},
    ports::ToolExecutionError,
};
use rstest::rstest;
use serde_json::json;
use tokio::task::JoinSet;

use super::helpers::{BridgeHarness, invoke, name, stdio_server, transport_with};

fn search_harness(config: impl FnOnce(BridgeConfig) -> BridgeConfig) -> BridgeHarness {
    BridgeHarness::new(
        config(BridgeConfig::new(vec![stdio_server("search")])),
        transport_with(&[("search", "query")]),
    )
}

fn provider_reply(value: serde_json::Value) -> ToolCallOutcome {
    serde_json::from_value(value).expect("provider reply should deserialize")
}

#[rstest]
#[case::text_and_data(
    ToolCallOutcome::new(vec![ContentItem::text("a"), ContentItem::data("b")], false),
    "a\nb",
    false
)]
#[case::empty_text_item_keeps_its_slot(
    ToolCallOutcome::new(vec![ContentItem::text(""), ContentItem::data("blob")], false),
    "\nblob",
    false
)]
#[case::present_empty_text_wins_over_data(
    provider_reply(json!({"content": [{"text": "", "data": "blob"}, {"text": "b"}]})),
    "\nb",
    false
)]
#[case::two_text_items(
    ToolCallOutcome::new(vec![ContentItem::text("a"), ContentItem::text("b")], false),
    "a\nb",
    false
)]
#[case::missing_content(ToolCallOutcome::without_content(false), "", false)]
#[case::missing_content_with_error(ToolCallOutcome::without_content(true), "", true)]
#[case::provider_error(
    ToolCallOutcome::new(vec![ContentItem::text("quota exceeded")], true),
    "quota exceeded",
    true
)]
#[tokio::test(flavor = "multi_thread")]
async fn provider_results_become_one_text_block(
    #[case] scripted: ToolCallOutcome,
    #[case] expected_text: &str,
    #[case] expected_error: bool,
) {
    let harness = search_harness(|config| config);
    harness
        .transport
        .set_response(name("search"), "query", scripted)
        .expect("response setup should succeed");
    let host = harness.register_and_start().await;

    let response = invoke(&host, "search_query", json!({}))
        .await
        .expect("invocation should succeed");

    assert_eq!(response.content().len(), 1);
    assert_eq!(response.first_text(), Some(expected_text));
    assert_eq!(response.is_error(), expected_error);
}

#[tokio::test(flavor = "multi_thread")]
async fn parameters_reach_provider_unchanged() {
    let harness = search_harness(|config| config);
    let host = harness.register_and_start().await;
    let params = json!({"q": "rust", "limit": 5, "filters": {"lang": ["en", "de"]}});

    invoke(&host, "search_query", params.clone())
        .await
        .expect("invocation should succeed");

    let calls = harness.transport.calls().expect("calls should be readable");
    let call = calls.first().expect("one call recorded");
    assert_eq!(call.tool, "query");
    assert_eq!(call.params, params);
}

#[tokio::test(flavor = "multi_thread")]
async fn stopping_during_a_call_reports_not_connected() {
    let harness = search_harness(|config| config);
    harness
        .transport
        .delay_calls(name("search"), Duration::from_millis(200))
        .expect("delay setup should succeed");
    let host = harness.register_and_start().await;

    let in_flight = {
        let host = host.clone();
        tokio::spawn(async move { invoke(&host, "search_query", json!({})).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    host.stop_services().await.expect("services should stop");

    let result = in_flight.await.expect("task should not panic");
    assert!(matches!(
        result,
        Err(ToolExecutionError::NotConnected { ref tool, .. }) if tool == "search_query"
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn calls_after_stop_report_not_connected() {
    let harness = search_harness(|config| config);
    let host = harness.register_and_start().await;
    host.stop_services().await.expect("services should stop");

    let result = invoke(&host, "search_query", json!({})).await;

    assert!(matches!(result, Err(ToolExecutionError::NotConnected { .. })));
}

#[tokio::test(start_paused = true)]
async fn hanging_provider_call_times_out_as_error_result() {
    let harness = search_harness(|config| {
        config.with_timeouts(TimeoutSettings::new(
            Duration::from_secs(5),
            Duration::from_secs(5),
            Duration::from_millis(100),
        ))
    });
    harness
        .transport
        .delay_calls(name("search"), Duration::from_secs(3600))
        .expect("delay setup should succeed");
    let host = harness.register_and_start().await;

    let response = invoke(&host, "search_query", json!({}))
        .await
        .expect("timeouts are reported as results");

    assert!(response.is_error());
    assert_eq!(
        response.first_text(),
        Some("tool query on provider search timed out after 100 ms")
    );
}

#[tokio::test(start_paused = true)]
async fn hanging_provider_is_skipped_at_start() {
    let transport = transport_with(&[("slow", "wait"), ("fast", "go")]);
    transport
        .delay_connect(name("slow"), Duration::from_secs(3600))
        .expect("delay setup should succeed");
    let config = BridgeConfig::new(vec![stdio_server("slow"), stdio_server("fast")])
        .with_timeouts(TimeoutSettings::new(
            Duration::from_millis(100),
            Duration::from_millis(100),
            Duration::from_millis(100),
        ));
    let harness = BridgeHarness::new(config, transport);

    let host = harness.register_and_start().await;

    assert_eq!(host.tool_names().expect("names should be readable"), ["fast_go"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn lazy_connect_reopens_a_dropped_provider() {
    let harness = search_harness(|config| config.with_lazy_connect(true));
    let host = harness.register_and_start().await;
    harness
        .transport
        .disconnect(&name("search"))
        .expect("disconnect should succeed");

    let dropped = invoke(&host, "search_query", json!({})).await;
    let reopened = invoke(&host, "search_query", json!({}))
        .await
        .expect("second call should reconnect");

    assert!(matches!(dropped, Err(ToolExecutionError::NotConnected { .. })));
    assert!(!reopened.is_error());
    assert_eq!(harness.connect_attempts(), 2);
}

async fn run_calls(host: &InMemoryToolHost, tools: &[&str]) {
    let mut calls = JoinSet::new();
    for tool in tools {
        let host = host.clone();
        let tool = (*tool).to_owned();
        calls.spawn(async move { invoke(&host, &tool, json!({})).await });
    }
    while let Some(joined) = calls.join_next().await {
        let response = joined
            .expect("task should not panic")
            .expect("invocation should succeed");
        assert!(!response.is_error());
    }
}

fn two_provider_harness(mode: InvocationMode) -> BridgeHarness {
    let transport = transport_with(&[("alpha", "work"), ("beta", "work")]);
    for provider in ["alpha", "beta"] {
        transport
            .delay_calls(name(provider), Duration::from_millis(50))
            .expect("delay setup should succeed");
    }
    BridgeHarness::new(
        BridgeConfig::new(vec![stdio_server("alpha"), stdio_server("beta")])
            .with_invocation_mode(mode),
        transport,
    )
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn distinct_providers_run_in_parallel_while_each_is_serialized() {
    let harness = two_provider_harness(InvocationMode::Serialized);
    let host = harness.register_and_start().await;

    run_calls(&host, &["alpha_work", "alpha_work", "beta_work", "beta_work"]).await;

    for provider in ["alpha", "beta"] {
        assert_eq!(
            harness
                .transport
                .peak_in_flight(&name(provider))
                .expect("peak should be readable"),
            1
        );
    }
    assert_eq!(
        harness
            .transport
            .peak_total_in_flight()
            .expect("peak should be readable"),
        2
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_mode_overlaps_calls_to_one_provider() {
    let harness = two_provider_harness(InvocationMode::Concurrent);
    let host = harness.register_and_start().await;

    run_calls(&host, &["alpha_work", "alpha_work", "alpha_work"]).await;

    assert!(
        harness
            .transport
            .peak_in_flight(&name("alpha"))
            .expect("peak should be readable")
            > 1
    );
}

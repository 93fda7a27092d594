//! Then steps for provider bridge BDD scenarios.

use super::world::{BridgeWorld, split_list};
use mcp_bridge::tool_bridge::{adapters::memory::InMemoryToolHost, services::RegistrationOutcome};
use rstest_bdd_macros::then;

fn assert_tool_names(host: &InMemoryToolHost, tools: &str) -> Result<(), eyre::Report> {
    let expected = split_list(tools);
    let actual = host.tool_names()?;
    if actual != expected {
        return Err(eyre::eyre!("expected tools {expected:?}, found {actual:?}"));
    }
    Ok(())
}

fn latest_outcome(world: &BridgeWorld) -> Result<&RegistrationOutcome, eyre::Report> {
    world
        .outcomes
        .last()
        .ok_or_else(|| eyre::eyre!("no registration outcome recorded"))
}

#[then(r#"the host lists tools "{tools}""#)]
fn host_lists_tools(world: &BridgeWorld, tools: String) -> Result<(), eyre::Report> {
    assert_tool_names(world.first_host()?, &tools)
}

#[then(r#"the latest host lists tools "{tools}""#)]
fn latest_host_lists_tools(world: &BridgeWorld, tools: String) -> Result<(), eyre::Report> {
    assert_tool_names(world.latest_host()?, &tools)
}

#[then("{count:usize} providers are connected")]
fn providers_connected(world: &BridgeWorld, count: usize) -> Result<(), eyre::Report> {
    let pool = world
        .coordinator
        .active_pool()
        .ok_or_else(|| eyre::eyre!("no connection pool is published"))?;
    let connected = pool.connected_servers().len();
    if connected != count {
        return Err(eyre::eyre!("expected {count} connected providers, found {connected}"));
    }
    Ok(())
}

#[then("the latest registration replayed {count:usize} cached tools")]
fn latest_registration_replayed(world: &BridgeWorld, count: usize) -> Result<(), eyre::Report> {
    let outcome = latest_outcome(world)?;
    if *outcome != (RegistrationOutcome::FastPath { tools: count }) {
        return Err(eyre::eyre!("expected fast path with {count} tools, got {outcome:?}"));
    }
    Ok(())
}

#[then("no further connection attempts were made")]
fn no_further_connection_attempts(world: &BridgeWorld) -> Result<(), eyre::Report> {
    let baseline = world
        .attempts_after_start
        .ok_or_else(|| eyre::eyre!("services were never started"))?;
    let attempts = world.connect_attempts()?;
    if attempts != baseline {
        return Err(eyre::eyre!("expected {baseline} connect attempts, found {attempts}"));
    }
    Ok(())
}

#[then("the latest registration created a new service")]
fn latest_registration_created_service(world: &BridgeWorld) -> Result<(), eyre::Report> {
    let outcome = latest_outcome(world)?;
    if !matches!(outcome, RegistrationOutcome::ColdPath { .. }) {
        return Err(eyre::eyre!("expected cold path, got {outcome:?}"));
    }
    if world.coordinator.is_live() {
        return Err(eyre::eyre!("shared state should be cleared after stop"));
    }
    Ok(())
}

#[then("the response is not an error")]
fn response_is_not_error(world: &BridgeWorld) -> Result<(), eyre::Report> {
    let response = world
        .last_response
        .as_ref()
        .ok_or_else(|| eyre::eyre!("no tool has been invoked"))?;
    if response.is_error() {
        return Err(eyre::eyre!("unexpected error response: {response:?}"));
    }
    Ok(())
}

#[then(r#"the response lines are "{lines}""#)]
fn response_lines(world: &BridgeWorld, lines: String) -> Result<(), eyre::Report> {
    let response = world
        .last_response
        .as_ref()
        .ok_or_else(|| eyre::eyre!("no tool has been invoked"))?;
    let expected = split_list(&lines).join("\n");
    if response.first_text() != Some(expected.as_str()) {
        return Err(eyre::eyre!("expected text {expected:?}, got {response:?}"));
    }
    Ok(())
}

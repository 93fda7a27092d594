//! In-memory provider transport for lifecycle and invocation tests.

use crate::tool_bridge::{
    domain::{CapabilityDescriptor, ContentItem, ProviderName, ServerConfig, ToolCallOutcome},
    ports::{ProviderTransport, ProviderTransportError, ProviderTransportResult},
};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

/// A recorded tool call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    /// Provider the call was routed to.
    pub server: ProviderName,
    /// Capability name as known to the provider.
    pub tool: String,
    /// Parameters passed through.
    pub params: Value,
}

/// In-memory provider transport.
///
/// Models connect, discovery and invocation without spawning processes or
/// opening sockets. Failures, latency and canned responses are scripted per
/// provider so tests can exercise isolation, timeouts and concurrency.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProviderTransport {
    state: Arc<RwLock<InMemoryTransportState>>,
}

#[derive(Debug, Default)]
struct InMemoryTransportState {
    connected: HashSet<ProviderName>,
    catalogs: HashMap<ProviderName, Vec<CapabilityDescriptor>>,
    connect_failures: HashMap<ProviderName, String>,
    connect_delays: HashMap<ProviderName, Duration>,
    list_failures: HashMap<ProviderName, String>,
    list_delays: HashMap<ProviderName, Duration>,
    call_delays: HashMap<ProviderName, Duration>,
    responses: HashMap<(ProviderName, String), ToolCallOutcome>,
    connect_attempts: Vec<ProviderName>,
    calls: Vec<RecordedCall>,
    in_flight: HashMap<ProviderName, usize>,
    peak_in_flight: HashMap<ProviderName, usize>,
    peak_total_in_flight: usize,
    close_all_calls: usize,
}

impl InMemoryTransportState {
    fn total_in_flight(&self) -> usize {
        self.in_flight.values().sum()
    }
}

fn lock_error(message: String) -> ProviderTransportError {
    ProviderTransportError::runtime(std::io::Error::other(message))
}

impl InMemoryProviderTransport {
    /// Creates an empty in-memory transport.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read_state(&self) -> ProviderTransportResult<RwLockReadGuard<'_, InMemoryTransportState>> {
        self.state.read().map_err(|err| lock_error(err.to_string()))
    }

    fn write_state(
        &self,
    ) -> ProviderTransportResult<RwLockWriteGuard<'_, InMemoryTransportState>> {
        self.state.write().map_err(|err| lock_error(err.to_string()))
    }

    /// Associates a capability catalog with a provider.
    ///
    /// Existing catalog entries are replaced.
    ///
    /// # Errors
    ///
    /// Returns transport runtime errors when lock acquisition fails.
    pub fn set_tool_catalog(
        &self,
        server: ProviderName,
        tools: Vec<CapabilityDescriptor>,
    ) -> ProviderTransportResult<()> {
        self.write_state()?.catalogs.insert(server, tools);
        Ok(())
    }

    /// Makes every connect attempt to `server` fail with `reason`.
    ///
    /// # Errors
    ///
    /// Returns transport runtime errors when lock acquisition fails.
    pub fn fail_connect(
        &self,
        server: ProviderName,
        reason: impl Into<String>,
    ) -> ProviderTransportResult<()> {
        self.write_state()?
            .connect_failures
            .insert(server, reason.into());
        Ok(())
    }

    /// Delays every connect attempt to `server`.
    ///
    /// # Errors
    ///
    /// Returns transport runtime errors when lock acquisition fails.
    pub fn delay_connect(
        &self,
        server: ProviderName,
        delay: Duration,
    ) -> ProviderTransportResult<()> {
        self.write_state()?.connect_delays.insert(server, delay);
        Ok(())
    }

    /// Makes every capability listing on `server` fail with `reason`.
    ///
    /// Connecting still succeeds.
    ///
    /// # Errors
    ///
    /// Returns transport runtime errors when lock acquisition fails.
    pub fn fail_list(
        &self,
        server: ProviderName,
        reason: impl Into<String>,
    ) -> ProviderTransportResult<()> {
        self.write_state()?.list_failures.insert(server, reason.into());
        Ok(())
    }

    /// Delays every capability listing on `server`.
    ///
    /// # Errors
    ///
    /// Returns transport runtime errors when lock acquisition fails.
    pub fn delay_list(&self, server: ProviderName, delay: Duration) -> ProviderTransportResult<()> {
        self.write_state()?.list_delays.insert(server, delay);
        Ok(())
    }

    /// Delays every tool call routed to `server`.
    ///
    /// # Errors
    ///
    /// Returns transport runtime errors when lock acquisition fails.
    pub fn delay_calls(&self, server: ProviderName, delay: Duration) -> ProviderTransportResult<()> {
        self.write_state()?.call_delays.insert(server, delay);
        Ok(())
    }

    /// Scripts the outcome returned for one capability.
    ///
    /// # Errors
    ///
    /// Returns transport runtime errors when lock acquisition fails.
    pub fn set_response(
        &self,
        server: ProviderName,
        tool: impl Into<String>,
        outcome: ToolCallOutcome,
    ) -> ProviderTransportResult<()> {
        self.write_state()?
            .responses
            .insert((server, tool.into()), outcome);
        Ok(())
    }

    /// Drops the connection to `server` as if the provider went away.
    ///
    /// # Errors
    ///
    /// Returns transport runtime errors when lock acquisition fails.
    pub fn disconnect(&self, server: &ProviderName) -> ProviderTransportResult<()> {
        self.write_state()?.connected.remove(server);
        Ok(())
    }

    /// Returns every connect attempt in order, including failed ones.
    ///
    /// # Errors
    ///
    /// Returns transport runtime errors when lock acquisition fails.
    pub fn connect_attempts(&self) -> ProviderTransportResult<Vec<ProviderName>> {
        Ok(self.read_state()?.connect_attempts.clone())
    }

    /// Returns every tool call in the order it started.
    ///
    /// # Errors
    ///
    /// Returns transport runtime errors when lock acquisition fails.
    pub fn calls(&self) -> ProviderTransportResult<Vec<RecordedCall>> {
        Ok(self.read_state()?.calls.clone())
    }

    /// Returns whether `server` currently has an open connection.
    ///
    /// # Errors
    ///
    /// Returns transport runtime errors when lock acquisition fails.
    pub fn is_connected(&self, server: &ProviderName) -> ProviderTransportResult<bool> {
        Ok(self.read_state()?.connected.contains(server))
    }

    /// Returns the highest number of simultaneous calls seen for `server`.
    ///
    /// # Errors
    ///
    /// Returns transport runtime errors when lock acquisition fails.
    pub fn peak_in_flight(&self, server: &ProviderName) -> ProviderTransportResult<usize> {
        Ok(self
            .read_state()?
            .peak_in_flight
            .get(server)
            .copied()
            .unwrap_or_default())
    }

    /// Returns the highest number of simultaneous calls across providers.
    ///
    /// # Errors
    ///
    /// Returns transport runtime errors when lock acquisition fails.
    pub fn peak_total_in_flight(&self) -> ProviderTransportResult<usize> {
        Ok(self.read_state()?.peak_total_in_flight)
    }

    /// Returns how many times `close_all` was called.
    ///
    /// # Errors
    ///
    /// Returns transport runtime errors when lock acquisition fails.
    pub fn close_all_calls(&self) -> ProviderTransportResult<usize> {
        Ok(self.read_state()?.close_all_calls)
    }

    fn begin_call(
        &self,
        server: &ProviderName,
        tool: &str,
        params: &Value,
    ) -> ProviderTransportResult<(InFlightGuard, Option<Duration>)> {
        let mut state = self.write_state()?;
        if !state.connected.contains(server) {
            return Err(ProviderTransportError::NotConnected(server.clone()));
        }

        state.calls.push(RecordedCall {
            server: server.clone(),
            tool: tool.to_owned(),
            params: params.clone(),
        });

        let current = {
            let counter = state.in_flight.entry(server.clone()).or_default();
            *counter += 1;
            *counter
        };
        let peak = state.peak_in_flight.entry(server.clone()).or_default();
        *peak = (*peak).max(current);
        let total = state.total_in_flight();
        state.peak_total_in_flight = state.peak_total_in_flight.max(total);

        let guard = InFlightGuard {
            state: Arc::clone(&self.state),
            server: server.clone(),
        };
        Ok((guard, state.call_delays.get(server).copied()))
    }

    fn resolve_call(
        &self,
        server: &ProviderName,
        tool: &str,
        params: &Value,
    ) -> ProviderTransportResult<ToolCallOutcome> {
        let state = self.read_state()?;
        if !state.connected.contains(server) {
            return Err(ProviderTransportError::NotConnected(server.clone()));
        }

        if let Some(outcome) = state.responses.get(&(server.clone(), tool.to_owned())) {
            return Ok(outcome.clone());
        }

        let known = state
            .catalogs
            .get(server)
            .is_some_and(|tools| tools.iter().any(|descriptor| descriptor.name() == tool));
        if known {
            Ok(ToolCallOutcome::new(
                vec![ContentItem::text(params.to_string())],
                false,
            ))
        } else {
            Ok(ToolCallOutcome::failure(format!("unknown tool: {tool}")))
        }
    }
}

/// Decrements the in-flight counter when a call finishes or is cancelled.
struct InFlightGuard {
    state: Arc<RwLock<InMemoryTransportState>>,
    server: ProviderName,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.write()
            && let Some(counter) = state.in_flight.get_mut(&self.server)
        {
            *counter = counter.saturating_sub(1);
        }
    }
}

#[async_trait]
impl ProviderTransport for InMemoryProviderTransport {
    async fn connect(&self, server: &ServerConfig) -> ProviderTransportResult<()> {
        let delay = {
            let mut state = self.write_state()?;
            state.connect_attempts.push(server.name().clone());
            state.connect_delays.get(server.name()).copied()
        };

        if let Some(duration) = delay {
            tokio::time::sleep(duration).await;
        }

        let mut state = self.write_state()?;
        if let Some(reason) = state.connect_failures.get(server.name()) {
            return Err(ProviderTransportError::Handshake {
                server: server.name().clone(),
                reason: reason.clone(),
            });
        }

        state.connected.insert(server.name().clone());
        Ok(())
    }

    async fn list_tools(
        &self,
        server: &ProviderName,
    ) -> ProviderTransportResult<Vec<CapabilityDescriptor>> {
        let delay = self.read_state()?.list_delays.get(server).copied();
        if let Some(duration) = delay {
            tokio::time::sleep(duration).await;
        }

        let state = self.read_state()?;
        if !state.connected.contains(server) {
            return Err(ProviderTransportError::NotConnected(server.clone()));
        }
        if let Some(reason) = state.list_failures.get(server) {
            return Err(ProviderTransportError::runtime(std::io::Error::other(
                reason.clone(),
            )));
        }

        Ok(state.catalogs.get(server).cloned().unwrap_or_default())
    }

    async fn call_tool(
        &self,
        server: &ProviderName,
        tool: &str,
        params: Value,
    ) -> ProviderTransportResult<ToolCallOutcome> {
        let (_guard, delay) = self.begin_call(server, tool, &params)?;

        if let Some(duration) = delay {
            tokio::time::sleep(duration).await;
        }

        self.resolve_call(server, tool, &params)
    }

    async fn close_all(&self) -> ProviderTransportResult<()> {
        let mut state = self.write_state()?;
        state.connected.clear();
        state.close_all_calls += 1;
        Ok(())
    }
}

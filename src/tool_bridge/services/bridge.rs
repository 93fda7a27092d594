//! Turns registered tool entries into host registrations.
//!
//! Both registration paths go through [`host_registration`], so a fast-path
//! replay produces exactly what the cold path registered.

use super::pool::{ConnectionPool, ConnectionPoolError};
use crate::tool_bridge::{
    domain::{HostToolResponse, InvocationId, ProviderName, RegisteredToolEntry},
    ports::{
        HostToolRegistration, ToolExecutionError, ToolExecutionResult, ToolExecutor, ToolHost,
        ToolHostResult,
    },
};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Routes host invocations of one exposed tool to its provider.
#[derive(Debug, Clone)]
pub struct ToolInvocationAdapter {
    pool: Arc<ConnectionPool>,
    exposed_name: String,
    server: ProviderName,
    original_name: String,
}

impl ToolInvocationAdapter {
    /// Binds `entry` to the pool that serves it.
    #[must_use]
    pub fn new(entry: &RegisteredToolEntry, pool: Arc<ConnectionPool>) -> Self {
        Self {
            pool,
            exposed_name: entry.exposed_name().to_owned(),
            server: entry.server_name().clone(),
            original_name: entry.original_name().to_owned(),
        }
    }
}

#[async_trait]
impl ToolExecutor for ToolInvocationAdapter {
    async fn execute(
        &self,
        invocation_id: InvocationId,
        params: Value,
    ) -> ToolExecutionResult<HostToolResponse> {
        debug!(
            %invocation_id,
            tool = %self.exposed_name,
            server = %self.server,
            "invoking provider tool"
        );
        match self
            .pool
            .invoke(&self.server, &self.original_name, params)
            .await
        {
            Ok(outcome) => Ok(HostToolResponse::from(outcome)),
            Err(ConnectionPoolError::NotConnected(server)) => {
                Err(ToolExecutionError::NotConnected {
                    tool: self.exposed_name.clone(),
                    server,
                })
            }
            Err(err) => Err(ToolExecutionError::Failed {
                tool: self.exposed_name.clone(),
                source: Arc::new(err),
            }),
        }
    }
}

/// Builds the host registration for `entry`.
#[must_use]
pub fn host_registration(
    entry: &RegisteredToolEntry,
    pool: &Arc<ConnectionPool>,
) -> HostToolRegistration {
    HostToolRegistration {
        name: entry.exposed_name().to_owned(),
        description: entry.description().to_owned(),
        parameters: entry.parameter_schema().clone(),
        executor: Arc::new(ToolInvocationAdapter::new(entry, Arc::clone(pool))),
    }
}

/// Registers one entry with `host`.
///
/// # Errors
///
/// Returns the host's rejection unchanged.
pub fn register_entry(
    host: &dyn ToolHost,
    entry: &RegisteredToolEntry,
    pool: &Arc<ConnectionPool>,
) -> ToolHostResult<()> {
    host.register_tool(host_registration(entry, pool))
}

/// Registers every entry with `host` in order, returning how many the host
/// accepted. Rejected entries are logged and skipped.
pub fn replay_entries(
    host: &dyn ToolHost,
    entries: &[RegisteredToolEntry],
    pool: &Arc<ConnectionPool>,
) -> usize {
    entries
        .iter()
        .filter(|entry| match register_entry(host, entry, pool) {
            Ok(()) => true,
            Err(err) => {
                warn!(tool = entry.exposed_name(), %err, "host rejected cached tool");
                false
            }
        })
        .count()
}

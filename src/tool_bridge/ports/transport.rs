//! Transport port for talking to tool providers.

use crate::tool_bridge::domain::{
    CapabilityDescriptor, ProviderName, ServerConfig, ToolCallOutcome,
};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Result type for provider transport operations.
pub type ProviderTransportResult<T> = Result<T, ProviderTransportError>;

/// Wire-level client contract for tool providers.
///
/// Implementations speak the provider protocol; the bridge treats them as
/// opaque. A provider-level tool failure is reported as a
/// [`ToolCallOutcome`] with `is_error` set, not as an `Err`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProviderTransport: Send + Sync {
    /// Opens a connection to the provider described by `server`.
    async fn connect(&self, server: &ServerConfig) -> ProviderTransportResult<()>;

    /// Lists the capabilities of a connected provider in provider order.
    async fn list_tools(
        &self,
        server: &ProviderName,
    ) -> ProviderTransportResult<Vec<CapabilityDescriptor>>;

    /// Invokes a capability on a connected provider.
    async fn call_tool(
        &self,
        server: &ProviderName,
        tool: &str,
        params: Value,
    ) -> ProviderTransportResult<ToolCallOutcome>;

    /// Closes every open connection. Must tolerate having nothing open.
    async fn close_all(&self) -> ProviderTransportResult<()>;
}

/// Errors returned by provider transport adapters.
#[derive(Debug, Clone, Error)]
pub enum ProviderTransportError {
    /// The provider has no open connection.
    #[error("provider {0} is not connected")]
    NotConnected(ProviderName),

    /// The connection parameters are not supported by this transport.
    #[error("unsupported connection for provider {server}: {reason}")]
    UnsupportedConnection {
        /// Provider name.
        server: ProviderName,
        /// Reason string.
        reason: String,
    },

    /// The provider could not be reached or rejected the handshake.
    #[error("handshake with provider {server} failed: {reason}")]
    Handshake {
        /// Provider name.
        server: ProviderName,
        /// Reason string.
        reason: String,
    },

    /// Generic transport failure.
    #[error("provider transport error: {0}")]
    Runtime(Arc<dyn std::error::Error + Send + Sync>),
}

impl ProviderTransportError {
    /// Wraps a runtime error from the transport adapter.
    pub fn runtime(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Runtime(Arc::new(err))
    }
}

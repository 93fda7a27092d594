//! Host registry port: the sink tools and services are registered into.

use crate::tool_bridge::domain::{HostToolResponse, InvocationId, ProviderName};
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Result type for host registry operations.
pub type ToolHostResult<T> = Result<T, ToolHostError>;

/// Result type for tool executions.
pub type ToolExecutionResult<T> = Result<T, ToolExecutionError>;

/// Result type for host-driven service hooks.
pub type HostServiceResult<T> = Result<T, HostServiceError>;

/// Registry API offered by the host application.
///
/// A host may create many registry instances per process; each one is a
/// separate `ToolHost`.
pub trait ToolHost: Send + Sync {
    /// Registers a tool under its exposed name.
    ///
    /// # Errors
    ///
    /// Returns [`ToolHostError`] when the host rejects the tool.
    fn register_tool(&self, tool: HostToolRegistration) -> ToolHostResult<()>;

    /// Registers a service whose hooks the host will drive.
    ///
    /// # Errors
    ///
    /// Returns [`ToolHostError`] when the host rejects the service.
    fn register_service(&self, service: Arc<dyn HostService>) -> ToolHostResult<()>;
}

/// Lifecycle hooks the host drives for a registered service.
///
/// By contract the host calls `start` once per process and `stop` once at
/// shutdown, never overlapping.
#[async_trait]
pub trait HostService: Send + Sync {
    /// Returns the service identifier.
    fn id(&self) -> &str;

    /// Starts the service.
    async fn start(&self) -> HostServiceResult<()>;

    /// Stops the service.
    async fn stop(&self) -> HostServiceResult<()>;
}

/// Invocation callback attached to a registered tool.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    /// Executes the tool with host-supplied parameters.
    async fn execute(
        &self,
        invocation_id: InvocationId,
        params: Value,
    ) -> ToolExecutionResult<HostToolResponse>;
}

/// A tool registration as submitted to the host.
#[derive(Clone)]
pub struct HostToolRegistration {
    /// Exposed tool name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// JSON schema for the tool parameters.
    pub parameters: Value,
    /// Invocation callback.
    pub executor: Arc<dyn ToolExecutor>,
}

impl fmt::Debug for HostToolRegistration {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("HostToolRegistration")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

/// Errors returned by host registry adapters.
#[derive(Debug, Clone, Error)]
pub enum ToolHostError {
    /// A tool with the same name is already registered.
    #[error("duplicate tool name: {0}")]
    DuplicateTool(String),

    /// A service with the same identifier is already registered.
    #[error("duplicate service identifier: {0}")]
    DuplicateService(String),

    /// Generic host failure.
    #[error("tool host error: {0}")]
    Runtime(Arc<dyn std::error::Error + Send + Sync>),
}

impl ToolHostError {
    /// Wraps a runtime error from the host adapter.
    pub fn runtime(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Runtime(Arc::new(err))
    }
}

/// Errors surfaced to the host from a tool execution.
///
/// Provider-reported failures never appear here; they travel inside the
/// [`HostToolResponse`] error flag.
#[derive(Debug, Clone, Error)]
pub enum ToolExecutionError {
    /// The owning provider has no live connection.
    #[error("tool {tool} is unavailable: provider {server} is not connected")]
    NotConnected {
        /// Exposed tool name.
        tool: String,
        /// Owning provider.
        server: ProviderName,
    },

    /// Any other failure reaching the provider.
    #[error("tool {tool} failed: {source}")]
    Failed {
        /// Exposed tool name.
        tool: String,
        /// Underlying error.
        source: Arc<dyn std::error::Error + Send + Sync>,
    },
}

/// Errors returned from host-driven service hooks.
#[derive(Debug, Clone, Error)]
#[error("service {service_id} failed: {source}")]
pub struct HostServiceError {
    /// Service identifier.
    pub service_id: String,
    /// Underlying error.
    pub source: Arc<dyn std::error::Error + Send + Sync>,
}

impl HostServiceError {
    /// Wraps a failure raised by a service hook.
    pub fn new(
        service_id: impl Into<String>,
        err: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            service_id: service_id.into(),
            source: Arc::new(err),
        }
    }
}

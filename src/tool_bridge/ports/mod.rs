//! Port contracts for provider transports and the host registry.

mod host;
mod transport;

pub use host::{
    HostService, HostServiceError, HostServiceResult, HostToolRegistration, ToolExecutionError,
    ToolExecutionResult, ToolExecutor, ToolHost, ToolHostError, ToolHostResult,
};
#[cfg(test)]
pub use transport::MockProviderTransport;
pub use transport::{ProviderTransport, ProviderTransportError, ProviderTransportResult};

//! Domain model for provider tool bridging.
//!
//! Provider identity and connection parameters, discovered capability
//! descriptors, resolved registry entries, tool call outcomes, and the
//! service lifecycle state. Infrastructure concerns remain outside this
//! boundary.

mod error;
mod ids;
mod lifecycle;
mod outcome;
mod server;
mod tool;
mod transport;

pub use error::ToolBridgeDomainError;
pub use ids::{InvocationId, ProviderName};
pub use lifecycle::ServiceState;
pub use outcome::{ContentItem, HostContentBlock, HostToolResponse, ToolCallOutcome};
pub use server::ServerConfig;
pub use tool::{
    CapabilityDescriptor, RegisteredToolEntry, exposed_tool_name, fallback_description,
    fallback_parameter_schema,
};
pub use transport::ConnectionParams;

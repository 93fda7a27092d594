//! Provider server configuration.

use super::{ConnectionParams, ProviderName};
use serde::{Deserialize, Serialize};

/// Configuration for one tool provider.
///
/// Supplied by the host's configuration layer and immutable for the lifetime
/// of the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    name: ProviderName,
    connection: ConnectionParams,
}

impl ServerConfig {
    /// Creates a server configuration.
    #[must_use]
    pub const fn new(name: ProviderName, connection: ConnectionParams) -> Self {
        Self { name, connection }
    }

    /// Returns the provider name.
    #[must_use]
    pub const fn name(&self) -> &ProviderName {
        &self.name
    }

    /// Returns the connection parameters.
    #[must_use]
    pub const fn connection(&self) -> &ConnectionParams {
        &self.connection
    }
}

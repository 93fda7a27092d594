//! Typed bridge configuration.
//!
//! Parsing configuration files is the host's job; this module only defines
//! the typed shape the host hands over, its defaults, and its validation.

use crate::tool_bridge::domain::{ProviderName, ServerConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_SERVICE_ID: &str = "mcp-bridge";
const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_LIST_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_INVOKE_TIMEOUT_MS: u64 = 120_000;

/// Errors returned while validating a [`BridgeConfig`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Two servers share a name.
    #[error("duplicate provider name in configuration: {0}")]
    DuplicateServerName(ProviderName),

    /// A timeout was configured as zero.
    #[error("{0} timeout must be greater than zero")]
    ZeroTimeout(&'static str),

    /// The service identifier is empty after trimming.
    #[error("service identifier must not be empty")]
    EmptyServiceId,
}

/// How calls against a single provider connection are scheduled.
///
/// Calls against distinct providers always run concurrently.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvocationMode {
    /// One call at a time per provider connection.
    #[default]
    Serialized,
    /// Calls may overlap on the same provider connection.
    Concurrent,
}

/// Per-operation timeouts, in milliseconds on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutSettings {
    connect_ms: u64,
    list_ms: u64,
    invoke_ms: u64,
}

impl Default for TimeoutSettings {
    fn default() -> Self {
        Self {
            connect_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            list_ms: DEFAULT_LIST_TIMEOUT_MS,
            invoke_ms: DEFAULT_INVOKE_TIMEOUT_MS,
        }
    }
}

impl TimeoutSettings {
    /// Creates timeout settings from explicit durations.
    #[must_use]
    pub fn new(connect: Duration, list: Duration, invoke: Duration) -> Self {
        Self {
            connect_ms: duration_millis(connect),
            list_ms: duration_millis(list),
            invoke_ms: duration_millis(invoke),
        }
    }

    /// Returns the connect timeout.
    #[must_use]
    pub const fn connect(&self) -> Duration {
        Duration::from_millis(self.connect_ms)
    }

    /// Returns the capability listing timeout.
    #[must_use]
    pub const fn list(&self) -> Duration {
        Duration::from_millis(self.list_ms)
    }

    /// Returns the invocation timeout.
    #[must_use]
    pub const fn invoke(&self) -> Duration {
        Duration::from_millis(self.invoke_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.connect_ms == 0 {
            return Err(ConfigError::ZeroTimeout("connect"));
        }
        if self.list_ms == 0 {
            return Err(ConfigError::ZeroTimeout("list"));
        }
        if self.invoke_ms == 0 {
            return Err(ConfigError::ZeroTimeout("invoke"));
        }
        Ok(())
    }
}

fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

const fn default_tool_prefix() -> bool {
    true
}

fn default_service_id() -> String {
    DEFAULT_SERVICE_ID.to_owned()
}

/// Configuration for one bridge instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    #[serde(default)]
    servers: Vec<ServerConfig>,
    #[serde(default = "default_tool_prefix", alias = "toolPrefix")]
    tool_prefix: bool,
    #[serde(default)]
    timeouts: TimeoutSettings,
    #[serde(default)]
    invocation_mode: InvocationMode,
    #[serde(default)]
    lazy_connect: bool,
    #[serde(default = "default_service_id")]
    service_id: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl BridgeConfig {
    /// Creates a configuration for `servers` with default settings.
    #[must_use]
    pub fn new(servers: Vec<ServerConfig>) -> Self {
        Self {
            servers,
            tool_prefix: default_tool_prefix(),
            timeouts: TimeoutSettings::default(),
            invocation_mode: InvocationMode::default(),
            lazy_connect: false,
            service_id: default_service_id(),
        }
    }

    /// Enables or disables provider-name prefixing of exposed tool names.
    #[must_use]
    pub const fn with_tool_prefix(mut self, enabled: bool) -> Self {
        self.tool_prefix = enabled;
        self
    }

    /// Replaces the per-operation timeouts.
    #[must_use]
    pub const fn with_timeouts(mut self, timeouts: TimeoutSettings) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Sets the per-provider invocation mode.
    #[must_use]
    pub const fn with_invocation_mode(mut self, mode: InvocationMode) -> Self {
        self.invocation_mode = mode;
        self
    }

    /// Enables on-demand connection of configured providers at first use.
    #[must_use]
    pub const fn with_lazy_connect(mut self, enabled: bool) -> Self {
        self.lazy_connect = enabled;
        self
    }

    /// Sets the identifier the service is registered with.
    #[must_use]
    pub fn with_service_id(mut self, service_id: impl Into<String>) -> Self {
        self.service_id = service_id.into();
        self
    }

    /// Returns the configured servers in declaration order.
    #[must_use]
    pub fn servers(&self) -> &[ServerConfig] {
        &self.servers
    }

    /// Returns whether exposed names carry the provider prefix.
    #[must_use]
    pub const fn tool_prefix(&self) -> bool {
        self.tool_prefix
    }

    /// Returns the per-operation timeouts.
    #[must_use]
    pub const fn timeouts(&self) -> TimeoutSettings {
        self.timeouts
    }

    /// Returns the per-provider invocation mode.
    #[must_use]
    pub const fn invocation_mode(&self) -> InvocationMode {
        self.invocation_mode
    }

    /// Returns whether lazy connection is enabled.
    #[must_use]
    pub const fn lazy_connect(&self) -> bool {
        self.lazy_connect
    }

    /// Returns the service identifier.
    #[must_use]
    pub fn service_id(&self) -> &str {
        &self.service_id
    }

    /// Checks cross-field constraints serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for duplicate provider names, zero timeouts,
    /// or a blank service identifier.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for server in &self.servers {
            if !seen.insert(server.name()) {
                return Err(ConfigError::DuplicateServerName(server.name().clone()));
            }
        }

        if self.service_id.trim().is_empty() {
            return Err(ConfigError::EmptyServiceId);
        }

        self.timeouts.validate()
    }
}

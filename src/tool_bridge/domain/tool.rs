//! Capability descriptors and registered tool entries.

use super::{ProviderName, ToolBridgeDomainError};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Metadata for one capability as reported by a provider.
///
/// Description and schema are optional on the wire; fallbacks are applied
/// when the descriptor is turned into a [`RegisteredToolEntry`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityDescriptor {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default, rename = "inputSchema")]
    input_schema: Option<Value>,
}

impl CapabilityDescriptor {
    /// Creates a descriptor with only a capability name.
    ///
    /// # Errors
    ///
    /// Returns [`ToolBridgeDomainError::EmptyCapabilityName`] when the name is
    /// empty after trimming.
    pub fn new(name: impl Into<String>) -> Result<Self, ToolBridgeDomainError> {
        let normalized_name = name.into().trim().to_owned();
        if normalized_name.is_empty() {
            return Err(ToolBridgeDomainError::EmptyCapabilityName);
        }

        Ok(Self {
            name: normalized_name,
            description: None,
            input_schema: None,
        })
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the parameter schema.
    #[must_use]
    pub fn with_input_schema(mut self, input_schema: Value) -> Self {
        self.input_schema = Some(input_schema);
        self
    }

    /// Returns the capability name as known to the provider.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the description, if the provider supplied one.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the parameter schema, if the provider supplied one.
    #[must_use]
    pub const fn input_schema(&self) -> Option<&Value> {
        self.input_schema.as_ref()
    }
}

/// Derives the externally visible name for a provider capability.
///
/// With prefixing enabled the provider name and capability name are joined
/// with an underscore.
#[must_use]
pub fn exposed_tool_name(server: &ProviderName, original_name: &str, prefix: bool) -> String {
    if prefix {
        format!("{server}_{original_name}")
    } else {
        original_name.to_owned()
    }
}

/// Description used when a provider omits one.
#[must_use]
pub fn fallback_description(server: &ProviderName) -> String {
    format!("Tool from {server}")
}

/// Parameter schema used when a provider omits one.
#[must_use]
pub fn fallback_parameter_schema() -> Value {
    json!({"type": "object", "properties": {}})
}

/// A discovered capability resolved into its registry form.
///
/// Entries are created once per capability during a successful start and
/// replayed verbatim on every later fast-path registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredToolEntry {
    exposed_name: String,
    server_name: ProviderName,
    original_name: String,
    description: String,
    parameter_schema: Value,
}

impl RegisteredToolEntry {
    /// Resolves a descriptor owned by `server` into a registry entry.
    #[must_use]
    pub fn from_descriptor(
        server: &ProviderName,
        descriptor: &CapabilityDescriptor,
        prefix: bool,
    ) -> Self {
        let description = descriptor
            .description()
            .filter(|text| !text.is_empty())
            .map_or_else(|| fallback_description(server), ToOwned::to_owned);
        let parameter_schema = descriptor
            .input_schema()
            .cloned()
            .unwrap_or_else(fallback_parameter_schema);

        Self {
            exposed_name: exposed_tool_name(server, descriptor.name(), prefix),
            server_name: server.clone(),
            original_name: descriptor.name().to_owned(),
            description,
            parameter_schema,
        }
    }

    /// Returns the globally unique exposed name.
    #[must_use]
    pub fn exposed_name(&self) -> &str {
        &self.exposed_name
    }

    /// Returns the owning provider.
    #[must_use]
    pub const fn server_name(&self) -> &ProviderName {
        &self.server_name
    }

    /// Returns the capability name as known to the provider.
    #[must_use]
    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    /// Returns the resolved description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the resolved parameter schema.
    #[must_use]
    pub const fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }
}

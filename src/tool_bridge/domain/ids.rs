//! Identifier and validated-name types for providers and invocations.

use super::ToolBridgeDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier handed to a tool executor for a single invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvocationId(Uuid);

impl InvocationId {
    /// Creates a new random invocation identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for InvocationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for InvocationId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Validated provider name.
///
/// The name is the stable identity of a provider for the lifetime of the
/// process and doubles as the prefix of exposed tool names. Case is
/// preserved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProviderName(String);

impl ProviderName {
    /// Creates a validated provider name.
    ///
    /// The input is trimmed. Embedded whitespace and control characters are
    /// rejected.
    ///
    /// # Errors
    ///
    /// Returns [`ToolBridgeDomainError`] when validation fails.
    pub fn new(value: impl Into<String>) -> Result<Self, ToolBridgeDomainError> {
        let normalized = value.into().trim().to_owned();

        if normalized.is_empty() {
            return Err(ToolBridgeDomainError::EmptyProviderName);
        }

        let has_invalid = normalized
            .chars()
            .any(|character| character.is_whitespace() || character.is_control());
        if has_invalid {
            return Err(ToolBridgeDomainError::InvalidProviderName(normalized));
        }

        Ok(Self(normalized))
    }

    /// Returns the provider name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ProviderName {
    type Error = ToolBridgeDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ProviderName> for String {
    fn from(value: ProviderName) -> Self {
        value.0
    }
}

impl AsRef<str> for ProviderName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ProviderName {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

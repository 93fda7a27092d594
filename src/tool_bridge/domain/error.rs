//! Error types for tool bridge domain validation.

use thiserror::Error;

/// Errors returned while constructing tool bridge domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ToolBridgeDomainError {
    /// The provider name is empty after trimming.
    #[error("provider name must not be empty")]
    EmptyProviderName,

    /// The provider name contains whitespace or control characters.
    #[error("provider name '{0}' must not contain whitespace or control characters")]
    InvalidProviderName(String),

    /// A capability name is empty after trimming.
    #[error("capability name must not be empty")]
    EmptyCapabilityName,

    /// The STDIO command is empty.
    #[error("STDIO command must not be empty")]
    EmptyStdioCommand,

    /// The HTTP+SSE URL is empty.
    #[error("HTTP+SSE URL must not be empty")]
    EmptyHttpSseUrl,

    /// Transitioning between two service states is invalid.
    #[error("invalid provider service transition: {from} -> {to}")]
    InvalidLifecycleTransition {
        /// Current service state.
        from: String,
        /// Requested target service state.
        to: String,
    },
}

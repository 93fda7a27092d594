//! Provider connection parameters.
//!
//! The bridge never interprets these values itself; they are handed to the
//! [`ProviderTransport`](crate::tool_bridge::ports::ProviderTransport)
//! unchanged when a connection is opened.

use super::ToolBridgeDomainError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How a provider is reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ConnectionParams {
    /// Local process speaking over STDIO.
    Stdio {
        /// Executable to spawn.
        command: String,
        /// Arguments passed to the executable.
        #[serde(default)]
        args: Vec<String>,
        /// Extra environment for the spawned process.
        #[serde(default)]
        env: BTreeMap<String, String>,
    },
    /// Remote server speaking HTTP+SSE.
    HttpSse {
        /// Endpoint the transport connects to.
        url: String,
    },
}

impl ConnectionParams {
    /// Creates `stdio` parameters for `command` with no arguments.
    ///
    /// # Errors
    ///
    /// Returns [`ToolBridgeDomainError::EmptyStdioCommand`] when `command`
    /// is blank.
    pub fn stdio(command: impl Into<String>) -> Result<Self, ToolBridgeDomainError> {
        let executable = command.into();
        if executable.trim().is_empty() {
            return Err(ToolBridgeDomainError::EmptyStdioCommand);
        }
        Ok(Self::Stdio {
            command: executable,
            args: Vec::new(),
            env: BTreeMap::new(),
        })
    }

    /// Creates `http_sse` parameters for `url`.
    ///
    /// # Errors
    ///
    /// Returns [`ToolBridgeDomainError::EmptyHttpSseUrl`] when `url` is
    /// blank.
    pub fn http_sse(url: impl Into<String>) -> Result<Self, ToolBridgeDomainError> {
        let endpoint = url.into();
        if endpoint.trim().is_empty() {
            return Err(ToolBridgeDomainError::EmptyHttpSseUrl);
        }
        Ok(Self::HttpSse { url: endpoint })
    }

    /// Returns the kind label used in logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Stdio { .. } => "stdio",
            Self::HttpSse { .. } => "http_sse",
        }
    }
}

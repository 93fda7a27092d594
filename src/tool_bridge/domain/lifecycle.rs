//! Provider service lifecycle states.

use super::ToolBridgeDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of the provider tool service.
///
/// The only legal cycle is `Idle -> Starting -> Running -> Stopping -> Idle`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceState {
    /// No pool is open.
    #[default]
    Idle,
    /// Providers are being connected and discovered.
    Starting,
    /// Discovery finished and the pool is published.
    Running,
    /// Connections are being closed.
    Stopping,
}

impl ServiceState {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Starting => "starting",
            Self::Running => "running",
            Self::Stopping => "stopping",
        }
    }

    /// Returns whether transition to `target` is allowed.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Idle, Self::Starting)
                | (Self::Starting, Self::Running)
                | (Self::Running, Self::Stopping)
                | (Self::Stopping, Self::Idle)
        )
    }

    /// Returns the target state when the transition is allowed.
    ///
    /// # Errors
    ///
    /// Returns [`ToolBridgeDomainError::InvalidLifecycleTransition`] when the
    /// transition is not allowed.
    pub fn transition_to(self, target: Self) -> Result<Self, ToolBridgeDomainError> {
        if self.can_transition_to(target) {
            return Ok(target);
        }

        Err(ToolBridgeDomainError::InvalidLifecycleTransition {
            from: self.as_str().to_owned(),
            to: target.as_str().to_owned(),
        })
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

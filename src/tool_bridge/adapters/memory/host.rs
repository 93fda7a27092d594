//! In-memory host registry.

use crate::tool_bridge::ports::{
    HostService, HostServiceResult, HostToolRegistration, ToolHost, ToolHostError, ToolHostResult,
};
use std::sync::{Arc, RwLock};

/// Thread-safe in-memory host registry.
///
/// Records tool and service registrations in arrival order. Each instance
/// stands in for one registry instantiation by the host.
#[derive(Clone, Default)]
pub struct InMemoryToolHost {
    state: Arc<RwLock<InMemoryHostState>>,
}

#[derive(Default)]
struct InMemoryHostState {
    tools: Vec<HostToolRegistration>,
    services: Vec<Arc<dyn HostService>>,
}

fn lock_error(message: String) -> ToolHostError {
    ToolHostError::runtime(std::io::Error::other(message))
}

impl InMemoryToolHost {
    /// Creates an empty host registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns registered tool names in registration order.
    ///
    /// # Errors
    ///
    /// Returns host runtime errors when lock acquisition fails.
    pub fn tool_names(&self) -> ToolHostResult<Vec<String>> {
        let state = self.state.read().map_err(|err| lock_error(err.to_string()))?;
        Ok(state.tools.iter().map(|tool| tool.name.clone()).collect())
    }

    /// Returns every registered tool in registration order.
    ///
    /// # Errors
    ///
    /// Returns host runtime errors when lock acquisition fails.
    pub fn tools(&self) -> ToolHostResult<Vec<HostToolRegistration>> {
        let state = self.state.read().map_err(|err| lock_error(err.to_string()))?;
        Ok(state.tools.clone())
    }

    /// Finds a registered tool by exposed name.
    ///
    /// # Errors
    ///
    /// Returns host runtime errors when lock acquisition fails.
    pub fn tool(&self, name: &str) -> ToolHostResult<Option<HostToolRegistration>> {
        let state = self.state.read().map_err(|err| lock_error(err.to_string()))?;
        Ok(state.tools.iter().find(|tool| tool.name == name).cloned())
    }

    /// Returns the number of registered services.
    ///
    /// # Errors
    ///
    /// Returns host runtime errors when lock acquisition fails.
    pub fn service_count(&self) -> ToolHostResult<usize> {
        let state = self.state.read().map_err(|err| lock_error(err.to_string()))?;
        Ok(state.services.len())
    }

    /// Returns every registered service.
    ///
    /// # Errors
    ///
    /// Returns host runtime errors when lock acquisition fails.
    pub fn services(&self) -> ToolHostResult<Vec<Arc<dyn HostService>>> {
        let state = self.state.read().map_err(|err| lock_error(err.to_string()))?;
        Ok(state.services.clone())
    }

    /// Drives `start` on every registered service, as a host would at boot.
    ///
    /// # Errors
    ///
    /// Returns the first service failure.
    pub async fn start_services(&self) -> HostServiceResult<()> {
        for service in self.services_snapshot() {
            service.start().await?;
        }
        Ok(())
    }

    /// Drives `stop` on every registered service, as a host would at
    /// shutdown.
    ///
    /// # Errors
    ///
    /// Returns the first service failure.
    pub async fn stop_services(&self) -> HostServiceResult<()> {
        for service in self.services_snapshot() {
            service.stop().await?;
        }
        Ok(())
    }

    fn services_snapshot(&self) -> Vec<Arc<dyn HostService>> {
        self.state
            .read()
            .map(|state| state.services.clone())
            .unwrap_or_default()
    }
}

impl ToolHost for InMemoryToolHost {
    fn register_tool(&self, tool: HostToolRegistration) -> ToolHostResult<()> {
        let mut state = self
            .state
            .write()
            .map_err(|err| lock_error(err.to_string()))?;

        if state.tools.iter().any(|existing| existing.name == tool.name) {
            return Err(ToolHostError::DuplicateTool(tool.name));
        }

        state.tools.push(tool);
        Ok(())
    }

    fn register_service(&self, service: Arc<dyn HostService>) -> ToolHostResult<()> {
        let mut state = self
            .state
            .write()
            .map_err(|err| lock_error(err.to_string()))?;

        if state
            .services
            .iter()
            .any(|existing| existing.id() == service.id())
        {
            return Err(ToolHostError::DuplicateService(service.id().to_owned()));
        }

        state.services.push(service);
        Ok(())
    }
}

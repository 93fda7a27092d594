//! Host service that connects providers and publishes their tools.

use super::{
    bridge,
    cache::DescriptorCache,
    coordinator::LifecycleCoordinator,
    pool::ConnectionPool,
};
use crate::config::BridgeConfig;
use crate::tool_bridge::{
    domain::{
        CapabilityDescriptor, ProviderName, RegisteredToolEntry, ServerConfig, ServiceState,
        ToolBridgeDomainError,
    },
    ports::{HostService, HostServiceError, HostServiceResult, ToolHost},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// Point-in-time view of a [`ProviderToolService`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceStatus {
    /// Current lifecycle state.
    pub state: ServiceState,
    /// Providers with a live connection, sorted by name.
    pub connected_servers: Vec<ProviderName>,
    /// Tools registered by the last successful start.
    pub registered_tools: usize,
    /// When the last start finished.
    pub started_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
struct ServiceRuntime {
    state: ServiceState,
    registered_tools: usize,
    started_at: Option<DateTime<Utc>>,
}

/// Connects every configured provider on start and closes them on stop.
///
/// Start never fails because of a provider: unreachable providers and
/// failed listings are logged and skipped.
pub struct ProviderToolService<C>
where
    C: Clock + Send + Sync,
{
    service_id: String,
    servers: Vec<ServerConfig>,
    tool_prefix: bool,
    pool: Arc<ConnectionPool>,
    host: Arc<dyn ToolHost>,
    coordinator: Arc<LifecycleCoordinator>,
    clock: Arc<C>,
    runtime: Mutex<ServiceRuntime>,
}

impl<C> ProviderToolService<C>
where
    C: Clock + Send + Sync,
{
    /// Creates an idle service for the providers in `config`.
    #[must_use]
    pub fn new(
        config: &BridgeConfig,
        pool: Arc<ConnectionPool>,
        host: Arc<dyn ToolHost>,
        coordinator: Arc<LifecycleCoordinator>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            service_id: config.service_id().to_owned(),
            servers: config.servers().to_vec(),
            tool_prefix: config.tool_prefix(),
            pool,
            host,
            coordinator,
            clock,
            runtime: Mutex::new(ServiceRuntime::default()),
        }
    }

    fn lock_runtime(&self) -> MutexGuard<'_, ServiceRuntime> {
        self.runtime.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn advance(&self, target: ServiceState) -> Result<(), ToolBridgeDomainError> {
        let mut runtime = self.lock_runtime();
        runtime.state = runtime.state.transition_to(target)?;
        Ok(())
    }

    /// Returns the pool this service owns.
    #[must_use]
    pub const fn pool(&self) -> &Arc<ConnectionPool> {
        &self.pool
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ServiceState {
        self.lock_runtime().state
    }

    /// Returns a snapshot of the service.
    #[must_use]
    pub fn status(&self) -> ServiceStatus {
        let runtime = self.lock_runtime();
        ServiceStatus {
            state: runtime.state,
            connected_servers: self.pool.connected_servers(),
            registered_tools: runtime.registered_tools,
            started_at: runtime.started_at,
        }
    }

    async fn discover(&self, server: &ServerConfig) -> Vec<CapabilityDescriptor> {
        let name = server.name();
        if let Err(err) = self.pool.connect(server).await {
            warn!(server = %name, %err, "skipping provider that failed to connect");
            return Vec::new();
        }

        match self.pool.list_capabilities(name).await {
            Ok(descriptors) => {
                info!(server = %name, tools = descriptors.len(), "discovered provider tools");
                descriptors
            }
            Err(err) => {
                warn!(server = %name, %err, "skipping provider whose tools could not be listed");
                Vec::new()
            }
        }
    }

    fn register_discovered(&self, cache: &mut DescriptorCache, entry: RegisteredToolEntry) {
        if cache.contains(entry.exposed_name()) {
            warn!(
                tool = entry.exposed_name(),
                server = %entry.server_name(),
                "skipping tool whose exposed name is already taken"
            );
            return;
        }

        if let Err(err) = bridge::register_entry(&*self.host, &entry, &self.pool) {
            warn!(tool = entry.exposed_name(), %err, "host rejected discovered tool");
            return;
        }

        if let Err(err) = cache.append(entry) {
            warn!(%err, "failed to cache registered tool");
        }
    }
}

#[async_trait]
impl<C> HostService for ProviderToolService<C>
where
    C: Clock + Send + Sync,
{
    fn id(&self) -> &str {
        &self.service_id
    }

    async fn start(&self) -> HostServiceResult<()> {
        if let Err(err) = self.advance(ServiceState::Starting) {
            warn!(service = %self.service_id, %err, "ignoring start request");
            return Ok(());
        }
        info!(
            service = %self.service_id,
            servers = self.servers.len(),
            "starting provider tool service"
        );

        let mut cache = DescriptorCache::new();
        for server in &self.servers {
            for descriptor in self.discover(server).await {
                let entry =
                    RegisteredToolEntry::from_descriptor(server.name(), &descriptor, self.tool_prefix);
                self.register_discovered(&mut cache, entry);
            }
        }

        let registered_tools = cache.len();
        self.coordinator.publish(Arc::clone(&self.pool), cache);
        self.advance(ServiceState::Running)
            .map_err(|err| HostServiceError::new(self.service_id.clone(), err))?;
        {
            let mut runtime = self.lock_runtime();
            runtime.registered_tools = registered_tools;
            runtime.started_at = Some(self.clock.utc());
        }

        info!(
            service = %self.service_id,
            tools = registered_tools,
            connected = self.pool.connected_servers().len(),
            "provider tool service running"
        );
        Ok(())
    }

    async fn stop(&self) -> HostServiceResult<()> {
        if self.state() == ServiceState::Idle {
            debug!(service = %self.service_id, "stop requested before start; nothing to close");
            return Ok(());
        }
        if let Err(err) = self.advance(ServiceState::Stopping) {
            warn!(service = %self.service_id, %err, "ignoring stop request");
            return Ok(());
        }

        self.pool.close_all().await;
        if !self.coordinator.teardown(&self.pool) {
            debug!(
                service = %self.service_id,
                "shared state belongs to a newer pool; leaving it in place"
            );
        }

        self.advance(ServiceState::Idle)
            .map_err(|err| HostServiceError::new(self.service_id.clone(), err))?;
        {
            let mut runtime = self.lock_runtime();
            runtime.registered_tools = 0;
            runtime.started_at = None;
        }

        info!(service = %self.service_id, "provider tool service stopped");
        Ok(())
    }
}

//! Entry point a host calls once per registry instance.

use super::{
    bridge,
    coordinator::{LifecycleCoordinator, RegistrationPath},
    pool::ConnectionPool,
    service::ProviderToolService,
};
use crate::config::{BridgeConfig, ConfigError};
use crate::tool_bridge::ports::{ProviderTransport, ToolHost, ToolHostError};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// What a call to [`ProviderToolRegistrar::register`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// No providers are configured.
    Skipped,
    /// Cached tools were replayed against the live pool.
    FastPath {
        /// Number of tools the host accepted.
        tools: usize,
    },
    /// A new pool and service were created and handed to the host.
    ColdPath {
        /// Identifier of the registered service.
        service_id: String,
    },
}

/// Errors raised while registering with a host.
#[derive(Debug, Error)]
pub enum RegistrarError {
    /// The bridge configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The host rejected the service.
    #[error(transparent)]
    Host(#[from] ToolHostError),
}

/// Result type for registrar operations.
pub type RegistrarResult<T> = Result<T, RegistrarError>;

/// Registers provider tools with host registry instances.
pub struct ProviderToolRegistrar<C>
where
    C: Clock + Send + Sync + 'static,
{
    config: BridgeConfig,
    transport: Arc<dyn ProviderTransport>,
    coordinator: Arc<LifecycleCoordinator>,
    clock: Arc<C>,
}

impl<C> ProviderToolRegistrar<C>
where
    C: Clock + Send + Sync + 'static,
{
    /// Creates a registrar sharing state through `coordinator`.
    #[must_use]
    pub fn new(
        config: BridgeConfig,
        transport: Arc<dyn ProviderTransport>,
        coordinator: Arc<LifecycleCoordinator>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            config,
            transport,
            coordinator,
            clock,
        }
    }

    /// Creates a registrar sharing the process-wide coordinator.
    #[must_use]
    pub fn with_global_coordinator(
        config: BridgeConfig,
        transport: Arc<dyn ProviderTransport>,
        clock: Arc<C>,
    ) -> Self {
        Self::new(config, transport, LifecycleCoordinator::global(), clock)
    }

    /// Returns the configuration in use.
    #[must_use]
    pub const fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Registers provider tools with `host`.
    ///
    /// When a live pool with cached tools exists, the cached entries are
    /// registered directly and no provider is contacted. Otherwise a new
    /// pool and service are created and the service is handed to the host,
    /// which discovers and registers tools when it starts the service.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrarError::Config`] for invalid configuration and
    /// [`RegistrarError::Host`] when the host rejects the service.
    pub fn register(&self, host: Arc<dyn ToolHost>) -> RegistrarResult<RegistrationOutcome> {
        if self.config.servers().is_empty() {
            debug!("no providers configured; skipping registration");
            return Ok(RegistrationOutcome::Skipped);
        }
        self.config.validate()?;

        match self.coordinator.registration_path() {
            RegistrationPath::Fast { pool, entries } => {
                let tools = bridge::replay_entries(&*host, &entries, &pool);
                debug!(tools, "registered cached provider tools");
                Ok(RegistrationOutcome::FastPath { tools })
            }
            RegistrationPath::Cold => {
                let pool = Arc::new(ConnectionPool::from_config(
                    Arc::clone(&self.transport),
                    &self.config,
                ));
                let service = ProviderToolService::new(
                    &self.config,
                    pool,
                    Arc::clone(&host),
                    Arc::clone(&self.coordinator),
                    Arc::clone(&self.clock),
                );
                host.register_service(Arc::new(service))?;
                info!(
                    service = self.config.service_id(),
                    servers = self.config.servers().len(),
                    "registered provider tool service"
                );
                Ok(RegistrationOutcome::ColdPath {
                    service_id: self.config.service_id().to_owned(),
                })
            }
        }
    }
}

//! Connection pool owning one live connection per provider.
//!
//! Every transport call is bounded by the configured timeout. Calls against
//! distinct providers always run concurrently. Calls against the same
//! provider are serialized behind a per-connection async mutex unless the
//! pool runs in [`InvocationMode::Concurrent`].
//!
//! Pools built by one registrar share a single transport. Once a newer pool
//! is published the older one is retired: it forgets its connections and no
//! longer closes the shared transport.

use crate::config::{BridgeConfig, InvocationMode, TimeoutSettings};
use crate::tool_bridge::{
    domain::{CapabilityDescriptor, ProviderName, ServerConfig, ToolCallOutcome},
    ports::{ProviderTransport, ProviderTransportError},
};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex as AsyncMutex;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Pool operation named in timeout errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolOperation {
    /// Opening a connection.
    Connect,
    /// Listing capabilities.
    ListCapabilities,
}

impl fmt::Display for PoolOperation {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            Self::Connect => "connect",
            Self::ListCapabilities => "capability listing",
        })
    }
}

/// Errors returned by [`ConnectionPool`] operations.
#[derive(Debug, Clone, Error)]
pub enum ConnectionPoolError {
    /// The provider could not be reached or rejected the handshake.
    #[error("failed to connect to provider {server}: {source}")]
    Connection {
        /// Provider name.
        server: ProviderName,
        /// Transport failure.
        source: ProviderTransportError,
    },

    /// The provider has no live connection in this pool.
    #[error("provider {0} is not connected")]
    NotConnected(ProviderName),

    /// Capability listing failed on a connected provider.
    #[error("failed to list capabilities of provider {server}: {source}")]
    Discovery {
        /// Provider name.
        server: ProviderName,
        /// Transport failure.
        source: ProviderTransportError,
    },

    /// The provider did not answer in time.
    #[error("provider {server} did not finish {operation} within {limit:?}")]
    Timeout {
        /// Provider name.
        server: ProviderName,
        /// Operation that timed out.
        operation: PoolOperation,
        /// Configured limit.
        limit: Duration,
    },
}

/// Result type for connection pool operations.
pub type ConnectionPoolResult<T> = Result<T, ConnectionPoolError>;

/// A live connection to one provider.
struct ProviderConnection {
    call_gate: Option<AsyncMutex<()>>,
}

impl ProviderConnection {
    fn new(mode: InvocationMode) -> Self {
        let call_gate = match mode {
            InvocationMode::Serialized => Some(AsyncMutex::new(())),
            InvocationMode::Concurrent => None,
        };
        Self { call_gate }
    }
}

/// Owns the connections to every configured provider.
pub struct ConnectionPool {
    transport: Arc<dyn ProviderTransport>,
    servers: HashMap<ProviderName, ServerConfig>,
    connections: RwLock<HashMap<ProviderName, Arc<ProviderConnection>>>,
    connect_gates: HashMap<ProviderName, AsyncMutex<()>>,
    retired: AtomicBool,
    timeouts: TimeoutSettings,
    invocation_mode: InvocationMode,
    lazy_connect: bool,
}

impl fmt::Debug for ConnectionPool {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ConnectionPool")
            .field("connected", &self.connected_servers())
            .field("retired", &self.is_retired())
            .field("timeouts", &self.timeouts)
            .field("invocation_mode", &self.invocation_mode)
            .field("lazy_connect", &self.lazy_connect)
            .finish_non_exhaustive()
    }
}

impl ConnectionPool {
    /// Creates an empty pool for the servers and settings in `config`.
    #[must_use]
    pub fn from_config(transport: Arc<dyn ProviderTransport>, config: &BridgeConfig) -> Self {
        Self {
            transport,
            servers: config
                .servers()
                .iter()
                .map(|server| (server.name().clone(), server.clone()))
                .collect(),
            connections: RwLock::new(HashMap::new()),
            connect_gates: config
                .servers()
                .iter()
                .map(|server| (server.name().clone(), AsyncMutex::new(())))
                .collect(),
            retired: AtomicBool::new(false),
            timeouts: config.timeouts(),
            invocation_mode: config.invocation_mode(),
            lazy_connect: config.lazy_connect(),
        }
    }

    fn read_connections(&self) -> RwLockReadGuard<'_, HashMap<ProviderName, Arc<ProviderConnection>>> {
        self.connections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write_connections(
        &self,
    ) -> RwLockWriteGuard<'_, HashMap<ProviderName, Arc<ProviderConnection>>> {
        self.connections
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn connection(&self, server: &ProviderName) -> Option<Arc<ProviderConnection>> {
        self.read_connections().get(server).cloned()
    }

    /// Returns whether `server` has a live connection.
    #[must_use]
    pub fn is_connected(&self, server: &ProviderName) -> bool {
        self.read_connections().contains_key(server)
    }

    /// Returns the names of all connected providers, sorted.
    #[must_use]
    pub fn connected_servers(&self) -> Vec<ProviderName> {
        let mut names: Vec<ProviderName> = self.read_connections().keys().cloned().collect();
        names.sort();
        names
    }

    /// Returns whether a newer pool has taken over the shared transport.
    #[must_use]
    pub fn is_retired(&self) -> bool {
        self.retired.load(Ordering::Acquire)
    }

    /// Hands the shared transport over to a newer pool.
    ///
    /// Forgets every connection without closing it in the transport; the
    /// newer pool owns those connections now.
    pub(crate) fn retire(&self) {
        self.retired.store(true, Ordering::Release);
        let dropped = self.write_connections().drain().count();
        info!(dropped, "connection pool superseded");
    }

    /// Opens a connection to `server`.
    ///
    /// Connecting an already connected provider is a no-op. Concurrent
    /// connects to one configured provider open a single transport
    /// connection.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionPoolError::Connection`] when the transport fails
    /// and [`ConnectionPoolError::Timeout`] when it does not answer in time.
    pub async fn connect(&self, server: &ServerConfig) -> ConnectionPoolResult<()> {
        let name = server.name();
        let _connecting = match self.connect_gates.get(name) {
            Some(gate) => Some(gate.lock().await),
            None => None,
        };
        if self.is_connected(name) {
            debug!(server = %name, "provider already connected");
            return Ok(());
        }

        let limit = self.timeouts.connect();
        match timeout(limit, self.transport.connect(server)).await {
            Err(_) => Err(ConnectionPoolError::Timeout {
                server: name.clone(),
                operation: PoolOperation::Connect,
                limit,
            }),
            Ok(Err(source)) => Err(ConnectionPoolError::Connection {
                server: name.clone(),
                source,
            }),
            Ok(Ok(())) => {
                self.write_connections()
                    .entry(name.clone())
                    .or_insert_with(|| Arc::new(ProviderConnection::new(self.invocation_mode)));
                info!(
                    server = %name,
                    transport = server.connection().kind(),
                    "provider connected"
                );
                Ok(())
            }
        }
    }

    /// Lists the capabilities of a connected provider.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionPoolError::NotConnected`] when `server` has no
    /// live connection, [`ConnectionPoolError::Discovery`] when the transport
    /// fails, and [`ConnectionPoolError::Timeout`] when it does not answer in
    /// time.
    pub async fn list_capabilities(
        &self,
        server: &ProviderName,
    ) -> ConnectionPoolResult<Vec<CapabilityDescriptor>> {
        if !self.is_connected(server) {
            return Err(ConnectionPoolError::NotConnected(server.clone()));
        }

        let limit = self.timeouts.list();
        match timeout(limit, self.transport.list_tools(server)).await {
            Err(_) => Err(ConnectionPoolError::Timeout {
                server: server.clone(),
                operation: PoolOperation::ListCapabilities,
                limit,
            }),
            Ok(Err(ProviderTransportError::NotConnected(_))) => {
                self.write_connections().remove(server);
                Err(ConnectionPoolError::NotConnected(server.clone()))
            }
            Ok(Err(source)) => Err(ConnectionPoolError::Discovery {
                server: server.clone(),
                source,
            }),
            Ok(Ok(tools)) => Ok(tools),
        }
    }

    async fn resolve_connection(
        &self,
        server: &ProviderName,
    ) -> ConnectionPoolResult<Arc<ProviderConnection>> {
        if let Some(connection) = self.connection(server) {
            return Ok(connection);
        }

        let config = self
            .servers
            .get(server)
            .filter(|_| self.lazy_connect)
            .ok_or_else(|| ConnectionPoolError::NotConnected(server.clone()))?;

        debug!(server = %server, "connecting provider on first use");
        self.connect(config).await?;
        self.connection(server)
            .ok_or_else(|| ConnectionPoolError::NotConnected(server.clone()))
    }

    /// Routes a capability call to the provider's connection.
    ///
    /// Transport and provider failures, including timeouts, come back as an
    /// outcome with the error flag set.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionPoolError::NotConnected`] when `server` has no live
    /// connection, including when the pool is closed while the call waits.
    /// With lazy connection enabled, connect failures are returned as-is.
    pub async fn invoke(
        &self,
        server: &ProviderName,
        original_name: &str,
        params: Value,
    ) -> ConnectionPoolResult<ToolCallOutcome> {
        let connection = self.resolve_connection(server).await?;
        let _permit = match &connection.call_gate {
            Some(gate) => Some(gate.lock().await),
            None => None,
        };

        if !self.is_connected(server) {
            return Err(ConnectionPoolError::NotConnected(server.clone()));
        }

        let limit = self.timeouts.invoke();
        match timeout(limit, self.transport.call_tool(server, original_name, params)).await {
            Err(_) => {
                warn!(server = %server, tool = original_name, ?limit, "tool call timed out");
                Ok(ToolCallOutcome::failure(format!(
                    "tool {original_name} on provider {server} timed out after {} ms",
                    limit.as_millis()
                )))
            }
            Ok(Err(ProviderTransportError::NotConnected(_))) => {
                self.write_connections().remove(server);
                Err(ConnectionPoolError::NotConnected(server.clone()))
            }
            Ok(Err(err)) => {
                warn!(server = %server, tool = original_name, %err, "tool call failed in transport");
                Ok(ToolCallOutcome::failure(err.to_string()))
            }
            Ok(Ok(outcome)) => Ok(outcome),
        }
    }

    /// Closes every connection.
    ///
    /// Safe to call repeatedly and on a pool that never connected. Transport
    /// failures while closing are logged, never returned. A retired pool
    /// leaves the shared transport open.
    pub async fn close_all(&self) {
        let closed = self.write_connections().drain().count();

        if self.is_retired() {
            debug!(closed, "retired pool leaves shared transport open");
            return;
        }

        if let Err(err) = self.transport.close_all().await {
            warn!(%err, "closing provider connections reported an error");
        }

        info!(closed, "provider connections closed");
    }
}

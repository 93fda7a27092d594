//! Orchestration services for the provider tool bridge.

pub mod bridge;
mod cache;
mod coordinator;
mod pool;
mod registrar;
mod service;

pub use cache::{DescriptorCache, DescriptorCacheError};
pub use coordinator::{LifecycleCoordinator, RegistrationPath};
pub use pool::{ConnectionPool, ConnectionPoolError, ConnectionPoolResult, PoolOperation};
pub use registrar::{ProviderToolRegistrar, RegistrarError, RegistrarResult, RegistrationOutcome};
pub use service::{ProviderToolService, ServiceStatus};

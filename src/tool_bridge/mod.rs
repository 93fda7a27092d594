//! Bridge exposing external tool providers as host-registered tools.
//!
//! Providers are connected once per process and their capabilities are
//! registered with every host registry instance that asks for them. The
//! module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

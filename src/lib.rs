//! mcp-bridge: expose external tool providers through a host tool registry.
//!
//! The bridge connects to configured providers over stdio or HTTP with
//! server-sent events, discovers their capabilities, and registers each one
//! with the host under a stable, collision-free name. Invocations are routed
//! back to the owning provider and their results normalized to a single text
//! block.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain**: Pure types with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for providers and the host
//! - **Adapters**: Concrete implementations of ports
//! - **Services**: Pool, coordinator, and registration orchestration
//!
//! # Modules
//!
//! - [`config`]: Bridge configuration and validation
//! - [`tool_bridge`]: Provider discovery, registration, and invocation

pub mod config;
pub mod tool_bridge;

//! Adapter implementations for the tool bridge ports.

pub mod memory;

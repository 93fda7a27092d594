//! In-memory adapters for the transport and host ports.

mod host;
mod transport;

pub use host::InMemoryToolHost;
pub use transport::{InMemoryProviderTransport, RecordedCall};

//! Outbound ports (application → infrastructure).

pub mod connection_port;

pub use connection_port::{TownConnectionPort, TransportError, TransportEvent};

#[cfg(any(test, feature = "testing"))]
pub use connection_port::MockTownConnectionPort;

//! Town Connection Port - the one wire the controllers talk through
//!
//! Outbound traffic goes through [`TownConnectionPort`]; inbound traffic
//! arrives as an ordered stream of [`TransportEvent`]s that the event loop
//! feeds into the town controller one at a time.

use thiserror::Error;
use townsync_shared::{ClientMessage, ServerMessage};

/// Errors raised while handing a message to the transport.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Connection is closed")]
    Closed,

    #[error("Failed to send message: {0}")]
    SendFailed(String),
}

/// Everything the transport can deliver to the town controller.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// A decoded server message
    Message(ServerMessage),
    /// The transport is gone; nothing else will arrive
    Closed { reason: Option<String> },
}

/// Port for sending messages to the town server
///
/// Implementations must be cheap to call from synchronous code: `send`
/// queues the message and returns without waiting for the network.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait TownConnectionPort: Send + Sync {
    /// Queue a message for the server
    fn send(&self, message: ClientMessage) -> Result<(), TransportError>;

    /// Close the connection; later sends fail with [`TransportError::Closed`]
    fn close(&self);
}

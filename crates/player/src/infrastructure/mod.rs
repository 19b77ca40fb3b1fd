//! Infrastructure: the command bus, the outbound connection and the
//! WebSocket transport.

pub mod messaging;
pub mod websocket;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use messaging::{ChannelConnection, CommandBus, CommandError};

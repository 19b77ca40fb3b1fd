//! Messaging infrastructure: the command bus and the channel connection.

mod command_bus;
mod connection;

pub use command_bus::{CommandBus, CommandError, PendingCommands, DEFAULT_COMMAND_TIMEOUT_MS};
pub use connection::{ChannelConnection, OutboundFrame};

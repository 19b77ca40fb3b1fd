//! WebSocket transport for the town connection.

mod bridge;
mod client;

pub use bridge::{create_connection, Connection};
pub use client::{run_socket, SocketEnd};

//! WebSocket bridge - wires a [`ChannelConnection`] to a live socket.
//!
//! `create_connection` hands back the port the controllers send through and
//! the stream of [`TransportEvent`]s for the event loop. The socket itself
//! runs on a background task; whatever way it ends, exactly one
//! `TransportEvent::Closed` is delivered last.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use url::Url;

use crate::infrastructure::messaging::ChannelConnection;
use crate::ports::outbound::TransportEvent;

use super::client::{run_socket, SocketEnd};

/// Everything needed to drive one town session over a WebSocket.
#[derive(Debug)]
pub struct Connection {
    pub port: Arc<ChannelConnection>,
    pub events: mpsc::UnboundedReceiver<TransportEvent>,
    pub task: JoinHandle<()>,
}

/// Start connecting to `url` in the background.
///
/// Must be called from within a tokio runtime.
pub fn create_connection(url: Url) -> Connection {
    let (port, outbound) = ChannelConnection::new();
    let (events_tx, events) = mpsc::unbounded_channel();

    let task = tokio::spawn(async move {
        let reason = match run_socket(&url, outbound, events_tx.clone()).await {
            Ok(end) => close_reason(end),
            Err(e) => {
                tracing::error!(error = %format!("{e:#}"), "Connection failed");
                Some(format!("{e:#}"))
            }
        };
        let _ = events_tx.send(TransportEvent::Closed { reason });
    });

    Connection {
        port: Arc::new(port),
        events,
        task,
    }
}

fn close_reason(end: SocketEnd) -> Option<String> {
    match end {
        SocketEnd::ClosedLocally => None,
        SocketEnd::ClosedByServer(reason) => reason,
        SocketEnd::Dropped => Some("connection dropped".to_string()),
    }
}

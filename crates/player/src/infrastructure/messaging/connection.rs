//! Channel-backed connection.
//!
//! [`ChannelConnection`] implements [`TownConnectionPort`] by queueing frames
//! on an unbounded channel. The WebSocket bridge drains the other end; tests
//! read it directly to see what the controllers sent.

use tokio::sync::mpsc;

use townsync_shared::ClientMessage;

use crate::ports::outbound::{TownConnectionPort, TransportError};

/// One item on the outbound queue.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundFrame {
    Message(ClientMessage),
    /// Close the socket after flushing earlier frames
    Close,
}

#[derive(Debug, Clone)]
pub struct ChannelConnection {
    tx: mpsc::UnboundedSender<OutboundFrame>,
}

impl ChannelConnection {
    /// Create a connection and the receiver its frames arrive on.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<OutboundFrame>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl TownConnectionPort for ChannelConnection {
    fn send(&self, message: ClientMessage) -> Result<(), TransportError> {
        self.tx
            .send(OutboundFrame::Message(message))
            .map_err(|_| TransportError::Closed)
    }

    fn close(&self) {
        // Already gone if the receiver dropped
        let _ = self.tx.send(OutboundFrame::Close);
    }
}

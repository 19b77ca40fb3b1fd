//! WebSocket transport using tokio-tungstenite

use anyhow::{Context, Result};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use url::Url;

use townsync_shared::parse_server_message;

use crate::infrastructure::messaging::OutboundFrame;
use crate::ports::outbound::TransportEvent;

/// Why the socket loop stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketEnd {
    /// We sent the close frame
    ClosedLocally,
    /// The server closed, with its reason if it gave one
    ClosedByServer(Option<String>),
    /// The read side ended without a close frame
    Dropped,
}

/// Connect to `url` and pump frames until either side closes.
///
/// Outbound frames are serialized as JSON text. Inbound text frames are
/// parsed into server messages and forwarded; frames that fail to parse are
/// logged and skipped.
pub async fn run_socket(
    url: &Url,
    mut outbound: mpsc::UnboundedReceiver<OutboundFrame>,
    events: mpsc::UnboundedSender<TransportEvent>,
) -> Result<SocketEnd> {
    let (ws_stream, _) = connect_async(url.as_str())
        .await
        .with_context(|| format!("Failed to connect to {url}"))?;
    tracing::info!(url = %url, "Connected to town server");

    let (mut write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            frame = outbound.recv() => {
                let Some(frame) = frame else {
                    // Every sender dropped; nobody can talk to us any more
                    let _ = write.send(Message::Close(None)).await;
                    return Ok(SocketEnd::ClosedLocally);
                };
                match frame {
                    OutboundFrame::Message(message) => {
                        let json = match serde_json::to_string(&message) {
                            Ok(json) => json,
                            Err(e) => {
                                tracing::error!(error = %e, "Failed to serialize client message");
                                continue;
                            }
                        };
                        write
                            .send(Message::Text(json))
                            .await
                            .context("Failed to send message")?;
                    }
                    OutboundFrame::Close => {
                        tracing::info!("Closing connection");
                        let _ = write.send(Message::Close(None)).await;
                        return Ok(SocketEnd::ClosedLocally);
                    }
                }
            }
            inbound = read.next() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => match parse_server_message(&text) {
                        Ok(message) => {
                            if events.send(TransportEvent::Message(message)).is_err() {
                                tracing::debug!("Event receiver dropped; stopping socket");
                                return Ok(SocketEnd::ClosedLocally);
                            }
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "Failed to parse server message");
                        }
                    },
                    Some(Ok(Message::Close(frame))) => {
                        let reason = frame
                            .map(|f| f.reason.to_string())
                            .filter(|r| !r.is_empty());
                        tracing::info!(reason = ?reason, "Server closed connection");
                        return Ok(SocketEnd::ClosedByServer(reason));
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        return Err(anyhow::Error::new(e).context("WebSocket error"));
                    }
                    None => return Ok(SocketEnd::Dropped),
                }
            }
        }
    }
}

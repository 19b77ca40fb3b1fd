//! Feeds transport events into the town controller, one at a time.

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

use super::TownController;
use crate::ports::outbound::TransportEvent;

/// Apply every transport event to `town` in arrival order.
///
/// The town lock is held for exactly one event, so an area update is fully
/// applied before the next event is looked at, and command or connect
/// futures awaited elsewhere keep making progress between events. The loop
/// ends after a `Closed` event; a dropped sender counts as one.
pub fn spawn_event_loop(
    town: Arc<Mutex<TownController>>,
    mut events: mpsc::UnboundedReceiver<TransportEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            let closed = matches!(event, TransportEvent::Closed { .. });
            town.lock().await.handle_transport_event(event);
            if closed {
                tracing::debug!("Town event loop finished");
                return;
            }
        }

        tracing::debug!("Transport event stream ended without a close");
        town.lock()
            .await
            .handle_transport_event(TransportEvent::Closed {
                reason: Some("event stream ended".into()),
            });
    })
}

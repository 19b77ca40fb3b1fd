//! Command Bus for sending messages to the town server.
//!
//! The CommandBus provides a unified interface for sending messages, supporting
//! both fire-and-forget sends and interactable commands that the server must
//! acknowledge. Commands are correlated with their `CommandResponse` through a
//! fresh [`CommandId`] and a pending table holding, per id, the completion
//! channel and the timer task that expires it.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;
use tokio::sync::oneshot;
use tokio::task::AbortHandle;

use townsync_domain::{CommandId, InteractableId};
use townsync_shared::{
    ClientMessage, CommandResponse, InteractableCommand, InteractableCommandEnvelope,
};

use crate::ports::outbound::{TownConnectionPort, TransportError};

/// Default time to wait for a command acknowledgement (5 seconds)
pub const DEFAULT_COMMAND_TIMEOUT_MS: u64 = 5_000;

/// Why a command did not produce a payload.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Timed out waiting for a response to command {command_id}")]
    Timeout { command_id: CommandId },

    /// The server answered with an error
    #[error("Command rejected: {0}")]
    Rejected(String),

    /// The pending entry was dropped (disconnect) before any response
    #[error("Command cancelled before a response arrived")]
    Cancelled,

    #[error("Failed to send command: {0}")]
    SendFailed(#[from] TransportError),

    #[error("Unexpected response payload: {0}")]
    InvalidPayload(String),
}

type Completion = oneshot::Sender<Result<Value, CommandError>>;

struct PendingCommand {
    completion: Completion,
    timer: Option<AbortHandle>,
}

/// Pending command tracker for request-response correlation
#[derive(Default)]
pub struct PendingCommands {
    inner: HashMap<CommandId, PendingCommand>,
}

impl PendingCommands {
    fn insert(&mut self, command_id: CommandId, completion: Completion) {
        self.inner.insert(
            command_id,
            PendingCommand {
                completion,
                timer: None,
            },
        );
    }

    /// Attach the expiry timer. Returns false if the command already settled.
    fn arm(&mut self, command_id: &CommandId, timer: AbortHandle) -> bool {
        match self.inner.get_mut(command_id) {
            Some(entry) => {
                entry.timer = Some(timer);
                true
            }
            None => false,
        }
    }

    /// Settle a pending command.
    ///
    /// Returns true if the command was found and resolved, false if no pending
    /// command exists for this ID (already timed out, or never ours).
    pub fn resolve(&mut self, command_id: &CommandId, result: Result<Value, CommandError>) -> bool {
        let Some(entry) = self.inner.remove(command_id) else {
            tracing::debug!(
                command_id = %command_id,
                "Response received for unknown command ID - command may have timed out"
            );
            return false;
        };
        if let Some(timer) = entry.timer {
            timer.abort();
        }
        let _ = entry.completion.send(result);
        true
    }

    pub fn remove(&mut self, command_id: &CommandId) -> bool {
        match self.inner.remove(command_id) {
            Some(entry) => {
                if let Some(timer) = entry.timer {
                    timer.abort();
                }
                true
            }
            None => false,
        }
    }

    /// Reject every pending command with [`CommandError::Cancelled`].
    pub fn cancel_all(&mut self) -> usize {
        let count = self.inner.len();
        for (_, entry) in self.inner.drain() {
            if let Some(timer) = entry.timer {
                timer.abort();
            }
            let _ = entry.completion.send(Err(CommandError::Cancelled));
        }
        count
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

fn lock(pending: &Mutex<PendingCommands>) -> MutexGuard<'_, PendingCommands> {
    pending.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Command bus for sending messages to the town server.
///
/// This is a concrete struct (not a trait) that can be cloned and shared.
/// Area controllers hold a clone and build their command futures from it.
#[derive(Clone)]
pub struct CommandBus {
    connection: Arc<dyn TownConnectionPort>,
    pending: Arc<Mutex<PendingCommands>>,
    timeout: Duration,
}

impl CommandBus {
    pub fn new(connection: Arc<dyn TownConnectionPort>, timeout: Duration) -> Self {
        Self {
            connection,
            pending: Arc::new(Mutex::new(PendingCommands::default())),
            timeout,
        }
    }

    /// Send a fire-and-forget message.
    pub fn send(&self, message: ClientMessage) -> Result<(), TransportError> {
        self.connection.send(message)
    }

    /// Send an interactable command and await its acknowledgement.
    ///
    /// The command is registered and handed to the transport before this
    /// returns; the returned future only waits. It resolves with the response
    /// payload (`Value::Null` when the server sent none), or fails with the
    /// server's error, a timeout, or a cancellation on disconnect.
    pub fn send_command(
        &self,
        interactable_id: InteractableId,
        command: InteractableCommand,
    ) -> impl Future<Output = Result<Value, CommandError>> + Send + 'static {
        let command_id = CommandId::new();
        let (completion, response) = oneshot::channel();
        let name = command.name();

        // Register before sending so a fast response cannot be missed
        lock(&self.pending).insert(command_id, completion);

        let sent = self
            .connection
            .send(ClientMessage::InteractableCommand(InteractableCommandEnvelope {
                command_id,
                interactable_id: interactable_id.clone(),
                command,
            }));

        match &sent {
            Ok(()) => {
                tracing::debug!(
                    command_id = %command_id,
                    area_id = %interactable_id,
                    command = name,
                    "Sent interactable command"
                );
                self.arm_timer(command_id);
            }
            Err(e) => {
                lock(&self.pending).remove(&command_id);
                tracing::warn!(
                    command_id = %command_id,
                    area_id = %interactable_id,
                    error = %e,
                    "Failed to send interactable command"
                );
            }
        }

        async move {
            sent?;
            response.await.unwrap_or(Err(CommandError::Cancelled))
        }
    }

    fn arm_timer(&self, command_id: CommandId) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(
                command_id = %command_id,
                "No tokio runtime; command will wait without a timeout"
            );
            return;
        };

        let pending = Arc::clone(&self.pending);
        let timeout = self.timeout;
        let task = runtime.spawn(async move {
            tokio::time::sleep(timeout).await;
            let expired = lock(&pending).resolve(&command_id, Err(CommandError::Timeout { command_id }));
            if expired {
                tracing::warn!(
                    command_id = %command_id,
                    timeout = ?timeout,
                    "Command timed out"
                );
            }
        });

        if !lock(&self.pending).arm(&command_id, task.abort_handle()) {
            task.abort();
        }
    }

    /// Dispatch an acknowledgement to the command waiting for it.
    ///
    /// Returns false for unknown or late responses, which are ignored.
    pub fn resolve(&self, response: CommandResponse) -> bool {
        let result = match response.error {
            Some(error) => Err(CommandError::Rejected(error)),
            None => Ok(response.payload.unwrap_or(Value::Null)),
        };
        lock(&self.pending).resolve(&response.command_id, result)
    }

    /// Reject every in-flight command; used when the session ends.
    pub fn cancel_all(&self) -> usize {
        let count = lock(&self.pending).cancel_all();
        if count > 0 {
            tracing::debug!(count, "Cancelled pending commands");
        }
        count
    }

    pub fn pending_count(&self) -> usize {
        lock(&self.pending).len()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl std::fmt::Debug for CommandBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandBus")
            .field("pending", &self.pending_count())
            .field("timeout", &self.timeout)
            .finish()
    }
}

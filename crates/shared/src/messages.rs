//! WebSocket message types for server-client communication
//!
//! Both directions are JSON objects discriminated by a `type` field.
//!
//! ## Versioning Policy
//!
//! - New variants can be added at the end (forward compatible)
//! - Renaming variants is a breaking change
//! - Unknown variants deserialize to `Unknown` so older clients keep working

use serde::{Deserialize, Serialize};
use serde_json::Value;

use townsync_domain::{
    ChatMessage, CommandId, ConnectFourMove, ConnectFourState, ConversationArea, GameArea,
    GameInstanceId, InteractableId, Player, PlayerId, PlayerLocation, TicTacToeMove,
    TicTacToeState, TownSettingsUpdate, ViewingArea,
};

// =============================================================================
// Interactable models
// =============================================================================

/// Authoritative snapshot of one interactable area, discriminated by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InteractableModel {
    ConversationArea(ConversationArea),
    ViewingArea(ViewingArea),
    ConnectFourArea(GameArea<ConnectFourState>),
    TicTacToeArea(GameArea<TicTacToeState>),
    /// Area kind this client does not know about
    #[serde(other)]
    Unknown,
}

impl InteractableModel {
    pub fn id(&self) -> Option<&InteractableId> {
        match self {
            InteractableModel::ConversationArea(area) => Some(&area.id),
            InteractableModel::ViewingArea(area) => Some(&area.id),
            InteractableModel::ConnectFourArea(area) => Some(&area.id),
            InteractableModel::TicTacToeArea(area) => Some(&area.id),
            InteractableModel::Unknown => None,
        }
    }

    pub fn occupants(&self) -> &[PlayerId] {
        match self {
            InteractableModel::ConversationArea(area) => &area.occupants,
            InteractableModel::ViewingArea(area) => &area.occupants,
            InteractableModel::ConnectFourArea(area) => &area.occupants,
            InteractableModel::TicTacToeArea(area) => &area.occupants,
            InteractableModel::Unknown => &[],
        }
    }

    /// Kind tag as it appears on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            InteractableModel::ConversationArea(_) => "ConversationArea",
            InteractableModel::ViewingArea(_) => "ViewingArea",
            InteractableModel::ConnectFourArea(_) => "ConnectFourArea",
            InteractableModel::TicTacToeArea(_) => "TicTacToeArea",
            InteractableModel::Unknown => "Unknown",
        }
    }
}

// =============================================================================
// Interactable commands
// =============================================================================

/// A move in whichever game the target area hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GameMovePayload {
    ConnectFour(ConnectFourMove),
    TicTacToe(TicTacToeMove),
}

/// Actions on an interactable area that the server must confirm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InteractableCommand {
    JoinGame,
    LeaveGame {
        game_id: GameInstanceId,
    },
    StartGame {
        game_id: GameInstanceId,
    },
    GameMove {
        game_id: GameInstanceId,
        #[serde(rename = "move")]
        game_move: GameMovePayload,
    },
}

impl InteractableCommand {
    pub fn name(&self) -> &'static str {
        match self {
            InteractableCommand::JoinGame => "JoinGame",
            InteractableCommand::LeaveGame { .. } => "LeaveGame",
            InteractableCommand::StartGame { .. } => "StartGame",
            InteractableCommand::GameMove { .. } => "GameMove",
        }
    }
}

/// An outgoing command stamped with its correlation id and target area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractableCommandEnvelope {
    pub command_id: CommandId,
    pub interactable_id: InteractableId,
    pub command: InteractableCommand,
}

/// Acknowledgement for one command, echoed with the same correlation id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandResponse {
    pub command_id: CommandId,
    pub interactable_id: InteractableId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Payload of a successful `JoinGame` acknowledgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinGameResponse {
    pub game_id: GameInstanceId,
}

// =============================================================================
// Session snapshot
// =============================================================================

/// Everything a client needs to start mirroring a town.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TownJoinResponse {
    /// The id the server assigned to this client's player
    pub user_id: PlayerId,
    pub session_token: String,
    pub provider_video_token: String,
    pub current_players: Vec<Player>,
    pub friendly_name: String,
    pub is_publicly_listed: bool,
    pub interactables: Vec<InteractableModel>,
}

// =============================================================================
// Client Messages (client → server)
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Our player moved
    PlayerMovement { location: PlayerLocation },
    /// Chat line authored by our player
    ChatMessage { message: ChatMessage },
    /// Locally edited area state to make authoritative (viewing areas)
    InteractableUpdate { interactable: InteractableModel },
    /// Command awaiting a `CommandResponse`
    InteractableCommand(InteractableCommandEnvelope),
}

// =============================================================================
// Server Messages (server → client)
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Full snapshot sent once after the connection is accepted
    Initialize(TownJoinResponse),
    /// The town is shutting down
    TownClosing,
    TownSettingsUpdated(TownSettingsUpdate),
    PlayerJoined { player: Player },
    PlayerDisconnect { player: Player },
    PlayerMoved { player: Player },
    ChatMessage { message: ChatMessage },
    InteractableUpdate { interactable: InteractableModel },
    CommandResponse(CommandResponse),

    /// Unknown message type for forward compatibility
    #[serde(other)]
    Unknown,
}

/// Parse one text frame from the server.
pub fn parse_server_message(text: &str) -> Result<ServerMessage, serde_json::Error> {
    serde_json::from_str(text)
}

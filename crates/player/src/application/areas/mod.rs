//! Interactable area controllers
//!
//! Each area kind has one controller type implementing
//! [`InteractableAreaController`]. Controllers compose an [`OccupantSet`],
//! own their derived state, and publish typed events through their own
//! emitter. The town controller holds them in [`AreaController`] and only
//! ever mutates them through `update_from`.

pub mod connect_four;
pub mod conversation;
pub mod game;
pub mod occupants;
pub mod tic_tac_toe;
pub mod viewing;

use thiserror::Error;

use townsync_domain::{DomainError, InteractableId, Player, PlayerId};
use townsync_shared::InteractableModel;

use crate::application::town::PlayerRoster;
use crate::infrastructure::messaging::CommandBus;

pub use connect_four::{ConnectFour, ConnectFourAreaController};
pub use conversation::{
    ConversationAreaController, ConversationAreaEvent, ConversationAreaEventKind, NO_TOPIC,
};
pub use game::{GameAreaController, GameAreaEvent, GameAreaEventKind, GameError, GameRules};
pub use occupants::OccupantSet;
pub use tic_tac_toe::{TicTacToe, TicTacToeAreaController};
pub use viewing::{ViewingAreaController, ViewingAreaEvent, ViewingAreaEventKind};

/// Failure while applying one area update. Logged by the town controller,
/// never propagated further.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AreaUpdateError {
    #[error("Area {area_id} is a {expected} but the update is a {actual}")]
    KindMismatch {
        area_id: InteractableId,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Game in area {area_id} seats unknown player {player_id}")]
    UnknownPlayer {
        area_id: InteractableId,
        player_id: PlayerId,
    },

    #[error("Invalid board in area {area_id}: {source}")]
    InvalidBoard {
        area_id: InteractableId,
        #[source]
        source: DomainError,
    },
}

/// Contract shared by every area kind.
pub trait InteractableAreaController {
    /// The wire model this controller mirrors
    type Model;

    fn id(&self) -> &InteractableId;

    fn occupants(&self) -> &[Player];

    fn is_empty(&self) -> bool {
        self.occupants().is_empty()
    }

    /// Whether consumers should currently show this area.
    fn is_active(&self) -> bool;

    fn friendly_name(&self) -> String;

    /// Replace the occupant snapshot, emitting on a membership change.
    fn set_occupants(&mut self, occupants: Vec<Player>);

    /// Kind-specific half of [`update_from`](Self::update_from).
    fn apply_model(&mut self, model: Self::Model, roster: &PlayerRoster)
        -> Result<(), AreaUpdateError>;

    /// Apply an authoritative update: occupants first, then the model.
    fn update_from(
        &mut self,
        model: Self::Model,
        occupants: Vec<Player>,
        roster: &PlayerRoster,
    ) -> Result<(), AreaUpdateError> {
        self.set_occupants(occupants);
        self.apply_model(model, roster)
    }
}

/// One controller per known area, tagged by kind.
#[derive(Debug)]
pub enum AreaController {
    Conversation(ConversationAreaController),
    Viewing(ViewingAreaController),
    ConnectFour(ConnectFourAreaController),
    TicTacToe(TicTacToeAreaController),
}

impl AreaController {
    /// A blank controller of the model's kind; `None` for unknown kinds.
    ///
    /// The caller follows up with `update_from` to load the model.
    pub fn create(
        model: &InteractableModel,
        our_player: PlayerId,
        commands: &CommandBus,
    ) -> Option<Self> {
        let id = model.id()?.clone();
        let controller = match model {
            InteractableModel::ConversationArea(_) => {
                AreaController::Conversation(ConversationAreaController::new(id))
            }
            InteractableModel::ViewingArea(_) => {
                AreaController::Viewing(ViewingAreaController::new(id))
            }
            InteractableModel::ConnectFourArea(_) => AreaController::ConnectFour(
                GameAreaController::new(id, our_player, commands.clone()),
            ),
            InteractableModel::TicTacToeArea(_) => AreaController::TicTacToe(
                GameAreaController::new(id, our_player, commands.clone()),
            ),
            InteractableModel::Unknown => return None,
        };
        Some(controller)
    }

    /// Route an update to the matching controller.
    pub fn update_from(
        &mut self,
        model: InteractableModel,
        occupants: Vec<Player>,
        roster: &PlayerRoster,
    ) -> Result<(), AreaUpdateError> {
        match (self, model) {
            (AreaController::Conversation(area), InteractableModel::ConversationArea(model)) => {
                area.update_from(model, occupants, roster)
            }
            (AreaController::Viewing(area), InteractableModel::ViewingArea(model)) => {
                area.update_from(model, occupants, roster)
            }
            (AreaController::ConnectFour(area), InteractableModel::ConnectFourArea(model)) => {
                area.update_from(model, occupants, roster)
            }
            (AreaController::TicTacToe(area), InteractableModel::TicTacToeArea(model)) => {
                area.update_from(model, occupants, roster)
            }
            (area, model) => Err(AreaUpdateError::KindMismatch {
                area_id: area.id().clone(),
                expected: area.kind(),
                actual: model.kind(),
            }),
        }
    }

    /// Kind tag, spelled as on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            AreaController::Conversation(_) => "ConversationArea",
            AreaController::Viewing(_) => "ViewingArea",
            AreaController::ConnectFour(_) => "ConnectFourArea",
            AreaController::TicTacToe(_) => "TicTacToeArea",
        }
    }

    pub fn id(&self) -> &InteractableId {
        match self {
            AreaController::Conversation(area) => area.id(),
            AreaController::Viewing(area) => area.id(),
            AreaController::ConnectFour(area) => area.id(),
            AreaController::TicTacToe(area) => area.id(),
        }
    }

    pub fn occupants(&self) -> &[Player] {
        match self {
            AreaController::Conversation(area) => area.occupants(),
            AreaController::Viewing(area) => area.occupants(),
            AreaController::ConnectFour(area) => area.occupants(),
            AreaController::TicTacToe(area) => area.occupants(),
        }
    }

    pub fn is_active(&self) -> bool {
        match self {
            AreaController::Conversation(area) => area.is_active(),
            AreaController::Viewing(area) => area.is_active(),
            AreaController::ConnectFour(area) => area.is_active(),
            AreaController::TicTacToe(area) => area.is_active(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            AreaController::Conversation(area) => area.is_empty(),
            AreaController::Viewing(area) => area.is_empty(),
            AreaController::ConnectFour(area) => area.is_empty(),
            AreaController::TicTacToe(area) => area.is_empty(),
        }
    }

    pub fn friendly_name(&self) -> String {
        match self {
            AreaController::Conversation(area) => area.friendly_name(),
            AreaController::Viewing(area) => area.friendly_name(),
            AreaController::ConnectFour(area) => area.friendly_name(),
            AreaController::TicTacToe(area) => area.friendly_name(),
        }
    }

    pub fn as_conversation(&self) -> Option<&ConversationAreaController> {
        match self {
            AreaController::Conversation(area) => Some(area),
            _ => None,
        }
    }

    pub fn as_conversation_mut(&mut self) -> Option<&mut ConversationAreaController> {
        match self {
            AreaController::Conversation(area) => Some(area),
            _ => None,
        }
    }

    pub fn as_viewing(&self) -> Option<&ViewingAreaController> {
        match self {
            AreaController::Viewing(area) => Some(area),
            _ => None,
        }
    }

    pub fn as_viewing_mut(&mut self) -> Option<&mut ViewingAreaController> {
        match self {
            AreaController::Viewing(area) => Some(area),
            _ => None,
        }
    }

    pub fn as_connect_four(&self) -> Option<&ConnectFourAreaController> {
        match self {
            AreaController::ConnectFour(area) => Some(area),
            _ => None,
        }
    }

    pub fn as_connect_four_mut(&mut self) -> Option<&mut ConnectFourAreaController> {
        match self {
            AreaController::ConnectFour(area) => Some(area),
            _ => None,
        }
    }

    pub fn as_tic_tac_toe(&self) -> Option<&TicTacToeAreaController> {
        match self {
            AreaController::TicTacToe(area) => Some(area),
            _ => None,
        }
    }

    pub fn as_tic_tac_toe_mut(&mut self) -> Option<&mut TicTacToeAreaController> {
        match self {
            AreaController::TicTacToe(area) => Some(area),
            _ => None,
        }
    }
}

//! Town-level notifications.

use townsync_domain::{ChatMessage, Player};

use crate::application::events::Notification;

#[derive(Debug, Clone, PartialEq)]
pub enum TownEvent {
    /// Someone joined or left; carries the whole new roster
    PlayersChanged(Vec<Player>),
    PlayerMoved(Player),
    TownSettingsUpdated {
        friendly_name: String,
        is_publicly_listed: bool,
    },
    /// The session ended (server closing, transport loss or local disconnect)
    Disconnect { reason: Option<String> },
    ChatMessage(ChatMessage),
    /// An area appeared or flipped between active and inactive
    InteractableAreasChanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TownEventKind {
    PlayersChanged,
    PlayerMoved,
    TownSettingsUpdated,
    Disconnect,
    ChatMessage,
    InteractableAreasChanged,
}

impl Notification for TownEvent {
    type Kind = TownEventKind;

    fn kind(&self) -> TownEventKind {
        match self {
            TownEvent::PlayersChanged(_) => TownEventKind::PlayersChanged,
            TownEvent::PlayerMoved(_) => TownEventKind::PlayerMoved,
            TownEvent::TownSettingsUpdated { .. } => TownEventKind::TownSettingsUpdated,
            TownEvent::Disconnect { .. } => TownEventKind::Disconnect,
            TownEvent::ChatMessage(_) => TownEventKind::ChatMessage,
            TownEvent::InteractableAreasChanged => TownEventKind::InteractableAreasChanged,
        }
    }
}

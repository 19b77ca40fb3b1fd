//! Players and their positions in the town.

use serde::{Deserialize, Serialize};

use crate::ids::{InteractableId, PlayerId};

/// Which way a player's avatar is facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Front,
    Back,
    Left,
    Right,
}

/// Position, facing and current area of a player.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlayerLocation {
    pub x: f64,
    pub y: f64,
    pub rotation: Direction,
    pub moving: bool,
    /// The interactable area the server has placed this player in, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interactable_id: Option<InteractableId>,
}

/// A participant in the town.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub user_name: String,
    #[serde(default)]
    pub location: PlayerLocation,
}

impl Player {
    pub fn new(id: PlayerId, user_name: impl Into<String>) -> Self {
        Self {
            id,
            user_name: user_name.into(),
            location: PlayerLocation::default(),
        }
    }

    /// Builder-style helper for placing a player at a position.
    pub fn with_location(mut self, location: PlayerLocation) -> Self {
        self.location = location;
        self
    }
}

//! Interactable areas: typed sub-regions of a town with their own occupants.

use serde::{Deserialize, Serialize};

use crate::game::{GameInstance, GameResult};
use crate::ids::{InteractableId, PlayerId};

/// A spot where occupants chat about a shared topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationArea {
    pub id: InteractableId,
    #[serde(default)]
    pub occupants: Vec<PlayerId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
}

/// A spot where occupants watch the same video in sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewingArea {
    pub id: InteractableId,
    #[serde(default)]
    pub occupants: Vec<PlayerId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,
    #[serde(default)]
    pub elapsed_time_sec: f64,
    #[serde(default)]
    pub is_playing: bool,
}

/// A spot hosting at most one game instance at a time, plus past results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameArea<S> {
    pub id: InteractableId,
    #[serde(default)]
    pub occupants: Vec<PlayerId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game: Option<GameInstance<S>>,
    #[serde(default)]
    pub history: Vec<GameResult>,
}

impl<S> GameArea<S> {
    /// An area with nobody in it and no game.
    pub fn vacant(id: InteractableId) -> Self {
        Self {
            id,
            occupants: Vec::new(),
            game: None,
            history: Vec::new(),
        }
    }
}

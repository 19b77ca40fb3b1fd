//! Game instances hosted by game areas.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ids::{GameInstanceId, PlayerId};

/// Lifecycle of one game instance.
///
/// Status only moves forward for a given instance id; a new instance id
/// starts over at the beginning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameStatus {
    #[default]
    WaitingForPlayers,
    WaitingToStart,
    InProgress,
    Over,
}

impl GameStatus {
    /// Position in the lifecycle, for detecting regressions.
    pub fn stage(self) -> u8 {
        match self {
            GameStatus::WaitingForPlayers => 0,
            GameStatus::WaitingToStart => 1,
            GameStatus::InProgress => 2,
            GameStatus::Over => 3,
        }
    }

    pub fn is_in_progress(self) -> bool {
        self == GameStatus::InProgress
    }
}

/// State common to every game; game-specific states add seats and moves.
pub trait GameState {
    type Move;

    fn status(&self) -> GameStatus;
    fn moves(&self) -> &[Self::Move];
    fn winner(&self) -> Option<PlayerId>;

    fn move_count(&self) -> usize {
        self.moves().len()
    }
}

/// Outcome of a finished game, keyed by player name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    pub game_id: GameInstanceId,
    pub scores: HashMap<String, u32>,
}

/// One play-through of a game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameInstance<S> {
    pub id: GameInstanceId,
    #[serde(default)]
    pub players: Vec<PlayerId>,
    pub state: S,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<GameResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_stages_are_ordered() {
        assert!(GameStatus::WaitingForPlayers.stage() < GameStatus::WaitingToStart.stage());
        assert!(GameStatus::WaitingToStart.stage() < GameStatus::InProgress.stage());
        assert!(GameStatus::InProgress.stage() < GameStatus::Over.stage());
    }

    #[test]
    fn status_uses_screaming_case_on_the_wire() {
        let json = serde_json::to_string(&GameStatus::InProgress).expect("serialize");
        assert_eq!(json, "\"IN_PROGRESS\"");
    }
}

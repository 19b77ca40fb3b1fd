//! Connect Four: a 6x7 board where pieces drop to the lowest free row.

use serde::{Deserialize, Serialize};

use crate::board::{Board, PlacedMove};
use crate::game::{GameState, GameStatus};
use crate::ids::PlayerId;

pub const CONNECT_FOUR_ROWS: usize = 6;
pub const CONNECT_FOUR_COLS: usize = 7;

pub type ConnectFourBoard = Board<ConnectFourColor, CONNECT_FOUR_ROWS, CONNECT_FOUR_COLS>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ConnectFourColor {
    #[default]
    Red,
    Yellow,
}

impl ConnectFourColor {
    pub fn other(self) -> Self {
        match self {
            ConnectFourColor::Red => ConnectFourColor::Yellow,
            ConnectFourColor::Yellow => ConnectFourColor::Red,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectFourMove {
    pub game_piece: ConnectFourColor,
    pub row: u8,
    pub col: u8,
}

impl PlacedMove for ConnectFourMove {
    type Piece = ConnectFourColor;

    fn row(&self) -> usize {
        usize::from(self.row)
    }

    fn col(&self) -> usize {
        usize::from(self.col)
    }

    fn piece(&self) -> ConnectFourColor {
        self.game_piece
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConnectFourState {
    pub status: GameStatus,
    #[serde(default)]
    pub moves: Vec<ConnectFourMove>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<PlayerId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub red: Option<PlayerId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yellow: Option<PlayerId>,
    #[serde(default)]
    pub red_ready: bool,
    #[serde(default)]
    pub yellow_ready: bool,
    /// Color that moved (or will move) first in this instance
    #[serde(default)]
    pub first_player: ConnectFourColor,
}

impl ConnectFourState {
    pub fn seat(&self, color: ConnectFourColor) -> Option<PlayerId> {
        match color {
            ConnectFourColor::Red => self.red,
            ConnectFourColor::Yellow => self.yellow,
        }
    }

    pub fn color_of(&self, player: PlayerId) -> Option<ConnectFourColor> {
        if self.red == Some(player) {
            Some(ConnectFourColor::Red)
        } else if self.yellow == Some(player) {
            Some(ConnectFourColor::Yellow)
        } else {
            None
        }
    }
}

impl GameState for ConnectFourState {
    type Move = ConnectFourMove;

    fn status(&self) -> GameStatus {
        self.status
    }

    fn moves(&self) -> &[ConnectFourMove] {
        &self.moves
    }

    fn winner(&self) -> Option<PlayerId> {
        self.winner
    }
}

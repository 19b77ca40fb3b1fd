//! Tic-Tac-Toe: a 3x3 board, X always moves first.

use serde::{Deserialize, Serialize};

use crate::board::{Board, PlacedMove};
use crate::game::{GameState, GameStatus};
use crate::ids::PlayerId;

pub const TIC_TAC_TOE_SIZE: usize = 3;

pub type TicTacToeBoard = Board<TicTacToePiece, TIC_TAC_TOE_SIZE, TIC_TAC_TOE_SIZE>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TicTacToePiece {
    X,
    O,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicTacToeMove {
    pub game_piece: TicTacToePiece,
    pub row: u8,
    pub col: u8,
}

impl PlacedMove for TicTacToeMove {
    type Piece = TicTacToePiece;

    fn row(&self) -> usize {
        usize::from(self.row)
    }

    fn col(&self) -> usize {
        usize::from(self.col)
    }

    fn piece(&self) -> TicTacToePiece {
        self.game_piece
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TicTacToeState {
    pub status: GameStatus,
    #[serde(default)]
    pub moves: Vec<TicTacToeMove>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<PlayerId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<PlayerId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub o: Option<PlayerId>,
}

impl TicTacToeState {
    pub fn seat(&self, piece: TicTacToePiece) -> Option<PlayerId> {
        match piece {
            TicTacToePiece::X => self.x,
            TicTacToePiece::O => self.o,
        }
    }

    pub fn piece_of(&self, player: PlayerId) -> Option<TicTacToePiece> {
        if self.x == Some(player) {
            Some(TicTacToePiece::X)
        } else if self.o == Some(player) {
            Some(TicTacToePiece::O)
        } else {
            None
        }
    }
}

impl GameState for TicTacToeState {
    type Move = TicTacToeMove;

    fn status(&self) -> GameStatus {
        self.status
    }

    fn moves(&self) -> &[TicTacToeMove] {
        &self.moves
    }

    fn winner(&self) -> Option<PlayerId> {
        self.winner
    }
}

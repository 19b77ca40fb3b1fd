//! Tic-Tac-Toe rules: X always moves first, then X and O alternate.

use std::future::Future;

use townsync_domain::{
    DomainError, GameStatus, Player, PlayerId, TicTacToeBoard, TicTacToeMove, TicTacToePiece,
    TicTacToeState, TIC_TAC_TOE_SIZE,
};
use townsync_shared::GameMovePayload;

use super::game::{GameAreaController, GameError, GameRules};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TicTacToe;

pub type TicTacToeAreaController = GameAreaController<TicTacToe>;

impl GameRules for TicTacToe {
    type State = TicTacToeState;
    type Board = TicTacToeBoard;

    fn empty_board() -> TicTacToeBoard {
        TicTacToeBoard::empty()
    }

    fn build_board(state: &TicTacToeState) -> Result<TicTacToeBoard, DomainError> {
        TicTacToeBoard::from_moves(&state.moves)
    }

    fn whose_turn(state: &TicTacToeState) -> Option<PlayerId> {
        if state.status != GameStatus::InProgress {
            return None;
        }
        if state.moves.len() % 2 == 0 {
            state.x
        } else {
            state.o
        }
    }

    fn is_active(status: GameStatus, _is_empty: bool) -> bool {
        status == GameStatus::InProgress
    }
}

impl GameAreaController<TicTacToe> {
    fn seat_player(&self, piece: TicTacToePiece) -> Option<&Player> {
        let id = self.state()?.seat(piece)?;
        self.players().iter().find(|p| p.id == id)
    }

    pub fn x(&self) -> Option<&Player> {
        self.seat_player(TicTacToePiece::X)
    }

    pub fn o(&self) -> Option<&Player> {
        self.seat_player(TicTacToePiece::O)
    }

    pub fn game_piece(&self) -> Result<TicTacToePiece, GameError> {
        self.state()
            .and_then(|s| s.piece_of(self.our_player()))
            .ok_or(GameError::NotInGame)
    }

    /// Place our piece at (`row`, `col`). Occupancy is left to the server.
    pub fn make_move(
        &self,
        row: u8,
        col: u8,
    ) -> Result<impl Future<Output = Result<(), GameError>> + Send + 'static, GameError> {
        let game_id = self.game_in_progress()?;
        let game_piece = self.game_piece()?;
        if usize::from(row) >= TIC_TAC_TOE_SIZE || usize::from(col) >= TIC_TAC_TOE_SIZE {
            return Err(GameError::InvalidCoordinate);
        }

        Ok(self.send_move(
            game_id,
            GameMovePayload::TicTacToe(TicTacToeMove {
                game_piece,
                row,
                col,
            }),
        ))
    }
}

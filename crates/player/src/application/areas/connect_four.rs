//! Connect Four rules: Red and Yellow alternate from a recorded first seat,
//! and pieces drop to the lowest free row of a column.

use std::future::Future;

use townsync_domain::{
    ConnectFourBoard, ConnectFourColor, ConnectFourMove, ConnectFourState, DomainError,
    GameStatus, Player, PlayerId, CONNECT_FOUR_COLS, CONNECT_FOUR_ROWS,
};
use townsync_shared::GameMovePayload;

use super::game::{GameAreaController, GameError, GameRules};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConnectFour;

pub type ConnectFourAreaController = GameAreaController<ConnectFour>;

impl GameRules for ConnectFour {
    type State = ConnectFourState;
    type Board = ConnectFourBoard;

    fn empty_board() -> ConnectFourBoard {
        ConnectFourBoard::empty()
    }

    fn build_board(state: &ConnectFourState) -> Result<ConnectFourBoard, DomainError> {
        ConnectFourBoard::from_moves(&state.moves)
    }

    fn whose_turn(state: &ConnectFourState) -> Option<PlayerId> {
        let (Some(_), Some(_)) = (state.red, state.yellow) else {
            return None;
        };
        if state.status != GameStatus::InProgress {
            return None;
        }
        let to_move = if state.moves.len() % 2 == 0 {
            state.first_player
        } else {
            state.first_player.other()
        };
        state.seat(to_move)
    }

    fn is_active(status: GameStatus, is_empty: bool) -> bool {
        !is_empty && status != GameStatus::Over && status != GameStatus::WaitingForPlayers
    }
}

impl GameAreaController<ConnectFour> {
    fn seat_player(&self, color: ConnectFourColor) -> Option<&Player> {
        let id = self.state()?.seat(color)?;
        self.players().iter().find(|p| p.id == id)
    }

    pub fn red(&self) -> Option<&Player> {
        self.seat_player(ConnectFourColor::Red)
    }

    pub fn yellow(&self) -> Option<&Player> {
        self.seat_player(ConnectFourColor::Yellow)
    }

    /// Color that moves first in the current instance.
    pub fn first_player(&self) -> ConnectFourColor {
        self.state().map_or(ConnectFourColor::Red, |s| s.first_player)
    }

    /// Our color, or `NotInGame` if we hold no seat.
    pub fn game_piece(&self) -> Result<ConnectFourColor, GameError> {
        self.state()
            .and_then(|s| s.color_of(self.our_player()))
            .ok_or(GameError::NotInGame)
    }

    /// Whether the seat of `color` has pressed start.
    pub fn is_ready(&self, color: ConnectFourColor) -> bool {
        self.state().is_some_and(|s| match color {
            ConnectFourColor::Red => s.red_ready,
            ConnectFourColor::Yellow => s.yellow_ready,
        })
    }

    /// Lowest free row in `column` on the current board.
    pub fn landing_row(&self, column: u8) -> Option<u8> {
        let col = usize::from(column);
        if col >= CONNECT_FOUR_COLS {
            return None;
        }
        (0..CONNECT_FOUR_ROWS)
            .rev()
            .find(|&row| !self.board().is_occupied(row, col))
            .and_then(|row| u8::try_from(row).ok())
    }

    /// Drop our piece into `column`.
    ///
    /// The target row is found locally, so a full column fails with
    /// `ColumnFull` without sending anything. The server still has the final
    /// say over whether the move is legal.
    pub fn make_move(
        &self,
        column: u8,
    ) -> Result<impl Future<Output = Result<(), GameError>> + Send + 'static, GameError> {
        let game_id = self.game_in_progress()?;
        let game_piece = self.game_piece()?;
        if usize::from(column) >= CONNECT_FOUR_COLS {
            return Err(GameError::InvalidCoordinate);
        }
        let row = self
            .landing_row(column)
            .ok_or(GameError::ColumnFull { column })?;

        Ok(self.send_move(
            game_id,
            GameMovePayload::ConnectFour(ConnectFourMove {
                game_piece,
                row,
                col: column,
            }),
        ))
    }
}

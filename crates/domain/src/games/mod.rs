//! Concrete turn-based games.

pub mod connect_four;
pub mod tic_tac_toe;

pub use connect_four::{
    ConnectFourBoard, ConnectFourColor, ConnectFourMove, ConnectFourState, CONNECT_FOUR_COLS,
    CONNECT_FOUR_ROWS,
};
pub use tic_tac_toe::{
    TicTacToeBoard, TicTacToeMove, TicTacToePiece, TicTacToeState, TIC_TAC_TOE_SIZE,
};

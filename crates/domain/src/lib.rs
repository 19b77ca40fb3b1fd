//! townsync Domain - the vocabulary shared by the protocol and the client.
//!
//! Pure data plus the few pure functions (board folds, seat lookups) that
//! every client must compute identically.

pub mod board;
pub mod chat;
pub mod error;
pub mod game;
pub mod games;
pub mod ids;
pub mod interactable;
pub mod player;
pub mod town;

pub use board::{Board, PlacedMove};
pub use chat::ChatMessage;
pub use error::DomainError;
pub use game::{GameInstance, GameResult, GameState, GameStatus};
pub use games::{
    ConnectFourBoard, ConnectFourColor, ConnectFourMove, ConnectFourState, TicTacToeBoard,
    TicTacToeMove, TicTacToePiece, TicTacToeState, CONNECT_FOUR_COLS, CONNECT_FOUR_ROWS,
    TIC_TAC_TOE_SIZE,
};
pub use ids::{CommandId, GameInstanceId, InteractableId, PlayerId, TownId};
pub use interactable::{ConversationArea, GameArea, ViewingArea};
pub use player::{Direction, Player, PlayerLocation};
pub use town::TownSettingsUpdate;

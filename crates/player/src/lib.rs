//! townsync Player - client-side mirror of a shared town.
//!
//! The [`TownController`] applies the server's authoritative updates to a
//! local model and publishes change events; area controllers do the same for
//! each conversation, viewing and game area. Game commands are correlated
//! with their acknowledgements by the [`CommandBus`].

pub mod application;
pub mod config;
pub mod infrastructure;
pub mod ports;

pub use application::areas::{
    AreaController, ConnectFourAreaController, ConversationAreaController, GameError,
    InteractableAreaController, TicTacToeAreaController, ViewingAreaController,
};
pub use application::events::{EventEmitter, Notification, SubscriptionToken};
pub use application::town::{
    spawn_event_loop, ConnectError, TownController, TownError, TownEvent, TownEventKind,
};
pub use config::{ClientConfig, ConfigError};
pub use infrastructure::messaging::{CommandBus, CommandError};
pub use infrastructure::websocket::{create_connection, Connection};

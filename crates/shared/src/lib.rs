//! townsync Shared - wire types exchanged between the town server and clients
//!
//! # Design Principles
//!
//! 1. **Minimal dependencies** - only serde, serde_json and the domain crate
//! 2. **No business logic** - pure data and serialization
//! 3. **Forward compatible** - unknown message and area kinds deserialize to `Unknown`

pub mod messages;

pub use messages::{
    parse_server_message, ClientMessage, CommandResponse, GameMovePayload, InteractableCommand,
    InteractableCommandEnvelope, InteractableModel, JoinGameResponse, ServerMessage,
    TownJoinResponse,
};

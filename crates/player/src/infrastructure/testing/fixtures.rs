//! Builders for the models tests keep needing.

use url::Url;

use townsync_domain::{
    ConnectFourState, ConversationArea, GameArea, GameInstance, GameInstanceId, InteractableId,
    Player, PlayerId, TicTacToeState, TownId,
};
use townsync_shared::{InteractableModel, TownJoinResponse};

use crate::config::ClientConfig;

pub fn player(user_name: &str) -> Player {
    Player::new(PlayerId::new(), user_name)
}

pub fn test_config() -> ClientConfig {
    let url = Url::parse("ws://localhost:8081/town").expect("valid fixture url");
    ClientConfig::new(url, TownId::from("test-town"), "tester")
}

pub fn conversation_area(id: &str, topic: Option<&str>, occupants: &[PlayerId]) -> ConversationArea {
    ConversationArea {
        id: InteractableId::from(id),
        occupants: occupants.to_vec(),
        topic: topic.map(str::to_string),
    }
}

fn game_area<S>(id: &str, game_id: GameInstanceId, players: Vec<PlayerId>, state: S) -> GameArea<S> {
    GameArea {
        id: InteractableId::from(id),
        occupants: players.clone(),
        game: Some(GameInstance {
            id: game_id,
            players,
            state,
            result: None,
        }),
        history: Vec::new(),
    }
}

/// A Connect Four area whose occupants are exactly `players`.
pub fn connect_four_area(
    id: &str,
    game_id: GameInstanceId,
    players: Vec<PlayerId>,
    state: ConnectFourState,
) -> GameArea<ConnectFourState> {
    game_area(id, game_id, players, state)
}

pub fn tic_tac_toe_area(
    id: &str,
    game_id: GameInstanceId,
    players: Vec<PlayerId>,
    state: TicTacToeState,
) -> GameArea<TicTacToeState> {
    game_area(id, game_id, players, state)
}

/// Initial snapshot for `user_id` named "Test Town", not publicly listed.
pub fn town_join_response(
    user_id: PlayerId,
    current_players: Vec<Player>,
    interactables: Vec<InteractableModel>,
) -> TownJoinResponse {
    TownJoinResponse {
        user_id,
        session_token: "session-token".to_string(),
        provider_video_token: "video-token".to_string(),
        current_players,
        friendly_name: "Test Town".to_string(),
        is_publicly_listed: false,
        interactables,
    }
}

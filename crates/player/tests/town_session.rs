//! End-to-end session tests against a scripted in-process WebSocket server.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, Mutex};
use tokio_tungstenite::{accept_async, tungstenite::Message, WebSocketStream};
use url::Url;

use townsync_domain::{
    ConnectFourState, GameArea, GameInstance, GameInstanceId, GameStatus, InteractableId, Player,
    PlayerId, TownId,
};
use townsync_player::application::areas::GameAreaEventKind;
use townsync_player::{
    create_connection, spawn_event_loop, ClientConfig, ConnectError, TownController,
};
use townsync_shared::{
    ClientMessage, CommandResponse, InteractableCommand, InteractableModel, ServerMessage,
    TownJoinResponse,
};

type ServerSocket = WebSocketStream<TcpStream>;

/// Accept one client and run `script` against it.
async fn serve_once<F, Fut>(script: F) -> Url
where
    F: FnOnce(ServerSocket) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept");
        let ws = accept_async(stream).await.expect("handshake");
        script(ws).await;
    });
    Url::parse(&format!("ws://{addr}/town")).expect("url")
}

async fn send(ws: &mut ServerSocket, message: &ServerMessage) {
    let text = serde_json::to_string(message).expect("serialize");
    ws.send(Message::Text(text)).await.expect("send");
}

/// Next client message, or `None` once the client closed.
async fn recv(ws: &mut ServerSocket) -> Option<ClientMessage> {
    while let Some(frame) = ws.next().await {
        match frame.ok()? {
            Message::Text(text) => return Some(serde_json::from_str(&text).expect("client message")),
            Message::Close(_) => return None,
            _ => {}
        }
    }
    None
}

fn snapshot(us: &Player, interactables: Vec<InteractableModel>) -> ServerMessage {
    ServerMessage::Initialize(TownJoinResponse {
        user_id: us.id,
        session_token: "token".into(),
        provider_video_token: "video".into(),
        current_players: vec![us.clone()],
        friendly_name: "Harbour".into(),
        is_publicly_listed: true,
        interactables,
    })
}

fn client(url: Url) -> (Arc<Mutex<TownController>>, townsync_player::Connection) {
    let config = ClientConfig::new(url, TownId::from("harbour"), "ada")
        .with_command_timeout(Duration::from_secs(2));
    let connection = create_connection(config.join_url());
    let town = TownController::new(&config, connection.port.clone());
    (Arc::new(Mutex::new(town)), connection)
}

#[tokio::test]
async fn join_game_round_trip() {
    let us = Player::new(PlayerId::new(), "ada");
    let game_id = GameInstanceId::new();
    let area_id = InteractableId::from("Game1");

    let url = {
        let us = us.clone();
        let area_id = area_id.clone();
        serve_once(move |mut ws| async move {
            send(
                &mut ws,
                &snapshot(
                    &us,
                    vec![InteractableModel::ConnectFourArea(GameArea::vacant(
                        area_id.clone(),
                    ))],
                ),
            )
            .await;

            let Some(ClientMessage::InteractableCommand(envelope)) = recv(&mut ws).await else {
                panic!("expected a command");
            };
            assert_eq!(envelope.command, InteractableCommand::JoinGame);
            assert_eq!(envelope.interactable_id, area_id);

            send(
                &mut ws,
                &ServerMessage::CommandResponse(CommandResponse {
                    command_id: envelope.command_id,
                    interactable_id: area_id.clone(),
                    payload: Some(json!({ "game_id": game_id })),
                    error: None,
                }),
            )
            .await;
            send(
                &mut ws,
                &ServerMessage::InteractableUpdate {
                    interactable: InteractableModel::ConnectFourArea(GameArea {
                        id: area_id,
                        occupants: vec![us.id],
                        game: Some(GameInstance {
                            id: game_id,
                            players: vec![us.id],
                            state: ConnectFourState {
                                status: GameStatus::WaitingForPlayers,
                                red: Some(us.id),
                                ..ConnectFourState::default()
                            },
                            result: None,
                        }),
                        history: Vec::new(),
                    }),
                },
            )
            .await;

            // Drain until the client hangs up
            while recv(&mut ws).await.is_some() {}
        })
        .await
    };

    let (town, connection) = client(url);
    let connect = town.lock().await.connect();
    let event_loop = spawn_event_loop(Arc::clone(&town), connection.events);
    connect.await.expect("connected");

    let (updated_tx, mut updated_rx) = mpsc::unbounded_channel();
    let join = {
        let mut town = town.lock().await;
        assert_eq!(town.friendly_name(), Some("Harbour"));
        let area = town
            .area_mut(&area_id)
            .and_then(|a| a.as_connect_four_mut())
            .expect("connect four area");
        area.subscribe(GameAreaEventKind::GameUpdated, move |_| {
            let _ = updated_tx.send(());
        });
        area.join_game()
    };

    assert_eq!(join.await.expect("joined"), game_id);
    tokio::time::timeout(Duration::from_secs(2), updated_rx.recv())
        .await
        .expect("game update in time")
        .expect("game update");

    {
        let town = town.lock().await;
        let area = town.connect_four_area(&area_id).expect("area");
        assert_eq!(area.red().map(|p| p.id), Some(us.id));
        assert_eq!(area.instance_id(), Some(game_id));
        assert!(area.is_player());
        assert_eq!(town.commands().pending_count(), 0);
    }

    town.lock().await.disconnect();
    event_loop.await.expect("event loop");
    connection.task.await.expect("socket task");
}

#[tokio::test]
async fn server_closing_before_snapshot_rejects_connect() {
    let url = serve_once(|mut ws| async move {
        let _ = ws.close(None).await;
    })
    .await;

    let (town, connection) = client(url);
    let connect = town.lock().await.connect();
    let event_loop = spawn_event_loop(Arc::clone(&town), connection.events);

    assert_eq!(connect.await, Err(ConnectError::Disconnected));
    event_loop.await.expect("event loop");
    assert!(!town.lock().await.is_connected());
}

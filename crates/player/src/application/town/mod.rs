//! Town controller - the client's mirror of one town session
//!
//! [`TownController`] owns the roster, one controller per interactable area,
//! the town metadata and the command bus. It turns every inbound
//! [`TransportEvent`] into model changes plus zero or more [`TownEvent`]s,
//! delegating area updates to the matching area controller.
//!
//! The controller is shared as `Arc<tokio::sync::Mutex<TownController>>` and
//! driven by [`spawn_event_loop`]. Futures returned by `connect` and by area
//! commands own everything they need, so they can be awaited without holding
//! the lock.

mod event_loop;
mod events;
mod roster;

pub use event_loop::spawn_event_loop;
pub use events::{TownEvent, TownEventKind};
pub use roster::PlayerRoster;

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::oneshot;

use townsync_domain::{
    ChatMessage, InteractableId, Player, PlayerId, PlayerLocation, TownId, TownSettingsUpdate,
};
use townsync_shared::{ClientMessage, InteractableModel, ServerMessage, TownJoinResponse};

use crate::application::areas::{
    AreaController, ConnectFourAreaController, ConversationAreaController,
    TicTacToeAreaController, ViewingAreaController,
};
use crate::application::events::{EventEmitter, SubscriptionToken};
use crate::config::ClientConfig;
use crate::infrastructure::messaging::CommandBus;
use crate::ports::outbound::{TownConnectionPort, TransportError, TransportEvent};

/// Why `connect()` did not produce a session.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConnectError {
    #[error("Disconnected before the town sent its initial state")]
    Disconnected,

    #[error("Connect attempt was cancelled")]
    Cancelled,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TownError {
    #[error("Not connected to a town")]
    NotConnected,

    #[error("No {kind} with id {id}")]
    UnknownArea {
        id: InteractableId,
        kind: &'static str,
    },

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// State that only exists between `Initialize` and a disconnect.
#[derive(Debug, Clone)]
struct Session {
    our_player_id: PlayerId,
    session_token: String,
    provider_video_token: String,
    friendly_name: String,
    is_publicly_listed: bool,
}

pub struct TownController {
    town_id: TownId,
    user_name: String,
    connection: Arc<dyn TownConnectionPort>,
    commands: CommandBus,
    session: Option<Session>,
    roster: PlayerRoster,
    areas: Vec<AreaController>,
    events: EventEmitter<TownEvent>,
    pending_connect: Option<oneshot::Sender<Result<(), ConnectError>>>,
}

impl std::fmt::Debug for TownController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TownController")
            .field("town_id", &self.town_id)
            .field("connected", &self.session.is_some())
            .field("players", &self.roster.len())
            .field("areas", &self.areas.len())
            .field("commands", &self.commands)
            .finish()
    }
}

impl TownController {
    /// Nothing is sent yet; the server pushes `Initialize` once it accepts us.
    pub fn new(config: &ClientConfig, connection: Arc<dyn TownConnectionPort>) -> Self {
        let commands = CommandBus::new(Arc::clone(&connection), config.command_timeout);
        Self {
            town_id: config.town_id.clone(),
            user_name: config.user_name.clone(),
            connection,
            commands,
            session: None,
            roster: PlayerRoster::default(),
            areas: Vec::new(),
            events: EventEmitter::new(),
            pending_connect: None,
        }
    }

    /// Resolves once the initial snapshot has been applied.
    ///
    /// Rejects with `Disconnected` if the transport closes first. Calling
    /// again while a connect is pending cancels the earlier one.
    pub fn connect(&mut self) -> impl Future<Output = Result<(), ConnectError>> + Send + 'static {
        let (tx, rx) = oneshot::channel();
        if let Some(previous) = self.pending_connect.replace(tx) {
            let _ = previous.send(Err(ConnectError::Cancelled));
        }
        tracing::info!(town_id = %self.town_id, user_name = %self.user_name, "Waiting for town snapshot");
        async move { rx.await.unwrap_or(Err(ConnectError::Cancelled)) }
    }

    /// Close the connection and drop the session.
    pub fn disconnect(&mut self) {
        tracing::info!(town_id = %self.town_id, "Disconnecting");
        self.connection.close();
        if let Some(pending) = self.pending_connect.take() {
            let _ = pending.send(Err(ConnectError::Cancelled));
        }
        self.end_session(None);
    }

    // =========================================================================
    // Inbound
    // =========================================================================

    pub fn handle_transport_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Message(message) => self.handle_server_message(message),
            TransportEvent::Closed { reason } => self.handle_closed(reason),
        }
    }

    pub fn handle_server_message(&mut self, message: ServerMessage) {
        match message {
            ServerMessage::Initialize(snapshot) => self.handle_initialize(snapshot),
            ServerMessage::TownClosing => self.handle_closed(Some("town closing".into())),
            ServerMessage::CommandResponse(response) => {
                self.commands.resolve(response);
            }
            ServerMessage::Unknown => {
                tracing::debug!("Ignoring unknown server message");
            }
            other if self.session.is_none() => {
                tracing::debug!(message = ?other, "Ignoring message received before initialization");
            }
            ServerMessage::TownSettingsUpdated(update) => self.handle_settings(update),
            ServerMessage::PlayerJoined { player } => {
                tracing::debug!(player_id = %player.id, user_name = %player.user_name, "Player joined");
                self.roster.join(player);
                self.emit_players_changed();
            }
            ServerMessage::PlayerDisconnect { player } => {
                tracing::debug!(player_id = %player.id, "Player left");
                self.roster.leave(player.id);
                self.emit_players_changed();
            }
            ServerMessage::PlayerMoved { player } => self.handle_player_moved(player),
            ServerMessage::ChatMessage { message } => {
                self.events.emit(&TownEvent::ChatMessage(message));
            }
            ServerMessage::InteractableUpdate { interactable } => {
                self.handle_interactable_update(interactable);
            }
        }
    }

    fn handle_initialize(&mut self, snapshot: TownJoinResponse) {
        let TownJoinResponse {
            user_id,
            session_token,
            provider_video_token,
            current_players,
            friendly_name,
            is_publicly_listed,
            interactables,
        } = snapshot;

        self.roster = PlayerRoster::new(current_players);
        self.session = Some(Session {
            our_player_id: user_id,
            session_token,
            provider_video_token,
            friendly_name,
            is_publicly_listed,
        });

        self.areas.clear();
        for model in interactables {
            let Some(mut area) = AreaController::create(&model, user_id, &self.commands) else {
                tracing::debug!("Skipping area of unknown kind in snapshot");
                continue;
            };
            let occupants = self.roster.players_in(model.occupants());
            match area.update_from(model, occupants, &self.roster) {
                Ok(()) => self.areas.push(area),
                Err(error) => {
                    tracing::error!(area_id = %area.id(), error = %error, "Failed to load area from snapshot");
                }
            }
        }

        tracing::info!(
            town_id = %self.town_id,
            players = self.roster.len(),
            areas = self.areas.len(),
            "Town initialized"
        );

        match self.pending_connect.take() {
            Some(pending) => {
                let _ = pending.send(Ok(()));
            }
            None => tracing::warn!("Received town snapshot with no pending connect"),
        }
    }

    fn handle_closed(&mut self, reason: Option<String>) {
        if let Some(pending) = self.pending_connect.take() {
            tracing::warn!(reason = ?reason, "Disconnected before town snapshot");
            let _ = pending.send(Err(ConnectError::Disconnected));
        }
        self.end_session(reason);
    }

    fn end_session(&mut self, reason: Option<String>) {
        self.commands.cancel_all();
        if self.session.take().is_some() {
            tracing::info!(reason = ?reason, "Town session ended");
            self.events.emit(&TownEvent::Disconnect { reason });
        }
    }

    fn handle_settings(&mut self, update: TownSettingsUpdate) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if let Some(name) = update.friendly_name {
            session.friendly_name = name;
        }
        if let Some(listed) = update.is_publicly_listed {
            session.is_publicly_listed = listed;
        }
        let event = TownEvent::TownSettingsUpdated {
            friendly_name: session.friendly_name.clone(),
            is_publicly_listed: session.is_publicly_listed,
        };
        self.events.emit(&event);
    }

    fn handle_player_moved(&mut self, moved: Player) {
        let our_id = self.our_player_id();
        let updated = match self.roster.get_mut(moved.id) {
            Some(existing) => {
                if Some(existing.id) == our_id {
                    // Keep our local position; only the area assignment is authoritative
                    existing.location.interactable_id = moved.location.interactable_id;
                } else {
                    existing.location = moved.location;
                }
                existing.clone()
            }
            None => {
                tracing::debug!(player_id = %moved.id, "Movement from unlisted player; adding to roster");
                self.roster.join(moved.clone());
                moved
            }
        };
        self.events.emit(&TownEvent::PlayerMoved(updated));
    }

    fn handle_interactable_update(&mut self, model: InteractableModel) {
        let Some(id) = model.id().cloned() else {
            tracing::debug!("Ignoring update for area of unknown kind");
            return;
        };
        let Some(our_id) = self.our_player_id() else {
            return;
        };

        let occupants = self.roster.players_in(model.occupants());
        let Some(index) = self.areas.iter().position(|a| a.id() == &id) else {
            self.add_area(id, our_id, model, occupants);
            return;
        };

        let area = &mut self.areas[index];
        let was_active = area.is_active();
        if let Err(error) = area.update_from(model, occupants, &self.roster) {
            tracing::error!(area_id = %id, error = %error, "Failed to apply interactable update");
            return;
        }
        if area.is_active() != was_active {
            tracing::debug!(area_id = %id, active = !was_active, "Area activity changed");
            self.events.emit(&TownEvent::InteractableAreasChanged);
        }
    }

    /// Load an area seen for the first time; it is only announced once loaded.
    fn add_area(
        &mut self,
        id: InteractableId,
        our_id: PlayerId,
        model: InteractableModel,
        occupants: Vec<Player>,
    ) {
        let Some(mut area) = AreaController::create(&model, our_id, &self.commands) else {
            return;
        };
        let was_active = area.is_active();
        if let Err(error) = area.update_from(model, occupants, &self.roster) {
            tracing::error!(area_id = %id, error = %error, "Failed to load new interactable area");
            return;
        }
        tracing::debug!(area_id = %id, kind = area.kind(), "New interactable area");
        let flipped = area.is_active() != was_active;
        self.areas.push(area);
        self.events.emit(&TownEvent::InteractableAreasChanged);
        if flipped {
            self.events.emit(&TownEvent::InteractableAreasChanged);
        }
    }

    fn emit_players_changed(&mut self) {
        let players = self.roster.players().to_vec();
        self.events.emit(&TownEvent::PlayersChanged(players));
    }

    // =========================================================================
    // Outbound
    // =========================================================================

    /// Report our own movement and apply it locally right away.
    pub fn emit_movement(&mut self, location: PlayerLocation) -> Result<(), TownError> {
        let our_id = self.our_player_id().ok_or(TownError::NotConnected)?;
        self.commands.send(ClientMessage::PlayerMovement {
            location: location.clone(),
        })?;
        if let Some(player) = self.roster.get_mut(our_id) {
            player.location = location;
            let moved = player.clone();
            self.events.emit(&TownEvent::PlayerMoved(moved));
        }
        Ok(())
    }

    /// Send a chat line, town-wide or scoped to one area.
    pub fn emit_chat_message(
        &self,
        body: impl Into<String>,
        interactable_id: Option<InteractableId>,
    ) -> Result<ChatMessage, TownError> {
        let author = self.our_player_id().ok_or(TownError::NotConnected)?;
        let message = ChatMessage {
            author,
            sid: uuid::Uuid::new_v4().to_string(),
            body: body.into(),
            date_created: Utc::now(),
            interactable_id,
        };
        self.commands.send(ClientMessage::ChatMessage {
            message: message.clone(),
        })?;
        Ok(message)
    }

    /// Push a viewing area's local playback state to the server.
    pub fn emit_viewing_area_update(&self, id: &InteractableId) -> Result<(), TownError> {
        if self.session.is_none() {
            return Err(TownError::NotConnected);
        }
        let area = self.viewing_area(id).ok_or_else(|| TownError::UnknownArea {
            id: id.clone(),
            kind: "ViewingArea",
        })?;
        self.commands.send(ClientMessage::InteractableUpdate {
            interactable: InteractableModel::ViewingArea(area.to_model()),
        })?;
        Ok(())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn subscribe(
        &mut self,
        kind: TownEventKind,
        handler: impl FnMut(&TownEvent) + Send + 'static,
    ) -> SubscriptionToken {
        self.events.subscribe(kind, handler)
    }

    pub fn unsubscribe(&mut self, token: SubscriptionToken) -> bool {
        self.events.unsubscribe(token)
    }

    pub fn town_id(&self) -> &TownId {
        &self.town_id
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    pub fn players(&self) -> &[Player] {
        self.roster.players()
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.roster.get(id)
    }

    pub fn our_player_id(&self) -> Option<PlayerId> {
        self.session.as_ref().map(|s| s.our_player_id)
    }

    pub fn our_player(&self) -> Option<&Player> {
        self.roster.get(self.our_player_id()?)
    }

    pub fn friendly_name(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.friendly_name.as_str())
    }

    pub fn is_publicly_listed(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.is_publicly_listed)
    }

    pub fn session_token(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.session_token.as_str())
    }

    pub fn provider_video_token(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.provider_video_token.as_str())
    }

    pub fn commands(&self) -> &CommandBus {
        &self.commands
    }

    pub fn areas(&self) -> &[AreaController] {
        &self.areas
    }

    pub fn area(&self, id: &InteractableId) -> Option<&AreaController> {
        self.areas.iter().find(|a| a.id() == id)
    }

    pub fn area_mut(&mut self, id: &InteractableId) -> Option<&mut AreaController> {
        self.areas.iter_mut().find(|a| a.id() == id)
    }

    pub fn conversation_area(&self, id: &InteractableId) -> Option<&ConversationAreaController> {
        self.area(id)?.as_conversation()
    }

    pub fn viewing_area(&self, id: &InteractableId) -> Option<&ViewingAreaController> {
        self.area(id)?.as_viewing()
    }

    pub fn connect_four_area(&self, id: &InteractableId) -> Option<&ConnectFourAreaController> {
        self.area(id)?.as_connect_four()
    }

    pub fn tic_tac_toe_area(&self, id: &InteractableId) -> Option<&TicTacToeAreaController> {
        self.area(id)?.as_tic_tac_toe()
    }

    /// Areas consumers should currently show.
    pub fn active_areas(&self) -> impl Iterator<Item = &AreaController> {
        self.areas.iter().filter(|a| a.is_active())
    }

    pub fn active_conversation_areas(&self) -> Vec<&ConversationAreaController> {
        self.active_areas()
            .filter_map(AreaController::as_conversation)
            .collect()
    }

    pub fn active_viewing_areas(&self) -> Vec<&ViewingAreaController> {
        self.active_areas()
            .filter_map(AreaController::as_viewing)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::areas::{ConversationAreaEvent, ConversationAreaEventKind};
    use crate::infrastructure::messaging::{ChannelConnection, OutboundFrame};
    use crate::infrastructure::testing::fixtures::{
        connect_four_area, conversation_area, player, test_config, town_join_response,
    };
    use townsync_domain::{ConnectFourState, GameInstanceId, ViewingArea};
    use crate::ports::outbound::MockTownConnectionPort;
    use std::sync::Mutex;
    use tokio::sync::mpsc;

    struct Harness {
        town: TownController,
        outbound: mpsc::UnboundedReceiver<OutboundFrame>,
        us: Player,
        them: Player,
        seen: Arc<Mutex<Vec<TownEvent>>>,
    }

    fn connected() -> Harness {
        let (connection, outbound) = ChannelConnection::new();
        let mut town = TownController::new(&test_config(), Arc::new(connection));
        let us = player("us");
        let them = player("them");

        let seen = Arc::new(Mutex::new(Vec::new()));
        for kind in [
            TownEventKind::PlayersChanged,
            TownEventKind::PlayerMoved,
            TownEventKind::TownSettingsUpdated,
            TownEventKind::Disconnect,
            TownEventKind::ChatMessage,
            TownEventKind::InteractableAreasChanged,
        ] {
            let seen = Arc::clone(&seen);
            town.subscribe(kind, move |event| {
                seen.lock().expect("lock").push(event.clone());
            });
        }

        let _connect = town.connect();
        town.handle_server_message(ServerMessage::Initialize(town_join_response(
            us.id,
            vec![us.clone(), them.clone()],
            vec![InteractableModel::ConversationArea(conversation_area(
                "Conversation1",
                None,
                &[],
            ))],
        )));

        Harness {
            town,
            outbound,
            us,
            them,
            seen,
        }
    }

    fn moved(player: &Player, x: f64, area: Option<&str>) -> Player {
        Player {
            location: PlayerLocation {
                x,
                interactable_id: area.map(InteractableId::from),
                ..PlayerLocation::default()
            },
            ..player.clone()
        }
    }

    #[tokio::test]
    async fn connect_resolves_on_initialize() {
        let (connection, _outbound) = ChannelConnection::new();
        let mut town = TownController::new(&test_config(), Arc::new(connection));
        let us = player("us");

        let connect = town.connect();
        town.handle_server_message(ServerMessage::Initialize(town_join_response(
            us.id,
            vec![us.clone()],
            Vec::new(),
        )));

        assert_eq!(connect.await, Ok(()));
        assert_eq!(town.our_player().map(|p| p.id), Some(us.id));
        assert_eq!(town.session_token(), Some("session-token"));
        assert_eq!(town.friendly_name(), Some("Test Town"));
    }

    #[tokio::test]
    async fn connect_rejects_when_disconnected_first() {
        let (connection, _outbound) = ChannelConnection::new();
        let mut town = TownController::new(&test_config(), Arc::new(connection));

        let connect = town.connect();
        town.handle_transport_event(TransportEvent::Closed { reason: None });

        assert_eq!(connect.await, Err(ConnectError::Disconnected));
        assert!(!town.is_connected());
    }

    #[test]
    fn join_and_leave_always_notify() {
        let mut h = connected();
        let newcomer = player("newcomer");

        h.town.handle_server_message(ServerMessage::PlayerJoined {
            player: newcomer.clone(),
        });
        h.town.handle_server_message(ServerMessage::PlayerDisconnect {
            player: newcomer.clone(),
        });
        h.town.handle_server_message(ServerMessage::PlayerDisconnect { player: newcomer });

        let seen = h.seen.lock().expect("lock");
        let changes = seen
            .iter()
            .filter(|e| matches!(e, TownEvent::PlayersChanged(_)))
            .count();
        assert_eq!(changes, 3);
        assert_eq!(h.town.players().len(), 2);
    }

    #[test]
    fn our_own_movement_keeps_local_position() {
        let mut h = connected();
        h.town
            .emit_movement(PlayerLocation {
                x: 5.0,
                ..PlayerLocation::default()
            })
            .expect("connected");

        h.town.handle_server_message(ServerMessage::PlayerMoved {
            player: moved(&h.us, 99.0, Some("Conversation1")),
        });
        h.town.handle_server_message(ServerMessage::PlayerMoved {
            player: moved(&h.them, 42.0, None),
        });

        let us = h.town.our_player().expect("us");
        assert_eq!(us.location.x, 5.0);
        assert_eq!(
            us.location.interactable_id,
            Some(InteractableId::from("Conversation1"))
        );
        assert_eq!(h.town.player(h.them.id).map(|p| p.location.x), Some(42.0));

        let movement = h.outbound.try_recv().expect("movement sent");
        assert!(matches!(
            movement,
            OutboundFrame::Message(ClientMessage::PlayerMovement { .. })
        ));
    }

    #[test]
    fn movement_from_unlisted_player_adds_them() {
        let mut h = connected();
        let stranger = player("stranger");

        h.town.handle_server_message(ServerMessage::PlayerMoved {
            player: moved(&stranger, 1.0, None),
        });

        assert!(h.town.player(stranger.id).is_some());
        assert!(matches!(
            h.seen.lock().expect("lock").last(),
            Some(TownEvent::PlayerMoved(p)) if p.id == stranger.id
        ));
    }

    #[test]
    fn areas_changed_only_when_activity_flips() {
        let mut h = connected();
        let us = h.us.clone();
        let update = |topic: Option<&str>| ServerMessage::InteractableUpdate {
            interactable: InteractableModel::ConversationArea(conversation_area(
                "Conversation1",
                topic,
                &[us.id],
            )),
        };

        h.town.handle_server_message(update(Some("rust")));
        h.town.handle_server_message(update(Some("tokio")));
        h.town.handle_server_message(update(None));

        let flips = h
            .seen
            .lock()
            .expect("lock")
            .iter()
            .filter(|e| **e == TownEvent::InteractableAreasChanged)
            .count();
        assert_eq!(flips, 2);
        assert!(h.town.active_conversation_areas().is_empty());
    }

    #[test]
    fn unknown_area_is_created_and_announced() {
        let mut h = connected();

        h.town.handle_server_message(ServerMessage::InteractableUpdate {
            interactable: InteractableModel::ConversationArea(conversation_area(
                "Conversation2",
                Some("new"),
                &[h.them.id],
            )),
        });

        let area = h
            .town
            .conversation_area(&InteractableId::from("Conversation2"))
            .expect("created");
        assert_eq!(area.topic(), Some("new"));
        assert_eq!(h.town.active_conversation_areas().len(), 1);
        // one for the new area, one for it turning active
        let announced = h
            .seen
            .lock()
            .expect("lock")
            .iter()
            .filter(|e| **e == TownEvent::InteractableAreasChanged)
            .count();
        assert_eq!(announced, 2);
    }

    #[test]
    fn failed_area_update_is_isolated() {
        let mut h = connected();
        let topics = Arc::new(Mutex::new(Vec::new()));
        {
            let topics = Arc::clone(&topics);
            h.town
                .area_mut(&InteractableId::from("Conversation1"))
                .and_then(AreaController::as_conversation_mut)
                .expect("conversation area")
                .subscribe(ConversationAreaEventKind::TopicChange, move |event| {
                    if let ConversationAreaEvent::TopicChange(topic) = event {
                        topics.lock().expect("lock").push(topic.clone());
                    }
                });
        }

        // Wrong kind for an existing id
        h.town.handle_server_message(ServerMessage::InteractableUpdate {
            interactable: InteractableModel::ViewingArea(ViewingArea {
                id: "Conversation1".into(),
                occupants: Vec::new(),
                video: None,
                elapsed_time_sec: 0.0,
                is_playing: false,
            }),
        });
        h.town.handle_server_message(ServerMessage::InteractableUpdate {
            interactable: InteractableModel::ConversationArea(conversation_area(
                "Conversation1",
                Some("still fine"),
                &[],
            )),
        });

        assert_eq!(
            *topics.lock().expect("lock"),
            vec![Some("still fine".to_string())]
        );
    }

    #[test]
    fn settings_update_is_partial() {
        let mut h = connected();

        h.town
            .handle_server_message(ServerMessage::TownSettingsUpdated(TownSettingsUpdate {
                friendly_name: None,
                is_publicly_listed: Some(true),
            }));

        assert_eq!(h.town.friendly_name(), Some("Test Town"));
        assert!(h.town.is_publicly_listed());
        assert!(matches!(
            h.seen.lock().expect("lock").last(),
            Some(TownEvent::TownSettingsUpdated { is_publicly_listed: true, .. })
        ));
    }

    #[test]
    fn town_closing_emits_disconnect_and_clears_session() {
        let mut h = connected();

        h.town.handle_server_message(ServerMessage::TownClosing);

        assert!(!h.town.is_connected());
        assert!(matches!(
            h.seen.lock().expect("lock").last(),
            Some(TownEvent::Disconnect { .. })
        ));
        assert_eq!(
            h.town.emit_chat_message("hello?", None),
            Err(TownError::NotConnected)
        );
    }

    #[test]
    fn chat_is_passed_through_and_sent() {
        let mut h = connected();
        let message = h
            .town
            .emit_chat_message("hi all", None)
            .expect("connected");
        assert_eq!(message.author, h.us.id);

        h.town.handle_server_message(ServerMessage::ChatMessage {
            message: message.clone(),
        });

        assert_eq!(
            h.seen.lock().expect("lock").last(),
            Some(&TownEvent::ChatMessage(message))
        );
    }

    #[test]
    fn viewing_update_for_unknown_area_fails() {
        let h = connected();
        let err = h
            .town
            .emit_viewing_area_update(&InteractableId::from("Conversation1"))
            .expect_err("not a viewing area");
        assert!(matches!(err, TownError::UnknownArea { .. }));
    }

    #[test]
    fn disconnect_closes_the_port() {
        let mut connection = MockTownConnectionPort::new();
        connection.expect_close().times(1).return_const(());
        let mut town = TownController::new(&test_config(), Arc::new(connection));

        town.disconnect();

        assert!(!town.is_connected());
    }

    fn areas_changed_count(h: &Harness) -> usize {
        h.seen
            .lock()
            .expect("lock")
            .iter()
            .filter(|e| **e == TownEvent::InteractableAreasChanged)
            .count()
    }

    #[tokio::test]
    async fn close_with_live_session_and_pending_connect_ends_both() {
        let mut h = connected();
        let reconnect = h.town.connect();

        h.town
            .handle_transport_event(TransportEvent::Closed { reason: None });

        assert_eq!(reconnect.await, Err(ConnectError::Disconnected));
        assert!(!h.town.is_connected());
        assert!(matches!(
            h.seen.lock().expect("lock").last(),
            Some(TownEvent::Disconnect { reason: None })
        ));
    }

    #[test]
    fn viewing_area_keeps_server_occupant_order() {
        let mut h = connected();
        let area_id = InteractableId::from("Viewing1");

        h.town.handle_server_message(ServerMessage::InteractableUpdate {
            interactable: InteractableModel::ViewingArea(ViewingArea {
                id: area_id.clone(),
                occupants: vec![h.them.id, h.us.id],
                video: Some("https://video.test/1".into()),
                elapsed_time_sec: 3.0,
                is_playing: true,
            }),
        });
        let occupants: Vec<PlayerId> = h
            .town
            .area(&area_id)
            .expect("viewing area")
            .occupants()
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(occupants, vec![h.them.id, h.us.id]);

        h.town
            .emit_viewing_area_update(&area_id)
            .expect("connected");
        let Ok(OutboundFrame::Message(ClientMessage::InteractableUpdate {
            interactable: InteractableModel::ViewingArea(sent),
        })) = h.outbound.try_recv()
        else {
            panic!("expected a viewing area update");
        };
        assert_eq!(sent.occupants, vec![h.them.id, h.us.id]);
    }

    #[test]
    fn new_area_that_fails_to_load_is_not_announced() {
        let mut h = connected();
        let area_id = InteractableId::from("Game1");
        let stranger = PlayerId::new();
        let state = ConnectFourState {
            red: Some(stranger),
            ..ConnectFourState::default()
        };

        h.town.handle_server_message(ServerMessage::InteractableUpdate {
            interactable: InteractableModel::ConnectFourArea(connect_four_area(
                "Game1",
                GameInstanceId::new(),
                vec![stranger],
                state,
            )),
        });

        assert!(h.town.area(&area_id).is_none());
        assert_eq!(areas_changed_count(&h), 0);
    }
}

//! Game areas: one game instance at a time, plus the results of past ones.
//!
//! [`GameAreaController`] is generic over a [`GameRules`] marker type that
//! supplies the board shape and the turn rule. Everything else (seated player
//! resolution, lifecycle transitions, result history, join/leave/start
//! commands) is shared.
//!
//! The board and the turn are derived state. They are rebuilt from the move
//! list on every update and published only when the rebuilt value differs
//! from the cached one.

use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;

use townsync_domain::{
    DomainError, GameArea, GameInstance, GameInstanceId, GameResult, GameState, GameStatus,
    InteractableId, Player, PlayerId,
};
use townsync_shared::{GameMovePayload, InteractableCommand, JoinGameResponse};

use super::occupants::members_differ;
use super::{AreaUpdateError, InteractableAreaController, OccupantSet};
use crate::application::events::{EventEmitter, Notification, SubscriptionToken};
use crate::application::town::PlayerRoster;
use crate::infrastructure::messaging::{CommandBus, CommandError};

/// Local pre-check failures and command failures for game actions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("No game in progress")]
    NoGameInProgress,

    #[error("No game startable")]
    NoGameStartable,

    #[error("No game instance in this area")]
    NoInstance,

    #[error("Player is not in the game")]
    NotInGame,

    #[error("Column {column} is full")]
    ColumnFull { column: u8 },

    #[error("Move is outside the board")]
    InvalidCoordinate,

    #[error(transparent)]
    Command(#[from] CommandError),
}

/// Game-specific rules plugged into [`GameAreaController`].
pub trait GameRules: fmt::Debug + Send + Sync + 'static {
    type State: GameState + Clone + PartialEq + fmt::Debug + Send + 'static;
    type Board: Clone + PartialEq + fmt::Debug + Send + 'static;

    fn empty_board() -> Self::Board;

    /// Fold the state's move list onto an empty board.
    fn build_board(state: &Self::State) -> Result<Self::Board, DomainError>;

    /// The seated player expected to move next, if any.
    fn whose_turn(state: &Self::State) -> Option<PlayerId>;

    fn is_active(status: GameStatus, is_empty: bool) -> bool;
}

#[derive(Debug, Clone, PartialEq)]
pub enum GameAreaEvent<G: GameRules> {
    OccupantsChange(Vec<Player>),
    PlayersChange(Vec<Player>),
    GameUpdated,
    GameEnd,
    BoardChanged(G::Board),
    TurnChanged {
        whose_turn: Option<PlayerId>,
        is_our_turn: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameAreaEventKind {
    OccupantsChange,
    PlayersChange,
    GameUpdated,
    GameEnd,
    BoardChanged,
    TurnChanged,
}

impl<G: GameRules> Notification for GameAreaEvent<G> {
    type Kind = GameAreaEventKind;

    fn kind(&self) -> GameAreaEventKind {
        match self {
            GameAreaEvent::OccupantsChange(_) => GameAreaEventKind::OccupantsChange,
            GameAreaEvent::PlayersChange(_) => GameAreaEventKind::PlayersChange,
            GameAreaEvent::GameUpdated => GameAreaEventKind::GameUpdated,
            GameAreaEvent::GameEnd => GameAreaEventKind::GameEnd,
            GameAreaEvent::BoardChanged(_) => GameAreaEventKind::BoardChanged,
            GameAreaEvent::TurnChanged { .. } => GameAreaEventKind::TurnChanged,
        }
    }
}

#[derive(Debug)]
pub struct GameAreaController<G: GameRules> {
    id: InteractableId,
    our_player: PlayerId,
    occupants: OccupantSet,
    game: Option<GameInstance<G::State>>,
    players: Vec<Player>,
    history: Vec<GameResult>,
    board: G::Board,
    whose_turn: Option<PlayerId>,
    /// Written by updates and by a completed `join_game`, which runs outside
    /// any borrow of the controller.
    instance_id: Arc<Mutex<Option<GameInstanceId>>>,
    commands: CommandBus,
    events: EventEmitter<GameAreaEvent<G>>,
}

impl<G: GameRules> GameAreaController<G> {
    pub fn new(id: InteractableId, our_player: PlayerId, commands: CommandBus) -> Self {
        Self {
            id,
            our_player,
            occupants: OccupantSet::new(),
            game: None,
            players: Vec::new(),
            history: Vec::new(),
            board: G::empty_board(),
            whose_turn: None,
            instance_id: Arc::new(Mutex::new(None)),
            commands,
            events: EventEmitter::new(),
        }
    }

    fn instance_cell(&self) -> MutexGuard<'_, Option<GameInstanceId>> {
        self.instance_id
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn game(&self) -> Option<&GameInstance<G::State>> {
        self.game.as_ref()
    }

    pub fn state(&self) -> Option<&G::State> {
        self.game.as_ref().map(|g| &g.state)
    }

    /// Status of the current instance; `WaitingForPlayers` when there is none.
    pub fn status(&self) -> GameStatus {
        self.state().map_or(GameStatus::WaitingForPlayers, GameState::status)
    }

    /// Seated players, in seat order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Occupants who are not seated in the game.
    pub fn observers(&self) -> Vec<Player> {
        self.occupants
            .players()
            .iter()
            .filter(|p| !self.players.iter().any(|seated| seated.id == p.id))
            .cloned()
            .collect()
    }

    /// Finished-game results, oldest first.
    pub fn history(&self) -> &[GameResult] {
        &self.history
    }

    pub fn winner(&self) -> Option<&Player> {
        let winner = self.state()?.winner()?;
        self.players.iter().find(|p| p.id == winner)
    }

    pub fn instance_id(&self) -> Option<GameInstanceId> {
        *self.instance_cell()
    }

    /// Whether our own player holds a seat.
    pub fn is_player(&self) -> bool {
        self.players.iter().any(|p| p.id == self.our_player)
    }

    pub fn our_player(&self) -> PlayerId {
        self.our_player
    }

    pub fn board(&self) -> &G::Board {
        &self.board
    }

    pub fn whose_turn(&self) -> Option<&Player> {
        let id = self.whose_turn?;
        self.players.iter().find(|p| p.id == id)
    }

    pub fn is_our_turn(&self) -> bool {
        self.whose_turn == Some(self.our_player)
    }

    pub fn move_count(&self) -> usize {
        self.state().map_or(0, GameState::move_count)
    }

    pub fn subscribe(
        &mut self,
        kind: GameAreaEventKind,
        handler: impl FnMut(&GameAreaEvent<G>) + Send + 'static,
    ) -> SubscriptionToken {
        self.events.subscribe(kind, handler)
    }

    pub fn unsubscribe(&mut self, token: SubscriptionToken) -> bool {
        self.events.unsubscribe(token)
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Ask to be seated. Resolves with the instance we joined, which is also
    /// recorded as this area's instance id.
    pub fn join_game(
        &self,
    ) -> impl Future<Output = Result<GameInstanceId, GameError>> + Send + 'static {
        let pending = self
            .commands
            .send_command(self.id.clone(), InteractableCommand::JoinGame);
        let instance_id = Arc::clone(&self.instance_id);
        let area_id = self.id.clone();

        async move {
            let payload = pending.await?;
            let JoinGameResponse { game_id } = serde_json::from_value(payload)
                .map_err(|e| CommandError::InvalidPayload(e.to_string()))?;
            *instance_id.lock().unwrap_or_else(PoisonError::into_inner) = Some(game_id);
            tracing::debug!(area_id = %area_id, game_id = %game_id, "Joined game");
            Ok(game_id)
        }
    }

    pub fn leave_game(
        &self,
    ) -> Result<impl Future<Output = Result<(), GameError>> + Send + 'static, GameError> {
        let game_id = self.instance_id().ok_or(GameError::NoInstance)?;
        let pending = self
            .commands
            .send_command(self.id.clone(), InteractableCommand::LeaveGame { game_id });
        Ok(acknowledged(pending))
    }

    /// Mark ourselves ready; only valid while the game waits to start.
    pub fn start_game(
        &self,
    ) -> Result<impl Future<Output = Result<(), GameError>> + Send + 'static, GameError> {
        let game_id = match self.instance_id() {
            Some(id) if self.status() == GameStatus::WaitingToStart => id,
            _ => return Err(GameError::NoGameStartable),
        };
        let pending = self
            .commands
            .send_command(self.id.clone(), InteractableCommand::StartGame { game_id });
        Ok(acknowledged(pending))
    }

    /// Instance id of a game that is currently in progress.
    pub(super) fn game_in_progress(&self) -> Result<GameInstanceId, GameError> {
        match self.instance_id() {
            Some(id) if self.status().is_in_progress() => Ok(id),
            _ => Err(GameError::NoGameInProgress),
        }
    }

    pub(super) fn send_move(
        &self,
        game_id: GameInstanceId,
        game_move: GameMovePayload,
    ) -> impl Future<Output = Result<(), GameError>> + Send + 'static {
        let pending = self.commands.send_command(
            self.id.clone(),
            InteractableCommand::GameMove { game_id, game_move },
        );
        acknowledged(pending)
    }

    // =========================================================================
    // Updates
    // =========================================================================

    fn record_results(&mut self, results: impl IntoIterator<Item = GameResult>) {
        for result in results {
            if self.history.iter().any(|r| r.game_id == result.game_id) {
                continue;
            }
            tracing::debug!(area_id = %self.id, game_id = %result.game_id, "Recorded game result");
            self.history.push(result);
        }
    }

    fn resolve_players(
        &self,
        game: Option<&GameInstance<G::State>>,
        roster: &PlayerRoster,
    ) -> Result<Vec<Player>, AreaUpdateError> {
        let Some(game) = game else {
            return Ok(Vec::new());
        };
        game.players
            .iter()
            .map(|id| {
                roster
                    .get(*id)
                    .cloned()
                    .ok_or_else(|| AreaUpdateError::UnknownPlayer {
                        area_id: self.id.clone(),
                        player_id: *id,
                    })
            })
            .collect()
    }
}

fn acknowledged(
    pending: impl Future<Output = Result<serde_json::Value, CommandError>> + Send + 'static,
) -> impl Future<Output = Result<(), GameError>> + Send + 'static {
    async move {
        pending.await?;
        Ok(())
    }
}

impl<G: GameRules> InteractableAreaController for GameAreaController<G> {
    type Model = GameArea<G::State>;

    fn id(&self) -> &InteractableId {
        &self.id
    }

    fn occupants(&self) -> &[Player] {
        self.occupants.players()
    }

    /// Nobody inside and no game instance.
    fn is_empty(&self) -> bool {
        self.occupants.is_empty() && self.game.is_none()
    }

    fn is_active(&self) -> bool {
        G::is_active(self.status(), self.is_empty())
    }

    fn friendly_name(&self) -> String {
        self.id.to_string()
    }

    fn set_occupants(&mut self, occupants: Vec<Player>) {
        if let Some(players) = self.occupants.apply(occupants) {
            self.events.emit(&GameAreaEvent::OccupantsChange(players));
        }
    }

    fn apply_model(
        &mut self,
        model: GameArea<G::State>,
        roster: &PlayerRoster,
    ) -> Result<(), AreaUpdateError> {
        let GameArea { game, history, .. } = model;

        // Transitions only count within one instance; a new id starts fresh
        let old_status = self.status();
        let new_status = game
            .as_ref()
            .map_or(GameStatus::WaitingForPlayers, |g| g.state.status());
        let same_instance = matches!(
            (&self.game, &game),
            (Some(old), Some(new)) if old.id == new.id
        );
        if same_instance && new_status.stage() < old_status.stage() {
            tracing::warn!(
                area_id = %self.id,
                from = ?old_status,
                to = ?new_status,
                "Game status moved backwards"
            );
        }
        let game_ending = same_instance
            && old_status == GameStatus::InProgress
            && new_status == GameStatus::Over;

        // Everything fallible happens before any state is replaced
        let players = self.resolve_players(game.as_ref(), roster)?;
        let board = match &game {
            Some(g) => G::build_board(&g.state).map_err(|source| AreaUpdateError::InvalidBoard {
                area_id: self.id.clone(),
                source,
            })?,
            None => G::empty_board(),
        };
        let whose_turn = game.as_ref().and_then(|g| G::whose_turn(&g.state));

        let players_changed = members_differ(&self.players, &players);
        self.players = players;
        if players_changed {
            self.events
                .emit(&GameAreaEvent::PlayersChange(self.players.clone()));
        }

        let finished = game.as_ref().and_then(|g| g.result.clone());
        self.record_results(history.into_iter().chain(finished));

        if let Some(g) = &game {
            *self.instance_cell() = Some(g.id);
        }
        self.game = game;
        self.events.emit(&GameAreaEvent::GameUpdated);
        if game_ending {
            tracing::info!(area_id = %self.id, "Game over");
            self.events.emit(&GameAreaEvent::GameEnd);
        }

        if board != self.board {
            self.board = board;
            self.events
                .emit(&GameAreaEvent::BoardChanged(self.board.clone()));
        }
        if whose_turn != self.whose_turn {
            self.whose_turn = whose_turn;
            self.events.emit(&GameAreaEvent::TurnChanged {
                whose_turn,
                is_our_turn: whose_turn == Some(self.our_player),
            });
        }
        Ok(())
    }
}

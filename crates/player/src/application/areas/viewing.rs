//! Viewing areas: everyone inside watches the same video at the same position.

use townsync_domain::{InteractableId, Player, ViewingArea};

use super::{AreaUpdateError, InteractableAreaController, OccupantSet};
use crate::application::events::{EventEmitter, Notification, SubscriptionToken};
use crate::application::town::PlayerRoster;

#[derive(Debug, Clone, PartialEq)]
pub enum ViewingAreaEvent {
    OccupantsChange(Vec<Player>),
    VideoChange(Option<String>),
    ProgressChange(f64),
    PlaybackChange(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewingAreaEventKind {
    OccupantsChange,
    VideoChange,
    ProgressChange,
    PlaybackChange,
}

impl Notification for ViewingAreaEvent {
    type Kind = ViewingAreaEventKind;

    fn kind(&self) -> ViewingAreaEventKind {
        match self {
            ViewingAreaEvent::OccupantsChange(_) => ViewingAreaEventKind::OccupantsChange,
            ViewingAreaEvent::VideoChange(_) => ViewingAreaEventKind::VideoChange,
            ViewingAreaEvent::ProgressChange(_) => ViewingAreaEventKind::ProgressChange,
            ViewingAreaEvent::PlaybackChange(_) => ViewingAreaEventKind::PlaybackChange,
        }
    }
}

#[derive(Debug)]
pub struct ViewingAreaController {
    id: InteractableId,
    occupants: OccupantSet,
    video: Option<String>,
    elapsed_time_sec: f64,
    is_playing: bool,
    events: EventEmitter<ViewingAreaEvent>,
}

impl ViewingAreaController {
    pub fn new(id: InteractableId) -> Self {
        Self {
            id,
            occupants: OccupantSet::new(),
            video: None,
            elapsed_time_sec: 0.0,
            is_playing: false,
            events: EventEmitter::new(),
        }
    }

    pub fn video(&self) -> Option<&str> {
        self.video.as_deref()
    }

    pub fn elapsed_time_sec(&self) -> f64 {
        self.elapsed_time_sec
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn apply_video(&mut self, video: Option<String>) -> Option<ViewingAreaEvent> {
        if self.video == video {
            return None;
        }
        self.video = video;
        Some(ViewingAreaEvent::VideoChange(self.video.clone()))
    }

    pub fn apply_elapsed_time(&mut self, elapsed_time_sec: f64) -> Option<ViewingAreaEvent> {
        if self.elapsed_time_sec == elapsed_time_sec {
            return None;
        }
        self.elapsed_time_sec = elapsed_time_sec;
        Some(ViewingAreaEvent::ProgressChange(elapsed_time_sec))
    }

    pub fn apply_playing(&mut self, is_playing: bool) -> Option<ViewingAreaEvent> {
        if self.is_playing == is_playing {
            return None;
        }
        self.is_playing = is_playing;
        Some(ViewingAreaEvent::PlaybackChange(is_playing))
    }

    pub fn set_video(&mut self, video: Option<String>) {
        let change = self.apply_video(video);
        self.publish(change);
    }

    pub fn set_elapsed_time(&mut self, elapsed_time_sec: f64) {
        let change = self.apply_elapsed_time(elapsed_time_sec);
        self.publish(change);
    }

    pub fn set_playing(&mut self, is_playing: bool) {
        let change = self.apply_playing(is_playing);
        self.publish(change);
    }

    fn publish(&mut self, change: Option<ViewingAreaEvent>) {
        if let Some(event) = change {
            self.events.emit(&event);
        }
    }

    /// Current local state, for sending back to the server.
    pub fn to_model(&self) -> ViewingArea {
        ViewingArea {
            id: self.id.clone(),
            occupants: self.occupants.ids(),
            video: self.video.clone(),
            elapsed_time_sec: self.elapsed_time_sec,
            is_playing: self.is_playing,
        }
    }

    pub fn subscribe(
        &mut self,
        kind: ViewingAreaEventKind,
        handler: impl FnMut(&ViewingAreaEvent) + Send + 'static,
    ) -> SubscriptionToken {
        self.events.subscribe(kind, handler)
    }

    pub fn unsubscribe(&mut self, token: SubscriptionToken) -> bool {
        self.events.unsubscribe(token)
    }
}

impl InteractableAreaController for ViewingAreaController {
    type Model = ViewingArea;

    fn id(&self) -> &InteractableId {
        &self.id
    }

    fn occupants(&self) -> &[Player] {
        self.occupants.players()
    }

    fn is_active(&self) -> bool {
        true
    }

    fn friendly_name(&self) -> String {
        self.id.to_string()
    }

    fn set_occupants(&mut self, occupants: Vec<Player>) {
        if let Some(players) = self.occupants.apply(occupants) {
            self.events.emit(&ViewingAreaEvent::OccupantsChange(players));
        }
    }

    fn apply_model(
        &mut self,
        model: ViewingArea,
        _roster: &PlayerRoster,
    ) -> Result<(), AreaUpdateError> {
        self.set_video(model.video);
        self.set_elapsed_time(model.elapsed_time_sec);
        self.set_playing(model.is_playing);
        Ok(())
    }
}

//! Conversation areas: a shared topic for whoever is standing there.

use townsync_domain::{ConversationArea, InteractableId, Player};

use super::{AreaUpdateError, InteractableAreaController, OccupantSet};
use crate::application::events::{EventEmitter, Notification, SubscriptionToken};
use crate::application::town::PlayerRoster;

/// Shown in place of a missing topic.
pub const NO_TOPIC: &str = "(No topic)";

#[derive(Debug, Clone, PartialEq)]
pub enum ConversationAreaEvent {
    OccupantsChange(Vec<Player>),
    TopicChange(Option<String>),
    FriendlyNameChange(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConversationAreaEventKind {
    OccupantsChange,
    TopicChange,
    FriendlyNameChange,
}

impl Notification for ConversationAreaEvent {
    type Kind = ConversationAreaEventKind;

    fn kind(&self) -> ConversationAreaEventKind {
        match self {
            ConversationAreaEvent::OccupantsChange(_) => ConversationAreaEventKind::OccupantsChange,
            ConversationAreaEvent::TopicChange(_) => ConversationAreaEventKind::TopicChange,
            ConversationAreaEvent::FriendlyNameChange(_) => {
                ConversationAreaEventKind::FriendlyNameChange
            }
        }
    }
}

#[derive(Debug)]
pub struct ConversationAreaController {
    id: InteractableId,
    occupants: OccupantSet,
    topic: Option<String>,
    events: EventEmitter<ConversationAreaEvent>,
}

impl ConversationAreaController {
    pub fn new(id: InteractableId) -> Self {
        Self {
            id,
            occupants: OccupantSet::new(),
            topic: None,
            events: EventEmitter::new(),
        }
    }

    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }

    /// Store a topic; returns the change to publish, if any.
    ///
    /// `None` and `Some` are always different, so clearing or setting the
    /// topic is a change even when the text would render the same.
    pub fn apply_topic(&mut self, topic: Option<String>) -> Option<ConversationAreaEvent> {
        if self.topic == topic {
            return None;
        }
        self.topic = topic;
        Some(ConversationAreaEvent::TopicChange(self.topic.clone()))
    }

    /// Store a topic and publish `TopicChange` then `FriendlyNameChange`.
    pub fn set_topic(&mut self, topic: Option<String>) {
        if let Some(change) = self.apply_topic(topic) {
            self.events.emit(&change);
            let name = self.friendly_name();
            self.events
                .emit(&ConversationAreaEvent::FriendlyNameChange(name));
        }
    }

    pub fn to_model(&self) -> ConversationArea {
        ConversationArea {
            id: self.id.clone(),
            occupants: self.occupants.ids(),
            topic: self.topic.clone(),
        }
    }

    pub fn subscribe(
        &mut self,
        kind: ConversationAreaEventKind,
        handler: impl FnMut(&ConversationAreaEvent) + Send + 'static,
    ) -> SubscriptionToken {
        self.events.subscribe(kind, handler)
    }

    pub fn unsubscribe(&mut self, token: SubscriptionToken) -> bool {
        self.events.unsubscribe(token)
    }
}

impl InteractableAreaController for ConversationAreaController {
    type Model = ConversationArea;

    fn id(&self) -> &InteractableId {
        &self.id
    }

    fn occupants(&self) -> &[Player] {
        self.occupants.players()
    }

    fn is_active(&self) -> bool {
        self.topic.is_some() && !self.occupants.is_empty()
    }

    fn friendly_name(&self) -> String {
        self.topic.clone().unwrap_or_else(|| NO_TOPIC.to_string())
    }

    fn set_occupants(&mut self, occupants: Vec<Player>) {
        if let Some(players) = self.occupants.apply(occupants) {
            self.events
                .emit(&ConversationAreaEvent::OccupantsChange(players));
        }
    }

    fn apply_model(
        &mut self,
        model: ConversationArea,
        _roster: &PlayerRoster,
    ) -> Result<(), AreaUpdateError> {
        self.set_topic(model.topic);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use townsync_domain::PlayerId;

    fn recorder(
        area: &mut ConversationAreaController,
    ) -> Arc<Mutex<Vec<ConversationAreaEvent>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        for kind in [
            ConversationAreaEventKind::OccupantsChange,
            ConversationAreaEventKind::TopicChange,
            ConversationAreaEventKind::FriendlyNameChange,
        ] {
            let seen = Arc::clone(&seen);
            area.subscribe(kind, move |event| {
                seen.lock().expect("lock").push(event.clone());
            });
        }
        seen
    }

    fn model(topic: Option<&str>, occupants: &[&Player]) -> ConversationArea {
        ConversationArea {
            id: "Conversation1".into(),
            occupants: occupants.iter().map(|p| p.id).collect(),
            topic: topic.map(str::to_string),
        }
    }

    #[test]
    fn topic_change_emits_topic_then_friendly_name() {
        let mut area = ConversationAreaController::new("Conversation1".into());
        let seen = recorder(&mut area);

        area.set_topic(Some("rust".into()));

        assert_eq!(
            *seen.lock().expect("lock"),
            vec![
                ConversationAreaEvent::TopicChange(Some("rust".into())),
                ConversationAreaEvent::FriendlyNameChange("rust".into()),
            ]
        );
    }

    #[test]
    fn same_topic_is_silent() {
        let mut area = ConversationAreaController::new("Conversation1".into());
        area.set_topic(Some("rust".into()));
        let seen = recorder(&mut area);

        area.set_topic(Some("rust".into()));

        assert!(seen.lock().expect("lock").is_empty());
    }

    #[test]
    fn clearing_topic_uses_placeholder_name() {
        let mut area = ConversationAreaController::new("Conversation1".into());
        area.set_topic(Some("rust".into()));
        let seen = recorder(&mut area);

        area.set_topic(None);

        assert_eq!(
            *seen.lock().expect("lock"),
            vec![
                ConversationAreaEvent::TopicChange(None),
                ConversationAreaEvent::FriendlyNameChange(NO_TOPIC.into()),
            ]
        );
        assert_eq!(area.friendly_name(), NO_TOPIC);
    }

    #[test]
    fn empty_string_topic_differs_from_no_topic() {
        let mut area = ConversationAreaController::new("Conversation1".into());

        assert!(area.apply_topic(Some(String::new())).is_some());
        assert!(area.apply_topic(None).is_some());
        assert!(area.apply_topic(None).is_none());
    }

    #[test]
    fn active_needs_topic_and_occupants() {
        let roster = PlayerRoster::default();
        let alice = Player::new(PlayerId::new(), "alice");
        let mut area = ConversationAreaController::new("Conversation1".into());

        area.update_from(model(Some("rust"), &[]), Vec::new(), &roster)
            .expect("update");
        assert!(!area.is_active());

        area.update_from(model(None, &[&alice]), vec![alice.clone()], &roster)
            .expect("update");
        assert!(!area.is_active());

        area.update_from(model(Some("rust"), &[&alice]), vec![alice], &roster)
            .expect("update");
        assert!(area.is_active());
    }

    #[test]
    fn update_applies_occupants_before_topic() {
        let roster = PlayerRoster::default();
        let alice = Player::new(PlayerId::new(), "alice");
        let mut area = ConversationAreaController::new("Conversation1".into());
        let seen = recorder(&mut area);

        area.update_from(model(Some("rust"), &[&alice]), vec![alice.clone()], &roster)
            .expect("update");

        let seen = seen.lock().expect("lock");
        assert_eq!(seen[0], ConversationAreaEvent::OccupantsChange(vec![alice]));
        assert_eq!(seen[1], ConversationAreaEvent::TopicChange(Some("rust".into())));
        assert_eq!(seen.len(), 3);
    }
}

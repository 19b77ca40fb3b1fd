use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{InteractableId, PlayerId};

/// A chat line, either town-wide or scoped to one interactable area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub author: PlayerId,
    pub sid: String,
    pub body: String,
    pub date_created: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interactable_id: Option<InteractableId>,
}

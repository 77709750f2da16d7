//! Player domain types: the committed result of a successful registration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered player. `external_user_id` is unique across all players; a player is created
/// exactly once, on explicit confirmation, and not mutated afterwards by this core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: i64,
    pub name: String,
    pub external_user_id: String,
    pub external_chat_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPlayer {
    pub name: String,
    pub external_user_id: String,
    pub external_chat_id: String,
}

//! Database row types for the players and registration_states tables.

use chrono::{DateTime, Utc};
use registration::{Player, RegistrationState, RepositoryError};

pub(crate) const STEP_AWAITING_NAME: &str = "awaiting_name";
pub(crate) const STEP_AWAITING_CONFIRMATION: &str = "awaiting_confirmation";

/// Row of the `players` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct PlayerRow {
    pub id: i64,
    pub name: String,
    pub external_user_id: String,
    pub external_chat_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PlayerRow> for Player {
    fn from(row: PlayerRow) -> Self {
        Player {
            id: row.id,
            name: row.name,
            external_user_id: row.external_user_id,
            external_chat_id: row.external_chat_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Row of the `registration_states` table. `candidate_name` is set only for the
/// confirmation step.
#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct RegistrationStateRow {
    pub user_id: i64,
    pub chat_id: i64,
    pub step: String,
    pub candidate_name: Option<String>,
}

impl RegistrationStateRow {
    pub(crate) fn from_state(state: &RegistrationState) -> Self {
        let (step, candidate_name) = match state.candidate_name() {
            Some(name) => (STEP_AWAITING_CONFIRMATION, Some(name.to_string())),
            None => (STEP_AWAITING_NAME, None),
        };
        Self {
            user_id: state.user_id,
            chat_id: state.chat_id,
            step: step.to_string(),
            candidate_name,
        }
    }

    pub(crate) fn into_state(self) -> Result<RegistrationState, RepositoryError> {
        match (self.step.as_str(), self.candidate_name) {
            (STEP_AWAITING_NAME, _) => Ok(RegistrationState::awaiting_name(
                self.user_id,
                self.chat_id,
            )),
            (STEP_AWAITING_CONFIRMATION, Some(candidate_name)) => Ok(
                RegistrationState::awaiting_confirmation(self.user_id, self.chat_id, candidate_name),
            ),
            (step, _) => Err(RepositoryError::Unavailable(format!(
                "Corrupt registration state row for user {}: step={}",
                self.user_id, step
            ))),
        }
    }
}

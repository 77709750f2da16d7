//! In-progress registration state, keyed by external user id.
//!
//! A user has at most one active state; absence of a state means the user is idle or already
//! registered. The state is a plain record so it can be persisted externally and the dialogue
//! survives restarts.

use serde::{Deserialize, Serialize};

/// Current step of the registration dialogue.
///
/// The candidate name lives inside `AwaitingConfirmation`, so a confirmation step without a
/// validated name cannot be represented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistrationStep {
    AwaitingName,
    AwaitingConfirmation { candidate_name: String },
}

/// An in-progress registration for exactly one external user id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationState {
    pub user_id: i64,
    pub chat_id: i64,
    pub step: RegistrationStep,
}

impl RegistrationState {
    /// Fresh state at the name-collection step.
    pub fn awaiting_name(user_id: i64, chat_id: i64) -> Self {
        Self {
            user_id,
            chat_id,
            step: RegistrationStep::AwaitingName,
        }
    }

    /// State waiting for the user to confirm a validated candidate name.
    pub fn awaiting_confirmation(user_id: i64, chat_id: i64, candidate_name: String) -> Self {
        Self {
            user_id,
            chat_id,
            step: RegistrationStep::AwaitingConfirmation { candidate_name },
        }
    }

    /// The name pending confirmation, if any.
    pub fn candidate_name(&self) -> Option<&str> {
        match &self.step {
            RegistrationStep::AwaitingConfirmation { candidate_name } => Some(candidate_name),
            RegistrationStep::AwaitingName => None,
        }
    }
}

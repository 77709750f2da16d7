//! Registration handler: runs in the handler chain and drives the engine.
//!
//! `/register` begins (or restarts) the dialogue; any other text is consumed only while the
//! user has an active registration state, otherwise the message falls through to the next
//! handler. Replies are sent through the [`Bot`] abstraction and the last reply text is
//! returned as `HandlerResponse::Reply` for the chain.

use crate::engine::{RegistrationEngine, Transition};
use crate::repo::RegistrationStateStore;
use crate::session::UserGate;
use async_trait::async_trait;
use qbot_core::{Bot, Handler, HandlerError, HandlerResponse, Message, Result};
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Returns true for `/register`, including the `/register@botname` group form.
fn is_register_command(text: &str) -> bool {
    let first = text.split_whitespace().next().unwrap_or("");
    let command = first.split('@').next().unwrap_or("");
    command.eq_ignore_ascii_case("/register")
}

pub struct RegistrationHandler {
    engine: RegistrationEngine,
    states: Arc<dyn RegistrationStateStore>,
    bot: Arc<dyn Bot>,
    gate: UserGate,
}

impl RegistrationHandler {
    pub fn new(
        engine: RegistrationEngine,
        states: Arc<dyn RegistrationStateStore>,
        bot: Arc<dyn Bot>,
    ) -> Self {
        Self {
            engine,
            states,
            bot,
            gate: UserGate::new(),
        }
    }

    /// Persists the transition outcome and sends its replies. Store failures are logged but do
    /// not fail the turn: a stale state is recovered by the idempotent commit on the next
    /// confirmation.
    async fn apply_transition(
        &self,
        message: &Message,
        transition: Transition,
    ) -> Result<HandlerResponse> {
        let store_result = match &transition.state {
            Some(state) => self.states.save(state).await,
            None => self.states.clear(message.user.id).await,
        };
        if let Err(e) = store_result {
            error!(
                user_id = message.user.id,
                error = %e,
                "Failed to persist registration state"
            );
        }

        let mut last_reply = None;
        for reply in transition.replies {
            if let Err(e) = self.bot.reply_to(message, &reply).await {
                error!(user_id = message.user.id, error = %e, "Failed to send reply");
            }
            last_reply = Some(reply);
        }

        match last_reply {
            Some(text) => Ok(HandlerResponse::Reply(text)),
            None => Ok(HandlerResponse::Stop),
        }
    }
}

#[async_trait]
impl Handler for RegistrationHandler {
    #[instrument(skip(self, message))]
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        let text = message.content.as_str();

        if is_register_command(text) {
            let _guard = self.gate.acquire(message.user.id).await;
            info!(user_id = message.user.id, "step: registration begin");
            let transition = self.engine.begin(message.user.id, message.chat.id).await;
            return self.apply_transition(message, transition).await;
        }

        let _guard = self.gate.acquire(message.user.id).await;
        let state = self
            .states
            .load(message.user.id)
            .await
            .map_err(|e| HandlerError::State(e.to_string()))?;

        let state = match state {
            Some(state) => state,
            // Not in a registration dialogue; let the next handler have the message.
            None => return Ok(HandlerResponse::Continue),
        };

        info!(
            user_id = message.user.id,
            step = ?state.step,
            "step: registration advance"
        );
        let transition = self.engine.advance(state, text).await;
        self.apply_transition(message, transition).await
    }
}

//! Command handler: /start and /help. Everything else continues down the chain
//! (registration owns /register and dialogue turns).

use async_trait::async_trait;
use qbot_core::{Bot, Handler, HandlerResponse, Message, Result};
use std::sync::Arc;
use tracing::{error, info, instrument};

const MSG_HELP: &str = "TeleQuest Help:\n\
/start - Start the bot\n\
/register - Create your player\n\
/help - Show this help message";

/// Extracts the leading bot command from text, stripping any `@botname` suffix.
fn command_of(text: &str) -> Option<&str> {
    let first = text.split_whitespace().next()?;
    if !first.starts_with('/') {
        return None;
    }
    first.split('@').next()
}

pub struct CommandHandler {
    bot: Arc<dyn Bot>,
}

impl CommandHandler {
    pub fn new(bot: Arc<dyn Bot>) -> Self {
        Self { bot }
    }

    fn start_reply(message: &Message) -> String {
        let name = message
            .user
            .first_name
            .as_deref()
            .unwrap_or("adventurer");
        format!("Hello, {}! Welcome to TeleQuest.", name)
    }
}

#[async_trait]
impl Handler for CommandHandler {
    #[instrument(skip(self, message))]
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        let reply = match command_of(&message.content) {
            Some("/start") => Self::start_reply(message),
            Some("/help") => MSG_HELP.to_string(),
            _ => return Ok(HandlerResponse::Continue),
        };

        info!(user_id = message.user.id, "step: command reply");
        if let Err(e) = self.bot.reply_to(message, &reply).await {
            error!(user_id = message.user.id, error = %e, "Failed to send command reply");
        }
        Ok(HandlerResponse::Reply(reply))
    }
}

//! Application runner: builds everything from config and starts the REPL.

use anyhow::Result;
use handler_chain::HandlerChain;
use qbot_core::{init_tracing, Message as CoreMessage};
use tracing::{error, info, instrument};

use super::components::{build_bot_components, build_handler_chain, BotComponents};
use super::config::BotConfig;
use super::telegram::run_repl;

/// TelegramBot: config, components, and handler chain. Also drivable from tests without a
/// running REPL via [`TelegramBot::handle_core_message`].
pub struct TelegramBot {
    pub config: BotConfig,
    pub components: BotComponents,
    pub handler_chain: HandlerChain,
}

impl TelegramBot {
    /// Creates a TelegramBot from config: repositories, adapter, and chain.
    pub async fn new(config: BotConfig) -> Result<Self> {
        let components = build_bot_components(&config).await?;
        let handler_chain = build_handler_chain(&components);
        Ok(Self {
            config,
            components,
            handler_chain,
        })
    }

    /// Drives the handler chain with one core message (callable from tests).
    pub async fn handle_core_message(&self, message: &CoreMessage) -> Result<()> {
        info!(
            user_id = message.user.id,
            message_content = %message.content,
            "Handling core message"
        );
        if let Err(e) = self.handler_chain.handle(message).await {
            error!(error = %e, user_id = message.user.id, "Handler chain failed");
        }
        Ok(())
    }
}

/// Main entry: validate config, init logging, build components, then run the REPL.
#[instrument(skip(config))]
pub async fn run_bot(config: BotConfig) -> Result<()> {
    config.validate()?;

    if let Some(parent) = std::path::Path::new(&config.log_file).parent() {
        std::fs::create_dir_all(parent)?;
    }
    init_tracing(config.log_file.as_str())?;

    info!(database_url = %config.database_url, "Initializing bot");

    let components = build_bot_components(&config).await?;
    let handler_chain = build_handler_chain(&components);
    let teloxide_bot = components.teloxide_bot.clone();

    info!("Bot started successfully");

    run_repl(teloxide_bot, handler_chain).await?;

    Ok(())
}

//! Component factory: builds BotComponents from config. Isolates assembly logic from runner.

use anyhow::Result;
use handler_chain::HandlerChain;
use registration::{PlayerRepository, RegistrationEngine, RegistrationHandler, RegistrationStateStore};
use std::sync::Arc;
use storage::{SqlitePlayerRepository, SqlitePoolManager, SqliteRegistrationStore};
use teloxide::prelude::*;
use tracing::{error, info, instrument};

use super::config::BotConfig;
use super::handlers::CommandHandler;
use super::telegram::TelegramBotAdapter;

/// Core dependencies for run_bot / TelegramBot; produced by the component factory.
pub struct BotComponents {
    pub player_repo: Arc<SqlitePlayerRepository>,
    pub state_store: Arc<SqliteRegistrationStore>,
    pub teloxide_bot: Bot,
    pub bot_adapter: Arc<dyn qbot_core::Bot>,
}

/// Builds repositories, the teloxide Bot, and the Bot adapter from config. Both repositories
/// share one SQLite pool (one database file).
#[instrument(skip(config))]
pub async fn build_bot_components(config: &BotConfig) -> Result<BotComponents> {
    let pool_manager = SqlitePoolManager::new(&config.database_url)
        .await
        .map_err(|e| {
            error!(
                error = %e,
                database_url = %config.database_url,
                "Failed to open SQLite database"
            );
            anyhow::anyhow!("Failed to open SQLite database: {}", e)
        })?;

    let player_repo = Arc::new(
        SqlitePlayerRepository::with_pool(pool_manager.clone())
            .await
            .map_err(|e| anyhow::anyhow!("Failed to initialize player storage: {}", e))?,
    );
    let state_store = Arc::new(
        SqliteRegistrationStore::with_pool(pool_manager)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to initialize registration state storage: {}", e))?,
    );

    let teloxide_bot = {
        let bot = Bot::new(config.bot_token.clone());
        if let Some(ref url_str) = config.telegram_api_url {
            match reqwest::Url::parse(url_str) {
                Ok(url) => bot.set_api_url(url),
                Err(e) => {
                    error!(error = %e, url = %url_str, "Invalid TELEGRAM_API_URL, using default");
                    bot
                }
            }
        } else {
            bot
        }
    };

    let bot_adapter: Arc<dyn qbot_core::Bot> =
        Arc::new(TelegramBotAdapter::new(teloxide_bot.clone()));

    info!(database_url = %config.database_url, "Bot components initialized");

    Ok(BotComponents {
        player_repo,
        state_store,
        teloxide_bot,
        bot_adapter,
    })
}

/// Builds the handler chain (commands → registration dialogue).
pub fn build_handler_chain(components: &BotComponents) -> HandlerChain {
    let command_handler = Arc::new(CommandHandler::new(components.bot_adapter.clone()));

    let players: Arc<dyn PlayerRepository> = components.player_repo.clone();
    let states: Arc<dyn RegistrationStateStore> = components.state_store.clone();
    let registration_handler = Arc::new(RegistrationHandler::new(
        RegistrationEngine::new(players),
        states,
        components.bot_adapter.clone(),
    ));

    HandlerChain::new()
        .add_handler(command_handler)
        .add_handler(registration_handler)
}

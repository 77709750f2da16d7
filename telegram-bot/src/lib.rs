//! # Telegram bot application
//!
//! Wires the registration dialogue, storage, and the handler chain into a running Telegram
//! bot. Loads config from env and runs the teloxide REPL; adapters convert teloxide updates
//! into core messages.

pub mod cli;
pub mod components;
pub mod config;
pub mod handlers;
pub mod runner;
pub mod telegram;

pub use cli::{load_config, Cli, Commands};

pub use config::BotConfig;
pub use runner::{run_bot, TelegramBot};

pub use components::{build_bot_components, build_handler_chain, BotComponents};
pub use handlers::CommandHandler;
pub use telegram::{
    run_repl, TelegramBotAdapter, TelegramMessageWrapper, TelegramUserWrapper,
};

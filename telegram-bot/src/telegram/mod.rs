//! Telegram layer: adapters from teloxide types to core types, the [`qbot_core::Bot`]
//! implementation used by handlers, and the REPL runner.

mod adapters;
mod bot_adapter;
mod runner;

pub use adapters::{TelegramMessageWrapper, TelegramUserWrapper};
pub use bot_adapter::TelegramBotAdapter;
pub use runner::run_repl;

//! # qbot-core
//!
//! Core types and traits for the TeleQuest bot: [`Bot`], [`Handler`], message and user types,
//! error types, and tracing initialization. Transport-agnostic; used by handler-chain,
//! registration, and the telegram-bot application.

pub mod bot;
pub mod error;
pub mod logger;
pub mod types;

pub use bot::{Bot, TelegramBot};
pub use error::{HandlerError, QbotError, Result};
pub use logger::init_tracing;
pub use types::{
    Chat, Handler, HandlerResponse, Message, MessageDirection, ToCoreMessage, ToCoreUser, User,
};

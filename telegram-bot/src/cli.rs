//! CLI: run the Telegram bot. Config from env and optional CLI args.

use anyhow::Result;
use clap::{Parser, Subcommand};

use super::config::BotConfig;

#[derive(Parser)]
#[command(name = "qbot")]
#[command(about = "TeleQuest Telegram bot: player registration", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the Telegram bot (config from env; token can override BOT_TOKEN).
    Run {
        #[arg(short, long)]
        token: Option<String>,
    },
}

/// Loads BotConfig, letting an explicit CLI token override the environment.
pub fn load_config(token: Option<String>) -> Result<BotConfig> {
    BotConfig::load(token)
}

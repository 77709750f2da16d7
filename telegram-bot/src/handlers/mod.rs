//! Handler implementations owned by the application (command surface).

mod command_handler;

pub use command_handler::CommandHandler;

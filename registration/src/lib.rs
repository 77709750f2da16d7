//! # Registration
//!
//! The player registration dialogue: a per-user state machine that collects a validated
//! display name, asks for confirmation, allows correction, and commits the player exactly once.
//!
//! ## Modules
//!
//! - [`validator`] – display name validation
//! - [`state`] – RegistrationState / RegistrationStep
//! - [`player`] – Player / NewPlayer domain types
//! - [`repo`] – PlayerRepository and RegistrationStateStore traits
//! - [`engine`] – RegistrationEngine (begin / advance / commit)
//! - [`handler`] – RegistrationHandler for the handler chain
//! - [`session`] – per-user transition gate
//! - [`inmemory`] – in-memory state store and player repository

mod engine;
mod handler;
mod inmemory;
mod player;
mod repo;
mod session;
mod state;
mod validator;

pub use engine::{RegistrationEngine, Transition};
pub use handler::RegistrationHandler;
pub use inmemory::{InMemoryPlayerRepository, InMemoryStateStore};
pub use player::{NewPlayer, Player};
pub use repo::{PlayerRepository, RegistrationStateStore, RepositoryError};
pub use session::UserGate;
pub use state::{RegistrationState, RegistrationStep};
pub use validator::{validate, NameRejection, NAME_MAX_CHARS, NAME_MIN_CHARS};

//! Storage crate: SQLite persistence for players and registration states.
//!
//! ## Modules
//!
//! - [`models`] – database row types
//! - [`player_repo`] – SqlitePlayerRepository
//! - [`registration_store`] – SqliteRegistrationStore
//! - [`sqlite_pool`] – SqlitePoolManager
//!
//! Both repositories implement the traits from the registration crate, so the engine never
//! sees sqlx.

mod models;
mod player_repo;
mod registration_store;
mod sqlite_pool;

pub use player_repo::SqlitePlayerRepository;
pub use registration_store::SqliteRegistrationStore;
pub use sqlite_pool::SqlitePoolManager;

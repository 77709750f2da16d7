//! Repository traits consumed by the engine and handler.
//!
//! Implementations live elsewhere (SQLite in the storage crate, in-memory in [`crate::inmemory`]);
//! the engine only sees these seams.

use crate::player::{NewPlayer, Player};
use crate::state::RegistrationState;
use async_trait::async_trait;
use thiserror::Error;

/// Errors surfaced by repositories and state stores.
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// A player already exists for this external user id (unique constraint).
    #[error("Duplicate external user id: {0}")]
    Duplicate(String),
    /// The backing store failed; the operation may be retried.
    #[error("Repository unavailable: {0}")]
    Unavailable(String),
}

/// Create/lookup of players by external user id.
#[async_trait]
pub trait PlayerRepository: Send + Sync {
    async fn find_by_external_user_id(
        &self,
        external_user_id: &str,
    ) -> Result<Option<Player>, RepositoryError>;

    /// Creates a player. Fails with [`RepositoryError::Duplicate`] when one already exists for
    /// the same external user id.
    async fn create(&self, new_player: NewPlayer) -> Result<Player, RepositoryError>;
}

/// Persistence of in-progress registration states, keyed by external user id.
#[async_trait]
pub trait RegistrationStateStore: Send + Sync {
    async fn load(&self, user_id: i64) -> Result<Option<RegistrationState>, RepositoryError>;
    /// Inserts or replaces the state for its user id.
    async fn save(&self, state: &RegistrationState) -> Result<(), RepositoryError>;
    async fn clear(&self, user_id: i64) -> Result<(), RepositoryError>;
}

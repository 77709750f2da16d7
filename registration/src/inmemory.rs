//! In-memory stores: registration states and players.
//!
//! Default stores for a single-process bot and for tests. Nothing survives a restart; wire the
//! SQLite implementations from the storage crate when durability matters.

use crate::player::{NewPlayer, Player};
use crate::repo::{PlayerRepository, RegistrationStateStore, RepositoryError};
use crate::state::RegistrationState;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// HashMap-backed [`RegistrationStateStore`].
#[derive(Default)]
pub struct InMemoryStateStore {
    states: RwLock<HashMap<i64, RegistrationState>>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RegistrationStateStore for InMemoryStateStore {
    async fn load(&self, user_id: i64) -> Result<Option<RegistrationState>, RepositoryError> {
        Ok(self.states.read().await.get(&user_id).cloned())
    }

    async fn save(&self, state: &RegistrationState) -> Result<(), RepositoryError> {
        self.states
            .write()
            .await
            .insert(state.user_id, state.clone());
        Ok(())
    }

    async fn clear(&self, user_id: i64) -> Result<(), RepositoryError> {
        self.states.write().await.remove(&user_id);
        Ok(())
    }
}

/// HashMap-backed [`PlayerRepository`] with sequential ids and the same uniqueness guarantee
/// as the SQLite implementation.
#[derive(Default)]
pub struct InMemoryPlayerRepository {
    players: RwLock<HashMap<String, Player>>,
}

impl InMemoryPlayerRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PlayerRepository for InMemoryPlayerRepository {
    async fn find_by_external_user_id(
        &self,
        external_user_id: &str,
    ) -> Result<Option<Player>, RepositoryError> {
        Ok(self.players.read().await.get(external_user_id).cloned())
    }

    async fn create(&self, new_player: NewPlayer) -> Result<Player, RepositoryError> {
        let mut players = self.players.write().await;
        if players.contains_key(&new_player.external_user_id) {
            return Err(RepositoryError::Duplicate(new_player.external_user_id));
        }
        let now = Utc::now();
        let player = Player {
            id: players.len() as i64 + 1,
            name: new_player.name,
            external_user_id: new_player.external_user_id.clone(),
            external_chat_id: new_player.external_chat_id,
            created_at: now,
            updated_at: now,
        };
        players.insert(new_player.external_user_id, player.clone());
        Ok(player)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_load_clear_roundtrip() {
        let store = InMemoryStateStore::new();
        assert_eq!(store.load(1).await.unwrap(), None);

        let state = RegistrationState::awaiting_name(1, 10);
        store.save(&state).await.unwrap();
        assert_eq!(store.load(1).await.unwrap(), Some(state.clone()));

        // Save replaces the previous state for the same user
        let confirmed = RegistrationState::awaiting_confirmation(1, 10, "Alice".to_string());
        store.save(&confirmed).await.unwrap();
        assert_eq!(store.load(1).await.unwrap(), Some(confirmed));

        store.clear(1).await.unwrap();
        assert_eq!(store.load(1).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_states_are_per_user() {
        let store = InMemoryStateStore::new();
        store
            .save(&RegistrationState::awaiting_name(1, 10))
            .await
            .unwrap();
        store
            .save(&RegistrationState::awaiting_name(2, 20))
            .await
            .unwrap();

        store.clear(1).await.unwrap();
        assert_eq!(store.load(1).await.unwrap(), None);
        assert!(store.load(2).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_player_repository_enforces_uniqueness() {
        let repo = InMemoryPlayerRepository::new();
        let new_player = NewPlayer {
            name: "Alice".to_string(),
            external_user_id: "123".to_string(),
            external_chat_id: "456".to_string(),
        };

        let created = repo.create(new_player.clone()).await.unwrap();
        assert_eq!(created.name, "Alice");

        let err = repo.create(new_player).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Duplicate(_)));

        let found = repo.find_by_external_user_id("123").await.unwrap();
        assert_eq!(found.map(|p| p.name), Some("Alice".to_string()));
    }
}

//! Durable registration state store, keyed by external user id.
//!
//! One row per user; save replaces the previous row, so the dialogue always has at most one
//! state per user and survives a process restart.

use crate::models::RegistrationStateRow;
use crate::sqlite_pool::SqlitePoolManager;
use async_trait::async_trait;
use chrono::Utc;
use registration::{RegistrationState, RegistrationStateStore, RepositoryError};
use tracing::info;

#[derive(Clone)]
pub struct SqliteRegistrationStore {
    pool_manager: SqlitePoolManager,
}

impl SqliteRegistrationStore {
    pub async fn new(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool_manager = SqlitePoolManager::new(database_url).await?;
        Self::with_pool(pool_manager).await
    }

    /// Builds the store on a shared pool (e.g. one database file for all repos).
    pub async fn with_pool(pool_manager: SqlitePoolManager) -> Result<Self, sqlx::Error> {
        let store = Self { pool_manager };
        store.init().await?;
        Ok(store)
    }

    async fn init(&self) -> Result<(), sqlx::Error> {
        info!("Creating registration_states table if not exists");

        let pool = self.pool_manager.pool();

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS registration_states (
                user_id INTEGER PRIMARY KEY,
                chat_id INTEGER NOT NULL,
                step TEXT NOT NULL,
                candidate_name TEXT,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl RegistrationStateStore for SqliteRegistrationStore {
    async fn load(&self, user_id: i64) -> Result<Option<RegistrationState>, RepositoryError> {
        let pool = self.pool_manager.pool();

        let row: Option<RegistrationStateRow> = sqlx::query_as(
            "SELECT user_id, chat_id, step, candidate_name FROM registration_states WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await
        .map_err(|e| RepositoryError::Unavailable(e.to_string()))?;

        row.map(RegistrationStateRow::into_state).transpose()
    }

    async fn save(&self, state: &RegistrationState) -> Result<(), RepositoryError> {
        let pool = self.pool_manager.pool();
        let row = RegistrationStateRow::from_state(state);

        sqlx::query(
            r#"
            INSERT OR REPLACE INTO registration_states
                (user_id, chat_id, step, candidate_name, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(row.user_id)
        .bind(row.chat_id)
        .bind(&row.step)
        .bind(&row.candidate_name)
        .bind(Utc::now())
        .execute(pool)
        .await
        .map_err(|e| RepositoryError::Unavailable(e.to_string()))?;

        Ok(())
    }

    async fn clear(&self, user_id: i64) -> Result<(), RepositoryError> {
        let pool = self.pool_manager.pool();

        sqlx::query("DELETE FROM registration_states WHERE user_id = ?")
            .bind(user_id)
            .execute(pool)
            .await
            .map_err(|e| RepositoryError::Unavailable(e.to_string()))?;

        Ok(())
    }
}

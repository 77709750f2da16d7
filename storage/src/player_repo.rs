//! Player repository: persistence and lookup of registered players.
//!
//! The `external_user_id` column carries a UNIQUE constraint; a violated insert surfaces as
//! [`RepositoryError::Duplicate`], which the engine treats as registration already completed.

use crate::models::PlayerRow;
use crate::sqlite_pool::SqlitePoolManager;
use async_trait::async_trait;
use chrono::Utc;
use registration::{NewPlayer, Player, PlayerRepository, RepositoryError};
use tracing::info;

#[derive(Clone)]
pub struct SqlitePlayerRepository {
    pool_manager: SqlitePoolManager,
}

impl SqlitePlayerRepository {
    pub async fn new(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool_manager = SqlitePoolManager::new(database_url).await?;
        Self::with_pool(pool_manager).await
    }

    /// Builds the repository on a shared pool (e.g. one database file for all repos).
    pub async fn with_pool(pool_manager: SqlitePoolManager) -> Result<Self, sqlx::Error> {
        let repo = Self { pool_manager };
        repo.init().await?;
        Ok(repo)
    }

    async fn init(&self) -> Result<(), sqlx::Error> {
        info!("Creating players table if not exists");

        let pool = self.pool_manager.pool();

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS players (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                external_user_id TEXT NOT NULL UNIQUE,
                external_chat_id TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_players_external_user_id
                ON players(external_user_id);
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}

fn map_sqlx_error(e: sqlx::Error, external_user_id: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db) = e {
        if db.is_unique_violation() {
            return RepositoryError::Duplicate(external_user_id.to_string());
        }
    }
    RepositoryError::Unavailable(e.to_string())
}

#[async_trait]
impl PlayerRepository for SqlitePlayerRepository {
    async fn find_by_external_user_id(
        &self,
        external_user_id: &str,
    ) -> Result<Option<Player>, RepositoryError> {
        let pool = self.pool_manager.pool();

        let row: Option<PlayerRow> =
            sqlx::query_as("SELECT * FROM players WHERE external_user_id = ?")
                .bind(external_user_id)
                .fetch_optional(pool)
                .await
                .map_err(|e| RepositoryError::Unavailable(e.to_string()))?;

        Ok(row.map(Player::from))
    }

    async fn create(&self, new_player: NewPlayer) -> Result<Player, RepositoryError> {
        let pool = self.pool_manager.pool();
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO players (name, external_user_id, external_chat_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&new_player.name)
        .bind(&new_player.external_user_id)
        .bind(&new_player.external_chat_id)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await
        .map_err(|e| map_sqlx_error(e, &new_player.external_user_id))?;

        let player = Player {
            id: result.last_insert_rowid(),
            name: new_player.name,
            external_user_id: new_player.external_user_id,
            external_chat_id: new_player.external_chat_id,
            created_at: now,
            updated_at: now,
        };

        info!(
            player_id = player.id,
            external_user_id = %player.external_user_id,
            "Saved player: name={}",
            player.name
        );
        Ok(player)
    }
}

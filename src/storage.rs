use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Row, Sqlite, SqlitePool};
use std::path::Path;

use crate::config;
use crate::errors::AppResult;

/// Storage key the web application writes the issued token under.
pub const ACCESS_TOKEN_KEY: &str = "access_token";

/// Persistent key-value store for credentials issued by the web application.
///
/// The store is handed to whoever needs it rather than kept in a global, so
/// tests can run against an in-memory database.
pub struct CredentialStore {
    pool: Pool<Sqlite>,
}

impl CredentialStore {
    pub async fn open_default() -> AppResult<Self> {
        let data_dir = config::get_data_directory()?;
        let db_path = data_dir.join("credentials.db");

        // SQLite will not create the file on connect
        if !db_path.exists() {
            log::info!("Creating credential store at {}", db_path.display());
            std::fs::File::create(&db_path)?;
        }

        Self::open(&db_path).await
    }

    pub async fn open(path: &Path) -> AppResult<Self> {
        let database_url = format!("sqlite:{}", path.display());
        log::debug!("Connecting to credential store: {}", database_url);

        let pool = SqlitePool::connect(&database_url).await?;
        let store = Self { pool };
        store.init_schema().await?;

        Ok(store)
    }

    /// In-memory store for tests. Capped at one connection so every query
    /// sees the same database.
    pub async fn open_in_memory() -> AppResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        let store = Self { pool };
        store.init_schema().await?;

        Ok(store)
    }

    async fn init_schema(&self) -> AppResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS credentials (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TRIGGER IF NOT EXISTS update_credential_timestamp
            AFTER UPDATE ON credentials
            BEGIN
                UPDATE credentials SET updated_at = CURRENT_TIMESTAMP WHERE key = NEW.key;
            END
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let row = sqlx::query("SELECT value FROM credentials WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| r.get("value")))
    }

    pub async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO credentials (key, value) VALUES (?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn delete(&self, key: &str) -> AppResult<()> {
        sqlx::query("DELETE FROM credentials WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Read the stored access token. An empty value counts as no credential,
    /// matching how the web client treats the storage entry.
    pub async fn access_token(&self) -> AppResult<Option<String>> {
        Ok(self
            .get(ACCESS_TOKEN_KEY)
            .await?
            .filter(|token| !token.is_empty()))
    }

    pub async fn set_access_token(&self, token: &str) -> AppResult<()> {
        self.set(ACCESS_TOKEN_KEY, token).await?;
        log::info!("Access token stored");
        Ok(())
    }

    pub async fn clear_access_token(&self) -> AppResult<()> {
        self.delete(ACCESS_TOKEN_KEY).await?;
        log::info!("Access token cleared");
        Ok(())
    }

    /// When the access token entry was last written, if one exists.
    pub async fn token_updated_at(&self) -> AppResult<Option<DateTime<Utc>>> {
        let row = sqlx::query("SELECT updated_at FROM credentials WHERE key = ?")
            .bind(ACCESS_TOKEN_KEY)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| {
            let naive: NaiveDateTime = r.get("updated_at");
            DateTime::from_naive_utc_and_offset(naive, Utc)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_returns_none_for_missing_key() {
        let store = CredentialStore::open_in_memory().await.unwrap();
        assert_eq!(store.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_then_get_round_trips() {
        let store = CredentialStore::open_in_memory().await.unwrap();

        store.set("some_key", "some value").await.unwrap();
        assert_eq!(
            store.get("some_key").await.unwrap(),
            Some("some value".to_string())
        );
    }

    #[tokio::test]
    async fn test_set_overwrites_existing_value() {
        let store = CredentialStore::open_in_memory().await.unwrap();

        store.set_access_token("first").await.unwrap();
        store.set_access_token("second").await.unwrap();

        assert_eq!(
            store.access_token().await.unwrap(),
            Some("second".to_string())
        );
    }

    #[tokio::test]
    async fn test_empty_token_counts_as_absent() {
        let store = CredentialStore::open_in_memory().await.unwrap();

        store.set_access_token("").await.unwrap();

        assert_eq!(store.access_token().await.unwrap(), None);
        // The raw entry is still there
        assert_eq!(
            store.get(ACCESS_TOKEN_KEY).await.unwrap(),
            Some(String::new())
        );
    }

    #[tokio::test]
    async fn test_clear_removes_token() {
        let store = CredentialStore::open_in_memory().await.unwrap();

        store.set_access_token("abc123").await.unwrap();
        store.clear_access_token().await.unwrap();

        assert_eq!(store.access_token().await.unwrap(), None);
        assert_eq!(store.token_updated_at().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_clearing_missing_token_is_not_an_error() {
        let store = CredentialStore::open_in_memory().await.unwrap();
        assert!(store.clear_access_token().await.is_ok());
    }

    #[tokio::test]
    async fn test_token_updated_at_is_set_on_write() {
        let store = CredentialStore::open_in_memory().await.unwrap();

        store.set_access_token("abc123").await.unwrap();

        assert!(store.token_updated_at().await.unwrap().is_some());
    }
}

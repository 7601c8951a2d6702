use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

use super::LocalCache;
use crate::error::AppError;

/// Key-value cache stored in a local SQLite database.
pub struct SqliteCache {
    db: SqlitePool,
}

impl SqliteCache {
    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        let db = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(database_url)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )
            "#,
        )
        .execute(&db)
        .await?;

        Ok(Self { db })
    }

    pub async fn in_memory() -> Result<Self, AppError> {
        Self::connect("sqlite::memory:").await
    }
}

#[async_trait]
impl LocalCache for SqliteCache {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM kv WHERE key = ?1")
                .bind(key)
                .fetch_optional(&self.db)
                .await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO kv (key, value) VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.db)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::FAVOURITES_KEY;

    #[tokio::test]
    async fn set_overwrites_previous_value() {
        let cache = SqliteCache::in_memory().await.expect("open cache");

        assert_eq!(cache.get(FAVOURITES_KEY).await.expect("get"), None);

        cache.set(FAVOURITES_KEY, "[]").await.expect("set");
        cache
            .set(FAVOURITES_KEY, r#"[{"id":"c1"}]"#)
            .await
            .expect("set");

        assert_eq!(
            cache.get(FAVOURITES_KEY).await.expect("get").as_deref(),
            Some(r#"[{"id":"c1"}]"#)
        );
    }
}

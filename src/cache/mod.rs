pub mod memory;
pub mod sqlite;

pub use memory::MemoryCache;
pub use sqlite::SqliteCache;

use async_trait::async_trait;

use crate::error::AppError;

/// Cache key holding the JSON-encoded array of favourited course snapshots.
pub static FAVOURITES_KEY: &str = "favourites";

/// On-device key-value persistence, usable without network access.
#[async_trait]
pub trait LocalCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), AppError>;
}

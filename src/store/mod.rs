pub mod firestore;
pub mod memory;

pub use firestore::{FirestoreClient, FirestoreConfig};
pub use memory::MemoryStore;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::AppError;

pub static COURSES_COLLECTION: &str = "courses";
pub static COURSE_WORKS_COLLECTION: &str = "courseWorks";
pub static SUBMISSIONS_COLLECTION: &str = "submissions";
pub static USERS_COLLECTION: &str = "users";

/// Per-user subcollection of course enrollments, keyed by course id.
pub fn enrollments_of(uid: &str) -> String {
    format!("{USERS_COLLECTION}/{uid}/enrollments")
}

/// Per-user subcollection of bookmarked courses, keyed by course id.
pub fn favourites_of(uid: &str) -> String {
    format!("{USERS_COLLECTION}/{uid}/favourites")
}

/// Equality filter on a single document field.
#[derive(Debug, Clone)]
pub struct Filter {
    pub field: String,
    pub equals: Value,
}

impl Filter {
    pub fn eq(field: &str, value: impl Into<Value>) -> Self {
        Self {
            field: field.to_string(),
            equals: value.into(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OrderBy {
    pub field: &'static str,
    pub descending: bool,
}

impl OrderBy {
    pub fn desc(field: &'static str) -> Self {
        Self {
            field,
            descending: true,
        }
    }

    pub fn asc(field: &'static str) -> Self {
        Self {
            field,
            descending: false,
        }
    }
}

/// Collection-oriented port to the remote document store.
///
/// Collections are slash-joined paths (`users/u1/enrollments`). Documents
/// are JSON objects; the document id is not stored inside the document but
/// is injected as an `"id"` field on every read. Transport failures map to
/// `AppError::Transient`.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Inserts with a store-generated id and returns it.
    async fn insert(&self, collection: &str, doc: Value) -> Result<String, AppError>;

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, AppError>;

    async fn query(
        &self,
        collection: &str,
        filters: &[Filter],
        order_by: Option<OrderBy>,
    ) -> Result<Vec<Value>, AppError>;

    /// Idempotent full replace, used for keyed per-user resources.
    async fn upsert(&self, collection: &str, id: &str, doc: Value) -> Result<(), AppError>;

    /// Partial merge of the given top-level fields.
    async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<(), AppError>;

    async fn delete(&self, collection: &str, id: &str) -> Result<(), AppError>;
}

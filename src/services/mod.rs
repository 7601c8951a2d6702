pub mod admin;
pub mod courses;
pub mod enrollments;
pub mod favourites;
pub mod submissions;
pub mod works;

pub use admin::AdminService;
pub use courses::CourseService;
pub use enrollments::EnrollmentService;
pub use favourites::FavouritesService;
pub use submissions::{SubmissionService, SubmitOutcome};
pub use works::WorkService;

use serde::Serialize;
use serde_json::Value;

use crate::error::AppError;

/// Serializes an entity for the remote store, dropping the `id` field: the
/// document id lives in the document name, not the payload.
pub(crate) fn to_document<T: Serialize>(entity: &T) -> Result<Value, AppError> {
    let mut value = serde_json::to_value(entity)?;
    if let Some(map) = value.as_object_mut() {
        map.remove("id");
    }
    Ok(value)
}

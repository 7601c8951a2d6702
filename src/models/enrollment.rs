use serde::{Deserialize, Serialize};

use super::Course;

/// Point-in-time copy of a course taken when the student enrolled.
///
/// This is a snapshot, not a foreign key: later edits to the course are
/// deliberately not reflected here. Stored under
/// `users/{uid}/enrollments/{courseId}`, so the (user, course) pair is
/// unique by key construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    #[serde(flatten)]
    pub course: Course,
    pub enrolled_at: String,
}

impl Enrollment {
    pub fn snapshot(course: &Course, enrolled_at: String) -> Self {
        Self {
            course: course.clone(),
            enrolled_at,
        }
    }
}

use serde::{Deserialize, Serialize};

/// Assigned coursework. Append-only once published; the due date is
/// advisory and not enforced at submit time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseWork {
    #[serde(default)]
    pub id: String,
    pub course_id: String,
    #[serde(default)]
    pub course_title: String,
    pub teacher_id: String,
    #[serde(default)]
    pub teacher_name: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub due_date: String,
    #[serde(default)]
    pub created_at: String,
}

use serde::{Deserialize, Serialize};

/// `Submitted -> Graded`, with `Graded` terminal. Re-grading overwrites the
/// grade fields in place; there is no resubmission or rejection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Submitted,
    Graded,
}

/// A student's answer to one coursework item. The work and student fields
/// are denormalized so grading screens need no joins. `file_url` is an
/// opaque reference; attachment storage is not managed here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    #[serde(default)]
    pub id: String,
    pub work_id: String,
    #[serde(default)]
    pub work_title: String,
    pub course_id: String,
    #[serde(default)]
    pub course_title: String,
    pub student_id: String,
    #[serde(default)]
    pub student_name: String,
    #[serde(default)]
    pub student_email: String,
    #[serde(default)]
    pub text_answer: String,
    #[serde(default)]
    pub file_url: String,
    pub submitted_at: String,
    pub status: SubmissionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graded_at: Option<String>,
}

impl Submission {
    /// Document id for the (work, student) pair. Keying submissions this way
    /// makes the one-submission-per-assignment invariant a property of the
    /// storage layer, not just of the pre-insert check.
    pub fn composite_id(work_id: &str, student_id: &str) -> String {
        format!("{work_id}_{student_id}")
    }
}

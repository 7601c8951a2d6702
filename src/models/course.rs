use serde::{Deserialize, Serialize};

/// Lifecycle label shown in the catalog, set by whoever manages the course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CourseStatus {
    #[default]
    Active,
    Popular,
    Upcoming,
}

/// Catalog entry. `price` is in minor currency units; `students` is the
/// denormalized enrolled count. Field names match the remote documents,
/// which use camelCase.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub price: i64,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub students: i64,
    #[serde(default)]
    pub status: CourseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher_id: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCourseRequest {
    pub title: String,
    pub code: String,
    pub description: String,
    pub category: String,
    pub price: i64,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub status: CourseStatus,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCourseRequest {
    pub title: Option<String>,
    pub code: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Option<i64>,
    pub thumbnail: Option<String>,
    pub duration: Option<String>,
    pub status: Option<CourseStatus>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn course_round_trips_camel_case() {
        let json = serde_json::json!({
            "id": "c1",
            "title": "Introduction to Computer Science",
            "code": "CS101",
            "description": "Fundamentals",
            "category": "Computer Science",
            "price": 15000,
            "thumbnail": "https://example.com/cs.png",
            "duration": "12 weeks",
            "rating": 4.8,
            "students": 1250,
            "status": "Popular",
            "teacherId": "t1",
            "createdAt": "2025-01-01T00:00:00Z"
        });

        let course: Course = serde_json::from_value(json).expect("decode course");
        assert_eq!(course.code, "CS101");
        assert_eq!(course.status, CourseStatus::Popular);
        assert_eq!(course.teacher_id.as_deref(), Some("t1"));

        let back = serde_json::to_value(&course).expect("encode course");
        assert_eq!(back["teacherId"], "t1");
        assert_eq!(back["status"], "Popular");
        // Absent optionals stay off the wire.
        assert!(back.get("startDate").is_none());
    }

    #[test]
    fn status_defaults_to_active() {
        let course: Course =
            serde_json::from_value(serde_json::json!({ "title": "Bare" })).expect("decode");
        assert_eq!(course.status, CourseStatus::Active);
    }
}

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use super::to_document;
use crate::error::AppError;
use crate::models::{Actor, Course, Enrollment};
use crate::policy::{self, Action, Role};
use crate::store::{OrderBy, RemoteStore, enrollments_of};

/// Enrollment workflow. Enrollments are remote-authoritative: there is no
/// local-only enrolled state.
pub struct EnrollmentService {
    store: Arc<dyn RemoteStore>,
}

impl EnrollmentService {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self { store }
    }

    /// Enrolls the actor in `course`, snapshotting the course fields as they
    /// are right now. Enrolling twice is an idempotent success: the existing
    /// record is returned unchanged.
    pub async fn enroll(&self, actor: &Actor, course: &Course) -> Result<Enrollment, AppError> {
        if actor.role == Role::Admin {
            return Err(AppError::Authorization(
                "admins do not enroll in courses".to_string(),
            ));
        }
        policy::require(actor, Action::Enroll, None)?;

        let collection = enrollments_of(&actor.uid);
        if let Some(existing) = self.store.get(&collection, &course.id).await? {
            info!("already enrolled: user {} course {}", actor.uid, course.id);
            return Ok(serde_json::from_value(existing)?);
        }

        let enrollment = Enrollment::snapshot(course, Utc::now().to_rfc3339());
        self.store
            .upsert(&collection, &course.id, to_document(&enrollment)?)
            .await?;
        info!("enrolled: user {} course {}", actor.uid, course.id);
        Ok(enrollment)
    }

    pub async fn list(&self, uid: &str) -> Result<Vec<Enrollment>, AppError> {
        let docs = self
            .store
            .query(&enrollments_of(uid), &[], Some(OrderBy::desc("enrolledAt")))
            .await?;
        docs.into_iter()
            .map(|doc| serde_json::from_value(doc).map_err(AppError::from))
            .collect()
    }

    pub async fn is_enrolled(&self, uid: &str, course_id: &str) -> Result<bool, AppError> {
        Ok(self
            .store
            .get(&enrollments_of(uid), course_id)
            .await?
            .is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CourseStatus;
    use crate::store::MemoryStore;

    fn course(id: &str, price: i64) -> Course {
        Course {
            id: id.into(),
            title: "CS101".into(),
            code: "CS101".into(),
            description: String::new(),
            category: "Computer Science".into(),
            price,
            thumbnail: String::new(),
            duration: "12 weeks".into(),
            rating: 4.8,
            students: 100,
            status: CourseStatus::Active,
            start_date: None,
            end_date: None,
            teacher_id: Some("t1".into()),
            created_at: "2025-01-01T00:00:00Z".into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn enroll_twice_is_an_idempotent_no_op() {
        let store = Arc::new(MemoryStore::new());
        let svc = EnrollmentService::new(store.clone());
        let student = Actor::new("u1", Role::Student, "u1@example.com");

        let first = svc.enroll(&student, &course("c1", 15000)).await.expect("enroll");
        assert_eq!(first.course.price, 15000);

        // Price changed since; the second call must return the original
        // snapshot, not re-enroll.
        let second = svc.enroll(&student, &course("c1", 99999)).await.expect("enroll");
        assert_eq!(second.course.price, 15000);
        assert_eq!(second.enrolled_at, first.enrolled_at);

        assert_eq!(store.count(&enrollments_of("u1")), 1);
    }

    #[tokio::test]
    async fn snapshot_is_a_point_in_time_copy() {
        let svc = EnrollmentService::new(Arc::new(MemoryStore::new()));
        let student = Actor::new("u1", Role::Student, "u1@example.com");

        svc.enroll(&student, &course("c1", 15000)).await.expect("enroll");

        let enrollments = svc.list("u1").await.expect("list");
        assert_eq!(enrollments.len(), 1);
        assert_eq!(enrollments[0].course.id, "c1");
        assert_eq!(enrollments[0].course.price, 15000);
        assert!(svc.is_enrolled("u1", "c1").await.expect("check"));
        assert!(!svc.is_enrolled("u1", "c2").await.expect("check"));
    }

    #[tokio::test]
    async fn admins_may_not_enroll() {
        let svc = EnrollmentService::new(Arc::new(MemoryStore::new()));
        let admin = Actor::new("a1", Role::Admin, "a1@example.com");

        let err = svc
            .enroll(&admin, &course("c1", 15000))
            .await
            .expect_err("deny");
        assert!(matches!(err, AppError::Authorization(_)));
    }

    #[tokio::test]
    async fn remote_failure_surfaces_as_transient() {
        let store = Arc::new(MemoryStore::new());
        let svc = EnrollmentService::new(store.clone());
        let student = Actor::new("u1", Role::Student, "u1@example.com");

        store.set_offline(true);
        let err = svc
            .enroll(&student, &course("c1", 15000))
            .await
            .expect_err("offline");
        assert!(err.is_retryable());
    }
}

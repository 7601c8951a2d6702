use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tracing::info;

use super::to_document;
use crate::error::AppError;
use crate::models::{Actor, Course, NewCourseRequest, UpdateCourseRequest};
use crate::policy::{self, Action, Role};
use crate::store::{COURSES_COLLECTION, RemoteStore};

/// Catalog queries plus admin/teacher course CRUD.
///
/// Read paths take no actor: anonymous users may browse the catalog.
pub struct CourseService {
    store: Arc<dyn RemoteStore>,
}

impl CourseService {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<Course>, AppError> {
        let docs = self.store.query(COURSES_COLLECTION, &[], None).await?;
        docs.into_iter()
            .map(|doc| serde_json::from_value(doc).map_err(AppError::from))
            .collect()
    }

    pub async fn get(&self, id: &str) -> Result<Course, AppError> {
        let doc = self
            .store
            .get(COURSES_COLLECTION, id)
            .await?
            .ok_or(AppError::NotFound)?;
        Ok(serde_json::from_value(doc)?)
    }

    /// Case-insensitive match against title, description, category and code.
    pub async fn search(&self, query: &str) -> Result<Vec<Course>, AppError> {
        let needle = query.to_lowercase();
        let mut courses = self.list().await?;
        courses.retain(|c| {
            c.title.to_lowercase().contains(&needle)
                || c.description.to_lowercase().contains(&needle)
                || c.category.to_lowercase().contains(&needle)
                || c.code.to_lowercase().contains(&needle)
        });
        Ok(courses)
    }

    pub async fn by_category(&self, category: &str) -> Result<Vec<Course>, AppError> {
        let wanted = category.to_lowercase();
        let mut courses = self.list().await?;
        courses.retain(|c| c.category.to_lowercase() == wanted);
        Ok(courses)
    }

    pub async fn create(
        &self,
        actor: &Actor,
        req: NewCourseRequest,
    ) -> Result<Course, AppError> {
        policy::require(actor, Action::CreateCourse, None)?;
        validate_price(req.price)?;
        validate_dates(req.start_date.as_deref(), req.end_date.as_deref())?;

        let mut course = Course {
            id: String::new(),
            title: req.title,
            code: req.code,
            description: req.description,
            category: req.category,
            price: req.price,
            thumbnail: req.thumbnail,
            duration: req.duration,
            // New courses start unrated and empty.
            rating: 0.0,
            students: 0,
            status: req.status,
            start_date: req.start_date,
            end_date: req.end_date,
            teacher_id: (actor.role == Role::Teacher).then(|| actor.uid.clone()),
            created_at: Utc::now().to_rfc3339(),
            updated_at: None,
        };

        let id = self
            .store
            .insert(COURSES_COLLECTION, to_document(&course)?)
            .await?;
        course.id = id;
        info!("course created: {} ({})", course.title, course.id);
        Ok(course)
    }

    pub async fn update(
        &self,
        actor: &Actor,
        id: &str,
        req: UpdateCourseRequest,
    ) -> Result<Course, AppError> {
        let mut course = self.get(id).await?;
        policy::require(actor, Action::UpdateCourse, course.teacher_id.as_deref())?;

        let mut patch = Map::new();
        if let Some(title) = req.title {
            patch.insert("title".into(), Value::String(title.clone()));
            course.title = title;
        }
        if let Some(code) = req.code {
            patch.insert("code".into(), Value::String(code.clone()));
            course.code = code;
        }
        if let Some(description) = req.description {
            patch.insert("description".into(), Value::String(description.clone()));
            course.description = description;
        }
        if let Some(category) = req.category {
            patch.insert("category".into(), Value::String(category.clone()));
            course.category = category;
        }
        if let Some(price) = req.price {
            patch.insert("price".into(), Value::from(price));
            course.price = price;
        }
        if let Some(thumbnail) = req.thumbnail {
            patch.insert("thumbnail".into(), Value::String(thumbnail.clone()));
            course.thumbnail = thumbnail;
        }
        if let Some(duration) = req.duration {
            patch.insert("duration".into(), Value::String(duration.clone()));
            course.duration = duration;
        }
        if let Some(status) = req.status {
            patch.insert("status".into(), serde_json::to_value(status)?);
            course.status = status;
        }
        if let Some(start_date) = req.start_date {
            patch.insert("startDate".into(), Value::String(start_date.clone()));
            course.start_date = Some(start_date);
        }
        if let Some(end_date) = req.end_date {
            patch.insert("endDate".into(), Value::String(end_date.clone()));
            course.end_date = Some(end_date);
        }

        validate_price(course.price)?;
        validate_dates(course.start_date.as_deref(), course.end_date.as_deref())?;

        let now = Utc::now().to_rfc3339();
        patch.insert("updatedAt".into(), Value::String(now.clone()));
        course.updated_at = Some(now);

        self.store
            .update(COURSES_COLLECTION, id, Value::Object(patch))
            .await?;
        Ok(course)
    }

    pub async fn delete(&self, actor: &Actor, id: &str) -> Result<(), AppError> {
        let course = self.get(id).await?;
        policy::require(actor, Action::DeleteCourse, course.teacher_id.as_deref())?;
        self.store.delete(COURSES_COLLECTION, id).await?;
        info!("course deleted: {id}");
        Ok(())
    }
}

fn validate_price(price: i64) -> Result<(), AppError> {
    if price < 0 {
        return Err(AppError::Validation(format!(
            "price must be non-negative, got {price}"
        )));
    }
    Ok(())
}

fn validate_dates(start: Option<&str>, end: Option<&str>) -> Result<(), AppError> {
    let parse = |label: &str, raw: &str| {
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|_| AppError::Validation(format!("invalid {label} date: {raw}")))
    };
    if let (Some(start), Some(end)) = (start, end) {
        let start = parse("start", start)?;
        let end = parse("end", end)?;
        if end <= start {
            return Err(AppError::Validation(
                "end date must be after start date".to_string(),
            ));
        }
    } else if let Some(start) = start {
        parse("start", start)?;
    } else if let Some(end) = end {
        parse("end", end)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn service() -> CourseService {
        CourseService::new(Arc::new(MemoryStore::new()))
    }

    fn teacher() -> Actor {
        Actor::new("t1", Role::Teacher, "teacher@example.com")
    }

    fn admin() -> Actor {
        Actor::new("a1", Role::Admin, "admin@example.com")
    }

    fn new_course() -> NewCourseRequest {
        NewCourseRequest {
            title: "Introduction to Computer Science".into(),
            code: "CS101".into(),
            description: "Programming, algorithms, data structures".into(),
            category: "Computer Science".into(),
            price: 15000,
            thumbnail: String::new(),
            duration: "12 weeks".into(),
            status: Default::default(),
            start_date: None,
            end_date: None,
        }
    }

    #[tokio::test]
    async fn create_stamps_defaults_and_owner() {
        let svc = service();
        let course = svc.create(&teacher(), new_course()).await.expect("create");

        assert!(!course.id.is_empty());
        assert_eq!(course.rating, 0.0);
        assert_eq!(course.students, 0);
        assert_eq!(course.teacher_id.as_deref(), Some("t1"));

        // Admin-created courses have no owning teacher.
        let course = svc.create(&admin(), new_course()).await.expect("create");
        assert_eq!(course.teacher_id, None);
    }

    #[tokio::test]
    async fn student_cannot_create_a_course() {
        let svc = service();
        let student = Actor::new("u1", Role::Student, "u1@example.com");
        let err = svc.create(&student, new_course()).await.expect_err("deny");
        assert!(matches!(err, AppError::Authorization(_)));
    }

    #[tokio::test]
    async fn update_is_owner_scoped() {
        let svc = service();
        let course = svc.create(&teacher(), new_course()).await.expect("create");

        let patch = UpdateCourseRequest {
            price: Some(18000),
            ..Default::default()
        };
        let updated = svc
            .update(&teacher(), &course.id, patch.clone())
            .await
            .expect("owner update");
        assert_eq!(updated.price, 18000);
        assert!(updated.updated_at.is_some());

        let other = Actor::new("t2", Role::Teacher, "t2@example.com");
        let err = svc
            .update(&other, &course.id, patch.clone())
            .await
            .expect_err("deny");
        assert!(matches!(err, AppError::Authorization(_)));

        // Admins may update anyone's course.
        svc.update(&admin(), &course.id, patch)
            .await
            .expect("admin update");
    }

    #[tokio::test]
    async fn rejects_negative_price_and_inverted_dates() {
        let svc = service();
        let mut req = new_course();
        req.price = -1;
        let err = svc.create(&teacher(), req).await.expect_err("deny");
        assert!(matches!(err, AppError::Validation(_)));

        let mut req = new_course();
        req.start_date = Some("2025-06-01T00:00:00Z".into());
        req.end_date = Some("2025-01-01T00:00:00Z".into());
        let err = svc.create(&teacher(), req).await.expect_err("deny");
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn search_matches_all_text_fields() {
        let svc = service();
        svc.create(&admin(), new_course()).await.expect("create");

        assert_eq!(svc.search("cs101").await.expect("search").len(), 1);
        assert_eq!(svc.search("algorithms").await.expect("search").len(), 1);
        assert_eq!(svc.search("knitting").await.expect("search").len(), 0);
        assert_eq!(
            svc.by_category("computer science").await.expect("query").len(),
            1
        );
    }

    #[tokio::test]
    async fn delete_requires_ownership_or_admin() {
        let svc = service();
        let course = svc.create(&teacher(), new_course()).await.expect("create");

        let other = Actor::new("t2", Role::Teacher, "t2@example.com");
        let err = svc.delete(&other, &course.id).await.expect_err("deny");
        assert!(matches!(err, AppError::Authorization(_)));

        svc.delete(&teacher(), &course.id).await.expect("delete");
        assert!(matches!(
            svc.get(&course.id).await.expect_err("gone"),
            AppError::NotFound
        ));
    }
}

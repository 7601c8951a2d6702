use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use super::to_document;
use crate::error::AppError;
use crate::models::{Actor, Course, CourseWork};
use crate::policy::{self, Action};
use crate::store::{COURSE_WORKS_COLLECTION, Filter, OrderBy, RemoteStore};

/// Coursework publishing. Published work is append-only: there is no edit
/// or delete path.
pub struct WorkService {
    store: Arc<dyn RemoteStore>,
}

impl WorkService {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self { store }
    }

    /// Publishes a coursework item against `course`. Any teacher may publish
    /// against any course; titles need not be unique within a course.
    pub async fn publish(
        &self,
        actor: &Actor,
        course: &Course,
        title: &str,
        description: &str,
        due_date: &str,
    ) -> Result<CourseWork, AppError> {
        policy::require(actor, Action::PublishWork, None)?;

        let title = title.trim();
        if title.is_empty() {
            return Err(AppError::Validation("title must not be empty".to_string()));
        }
        let description = description.trim();
        if description.is_empty() {
            return Err(AppError::Validation(
                "description must not be empty".to_string(),
            ));
        }
        DateTime::parse_from_rfc3339(due_date)
            .map_err(|_| AppError::Validation(format!("invalid due date: {due_date}")))?;

        let mut work = CourseWork {
            id: String::new(),
            course_id: course.id.clone(),
            course_title: course.title.clone(),
            teacher_id: actor.uid.clone(),
            teacher_name: actor.name().to_string(),
            title: title.to_string(),
            description: description.to_string(),
            due_date: due_date.to_string(),
            created_at: Utc::now().to_rfc3339(),
        };

        let id = self
            .store
            .insert(COURSE_WORKS_COLLECTION, to_document(&work)?)
            .await?;
        work.id = id;
        info!("coursework published: {} for course {}", work.id, work.course_id);
        Ok(work)
    }

    pub async fn get(&self, id: &str) -> Result<CourseWork, AppError> {
        let doc = self
            .store
            .get(COURSE_WORKS_COLLECTION, id)
            .await?
            .ok_or(AppError::NotFound)?;
        Ok(serde_json::from_value(doc)?)
    }

    /// Coursework for one course, newest first.
    pub async fn list_by_course(&self, course_id: &str) -> Result<Vec<CourseWork>, AppError> {
        self.query(Filter::eq("courseId", course_id)).await
    }

    /// Everything a teacher has published, newest first.
    pub async fn list_by_teacher(&self, teacher_id: &str) -> Result<Vec<CourseWork>, AppError> {
        self.query(Filter::eq("teacherId", teacher_id)).await
    }

    async fn query(&self, filter: Filter) -> Result<Vec<CourseWork>, AppError> {
        let docs = self
            .store
            .query(
                COURSE_WORKS_COLLECTION,
                &[filter],
                Some(OrderBy::desc("createdAt")),
            )
            .await?;
        docs.into_iter()
            .map(|doc| serde_json::from_value(doc).map_err(AppError::from))
            .collect()
    }
}

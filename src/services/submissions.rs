use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::info;

use super::to_document;
use crate::error::AppError;
use crate::models::{Actor, CourseWork, Submission, SubmissionStatus};
use crate::policy::{self, Action};
use crate::store::{
    COURSE_WORKS_COLLECTION, Filter, OrderBy, RemoteStore, SUBMISSIONS_COLLECTION, enrollments_of,
};

/// Result of a submit call. `late` is advisory: submissions after the due
/// date are accepted, the caller decides how to surface it.
#[derive(Debug)]
pub struct SubmitOutcome {
    pub submission: Submission,
    pub late: bool,
}

/// Submission intake and the `Submitted -> Graded` transition.
pub struct SubmissionService {
    store: Arc<dyn RemoteStore>,
}

impl SubmissionService {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self { store }
    }

    /// Files the actor's answer for `work`. At most one submission may exist
    /// per (student, work); a duplicate attempt is a `Conflict` and the
    /// caller should route the user to the existing submission.
    ///
    /// The pre-insert existence check is read-then-write and so racy under
    /// concurrent calls for the same pair; the caller serializes them. The
    /// composite document id keeps even a lost race from duplicating.
    pub async fn submit(
        &self,
        actor: &Actor,
        work: &CourseWork,
        text_answer: &str,
        file_url: &str,
    ) -> Result<SubmitOutcome, AppError> {
        policy::require(actor, Action::SubmitWork, None)?;

        let text_answer = text_answer.trim();
        let file_url = file_url.trim();
        if text_answer.is_empty() && file_url.is_empty() {
            return Err(AppError::Validation(
                "submission needs a text answer or a file".to_string(),
            ));
        }

        if self
            .store
            .get(&enrollments_of(&actor.uid), &work.course_id)
            .await?
            .is_none()
        {
            return Err(AppError::Authorization(format!(
                "student {} is not enrolled in course {}",
                actor.uid, work.course_id
            )));
        }

        let id = Submission::composite_id(&work.id, &actor.uid);
        if self.store.get(SUBMISSIONS_COLLECTION, &id).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "work {} already submitted by {}",
                work.id, actor.uid
            )));
        }

        let now = Utc::now();
        let late = DateTime::parse_from_rfc3339(&work.due_date)
            .map(|due| now > due)
            .unwrap_or(false);

        let submission = Submission {
            id: id.clone(),
            work_id: work.id.clone(),
            work_title: work.title.clone(),
            course_id: work.course_id.clone(),
            course_title: work.course_title.clone(),
            student_id: actor.uid.clone(),
            student_name: actor.name().to_string(),
            student_email: actor.email.clone(),
            text_answer: text_answer.to_string(),
            file_url: file_url.to_string(),
            submitted_at: now.to_rfc3339(),
            status: SubmissionStatus::Submitted,
            grade: None,
            feedback: None,
            graded_at: None,
        };

        self.store
            .upsert(SUBMISSIONS_COLLECTION, &id, to_document(&submission)?)
            .await?;
        info!(
            "submission filed: work {} student {} late={late}",
            work.id, actor.uid
        );
        Ok(SubmitOutcome { submission, late })
    }

    /// Grades a submission. Only the teacher who authored the coursework may
    /// grade it. Re-grading overwrites the previous grade and feedback.
    pub async fn grade(
        &self,
        actor: &Actor,
        submission_id: &str,
        grade: &str,
        feedback: &str,
    ) -> Result<Submission, AppError> {
        let doc = self
            .store
            .get(SUBMISSIONS_COLLECTION, submission_id)
            .await?
            .ok_or(AppError::NotFound)?;
        let mut submission: Submission = serde_json::from_value(doc)?;

        let grade = grade.trim();
        if grade.is_empty() {
            return Err(AppError::Validation("grade must not be empty".to_string()));
        }

        let work_doc = self
            .store
            .get(COURSE_WORKS_COLLECTION, &submission.work_id)
            .await?
            .ok_or(AppError::NotFound)?;
        let work: CourseWork = serde_json::from_value(work_doc)?;
        policy::require(actor, Action::GradeSubmission, Some(&work.teacher_id))?;

        let feedback = feedback.trim();
        let feedback = (!feedback.is_empty()).then(|| feedback.to_string());
        let graded_at = Utc::now().to_rfc3339();

        self.store
            .update(
                SUBMISSIONS_COLLECTION,
                submission_id,
                json!({
                    "status": SubmissionStatus::Graded,
                    "grade": grade,
                    "feedback": &feedback,
                    "gradedAt": &graded_at,
                }),
            )
            .await?;

        submission.status = SubmissionStatus::Graded;
        submission.grade = Some(grade.to_string());
        submission.feedback = feedback;
        submission.graded_at = Some(graded_at);
        info!("submission graded: {} by {}", submission_id, actor.uid);
        Ok(submission)
    }

    /// A student's submissions, newest first.
    pub async fn list_by_student(&self, student_id: &str) -> Result<Vec<Submission>, AppError> {
        self.query(Filter::eq("studentId", student_id)).await
    }

    /// All submissions for one coursework item, newest first.
    pub async fn list_by_work(&self, work_id: &str) -> Result<Vec<Submission>, AppError> {
        self.query(Filter::eq("workId", work_id)).await
    }

    async fn query(&self, filter: Filter) -> Result<Vec<Submission>, AppError> {
        let docs = self
            .store
            .query(
                SUBMISSIONS_COLLECTION,
                &[filter],
                Some(OrderBy::desc("submittedAt")),
            )
            .await?;
        docs.into_iter()
            .map(|doc| serde_json::from_value(doc).map_err(AppError::from))
            .collect()
    }
}

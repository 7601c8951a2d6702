use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::Actor;

/// User role as stored in the `users` collection. Accounts without a role
/// document default to `Student`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Student,
    Teacher,
    Admin,
}

impl Role {
    /// Maps the raw role string from the auth collaborator. Missing or
    /// unrecognized roles fall back to `Student`.
    pub fn parse(value: Option<&str>) -> Role {
        match value {
            Some("admin") => Role::Admin,
            Some("teacher") => Role::Teacher,
            _ => Role::Student,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Student => write!(f, "student"),
            Role::Teacher => write!(f, "teacher"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreateCourse,
    UpdateCourse,
    DeleteCourse,
    PublishWork,
    GradeSubmission,
    Enroll,
    SubmitWork,
    ToggleFavourite,
    ManageRoles,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::CreateCourse => "create course",
            Action::UpdateCourse => "update course",
            Action::DeleteCourse => "delete course",
            Action::PublishWork => "publish course work",
            Action::GradeSubmission => "grade submission",
            Action::Enroll => "enroll",
            Action::SubmitWork => "submit work",
            Action::ToggleFavourite => "toggle favourite",
            Action::ManageRoles => "manage roles",
        };
        write!(f, "{name}")
    }
}

/// Pure authorization check.
///
/// `resource_owner_id` is the owning user of the resource being acted on
/// (course owner for updates/deletes, work author for grading). Owner-scoped
/// actions deny when the owner is unknown.
///
/// Teachers may publish course work against any course, not only their own;
/// this mirrors the product's current (possibly unintentionally permissive)
/// behavior and must not be silently restricted here.
pub fn can_perform(
    role: Role,
    action: Action,
    resource_owner_id: Option<&str>,
    actor_id: &str,
) -> bool {
    use Action::*;

    match role {
        Role::Admin => matches!(
            action,
            CreateCourse | UpdateCourse | DeleteCourse | ManageRoles | ToggleFavourite
        ),
        Role::Teacher => match action {
            CreateCourse | PublishWork | Enroll | ToggleFavourite => true,
            UpdateCourse | DeleteCourse | GradeSubmission => {
                resource_owner_id.is_some_and(|owner| owner == actor_id)
            }
            _ => false,
        },
        Role::Student => matches!(action, Enroll | SubmitWork | ToggleFavourite),
    }
}

/// Policy gate used by the workflow services: denial is an `Authorization`
/// error, never a silent no-op.
pub fn require(
    actor: &Actor,
    action: Action,
    resource_owner_id: Option<&str>,
) -> Result<(), AppError> {
    if can_perform(actor.role, action, resource_owner_id, &actor.uid) {
        Ok(())
    } else {
        Err(AppError::Authorization(format!(
            "{} {} may not {}",
            actor.role, actor.uid, action
        )))
    }
}

use std::sync::Arc;

use serde_json::json;
use tracing::{info, warn};

use crate::error::AppError;
use crate::models::{Actor, UserProfile};
use crate::policy::{self, Action, Role};
use crate::store::{RemoteStore, USERS_COLLECTION};

/// Admin-only account management: listing users and reassigning roles.
pub struct AdminService {
    store: Arc<dyn RemoteStore>,
}

impl AdminService {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self { store }
    }

    pub async fn list_users(&self, actor: &Actor) -> Result<Vec<UserProfile>, AppError> {
        policy::require(actor, Action::ManageRoles, None)?;
        let docs = self.store.query(USERS_COLLECTION, &[], None).await?;
        docs.into_iter()
            .map(|doc| serde_json::from_value(doc).map_err(AppError::from))
            .collect()
    }

    /// Reassigns a user's role. Nothing stops an admin from demoting itself,
    /// even down to zero remaining admins; that case is logged but allowed.
    pub async fn set_role(&self, actor: &Actor, uid: &str, role: Role) -> Result<(), AppError> {
        policy::require(actor, Action::ManageRoles, None)?;

        self.store
            .get(USERS_COLLECTION, uid)
            .await?
            .ok_or(AppError::NotFound)?;

        if actor.uid == uid && role != Role::Admin {
            warn!("admin {} is demoting itself to {role}", actor.uid);
        }

        self.store
            .update(USERS_COLLECTION, uid, json!({ "role": role }))
            .await?;
        info!("role of {uid} set to {role} by {}", actor.uid);
        Ok(())
    }
}

use serde::{Deserialize, Serialize};

use crate::policy::Role;

/// The identity performing an operation, as supplied by the external auth
/// collaborator. A missing role defaults to `Student`.
#[derive(Debug, Clone)]
pub struct Actor {
    pub uid: String,
    pub role: Role,
    pub email: String,
    pub display_name: Option<String>,
}

impl Actor {
    pub fn new(uid: impl Into<String>, role: Role, email: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            role,
            email: email.into(),
            display_name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Display name, falling back to the email address.
    pub fn name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.email)
    }
}

/// Account document in the `users` collection, managed by admins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, alias = "id")]
    pub uid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: Role,
}

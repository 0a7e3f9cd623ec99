use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::fmt;
use super::UnknownVariant;
use crate::error::AppError;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    /// Registered as an administrator, waiting for an existing admin to decide.
    /// Has no admin or volunteer rights until then.
    #[serde(rename = "ADMIN_PENDING")]
    PendingAdmin,
    Volunteer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::PendingAdmin => "ADMIN_PENDING",
            Role::Volunteer => "VOLUNTEER",
        }
    }

    /// Role after an admin approves or denies a pending request.
    /// Approval grants admin; denial leaves an ordinary volunteer account.
    pub fn resolve_pending(self, approve: bool) -> Result<Role, AppError> {
        match (self, approve) {
            (Role::PendingAdmin, true) => Ok(Role::Admin),
            (Role::PendingAdmin, false) => Ok(Role::Volunteer),
            (Role::Admin, _) => Err(AppError::Validation("User is already an admin".into())),
            (Role::Volunteer, _) => Err(AppError::Validation("User has no pending admin request".into())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Role {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "ADMIN" => Ok(Role::Admin),
            "ADMIN_PENDING" => Ok(Role::PendingAdmin),
            "VOLUNTEER" => Ok(Role::Volunteer),
            _ => Err(UnknownVariant { kind: "role", value }),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: String, password_hash: String, role: Role) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.trim().to_lowercase(),
            password_hash,
            role,
            created_at: Utc::now(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

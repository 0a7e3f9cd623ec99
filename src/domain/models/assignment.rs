use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;
use crate::error::AppError;
use super::{user::Role, UnknownVariant};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentStatus {
    Assigned,
    Registered,
    Completed,
}

/// Who is asking for a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Volunteer,
    Admin,
    /// The background completion sweep.
    System,
}

impl From<Role> for Actor {
    fn from(role: Role) -> Self {
        match role {
            Role::Admin => Actor::Admin,
            Role::Volunteer | Role::PendingAdmin => Actor::Volunteer,
        }
    }
}

impl AssignmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentStatus::Assigned => "assigned",
            AssignmentStatus::Registered => "registered",
            AssignmentStatus::Completed => "completed",
        }
    }

    /// Assigned or registered: the volunteer currently holds a place at the event.
    pub fn is_active(&self) -> bool {
        matches!(self, AssignmentStatus::Assigned | AssignmentStatus::Registered)
    }

    /// Validates one edge of the status machine and returns the new status.
    ///
    /// `assigned <-> registered` belongs to the volunteer. `completed` is reached
    /// from either active status by an admin or the sweep once the event date has
    /// passed, and has no outgoing edges.
    pub fn transition(
        self,
        to: AssignmentStatus,
        actor: Actor,
        event_date: NaiveDate,
        today: NaiveDate,
    ) -> Result<AssignmentStatus, AppError> {
        use AssignmentStatus::*;

        match (self, to) {
            (Completed, _) => Err(AppError::InvalidTransition(format!(
                "completed assignment cannot move to {}", to
            ))),
            (Assigned, Registered) | (Registered, Assigned) => match actor {
                Actor::Volunteer => Ok(to),
                _ => Err(AppError::Forbidden("Only the volunteer can change registration".into())),
            },
            (Assigned, Completed) | (Registered, Completed) => {
                if actor == Actor::Volunteer {
                    return Err(AppError::Forbidden("Volunteers cannot complete assignments".into()));
                }
                if event_date >= today {
                    return Err(AppError::InvalidTransition(format!(
                        "event on {} has not passed yet", event_date
                    )));
                }
                Ok(Completed)
            }
            (from, to) => Err(AppError::InvalidTransition(format!("{} -> {}", from, to))),
        }
    }
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for AssignmentStatus {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "assigned" => Ok(AssignmentStatus::Assigned),
            "registered" => Ok(AssignmentStatus::Registered),
            "completed" => Ok(AssignmentStatus::Completed),
            _ => Err(UnknownVariant { kind: "assignment status", value }),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Assignment {
    pub id: String,
    pub event_id: String,
    pub volunteer_id: String,
    #[sqlx(try_from = "String")]
    pub status: AssignmentStatus,
    pub hours_volunteered: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Assignment {
    pub fn new(event_id: String, volunteer_id: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            event_id,
            volunteer_id,
            status: AssignmentStatus::Assigned,
            hours_volunteered: None,
            created_at: now,
            updated_at: now,
        }
    }
}

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

pub const KIND_ASSIGNED: &str = "ASSIGNED";
pub const KIND_EVENT_UPDATED: &str = "EVENT_UPDATED";

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    pub event_id: Option<String>,
    pub kind: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(user_id: String, event_id: Option<String>, kind: &str, message: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            event_id,
            kind: kind.to_string(),
            message,
            is_read: false,
            created_at: Utc::now(),
        }
    }
}

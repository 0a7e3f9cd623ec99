use crate::domain::models::{
    user::{Role, User}, profile::VolunteerProfile, event::EventRecord,
    assignment::{Assignment, AssignmentStatus}, notification::Notification,
    reference::{Skill, UsState},
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::NaiveDate;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &User) -> Result<User, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError>;
    async fn list_by_role(&self, role: Role) -> Result<Vec<User>, AppError>;
    /// Compare-and-set on the current role. `None` when the row no longer holds `from`.
    async fn update_role(&self, id: &str, from: Role, to: Role) -> Result<Option<User>, AppError>;
}

#[async_trait]
pub trait ReferenceRepository: Send + Sync {
    async fn list_skills(&self) -> Result<Vec<Skill>, AppError>;
    async fn list_states(&self) -> Result<Vec<UsState>, AppError>;
}

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<VolunteerProfile>, AppError>;
    async fn list(&self) -> Result<Vec<VolunteerProfile>, AppError>;
    /// Inserts or replaces the profile together with its skill and availability sets.
    async fn upsert(&self, profile: &VolunteerProfile) -> Result<VolunteerProfile, AppError>;
}

#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn create(&self, event: &EventRecord) -> Result<EventRecord, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<EventRecord>, AppError>;
    async fn list(&self) -> Result<Vec<EventRecord>, AppError>;
    async fn list_upcoming(&self, today: NaiveDate) -> Result<Vec<EventRecord>, AppError>;
    async fn list_past(&self, today: NaiveDate) -> Result<Vec<EventRecord>, AppError>;
    async fn update(&self, event: &EventRecord) -> Result<EventRecord, AppError>;
}

#[async_trait]
pub trait AssignmentRepository: Send + Sync {
    /// Inserts the assignment unless one exists for the same (event, volunteer) pair.
    /// Returns the stored row and whether this call created it.
    async fn insert_if_absent(&self, assignment: &Assignment) -> Result<(Assignment, bool), AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Assignment>, AppError>;
    async fn find_by_pair(&self, event_id: &str, volunteer_id: &str) -> Result<Option<Assignment>, AppError>;
    async fn list(&self) -> Result<Vec<Assignment>, AppError>;
    async fn list_by_volunteer(&self, volunteer_id: &str) -> Result<Vec<Assignment>, AppError>;
    async fn list_active_by_event(&self, event_id: &str) -> Result<Vec<Assignment>, AppError>;
    /// Compare-and-set on the current status. `None` when the row no longer holds `from`.
    async fn update_status(&self, id: &str, from: AssignmentStatus, to: AssignmentStatus) -> Result<Option<Assignment>, AppError>;
    /// Marks every active assignment of an event dated before `today` as completed.
    async fn complete_before(&self, today: NaiveDate) -> Result<u64, AppError>;
}

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn create(&self, notification: &Notification) -> Result<Notification, AppError>;
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Notification>, AppError>;
    async fn mark_read(&self, user_id: &str, id: &str) -> Result<(), AppError>;
}

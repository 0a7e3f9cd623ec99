pub mod sqlite_user_repo;
pub mod sqlite_reference_repo;
pub mod sqlite_profile_repo;
pub mod sqlite_event_repo;
pub mod sqlite_assignment_repo;
pub mod sqlite_notification_repo;

pub mod postgres_user_repo;
pub mod postgres_reference_repo;
pub mod postgres_profile_repo;
pub mod postgres_event_repo;
pub mod postgres_assignment_repo;
pub mod postgres_notification_repo;

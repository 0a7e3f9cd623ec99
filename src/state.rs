use std::sync::Arc;
use crate::domain::ports::{
    UserRepository, ReferenceRepository, ProfileRepository, EventRepository,
    AssignmentRepository, NotificationRepository,
};
use crate::domain::services::{auth_service::AuthService, assignment_service::AssignmentService};
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub user_repo: Arc<dyn UserRepository>,
    pub reference_repo: Arc<dyn ReferenceRepository>,
    pub profile_repo: Arc<dyn ProfileRepository>,
    pub event_repo: Arc<dyn EventRepository>,
    pub assignment_repo: Arc<dyn AssignmentRepository>,
    pub notification_repo: Arc<dyn NotificationRepository>,
    pub auth_service: Arc<AuthService>,
    pub assignment_service: Arc<AssignmentService>,
}

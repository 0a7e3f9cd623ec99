pub mod assignment_service;
pub mod auth_service;
pub mod event_validation;
pub mod matching;
pub mod profile_validation;
pub mod validation;

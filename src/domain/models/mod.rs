pub mod assignment;
pub mod auth;
pub mod event;
pub mod notification;
pub mod profile;
pub mod reference;
pub mod user;

use thiserror::Error;

/// Raised when a stored enum column holds a value this build does not know.
#[derive(Debug, Error)]
#[error("unknown {kind} value: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

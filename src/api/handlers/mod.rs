pub mod admin;
pub mod assignment;
pub mod auth;
pub mod event;
pub mod health;
pub mod history;
pub mod matching;
pub mod notification;
pub mod profile;
pub mod reference;

use chrono::{NaiveDate, Utc};

/// Calendar date the request is evaluated against.
pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}

use crate::domain::models::{assignment::AssignmentStatus, event::Urgency, reference::SkillId};
use crate::domain::services::{matching::{MatchQuery, SortOrder}, validation};
use crate::error::AppError;
use serde::Deserialize;
use std::collections::BTreeSet;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    /// "volunteer" (default) or "admin"; an admin request starts out pending.
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Query string of the volunteer event listing. `dates` and `skills` are comma separated.
#[derive(Deserialize, Default)]
pub struct VisibleEventsQuery {
    pub dates: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zipcode: Option<String>,
    pub urgency: Option<String>,
    pub skills: Option<String>,
    pub sort: Option<String>,
}

impl VisibleEventsQuery {
    pub fn into_match_query(self) -> Result<(MatchQuery, SortOrder), AppError> {
        let dates = split_list(self.dates.as_deref())
            .map(|d| validation::calendar_date(d).map_err(|e| AppError::Validation(format!("dates: {}", e))))
            .collect::<Result<BTreeSet<_>, _>>()?;

        let skills = split_list(self.skills.as_deref())
            .map(|s| s.parse::<SkillId>().map_err(|_| AppError::Validation(format!("skills: '{}' is not a skill id", s))))
            .collect::<Result<BTreeSet<_>, _>>()?;

        let urgency = match self.urgency.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
            Some(u) => Some(u.parse::<Urgency>().map_err(|e| AppError::Validation(e.to_string()))?),
            None => None,
        };

        let sort = match self.sort.as_deref().map(str::trim) {
            None | Some("") | Some("urgency") => SortOrder::Urgency,
            Some("date") => SortOrder::Date,
            Some(other) => return Err(AppError::Validation(format!("Unknown sort order: {}", other))),
        };

        let query = MatchQuery {
            dates,
            city: self.city,
            state: self.state.map(|s| s.trim().to_uppercase()),
            zipcode: self.zipcode.map(|z| z.trim().replace('-', "")),
            urgency,
            skills,
        };
        Ok((query, sort))
    }
}

fn split_list(value: Option<&str>) -> impl Iterator<Item = &str> {
    value.unwrap_or_default().split(',').map(str::trim).filter(|s| !s.is_empty())
}

#[derive(Deserialize)]
pub struct MatchingQuery {
    pub event_id: String,
}

#[derive(Deserialize)]
pub struct AssignRequest {
    pub event_id: String,
    pub volunteer_id: String,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: AssignmentStatus,
}

use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use std::collections::BTreeSet;
use super::reference::SkillId;

/// A volunteer's profile. `id` is the owning user's id.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct VolunteerProfile {
    pub id: String,
    pub full_name: String,
    pub address1: String,
    pub address2: Option<String>,
    pub city: String,
    pub state: String,
    pub zipcode: String,
    pub preferences: Option<String>,
    #[sqlx(skip)]
    pub skills: BTreeSet<SkillId>,
    #[sqlx(skip)]
    pub availability: BTreeSet<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VolunteerProfile {
    pub fn has_skill(&self, skill: SkillId) -> bool {
        self.skills.contains(&skill)
    }

    pub fn is_available_on(&self, date: NaiveDate) -> bool {
        self.availability.contains(&date)
    }
}

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use crate::domain::models::{profile::VolunteerProfile, reference::{Skill, SkillId, UsState}};
use crate::error::AppError;
use super::validation::{self, FieldErrors};

/// Profile form as submitted. Every field is optional so PATCH can send a subset.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProfileDraft {
    pub full_name: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zipcode: Option<String>,
    pub preferences: Option<String>,
    pub skills: Option<Vec<SkillId>>,
    pub availability: Option<Vec<String>>,
}

impl From<&VolunteerProfile> for ProfileDraft {
    fn from(p: &VolunteerProfile) -> Self {
        Self {
            full_name: Some(p.full_name.clone()),
            address1: Some(p.address1.clone()),
            address2: p.address2.clone(),
            city: Some(p.city.clone()),
            state: Some(p.state.clone()),
            zipcode: Some(p.zipcode.clone()),
            preferences: p.preferences.clone(),
            skills: Some(p.skills.iter().copied().collect()),
            availability: Some(p.availability.iter().map(|d| d.format("%Y-%m-%d").to_string()).collect()),
        }
    }
}

impl ProfileDraft {
    /// Fields present in `self` win; the rest come from `base`.
    pub fn merged_over(self, base: ProfileDraft) -> ProfileDraft {
        ProfileDraft {
            full_name: self.full_name.or(base.full_name),
            address1: self.address1.or(base.address1),
            address2: self.address2.or(base.address2),
            city: self.city.or(base.city),
            state: self.state.or(base.state),
            zipcode: self.zipcode.or(base.zipcode),
            preferences: self.preferences.or(base.preferences),
            skills: self.skills.or(base.skills),
            availability: self.availability.or(base.availability),
        }
    }
}

/// Validates a draft against the reference data and builds the profile for `user_id`.
/// `existing` keeps the original creation time on updates.
pub fn validate_profile(
    user_id: &str,
    draft: &ProfileDraft,
    states: &[UsState],
    skills: &[Skill],
    existing: Option<&VolunteerProfile>,
) -> Result<VolunteerProfile, AppError> {
    let mut errors = FieldErrors::default();

    let full_name = errors.check("full_name", validation::required(draft.full_name.as_deref(), 50));
    let address1 = errors.check("address1", validation::required(draft.address1.as_deref(), 100));
    let address2 = errors.check("address2", validation::optional(draft.address2.as_deref(), 100));
    let city = errors.check("city", validation::required(draft.city.as_deref(), 100));
    let state = errors.check("state", validation::state_code(draft.state.as_deref(), states));
    let zipcode = errors.check("zipcode", validation::normalize_zip(draft.zipcode.as_deref()));
    let skill_set = errors.check("skills", validation::skill_ids(draft.skills.as_deref(), skills));
    let availability = errors.check("availability", availability(draft.availability.as_deref()));
    let preferences = draft.preferences.as_deref().map(str::trim).filter(|p| !p.is_empty()).map(String::from);

    match (full_name, address1, address2, city, state, zipcode, skill_set, availability) {
        (Some(full_name), Some(address1), Some(address2), Some(city), Some(state), Some(zipcode), Some(skills), Some(availability))
            if errors.is_empty() =>
        {
            let now = Utc::now();
            Ok(VolunteerProfile {
                id: user_id.to_string(),
                full_name,
                address1,
                address2,
                city,
                state,
                zipcode,
                preferences,
                skills,
                availability,
                created_at: existing.map_or(now, |p| p.created_at),
                updated_at: now,
            })
        }
        _ => Err(errors.into_result().err().unwrap_or(AppError::Internal)),
    }
}

fn availability(dates: Option<&[String]>) -> Result<BTreeSet<NaiveDate>, String> {
    let dates = dates.unwrap_or_default();
    let parsed = dates.iter().map(|d| validation::calendar_date(d)).collect::<Result<BTreeSet<_>, _>>()?;
    if parsed.is_empty() {
        return Err("At least one availability date required.".to_string());
    }
    Ok(parsed)
}

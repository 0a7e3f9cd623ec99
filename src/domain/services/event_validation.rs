use serde::{Deserialize, Serialize};
use crate::domain::models::{
    event::{EventRecord, Location, NewEventParams, Urgency},
    reference::{Skill, SkillId, UsState},
};
use crate::error::AppError;
use super::validation::{self, FieldErrors};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EventDraft {
    pub name: Option<String>,
    pub description: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zipcode: Option<String>,
    pub urgency: Option<String>,
    pub date: Option<String>,
    pub required_skills: Option<Vec<SkillId>>,
}

impl From<&EventRecord> for EventDraft {
    fn from(e: &EventRecord) -> Self {
        Self {
            name: Some(e.name.clone()),
            description: Some(e.description.clone()),
            city: Some(e.location.city.clone()),
            state: Some(e.location.state.clone()),
            zipcode: Some(e.location.zipcode.clone()),
            urgency: Some(e.urgency.to_string()),
            date: Some(e.date.format("%Y-%m-%d").to_string()),
            required_skills: Some(e.required_skills.iter().copied().collect()),
        }
    }
}

impl EventDraft {
    pub fn merged_over(self, base: EventDraft) -> EventDraft {
        EventDraft {
            name: self.name.or(base.name),
            description: self.description.or(base.description),
            city: self.city.or(base.city),
            state: self.state.or(base.state),
            zipcode: self.zipcode.or(base.zipcode),
            urgency: self.urgency.or(base.urgency),
            date: self.date.or(base.date),
            required_skills: self.required_skills.or(base.required_skills),
        }
    }
}

pub fn validate_event(draft: &EventDraft, states: &[UsState], skills: &[Skill]) -> Result<NewEventParams, AppError> {
    let mut errors = FieldErrors::default();

    let name = errors.check("name", validation::required(draft.name.as_deref(), 100));
    let description = errors.check("description", validation::required(draft.description.as_deref(), 512));
    let city = errors.check("city", validation::required(draft.city.as_deref(), 100));
    let state = errors.check("state", validation::state_code(draft.state.as_deref(), states));
    let zipcode = errors.check("zipcode", validation::normalize_zip(draft.zipcode.as_deref()));
    let urgency = errors.check("urgency", match draft.urgency.as_deref() {
        Some(u) => u.parse::<Urgency>().map_err(|_| "Urgency must be Low, Medium or High".to_string()),
        None => Err("Required".to_string()),
    });
    let date = errors.check("date", match draft.date.as_deref() {
        Some(d) => validation::calendar_date(d),
        None => Err("Required".to_string()),
    });
    let required_skills = errors.check("required_skills", validation::skill_ids(draft.required_skills.as_deref(), skills));

    match (name, description, city, state, zipcode, urgency, date, required_skills) {
        (Some(name), Some(description), Some(city), Some(state), Some(zipcode), Some(urgency), Some(date), Some(required_skills))
            if errors.is_empty() =>
        {
            Ok(NewEventParams {
                name,
                description,
                location: Location { city, state, zipcode },
                required_skills,
                urgency,
                date,
            })
        }
        _ => Err(errors.into_result().err().unwrap_or(AppError::Internal)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_draft_validates() {
        let states = vec![UsState { code: "TX".to_string(), name: "Texas".to_string() }];
        let skills = vec![Skill { id: 1, name: "Leadership".to_string() }];
        let draft = EventDraft {
            name: Some("Food Drive".to_string()),
            description: Some("Sort donations".to_string()),
            city: Some("Austin".to_string()),
            state: Some("TX".to_string()),
            zipcode: Some("73301".to_string()),
            urgency: Some("high".to_string()),
            date: Some("2025-07-11T08:00:00".to_string()),
            required_skills: Some(vec![1]),
        };

        let params = validate_event(&draft, &states, &skills).unwrap();
        assert_eq!(params.urgency, Urgency::High);
        assert_eq!(params.date.to_string(), "2025-07-11");

        let bad = EventDraft { urgency: Some("urgent".to_string()), required_skills: None, ..draft };
        match validate_event(&bad, &states, &skills) {
            Err(AppError::InvalidFields(fields)) => {
                assert!(fields.contains_key("urgency"));
                assert!(fields.contains_key("required_skills"));
            }
            other => panic!("expected field errors, got {:?}", other.map(|p| p.name)),
        }
    }
}

use crate::domain::models::{
    assignment::Assignment, event::EventRecord, profile::VolunteerProfile,
};
use crate::domain::services::matching::{ApplyDecision, RankedVolunteer};
use serde::Serialize;

/// An event in the volunteer listing together with what applying would do.
#[derive(Serialize)]
pub struct VisibleEvent {
    #[serde(flatten)]
    pub event: EventRecord,
    pub decision: ApplyDecision,
}

#[derive(Serialize)]
pub struct RankedVolunteerView {
    pub volunteer: VolunteerProfile,
    pub available: bool,
    pub matched_skills: usize,
    pub fully_qualified: bool,
}

impl From<RankedVolunteer<'_>> for RankedVolunteerView {
    fn from(r: RankedVolunteer<'_>) -> Self {
        Self {
            volunteer: r.volunteer.clone(),
            available: r.available,
            matched_skills: r.matched_skills,
            fully_qualified: r.fully_qualified,
        }
    }
}

#[derive(Serialize)]
pub struct MatchingResponse {
    pub event: EventRecord,
    pub volunteers: Vec<RankedVolunteerView>,
}

/// A saved pairing as listed to administrators.
#[derive(Serialize)]
pub struct SavedMatch {
    #[serde(flatten)]
    pub assignment: Assignment,
    pub event_name: Option<String>,
    pub event_date: Option<chrono::NaiveDate>,
    pub volunteer_name: Option<String>,
}

#[derive(Serialize)]
pub struct HistoryEntry {
    pub assignment: Assignment,
    pub event: EventRecord,
}

#[derive(Serialize)]
pub struct VolunteerHistory {
    pub volunteer_id: String,
    pub full_name: Option<String>,
    pub completed: usize,
    pub entries: Vec<HistoryEntry>,
}

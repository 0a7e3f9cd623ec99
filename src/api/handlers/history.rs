use axum::{extract::State, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::{AdminUser, VolunteerUser};
use crate::api::dtos::responses::{HistoryEntry, VolunteerHistory};
use crate::domain::models::{assignment::{Assignment, AssignmentStatus}, event::EventRecord};
use crate::error::AppError;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

fn join_events(assignments: Vec<Assignment>, events: &HashMap<String, EventRecord>) -> Vec<HistoryEntry> {
    let mut entries: Vec<HistoryEntry> = assignments
        .into_iter()
        .filter_map(|a| {
            let event = events.get(&a.event_id)?.clone();
            Some(HistoryEntry { assignment: a, event })
        })
        .collect();
    entries.sort_by(|a, b| b.event.date.cmp(&a.event.date).then_with(|| a.event.id.cmp(&b.event.id)));
    entries
}

async fn events_by_id(state: &AppState) -> Result<HashMap<String, EventRecord>, AppError> {
    Ok(state.event_repo.list().await?
        .into_iter()
        .map(|e| (e.id.clone(), e))
        .collect())
}

pub async fn my_history(
    State(state): State<Arc<AppState>>,
    VolunteerUser(user): VolunteerUser,
) -> Result<impl IntoResponse, AppError> {
    let assignments = state.assignment_repo.list_by_volunteer(&user.id).await?;
    let events = events_by_id(&state).await?;
    Ok(Json(join_events(assignments, &events)))
}

/// Participation report: every volunteer with their assignments, newest event first.
pub async fn history_report(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, AppError> {
    let events = events_by_id(&state).await?;
    let names: HashMap<_, _> = state.profile_repo.list().await?
        .into_iter()
        .map(|p| (p.id, p.full_name))
        .collect();

    let mut grouped: BTreeMap<String, Vec<Assignment>> = BTreeMap::new();
    for a in state.assignment_repo.list().await? {
        grouped.entry(a.volunteer_id.clone()).or_default().push(a);
    }

    let mut report: Vec<VolunteerHistory> = grouped
        .into_iter()
        .map(|(volunteer_id, assignments)| {
            let entries = join_events(assignments, &events);
            VolunteerHistory {
                full_name: names.get(&volunteer_id).cloned(),
                completed: entries.iter().filter(|e| e.assignment.status == AssignmentStatus::Completed).count(),
                volunteer_id,
                entries,
            }
        })
        .collect();
    report.sort_by(|a, b| a.full_name.cmp(&b.full_name).then_with(|| a.volunteer_id.cmp(&b.volunteer_id)));

    Ok(Json(report))
}

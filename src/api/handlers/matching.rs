use axum::{extract::{State, Query}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::AdminUser;
use crate::api::dtos::{
    requests::{AssignRequest, MatchingQuery},
    responses::{MatchingResponse, RankedVolunteerView, SavedMatch},
};
use crate::api::handlers::today;
use crate::domain::services::{assignment_service::ApplyOutcome, matching::rank_volunteers};
use crate::error::AppError;
use std::collections::HashMap;
use std::sync::Arc;

/// Every volunteer ranked against one event.
pub async fn rank_for_event(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(params): Query<MatchingQuery>,
) -> Result<impl IntoResponse, AppError> {
    let event = state.event_repo.find_by_id(&params.event_id).await?
        .ok_or(AppError::NotFound("Event not found".into()))?;
    let volunteers = state.profile_repo.list().await?;

    let ranked = rank_volunteers(&event, &volunteers)
        .into_iter()
        .map(RankedVolunteerView::from)
        .collect();

    Ok(Json(MatchingResponse { event, volunteers: ranked }))
}

pub async fn assign_volunteer(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Json(payload): Json<AssignRequest>,
) -> Result<impl IntoResponse, AppError> {
    let event = state.event_repo.find_by_id(&payload.event_id).await?
        .ok_or(AppError::NotFound("Event not found".into()))?;
    state.profile_repo.find_by_id(&payload.volunteer_id).await?
        .ok_or(AppError::NotFound("Volunteer not found".into()))?;

    let outcome = state.assignment_service.assign(&payload.volunteer_id, &event, today()).await?;
    let status = match &outcome {
        ApplyOutcome::Applied(_) => StatusCode::CREATED,
        ApplyOutcome::AlreadyApplied(_) => StatusCode::OK,
        ApplyOutcome::EventClosed => return Err(AppError::EventClosed),
    };

    Ok((status, Json(outcome)))
}

pub async fn list_saved(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, AppError> {
    let assignments = state.assignment_repo.list().await?;
    let events: HashMap<_, _> = state.event_repo.list().await?
        .into_iter()
        .map(|e| (e.id.clone(), e))
        .collect();
    let names: HashMap<_, _> = state.profile_repo.list().await?
        .into_iter()
        .map(|p| (p.id, p.full_name))
        .collect();

    let saved: Vec<SavedMatch> = assignments
        .into_iter()
        .map(|a| {
            let event = events.get(&a.event_id);
            SavedMatch {
                event_name: event.map(|e| e.name.clone()),
                event_date: event.map(|e| e.date),
                volunteer_name: names.get(&a.volunteer_id).cloned(),
                assignment: a,
            }
        })
        .collect();

    Ok(Json(saved))
}

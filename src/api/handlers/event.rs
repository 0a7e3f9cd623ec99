use axum::{extract::{State, Path, Query}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::{AdminUser, AuthUser, VolunteerUser};
use crate::api::dtos::{requests::VisibleEventsQuery, responses::VisibleEvent};
use crate::api::handlers::today;
use crate::domain::models::{event::EventRecord, reference::SkillId};
use crate::domain::services::{
    assignment_service::ApplyOutcome,
    event_validation::{validate_event, EventDraft},
    matching::{can_apply, sort_events, visible_events},
};
use crate::error::AppError;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{info, warn};

pub async fn create_event(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Json(draft): Json<EventDraft>,
) -> Result<impl IntoResponse, AppError> {
    let states = state.reference_repo.list_states().await?;
    let skills = state.reference_repo.list_skills().await?;

    let params = validate_event(&draft, &states, &skills)?;
    let created = state.event_repo.create(&EventRecord::new(params)).await?;

    info!("Created event {} on {}", created.id, created.date);
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_events(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.event_repo.list().await?))
}

pub async fn list_upcoming(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.event_repo.list_upcoming(today()).await?))
}

pub async fn list_past(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.event_repo.list_past(today()).await?))
}

/// The volunteer's event browser: filtered, sorted, and annotated with the apply decision.
pub async fn list_visible(
    State(state): State<Arc<AppState>>,
    VolunteerUser(user): VolunteerUser,
    Query(params): Query<VisibleEventsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (query, order) = params.into_match_query()?;
    let today = today();

    let events = state.event_repo.list_upcoming(today).await?;
    let known_skills: BTreeSet<SkillId> = state
        .reference_repo
        .list_skills()
        .await?
        .into_iter()
        .map(|s| s.id)
        .collect();
    let existing = state.assignment_repo.list_by_volunteer(&user.id).await?;

    let mut visible = visible_events(&events, &query, today, &known_skills);
    sort_events(&mut visible, order);

    let response: Vec<VisibleEvent> = visible
        .into_iter()
        .map(|event| VisibleEvent {
            decision: can_apply(&user.id, event, &existing, today),
            event: event.clone(),
        })
        .collect();

    Ok(Json(response))
}

pub async fn get_event(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let event = state.event_repo.find_by_id(&id).await?
        .ok_or(AppError::NotFound("Event not found".into()))?;
    Ok(Json(event))
}

/// Partial edit; fields left out keep their stored values. Active assignees are notified.
pub async fn update_event(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<String>,
    Json(draft): Json<EventDraft>,
) -> Result<impl IntoResponse, AppError> {
    let existing = state.event_repo.find_by_id(&id).await?
        .ok_or(AppError::NotFound("Event not found".into()))?;

    let states = state.reference_repo.list_states().await?;
    let skills = state.reference_repo.list_skills().await?;

    let params = validate_event(&draft.merged_over(EventDraft::from(&existing)), &states, &skills)?;
    let event = EventRecord {
        id: existing.id,
        name: params.name,
        description: params.description,
        location: params.location,
        required_skills: params.required_skills,
        urgency: params.urgency,
        date: params.date,
        created_at: existing.created_at,
    };

    let updated = state.event_repo.update(&event).await?;

    match state.assignment_service.notify_event_updated(&updated).await {
        Ok(count) => info!("Updated event {}; notified {} volunteers", updated.id, count),
        Err(e) => warn!("Updated event {} but notifying volunteers failed: {:?}", updated.id, e),
    }

    Ok(Json(updated))
}

pub async fn apply_to_event(
    State(state): State<Arc<AppState>>,
    VolunteerUser(user): VolunteerUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let event = state.event_repo.find_by_id(&id).await?
        .ok_or(AppError::NotFound("Event not found".into()))?;

    let outcome = state.assignment_service.apply(&user.id, &event, today()).await?;
    let status = match &outcome {
        ApplyOutcome::Applied(_) => StatusCode::CREATED,
        ApplyOutcome::AlreadyApplied(_) => StatusCode::OK,
        ApplyOutcome::EventClosed => return Err(AppError::EventClosed),
    };

    Ok((status, Json(outcome)))
}

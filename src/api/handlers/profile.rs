use axum::{extract::State, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::{AdminUser, VolunteerUser};
use crate::domain::models::profile::VolunteerProfile;
use crate::domain::services::profile_validation::{validate_profile, ProfileDraft};
use crate::error::AppError;
use std::sync::Arc;
use tracing::info;

pub async fn get_my_profile(
    State(state): State<Arc<AppState>>,
    VolunteerUser(user): VolunteerUser,
) -> Result<impl IntoResponse, AppError> {
    let profile = state.profile_repo.find_by_id(&user.id).await?
        .ok_or(AppError::NotFound("Profile not found".into()))?;
    Ok(Json(profile))
}

/// Full replacement: every required field must be present.
pub async fn put_my_profile(
    State(state): State<Arc<AppState>>,
    VolunteerUser(user): VolunteerUser,
    Json(draft): Json<ProfileDraft>,
) -> Result<impl IntoResponse, AppError> {
    save_profile(&state, &user.id, draft, false).await
}

/// Partial update merged over the stored profile.
pub async fn patch_my_profile(
    State(state): State<Arc<AppState>>,
    VolunteerUser(user): VolunteerUser,
    Json(draft): Json<ProfileDraft>,
) -> Result<impl IntoResponse, AppError> {
    save_profile(&state, &user.id, draft, true).await
}

async fn save_profile(
    state: &AppState,
    user_id: &str,
    draft: ProfileDraft,
    merge: bool,
) -> Result<Json<VolunteerProfile>, AppError> {
    let existing = state.profile_repo.find_by_id(user_id).await?;
    let states = state.reference_repo.list_states().await?;
    let skills = state.reference_repo.list_skills().await?;

    let draft = match (&existing, merge) {
        (Some(current), true) => draft.merged_over(ProfileDraft::from(current)),
        _ => draft,
    };

    let profile = validate_profile(user_id, &draft, &states, &skills, existing.as_ref())?;
    let saved = state.profile_repo.upsert(&profile).await?;

    info!("Saved profile for volunteer {}", user_id);
    Ok(Json(saved))
}

pub async fn list_volunteers(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.profile_repo.list().await?))
}

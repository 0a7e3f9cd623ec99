use axum::{extract::{State, Path}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::{AuthUser, VolunteerUser};
use crate::api::dtos::requests::UpdateStatusRequest;
use crate::api::handlers::today;
use crate::error::AppError;
use std::sync::Arc;

pub async fn list_my_assignments(
    State(state): State<Arc<AppState>>,
    VolunteerUser(user): VolunteerUser,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.assignment_repo.list_by_volunteer(&user.id).await?))
}

pub async fn update_assignment_status(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<impl IntoResponse, AppError> {
    let updated = state.assignment_service
        .update_status(&id, payload.status, &user, today())
        .await?;
    Ok(Json(updated))
}

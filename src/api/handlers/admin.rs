use axum::{extract::{State, Path}, Json};
use crate::state::AppState;
use crate::api::extractors::auth::AdminUser;
use crate::domain::models::auth::UserSummary;
use crate::domain::models::user::Role;
use crate::error::AppError;
use std::sync::Arc;
use tracing::info;

/// Accounts that registered as admin and are waiting for a decision. Empty list when none.
pub async fn list_pending(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Result<Json<Vec<UserSummary>>, AppError> {
    let pending = state.user_repo.list_by_role(Role::PendingAdmin).await?;
    Ok(Json(pending.into_iter().map(UserSummary::from).collect()))
}

pub async fn approve_user(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
) -> Result<Json<UserSummary>, AppError> {
    resolve(&state, &admin.id, &id, true).await
}

pub async fn deny_user(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
) -> Result<Json<UserSummary>, AppError> {
    resolve(&state, &admin.id, &id, false).await
}

async fn resolve(state: &AppState, admin_id: &str, id: &str, approve: bool) -> Result<Json<UserSummary>, AppError> {
    let user = state.user_repo.find_by_id(id).await?
        .ok_or(AppError::NotFound("User not found".into()))?;

    let next = user.role.resolve_pending(approve)?;

    let updated = state.user_repo.update_role(&user.id, user.role, next).await?
        .ok_or_else(|| AppError::Conflict("Admin request was already decided".into()))?;

    info!("Admin {} moved user {} {} -> {}", admin_id, updated.id, user.role, updated.role);
    Ok(Json(UserSummary::from(updated)))
}

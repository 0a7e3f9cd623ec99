use axum::{extract::State, response::IntoResponse, Json, http::StatusCode};
use crate::state::AppState;
use crate::error::AppError;
use crate::api::dtos::requests::{LoginRequest, RegisterRequest};
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::auth::{AuthResponse, UserSummary};
use crate::domain::models::user::{Role, User};
use crate::domain::services::{auth_service::ACCESS_TOKEN_MINUTES, validation::FieldErrors};
use std::sync::Arc;
use tower_cookies::{Cookies, Cookie};
use tower_cookies::cookie::SameSite;
use time::Duration;
use tracing::info;

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let email = payload.email.trim().to_lowercase();

    let mut errors = FieldErrors::default();
    if email.is_empty() {
        errors.add("email", "Required");
    } else if !email.contains('@') || email.len() > 255 {
        errors.add("email", "Not a valid email address");
    }
    if payload.password.is_empty() {
        errors.add("password", "Required");
    }
    let role = match payload.role.as_deref().map(|r| r.trim().to_lowercase()).as_deref() {
        None | Some("") | Some("volunteer") => Role::Volunteer,
        Some("admin") => Role::PendingAdmin,
        Some(_) => {
            errors.add("role", "Must be 'volunteer' or 'admin'");
            Role::Volunteer
        }
    };
    errors.into_result()?;

    if state.user_repo.find_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict("Email already registered".into()));
    }

    let password_hash = state.auth_service.hash_password(&payload.password)?;
    let user = state.user_repo.create(&User::new(email, password_hash, role)).await?;

    info!("Registered user {} as {}", user.id, user.role);

    Ok((StatusCode::CREATED, Json(UserSummary::from(user))))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.user_repo.find_by_email(&payload.email).await?
        .ok_or(AppError::Unauthorized)?;

    state.auth_service.verify_password(&user, &payload.password)?;

    let (access_jwt, csrf_token) = state.auth_service.login(&user)?;

    set_access_cookie(&cookies, &access_jwt);

    info!("User logged in: {}", user.id);

    Ok(Json(AuthResponse {
        csrf_token,
        user: UserSummary::from(user),
    }))
}

/// Current account as stored, so a pending admin sees the outcome of the request.
pub async fn me(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<Json<UserSummary>, AppError> {
    let stored = state.user_repo.find_by_id(&user.id).await?
        .ok_or(AppError::NotFound("User not found".into()))?;
    Ok(Json(UserSummary::from(stored)))
}

pub async fn logout(cookies: Cookies) -> Result<impl IntoResponse, AppError> {
    cookies.remove(Cookie::build(("access_token", "")).path("/").into());

    info!("User logged out");

    Ok(StatusCode::OK)
}

fn set_access_cookie(cookies: &Cookies, access: &str) {
    let mut access_c = Cookie::new("access_token", access.to_string());
    access_c.set_http_only(true);
    access_c.set_secure(true);
    access_c.set_same_site(SameSite::Strict);
    access_c.set_path("/");
    access_c.set_max_age(Duration::minutes(ACCESS_TOKEN_MINUTES));
    cookies.add(access_c);
}

use axum::{
    body::Body,
    extract::Request,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{health, auth, admin, reference, profile, event, matching, assignment, history, notification};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tower_cookies::CookieManagerLayer;
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Auth
        .route("/api/v1/auth/register", post(auth::register))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/logout", post(auth::logout))
        .route("/api/v1/auth/me", get(auth::me))

        // Admin requests
        .route("/api/v1/admin/pending", get(admin::list_pending))
        .route("/api/v1/admin/approve/{id}", post(admin::approve_user))
        .route("/api/v1/admin/deny/{id}", post(admin::deny_user))

        // Reference data
        .route("/api/v1/skills", get(reference::list_skills))
        .route("/api/v1/states", get(reference::list_states))

        // Profiles
        .route("/api/v1/profile/me", get(profile::get_my_profile).put(profile::put_my_profile).patch(profile::patch_my_profile))
        .route("/api/v1/volunteers", get(profile::list_volunteers))

        // Events
        .route("/api/v1/events", post(event::create_event).get(event::list_events))
        .route("/api/v1/events/upcoming", get(event::list_upcoming))
        .route("/api/v1/events/past", get(event::list_past))
        .route("/api/v1/events/visible", get(event::list_visible))
        .route("/api/v1/events/{id}", get(event::get_event).put(event::update_event))
        .route("/api/v1/events/{id}/apply", post(event::apply_to_event))

        // Matching
        .route("/api/v1/matching", get(matching::rank_for_event).post(matching::assign_volunteer))
        .route("/api/v1/matching/saved", get(matching::list_saved))

        // Assignments & history
        .route("/api/v1/assignments/me", get(assignment::list_my_assignments))
        .route("/api/v1/assignments/{id}/status", put(assignment::update_assignment_status))
        .route("/api/v1/history/me", get(history::my_history))
        .route("/api/v1/history", get(history::history_report))

        // Notifications
        .route("/api/v1/notifications", get(notification::list_notifications))
        .route("/api/v1/notifications/{id}/read", post(notification::mark_notification_read))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        user_id = tracing::field::Empty,
                        role = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .layer(CookieManagerLayer::new())
        .with_state(state)
}

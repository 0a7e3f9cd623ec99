mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{day, event_payload, parse_body, TestApp};
use serde_json::json;
use std::collections::HashSet;
use tokio::task::JoinSet;
use volunteer_backend::background::run_completion_sweep;
use volunteer_backend::domain::models::assignment::{Assignment, AssignmentStatus};
use volunteer_backend::domain::services::assignment_service::ApplyOutcome;

#[tokio::test]
async fn test_apply_twice_converges_to_one_assignment() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let (volunteer_id, volunteer) = app.volunteer("twice@example.com").await;

    let event = app.create_event(&admin, event_payload("Food Bank", "Houston", "TX", "High", &day(14), &[1])).await;
    let uri = format!("/api/v1/events/{}/apply", event["id"].as_str().unwrap());

    let first = app.send("POST", &uri, Some(&volunteer), None).await;
    assert_eq!(first.status(), StatusCode::CREATED);
    let first = parse_body(first).await;
    assert_eq!(first["outcome"], "applied");
    assert_eq!(first["assignment"]["status"], "assigned");

    let second = app.send("POST", &uri, Some(&volunteer), None).await;
    assert_eq!(second.status(), StatusCode::OK);
    let second = parse_body(second).await;
    assert_eq!(second["outcome"], "already_applied");
    assert_eq!(second["assignment"]["id"], first["assignment"]["id"]);

    let mine = parse_body(app.send("GET", "/api/v1/assignments/me", Some(&volunteer), None).await).await;
    assert_eq!(mine.as_array().unwrap().len(), 1);
    assert_eq!(mine[0]["volunteer_id"], volunteer_id.as_str());

    let listing = parse_body(app.send("GET", "/api/v1/events/visible", Some(&volunteer), None).await).await;
    assert_eq!(listing[0]["decision"], "already_applied");
}

#[tokio::test]
async fn test_apply_to_past_event_is_closed() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let (_, volunteer) = app.volunteer("late@example.com").await;

    let event = app.create_event(&admin, event_payload("Yesterday", "Houston", "TX", "Low", &day(-1), &[1])).await;
    let res = app.send("POST", &format!("/api/v1/events/{}/apply", event["id"].as_str().unwrap()), Some(&volunteer), None).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let mine = parse_body(app.send("GET", "/api/v1/assignments/me", Some(&volunteer), None).await).await;
    assert!(mine.as_array().unwrap().is_empty());

    let missing = app.send("POST", "/api/v1/events/nope/apply", Some(&volunteer), None).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_concurrent_apply_creates_single_row() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let (volunteer_id, _) = app.volunteer("race@example.com").await;

    let created = app.create_event(&admin, event_payload("Race Day", "Houston", "TX", "High", &day(3), &[1])).await;
    let event = app.state.event_repo.find_by_id(created["id"].as_str().unwrap()).await.unwrap().unwrap();
    let today = Utc::now().date_naive();

    let mut set = JoinSet::new();
    for _ in 0..16 {
        let service = app.state.assignment_service.clone();
        let event = event.clone();
        let volunteer_id = volunteer_id.clone();
        set.spawn(async move { service.apply(&volunteer_id, &event, today).await });
    }

    let mut applied = 0;
    let mut ids = HashSet::new();
    while let Some(res) = set.join_next().await {
        match res.unwrap().unwrap() {
            ApplyOutcome::Applied(a) => {
                applied += 1;
                ids.insert(a.id);
            }
            ApplyOutcome::AlreadyApplied(a) => {
                ids.insert(a.id);
            }
            ApplyOutcome::EventClosed => panic!("event is upcoming"),
        }
    }

    assert_eq!(applied, 1);
    assert_eq!(ids.len(), 1);

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM assignments WHERE event_id = ? AND volunteer_id = ?")
        .bind(&event.id)
        .bind(&volunteer_id)
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_status_transitions_by_actor() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let (_, volunteer) = app.volunteer("status@example.com").await;
    let (_, other) = app.volunteer("other@example.com").await;

    let event = app.create_event(&admin, event_payload("Park Cleanup", "Houston", "TX", "Medium", &day(4), &[1])).await;
    let applied = parse_body(app.send("POST", &format!("/api/v1/events/{}/apply", event["id"].as_str().unwrap()), Some(&volunteer), None).await).await;
    let uri = format!("/api/v1/assignments/{}/status", applied["assignment"]["id"].as_str().unwrap());

    // assigned -> registered -> assigned -> registered
    for target in ["registered", "assigned", "registered"] {
        let res = app.send("PUT", &uri, Some(&volunteer), Some(json!({"status": target}))).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(parse_body(res).await["status"], target);
    }

    let same = app.send("PUT", &uri, Some(&volunteer), Some(json!({"status": "registered"}))).await;
    assert_eq!(same.status(), StatusCode::CONFLICT);

    let foreign = app.send("PUT", &uri, Some(&other), Some(json!({"status": "assigned"}))).await;
    assert_eq!(foreign.status(), StatusCode::NOT_FOUND);

    let self_complete = app.send("PUT", &uri, Some(&volunteer), Some(json!({"status": "completed"}))).await;
    assert_eq!(self_complete.status(), StatusCode::FORBIDDEN);

    let admin_register = app.send("PUT", &uri, Some(&admin), Some(json!({"status": "assigned"}))).await;
    assert_eq!(admin_register.status(), StatusCode::FORBIDDEN);

    // Event has not happened yet
    let early = app.send("PUT", &uri, Some(&admin), Some(json!({"status": "completed"}))).await;
    assert_eq!(early.status(), StatusCode::CONFLICT);

    let unknown = app.send("PUT", &uri, Some(&volunteer), Some(json!({"status": "cancelled"}))).await;
    assert!(unknown.status().is_client_error());
}

#[tokio::test]
async fn test_completed_assignment_is_terminal() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let (volunteer_id, volunteer) = app.volunteer("done@example.com").await;

    let event = app.create_event(&admin, event_payload("Last Week", "Houston", "TX", "High", &day(-7), &[1])).await;
    let event_id = event["id"].as_str().unwrap().to_string();

    // Applying is closed for past events, so seed the pairing directly
    let (assignment, created) = app.state.assignment_repo
        .insert_if_absent(&Assignment::new(event_id, volunteer_id))
        .await
        .unwrap();
    assert!(created);
    let uri = format!("/api/v1/assignments/{}/status", assignment.id);

    let done = app.send("PUT", &uri, Some(&admin), Some(json!({"status": "completed"}))).await;
    assert_eq!(done.status(), StatusCode::OK);
    assert_eq!(parse_body(done).await["status"], "completed");

    for (who, target) in [(&volunteer, "registered"), (&volunteer, "assigned"), (&admin, "completed")] {
        let res = app.send("PUT", &uri, Some(who), Some(json!({"status": target}))).await;
        assert_eq!(res.status(), StatusCode::CONFLICT, "completed -> {} must be rejected", target);
    }

    let stored = app.state.assignment_repo.find_by_id(&assignment.id).await.unwrap().unwrap();
    assert_eq!(stored.status, AssignmentStatus::Completed);
}

#[tokio::test]
async fn test_completion_sweep_completes_past_assignments_only() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let (volunteer_id, volunteer) = app.volunteer("sweep@example.com").await;

    let past = app.create_event(&admin, event_payload("Past", "Houston", "TX", "High", &day(-2), &[1])).await;
    let future = app.create_event(&admin, event_payload("Future", "Houston", "TX", "High", &day(2), &[1])).await;

    let (old, _) = app.state.assignment_repo
        .insert_if_absent(&Assignment::new(past["id"].as_str().unwrap().to_string(), volunteer_id.clone()))
        .await
        .unwrap();
    let upcoming = parse_body(app.send("POST", &format!("/api/v1/events/{}/apply", future["id"].as_str().unwrap()), Some(&volunteer), None).await).await;

    assert_eq!(run_completion_sweep(&app.state).await, 1);
    assert_eq!(run_completion_sweep(&app.state).await, 0);

    let old = app.state.assignment_repo.find_by_id(&old.id).await.unwrap().unwrap();
    assert_eq!(old.status, AssignmentStatus::Completed);
    assert!(old.updated_at >= old.created_at);

    let still_active = app.state.assignment_repo
        .find_by_id(upcoming["assignment"]["id"].as_str().unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(still_active.status, AssignmentStatus::Assigned);

    // Sweeping as of a later day catches the second one too
    let later = Utc::now().date_naive() + Duration::days(5);
    assert_eq!(app.state.assignment_service.complete_past(later).await.unwrap(), 1);
}

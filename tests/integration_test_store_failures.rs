mod common;

use async_trait::async_trait;
use axum::http::StatusCode;
use chrono::{NaiveDate, Utc};
use common::{day, event_payload, parse_body, profile_payload, TestApp};
use serde_json::json;
use sqlx::{Pool, Sqlite};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use volunteer_backend::domain::models::{
    assignment::{Assignment, AssignmentStatus},
    notification::Notification,
};
use volunteer_backend::domain::ports::{AssignmentRepository, NotificationRepository};
use volunteer_backend::error::AppError;
use volunteer_backend::infra::repositories::{
    sqlite_assignment_repo::SqliteAssignmentRepo,
    sqlite_notification_repo::SqliteNotificationRepo,
};

/// Assignment store whose inserts always fail at the database layer.
struct BrokenInsertRepo {
    inner: SqliteAssignmentRepo,
    insert_attempts: AtomicUsize,
}

impl BrokenInsertRepo {
    fn new(pool: Pool<Sqlite>) -> Self {
        Self { inner: SqliteAssignmentRepo::new(pool), insert_attempts: AtomicUsize::new(0) }
    }
}

#[async_trait]
impl AssignmentRepository for BrokenInsertRepo {
    async fn insert_if_absent(&self, _assignment: &Assignment) -> Result<(Assignment, bool), AppError> {
        self.insert_attempts.fetch_add(1, Ordering::SeqCst);
        Err(AppError::Database(sqlx::Error::PoolClosed))
    }
    async fn find_by_id(&self, id: &str) -> Result<Option<Assignment>, AppError> {
        self.inner.find_by_id(id).await
    }
    async fn find_by_pair(&self, event_id: &str, volunteer_id: &str) -> Result<Option<Assignment>, AppError> {
        self.inner.find_by_pair(event_id, volunteer_id).await
    }
    async fn list(&self) -> Result<Vec<Assignment>, AppError> {
        self.inner.list().await
    }
    async fn list_by_volunteer(&self, volunteer_id: &str) -> Result<Vec<Assignment>, AppError> {
        self.inner.list_by_volunteer(volunteer_id).await
    }
    async fn list_active_by_event(&self, event_id: &str) -> Result<Vec<Assignment>, AppError> {
        self.inner.list_active_by_event(event_id).await
    }
    async fn update_status(&self, id: &str, from: AssignmentStatus, to: AssignmentStatus) -> Result<Option<Assignment>, AppError> {
        self.inner.update_status(id, from, to).await
    }
    async fn complete_before(&self, today: NaiveDate) -> Result<u64, AppError> {
        self.inner.complete_before(today).await
    }
}

/// Notification store that rejects the first `failures` writes, then behaves normally.
struct FlakyNotificationRepo {
    inner: SqliteNotificationRepo,
    failures: AtomicUsize,
    attempts: AtomicUsize,
}

impl FlakyNotificationRepo {
    fn new(pool: Pool<Sqlite>, failures: usize) -> Self {
        Self {
            inner: SqliteNotificationRepo::new(pool),
            failures: AtomicUsize::new(failures),
            attempts: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl NotificationRepository for FlakyNotificationRepo {
    async fn create(&self, notification: &Notification) -> Result<Notification, AppError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let left = self.failures.load(Ordering::SeqCst);
        if left > 0 {
            self.failures.store(left - 1, Ordering::SeqCst);
            return Err(AppError::Database(sqlx::Error::PoolClosed));
        }
        self.inner.create(notification).await
    }
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Notification>, AppError> {
        self.inner.list_by_user(user_id).await
    }
    async fn mark_read(&self, user_id: &str, id: &str) -> Result<(), AppError> {
        self.inner.mark_read(user_id, id).await
    }
}

async fn assignment_rows(app: &TestApp) -> i64 {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM assignments")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    count
}

#[tokio::test]
async fn test_storage_failure_on_apply_is_reported_once_and_leaves_no_row() {
    let mut broken: Option<Arc<BrokenInsertRepo>> = None;
    let app = TestApp::build(
        |pool| -> Arc<dyn AssignmentRepository> {
            let repo = Arc::new(BrokenInsertRepo::new(pool));
            broken = Some(repo.clone());
            repo
        },
        |pool| -> Arc<dyn NotificationRepository> { Arc::new(SqliteNotificationRepo::new(pool)) },
    ).await;
    let broken = broken.unwrap();

    let admin = app.admin().await;
    let (volunteer_id, volunteer) = app.volunteer("unlucky@example.com").await;
    let created = app.create_event(&admin, event_payload("Shelter Shift", "Houston", "TX", "High", &day(5), &[1])).await;
    let event_id = created["id"].as_str().unwrap().to_string();

    // Service level: the database error surfaces as ApplyFailed after a single attempt
    let event = app.state.event_repo.find_by_id(&event_id).await.unwrap().unwrap();
    let result = app.state.assignment_service.apply(&volunteer_id, &event, Utc::now().date_naive()).await;
    assert!(matches!(result, Err(AppError::ApplyFailed(_))), "got {:?}", result);
    assert_eq!(broken.insert_attempts.load(Ordering::SeqCst), 1);

    // HTTP level: 503 with a retry hint, still one attempt per request
    let res = app.send("POST", &format!("/api/v1/events/{}/apply", event_id), Some(&volunteer), None).await;
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(parse_body(res).await["error"].as_str().unwrap().contains("retry"));
    assert_eq!(broken.insert_attempts.load(Ordering::SeqCst), 2);

    // Admin pairing goes through the same path
    assert_eq!(app.save_profile(&volunteer, profile_payload("Una", &[1], &[day(5)])).await.status(), StatusCode::OK);
    let res = app.send("POST", "/api/v1/matching", Some(&admin), Some(json!({
        "event_id": event_id,
        "volunteer_id": volunteer_id,
    }))).await;
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(broken.insert_attempts.load(Ordering::SeqCst), 3);

    assert_eq!(assignment_rows(&app).await, 0);
    let mine = parse_body(app.send("GET", "/api/v1/assignments/me", Some(&volunteer), None).await).await;
    assert!(mine.as_array().unwrap().is_empty());
    let notes = parse_body(app.send("GET", "/api/v1/notifications", Some(&volunteer), None).await).await;
    assert!(notes.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_event_update_notifies_remaining_volunteers_after_a_failed_write() {
    let mut flaky: Option<Arc<FlakyNotificationRepo>> = None;
    let app = TestApp::build(
        |pool| -> Arc<dyn AssignmentRepository> { Arc::new(SqliteAssignmentRepo::new(pool)) },
        |pool| -> Arc<dyn NotificationRepository> {
            let repo = Arc::new(FlakyNotificationRepo::new(pool, 1));
            flaky = Some(repo.clone());
            repo
        },
    ).await;
    let flaky = flaky.unwrap();

    let admin = app.admin().await;
    let (_, ann) = app.volunteer("ann@example.com").await;
    let (_, ben) = app.volunteer("ben@example.com").await;
    let (_, cy) = app.volunteer("cy@example.com").await;

    let created = app.create_event(&admin, event_payload("Park Cleanup", "Austin", "TX", "Medium", &day(6), &[2])).await;
    let event_id = created["id"].as_str().unwrap().to_string();
    for volunteer in [&ann, &ben, &cy] {
        let res = app.send("POST", &format!("/api/v1/events/{}/apply", event_id), Some(volunteer), None).await;
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let res = app.send("PUT", &format!("/api/v1/events/{}", event_id), Some(&admin), Some(json!({"urgency": "High"}))).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(parse_body(res).await["urgency"], "High");

    // One write failed, every volunteer was still attempted
    assert_eq!(flaky.attempts.load(Ordering::SeqCst), 3);
    let mut delivered = 0;
    for volunteer in [&ann, &ben, &cy] {
        let notes = parse_body(app.send("GET", "/api/v1/notifications", Some(volunteer), None).await).await;
        delivered += notes.as_array().unwrap().iter().filter(|n| n["kind"] == "EVENT_UPDATED").count();
    }
    assert_eq!(delivered, 2);

    // The count only includes stored notices
    let event = app.state.event_repo.find_by_id(&event_id).await.unwrap().unwrap();
    let written = app.state.assignment_service.notify_event_updated(&event).await.unwrap();
    assert_eq!(written, 3);
}

#![allow(dead_code)]

use volunteer_backend::{
    api::router::create_router,
    state::AppState,
    config::Config,
    domain::models::user::{Role, User},
    domain::ports::{AssignmentRepository, NotificationRepository},
    infra::factory::assemble,
    infra::repositories::{
        sqlite_assignment_repo::SqliteAssignmentRepo,
        sqlite_event_repo::SqliteEventRepo,
        sqlite_notification_repo::SqliteNotificationRepo,
        sqlite_profile_repo::SqliteProfileRepo,
        sqlite_reference_repo::SqliteReferenceRepo,
        sqlite_user_repo::SqliteUserRepo,
    },
};
use sqlx::{sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions}, Pool, Sqlite};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;
use axum::{
    body::Body,
    http::{Request, header},
    response::Response,
    Router,
};
use std::str::FromStr;
use tower::ServiceExt;
use serde_json::Value;

pub const ADMIN_EMAIL: &str = "admin@volunteer.test";
pub const ADMIN_PASSWORD: &str = "admin-password";

pub struct AuthHeaders {
    pub access_token: String,
    pub csrf_token: String,
}

pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::build(
            |pool| -> Arc<dyn AssignmentRepository> { Arc::new(SqliteAssignmentRepo::new(pool)) },
            |pool| -> Arc<dyn NotificationRepository> { Arc::new(SqliteNotificationRepo::new(pool)) },
        ).await
    }

    /// Same wiring as `new`, but the assignment and notification stores come from the caller.
    pub async fn build<A, N>(assignments: A, notifications: N) -> Self
    where
        A: FnOnce(Pool<Sqlite>) -> Arc<dyn AssignmentRepository>,
        N: FnOnce(Pool<Sqlite>) -> Arc<dyn NotificationRepository>,
    {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(10));

        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let priv_key_pem = include_str!("../tests/keys/test_private.pem");
        let pub_key_pem = include_str!("../tests/keys/test_public.pem");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            jwt_secret_key: priv_key_pem.to_string(),
            jwt_public_key: pub_key_pem.to_string(),
            auth_issuer: "test-issuer".to_string(),
            admin_email: None,
            admin_password: None,
            completion_sweep_secs: 0,
            log_dir: "./logs".to_string(),
        };

        let state = Arc::new(assemble(
            &config,
            Arc::new(SqliteUserRepo::new(pool.clone())),
            Arc::new(SqliteReferenceRepo::new(pool.clone())),
            Arc::new(SqliteProfileRepo::new(pool.clone())),
            Arc::new(SqliteEventRepo::new(pool.clone())),
            assignments(pool.clone()),
            notifications(pool.clone()),
        ));

        let hash = state.auth_service.hash_password(ADMIN_PASSWORD).unwrap();
        state.user_repo
            .create(&User::new(ADMIN_EMAIL.to_string(), hash, Role::Admin))
            .await
            .expect("Failed to seed admin");

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> AuthHeaders {
        let payload = serde_json::json!({
            "email": email,
            "password": password
        });

        let response = self.router.clone().oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap()
        ).await.unwrap();

        if !response.status().is_success() {
            panic!("Login failed in test helper: status {}", response.status());
        }

        let cookies: Vec<String> = response.headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|h| h.to_str().unwrap().to_string())
            .collect();

        let access_token_cookie = cookies.iter()
            .find(|c| c.contains("access_token="))
            .expect("No access_token cookie returned");

        let start = access_token_cookie.find("access_token=").unwrap() + 13;
        let end = access_token_cookie[start..].find(';').unwrap_or(access_token_cookie.len() - start);
        let access_token = access_token_cookie[start..start+end].to_string();

        let body_json = parse_body(response).await;
        let csrf_token = body_json["csrf_token"].as_str().expect("No csrf_token in body").to_string();

        AuthHeaders {
            access_token,
            csrf_token
        }
    }

    pub async fn admin(&self) -> AuthHeaders {
        self.login(ADMIN_EMAIL, ADMIN_PASSWORD).await
    }

    /// Registers and logs in a volunteer. Returns the user id with the auth headers.
    pub async fn volunteer(&self, email: &str) -> (String, AuthHeaders) {
        let response = self.send("POST", "/api/v1/auth/register", None, Some(serde_json::json!({
            "email": email,
            "password": "volunteer-password"
        }))).await;
        assert!(response.status().is_success(), "register failed: {}", response.status());
        let id = parse_body(response).await["id"].as_str().unwrap().to_string();

        let auth = self.login(email, "volunteer-password").await;
        (id, auth)
    }

    pub async fn send(&self, method: &str, uri: &str, auth: Option<&AuthHeaders>, body: Option<Value>) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(auth) = auth {
            builder = builder
                .header(header::COOKIE, format!("access_token={}", auth.access_token))
                .header("X-CSRF-Token", &auth.csrf_token);
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        self.router.clone().oneshot(builder.body(body).unwrap()).await.unwrap()
    }

    /// Creates an event as admin and returns the stored JSON.
    pub async fn create_event(&self, admin: &AuthHeaders, payload: Value) -> Value {
        let response = self.send("POST", "/api/v1/events", Some(admin), Some(payload)).await;
        assert_eq!(response.status(), axum::http::StatusCode::CREATED);
        parse_body(response).await
    }

    pub async fn save_profile(&self, auth: &AuthHeaders, payload: Value) -> Response {
        self.send("PUT", "/api/v1/profile/me", Some(auth), Some(payload)).await
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
        let _ = std::fs::remove_file(format!("{}-wal", self.db_filename));
        let _ = std::fs::remove_file(format!("{}-shm", self.db_filename));
    }
}

pub async fn parse_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// `YYYY-MM-DD` for today shifted by `days`.
pub fn day(days: i64) -> String {
    (chrono::Utc::now().date_naive() + chrono::Duration::days(days)).format("%Y-%m-%d").to_string()
}

pub fn event_payload(name: &str, city: &str, state: &str, urgency: &str, date: &str, skills: &[i64]) -> Value {
    serde_json::json!({
        "name": name,
        "description": format!("{} description", name),
        "city": city,
        "state": state,
        "zipcode": "77001",
        "urgency": urgency,
        "date": date,
        "required_skills": skills,
    })
}

pub fn profile_payload(full_name: &str, skills: &[i64], availability: &[String]) -> Value {
    serde_json::json!({
        "full_name": full_name,
        "address1": "1 Main St",
        "city": "Houston",
        "state": "TX",
        "zipcode": "77001",
        "skills": skills,
        "availability": availability,
    })
}

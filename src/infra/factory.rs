use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::{postgres::{PgPoolOptions, PgConnectOptions}, sqlite::{SqlitePoolOptions, SqliteJournalMode, SqliteConnectOptions}};
use sqlx::{PgPool, SqlitePool, ConnectOptions};
use tracing::{info, warn, error};
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::state::AppState;
use crate::domain::models::user::{Role, User};
use crate::domain::ports::{
    AssignmentRepository, EventRepository, NotificationRepository, ProfileRepository,
    ReferenceRepository, UserRepository,
};
use crate::domain::services::{assignment_service::AssignmentService, auth_service::AuthService};
use crate::infra::repositories::{
    postgres_assignment_repo::PostgresAssignmentRepo, postgres_event_repo::PostgresEventRepo,
    postgres_notification_repo::PostgresNotificationRepo, postgres_profile_repo::PostgresProfileRepo,
    postgres_reference_repo::PostgresReferenceRepo, postgres_user_repo::PostgresUserRepo,
    sqlite_assignment_repo::SqliteAssignmentRepo, sqlite_event_repo::SqliteEventRepo,
    sqlite_notification_repo::SqliteNotificationRepo, sqlite_profile_repo::SqliteProfileRepo,
    sqlite_reference_repo::SqliteReferenceRepo, sqlite_user_repo::SqliteUserRepo,
};

pub async fn bootstrap_state(config: &Config) -> AppState {
    let database_url = &config.database_url;

    let state = if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        info!("Initializing PostgreSQL connection...");

        let mut opts: PgConnectOptions = database_url.parse().expect("Invalid Postgres URL");
        opts = opts.log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(opts)
            .await
            .expect("Failed to connect to Postgres");

        run_postgres_migrations(&pool).await;

        assemble(
            config,
            Arc::new(PostgresUserRepo::new(pool.clone())),
            Arc::new(PostgresReferenceRepo::new(pool.clone())),
            Arc::new(PostgresProfileRepo::new(pool.clone())),
            Arc::new(PostgresEventRepo::new(pool.clone())),
            Arc::new(PostgresAssignmentRepo::new(pool.clone())),
            Arc::new(PostgresNotificationRepo::new(pool)),
        )
    } else {
        info!("Initializing SQLite connection with WAL Mode...");

        let opts = SqliteConnectOptions::from_str(database_url)
            .expect("Invalid SQLite connection string")
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .expect("Failed to connect to SQLite");

        run_sqlite_migrations(&pool).await;

        assemble(
            config,
            Arc::new(SqliteUserRepo::new(pool.clone())),
            Arc::new(SqliteReferenceRepo::new(pool.clone())),
            Arc::new(SqliteProfileRepo::new(pool.clone())),
            Arc::new(SqliteEventRepo::new(pool.clone())),
            Arc::new(SqliteAssignmentRepo::new(pool.clone())),
            Arc::new(SqliteNotificationRepo::new(pool)),
        )
    };

    ensure_admin(&state).await;
    state
}

pub fn assemble(
    config: &Config,
    user_repo: Arc<dyn UserRepository>,
    reference_repo: Arc<dyn ReferenceRepository>,
    profile_repo: Arc<dyn ProfileRepository>,
    event_repo: Arc<dyn EventRepository>,
    assignment_repo: Arc<dyn AssignmentRepository>,
    notification_repo: Arc<dyn NotificationRepository>,
) -> AppState {
    let auth_service = Arc::new(AuthService::new(config.clone()));
    let assignment_service = Arc::new(AssignmentService::new(
        assignment_repo.clone(),
        event_repo.clone(),
        notification_repo.clone(),
    ));

    AppState {
        config: config.clone(),
        user_repo,
        reference_repo,
        profile_repo,
        event_repo,
        assignment_repo,
        notification_repo,
        auth_service,
        assignment_service,
    }
}

/// Creates the configured administrator account on first start.
async fn ensure_admin(state: &AppState) {
    let (Some(email), Some(password)) = (&state.config.admin_email, &state.config.admin_password) else {
        return;
    };

    match state.user_repo.find_by_email(email).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            let hash = match state.auth_service.hash_password(password) {
                Ok(h) => h,
                Err(e) => {
                    error!("Failed to hash admin password: {:?}", e);
                    return;
                }
            };
            match state.user_repo.create(&User::new(email.clone(), hash, Role::Admin)).await {
                Ok(admin) => info!("Created administrator account {}", admin.email),
                Err(e) => error!("Failed to create administrator account: {:?}", e),
            }
        }
        Err(e) => warn!("Could not check for administrator account: {:?}", e),
    }
}

async fn run_postgres_migrations(pool: &PgPool) {
    sqlx::migrate!("./migrations/postgres")
        .run(pool)
        .await
        .expect("Failed to run Postgres migrations");
}

async fn run_sqlite_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .expect("Failed to run SQLite migrations");
}

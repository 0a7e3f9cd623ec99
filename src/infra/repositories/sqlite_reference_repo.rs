use crate::domain::{models::reference::{Skill, UsState}, ports::ReferenceRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteReferenceRepo {
    pool: SqlitePool,
}

impl SqliteReferenceRepo {
    pub fn new(pool: SqlitePool) -> Self { Self { pool } }
}

#[async_trait]
impl ReferenceRepository for SqliteReferenceRepo {
    async fn list_skills(&self) -> Result<Vec<Skill>, AppError> {
        sqlx::query_as::<_, Skill>("SELECT id, name FROM skills ORDER BY name ASC")
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_states(&self) -> Result<Vec<UsState>, AppError> {
        sqlx::query_as::<_, UsState>("SELECT code, name FROM states ORDER BY name ASC")
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }
}

use crate::domain::{models::assignment::{Assignment, AssignmentStatus}, ports::AssignmentRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;

pub struct SqliteAssignmentRepo {
    pool: SqlitePool,
}

impl SqliteAssignmentRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AssignmentRepository for SqliteAssignmentRepo {
    async fn insert_if_absent(&self, assignment: &Assignment) -> Result<(Assignment, bool), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        // The unique (event_id, volunteer_id) index arbitrates concurrent applies.
        let inserted = sqlx::query(
            r#"
            INSERT INTO assignments (id, event_id, volunteer_id, status, hours_volunteered, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(event_id, volunteer_id) DO NOTHING
            "#,
        )
            .bind(&assignment.id)
            .bind(&assignment.event_id)
            .bind(&assignment.volunteer_id)
            .bind(assignment.status.as_str())
            .bind(assignment.hours_volunteered)
            .bind(assignment.created_at)
            .bind(assignment.updated_at)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?
            .rows_affected() > 0;

        let stored = sqlx::query_as::<_, Assignment>(
            "SELECT * FROM assignments WHERE event_id = ? AND volunteer_id = ?",
        )
            .bind(&assignment.event_id)
            .bind(&assignment.volunteer_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok((stored, inserted))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Assignment>, AppError> {
        sqlx::query_as::<_, Assignment>("SELECT * FROM assignments WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_pair(&self, event_id: &str, volunteer_id: &str) -> Result<Option<Assignment>, AppError> {
        sqlx::query_as::<_, Assignment>("SELECT * FROM assignments WHERE event_id = ? AND volunteer_id = ?")
            .bind(event_id)
            .bind(volunteer_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list(&self) -> Result<Vec<Assignment>, AppError> {
        sqlx::query_as::<_, Assignment>("SELECT * FROM assignments ORDER BY created_at ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_volunteer(&self, volunteer_id: &str) -> Result<Vec<Assignment>, AppError> {
        sqlx::query_as::<_, Assignment>(
            "SELECT * FROM assignments WHERE volunteer_id = ? ORDER BY created_at DESC",
        )
            .bind(volunteer_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_active_by_event(&self, event_id: &str) -> Result<Vec<Assignment>, AppError> {
        sqlx::query_as::<_, Assignment>(
            "SELECT * FROM assignments WHERE event_id = ? AND status IN ('assigned', 'registered') ORDER BY created_at ASC",
        )
            .bind(event_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update_status(&self, id: &str, from: AssignmentStatus, to: AssignmentStatus) -> Result<Option<Assignment>, AppError> {
        sqlx::query_as::<_, Assignment>(
            "UPDATE assignments SET status = ?, updated_at = ? WHERE id = ? AND status = ? RETURNING *",
        )
            .bind(to.as_str())
            .bind(Utc::now())
            .bind(id)
            .bind(from.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn complete_before(&self, today: NaiveDate) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE assignments SET status = 'completed', updated_at = ?
            WHERE status IN ('assigned', 'registered')
              AND event_id IN (SELECT id FROM events WHERE date < ?)
            "#,
        )
            .bind(Utc::now())
            .bind(today)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok(result.rows_affected())
    }
}

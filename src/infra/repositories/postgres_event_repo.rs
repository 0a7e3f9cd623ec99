use crate::domain::{models::{event::EventRecord, reference::SkillId}, ports::EventRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, Transaction};
use std::collections::{BTreeSet, HashMap};

pub struct PostgresEventRepo {
    pool: PgPool,
}

impl PostgresEventRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn attach_skills(&self, mut events: Vec<EventRecord>) -> Result<Vec<EventRecord>, AppError> {
        if events.is_empty() {
            return Ok(events);
        }

        let rows = sqlx::query_as::<_, (String, SkillId)>("SELECT event_id, skill_id FROM event_skills")
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;

        let mut map: HashMap<String, BTreeSet<SkillId>> = HashMap::new();
        for (event_id, skill_id) in rows {
            map.entry(event_id).or_default().insert(skill_id);
        }
        for event in events.iter_mut() {
            event.required_skills = map.remove(&event.id).unwrap_or_default();
        }
        Ok(events)
    }

    async fn replace_skills(tx: &mut Transaction<'_, Postgres>, event: &EventRecord) -> Result<(), AppError> {
        sqlx::query("DELETE FROM event_skills WHERE event_id = $1")
            .bind(&event.id)
            .execute(&mut **tx)
            .await
            .map_err(AppError::Database)?;

        for skill_id in &event.required_skills {
            sqlx::query("INSERT INTO event_skills (event_id, skill_id) VALUES ($1, $2)")
                .bind(&event.id)
                .bind(skill_id)
                .execute(&mut **tx)
                .await
                .map_err(AppError::Database)?;
        }
        Ok(())
    }
}

#[async_trait]
impl EventRepository for PostgresEventRepo {
    async fn create(&self, event: &EventRecord) -> Result<EventRecord, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        sqlx::query(
            "INSERT INTO events (id, name, description, city, state, zipcode, urgency, date, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
            .bind(&event.id)
            .bind(&event.name)
            .bind(&event.description)
            .bind(&event.location.city)
            .bind(&event.location.state)
            .bind(&event.location.zipcode)
            .bind(event.urgency.as_str())
            .bind(event.date)
            .bind(event.created_at)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        Self::replace_skills(&mut tx, event).await?;
        tx.commit().await.map_err(AppError::Database)?;
        Ok(event.clone())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<EventRecord>, AppError> {
        let event = sqlx::query_as::<_, EventRecord>("SELECT * FROM events WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?;

        let Some(mut event) = event else { return Ok(None) };

        event.required_skills = sqlx::query_as::<_, (SkillId,)>("SELECT skill_id FROM event_skills WHERE event_id = $1")
            .bind(id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?
            .into_iter()
            .map(|(s,)| s)
            .collect();

        Ok(Some(event))
    }

    async fn list(&self) -> Result<Vec<EventRecord>, AppError> {
        let events = sqlx::query_as::<_, EventRecord>("SELECT * FROM events ORDER BY date ASC, id ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;
        self.attach_skills(events).await
    }

    async fn list_upcoming(&self, today: NaiveDate) -> Result<Vec<EventRecord>, AppError> {
        let events = sqlx::query_as::<_, EventRecord>("SELECT * FROM events WHERE date >= $1 ORDER BY date ASC, id ASC")
            .bind(today)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;
        self.attach_skills(events).await
    }

    async fn list_past(&self, today: NaiveDate) -> Result<Vec<EventRecord>, AppError> {
        let events = sqlx::query_as::<_, EventRecord>("SELECT * FROM events WHERE date < $1 ORDER BY date DESC, id ASC")
            .bind(today)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;
        self.attach_skills(events).await
    }

    async fn update(&self, event: &EventRecord) -> Result<EventRecord, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let result = sqlx::query(
            "UPDATE events SET name = $1, description = $2, city = $3, state = $4, zipcode = $5, urgency = $6, date = $7 WHERE id = $8",
        )
            .bind(&event.name)
            .bind(&event.description)
            .bind(&event.location.city)
            .bind(&event.location.state)
            .bind(&event.location.zipcode)
            .bind(event.urgency.as_str())
            .bind(event.date)
            .bind(&event.id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Event not found".into()));
        }

        Self::replace_skills(&mut tx, event).await?;
        tx.commit().await.map_err(AppError::Database)?;
        Ok(event.clone())
    }
}

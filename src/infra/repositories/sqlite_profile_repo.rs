use crate::domain::{models::{profile::VolunteerProfile, reference::SkillId}, ports::ProfileRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::SqlitePool;
use std::collections::{BTreeSet, HashMap};

pub struct SqliteProfileRepo {
    pool: SqlitePool,
}

impl SqliteProfileRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn skill_map(&self) -> Result<HashMap<String, BTreeSet<SkillId>>, AppError> {
        let rows = sqlx::query_as::<_, (String, SkillId)>("SELECT volunteer_id, skill_id FROM volunteer_skills")
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;

        let mut map: HashMap<String, BTreeSet<SkillId>> = HashMap::new();
        for (volunteer_id, skill_id) in rows {
            map.entry(volunteer_id).or_default().insert(skill_id);
        }
        Ok(map)
    }

    async fn availability_map(&self) -> Result<HashMap<String, BTreeSet<NaiveDate>>, AppError> {
        let rows = sqlx::query_as::<_, (String, NaiveDate)>("SELECT volunteer_id, available_date FROM volunteer_availability")
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;

        let mut map: HashMap<String, BTreeSet<NaiveDate>> = HashMap::new();
        for (volunteer_id, date) in rows {
            map.entry(volunteer_id).or_default().insert(date);
        }
        Ok(map)
    }
}

#[async_trait]
impl ProfileRepository for SqliteProfileRepo {
    async fn find_by_id(&self, id: &str) -> Result<Option<VolunteerProfile>, AppError> {
        let profile = sqlx::query_as::<_, VolunteerProfile>("SELECT * FROM volunteer_profiles WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?;

        let Some(mut profile) = profile else { return Ok(None) };

        profile.skills = sqlx::query_as::<_, (SkillId,)>("SELECT skill_id FROM volunteer_skills WHERE volunteer_id = ?")
            .bind(id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?
            .into_iter()
            .map(|(s,)| s)
            .collect();

        profile.availability = sqlx::query_as::<_, (NaiveDate,)>(
            "SELECT available_date FROM volunteer_availability WHERE volunteer_id = ?",
        )
            .bind(id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?
            .into_iter()
            .map(|(d,)| d)
            .collect();

        Ok(Some(profile))
    }

    async fn list(&self) -> Result<Vec<VolunteerProfile>, AppError> {
        let mut profiles = sqlx::query_as::<_, VolunteerProfile>("SELECT * FROM volunteer_profiles ORDER BY full_name ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;

        let mut skills = self.skill_map().await?;
        let mut availability = self.availability_map().await?;
        for profile in profiles.iter_mut() {
            profile.skills = skills.remove(&profile.id).unwrap_or_default();
            profile.availability = availability.remove(&profile.id).unwrap_or_default();
        }
        Ok(profiles)
    }

    async fn upsert(&self, profile: &VolunteerProfile) -> Result<VolunteerProfile, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        sqlx::query(
            r#"
            INSERT INTO volunteer_profiles (id, full_name, address1, address2, city, state, zipcode, preferences, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                full_name = excluded.full_name,
                address1 = excluded.address1,
                address2 = excluded.address2,
                city = excluded.city,
                state = excluded.state,
                zipcode = excluded.zipcode,
                preferences = excluded.preferences,
                updated_at = excluded.updated_at
            "#,
        )
            .bind(&profile.id)
            .bind(&profile.full_name)
            .bind(&profile.address1)
            .bind(&profile.address2)
            .bind(&profile.city)
            .bind(&profile.state)
            .bind(&profile.zipcode)
            .bind(&profile.preferences)
            .bind(profile.created_at)
            .bind(profile.updated_at)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        sqlx::query("DELETE FROM volunteer_skills WHERE volunteer_id = ?")
            .bind(&profile.id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        for skill_id in &profile.skills {
            sqlx::query("INSERT INTO volunteer_skills (volunteer_id, skill_id) VALUES (?, ?)")
                .bind(&profile.id)
                .bind(skill_id)
                .execute(&mut *tx)
                .await
                .map_err(AppError::Database)?;
        }

        sqlx::query("DELETE FROM volunteer_availability WHERE volunteer_id = ?")
            .bind(&profile.id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        for date in &profile.availability {
            sqlx::query("INSERT INTO volunteer_availability (volunteer_id, available_date) VALUES (?, ?)")
                .bind(&profile.id)
                .bind(date)
                .execute(&mut *tx)
                .await
                .map_err(AppError::Database)?;
        }

        tx.commit().await.map_err(AppError::Database)?;
        Ok(profile.clone())
    }
}

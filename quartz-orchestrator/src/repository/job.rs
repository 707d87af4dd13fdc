//! Job Repository
//!
//! Postgres implementation of the job registry.

use std::collections::HashMap;

use async_trait::async_trait;
use quartz_core::domain::job::{Cron, Job};
use quartz_core::dto::job::CreateJob;
use sqlx::PgPool;
use uuid::Uuid;

use super::JobRepository;

/// Job registry backed by the `jobs` and `schedule` tables
#[derive(Clone)]
pub struct PgJobRepository {
    pool: PgPool,
}

impl PgJobRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn schedule_for(&self, job_id: Uuid) -> Result<Vec<Cron>, sqlx::Error> {
        let rows = sqlx::query_as::<_, CronRow>(
            r#"
            SELECT id, job_id, expression
            FROM schedule
            WHERE job_id = $1
            ORDER BY position ASC
            "#,
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }
}

#[async_trait]
impl JobRepository for PgJobRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Job>, sqlx::Error> {
        let row = sqlx::query_as::<_, JobRow>(
            r#"
            SELECT id, name, timezone, container_id, created_at, updated_at
            FROM jobs
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let schedule = self.schedule_for(id).await?;
        Ok(Some(row.into_job(schedule)))
    }

    async fn list_all(&self) -> Result<Vec<Job>, sqlx::Error> {
        let rows = sqlx::query_as::<_, JobRow>(
            r#"
            SELECT id, name, timezone, container_id, created_at, updated_at
            FROM jobs
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        // One query for every schedule row, grouped in memory by owner
        let cron_rows = sqlx::query_as::<_, CronRow>(
            r#"
            SELECT id, job_id, expression
            FROM schedule
            ORDER BY job_id, position ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut schedules: HashMap<Uuid, Vec<Cron>> = HashMap::new();
        for row in cron_rows {
            schedules.entry(row.job_id).or_default().push(row.into());
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let schedule = schedules.remove(&row.id).unwrap_or_default();
                row.into_job(schedule)
            })
            .collect())
    }

    async fn create(&self, req: CreateJob) -> Result<Job, sqlx::Error> {
        let id = Uuid::new_v4();
        let now = chrono::Utc::now();

        // Dropping the transaction without commit rolls it back
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO jobs (id, name, timezone, container_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(id)
        .bind(&req.name)
        .bind(&req.timezone)
        .bind(&req.container_id)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let mut schedule = Vec::with_capacity(req.schedule.len());
        for (position, expression) in req.schedule.iter().enumerate() {
            let cron_id = Uuid::new_v4();

            sqlx::query(
                r#"
                INSERT INTO schedule (id, job_id, expression, position)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(cron_id)
            .bind(id)
            .bind(expression)
            .bind(position as i32)
            .execute(&mut *tx)
            .await?;

            schedule.push(Cron {
                id: cron_id,
                expression: expression.clone(),
            });
        }

        tx.commit().await?;

        Ok(Job {
            id,
            name: req.name,
            timezone: req.timezone,
            schedule,
            container_id: req.container_id,
            created_at: now,
            updated_at: now,
        })
    }

    async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct JobRow {
    id: Uuid,
    name: String,
    timezone: String,
    container_id: String,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl JobRow {
    fn into_job(self, schedule: Vec<Cron>) -> Job {
        Job {
            id: self.id,
            name: self.name,
            timezone: self.timezone,
            schedule,
            container_id: self.container_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CronRow {
    id: Uuid,
    job_id: Uuid,
    expression: String,
}

impl From<CronRow> for Cron {
    fn from(row: CronRow) -> Self {
        Cron {
            id: row.id,
            expression: row.expression,
        }
    }
}

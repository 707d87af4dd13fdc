//! In-memory job registry used by tests
//!
//! Commits are atomic by construction. Failures can be injected to exercise
//! the compensation paths of the deployment pipeline.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use quartz_core::domain::job::{Cron, Job};
use quartz_core::dto::job::CreateJob;
use uuid::Uuid;

use super::JobRepository;

#[derive(Default)]
pub struct InMemoryJobRepository {
    jobs: Mutex<Vec<Job>>,
    fail_create: AtomicBool,
    fail_delete: AtomicBool,
}

impl InMemoryJobRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `create` fail as if the commit was rejected
    pub fn fail_create(&self, fail: bool) {
        self.fail_create.store(fail, Ordering::SeqCst);
    }

    /// Makes every subsequent `delete` fail
    pub fn fail_delete(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.jobs.lock().unwrap().len()
    }

    pub fn contains_container(&self, container_id: &str) -> bool {
        self.jobs
            .lock()
            .unwrap()
            .iter()
            .any(|job| job.container_id == container_id)
    }
}

#[async_trait]
impl JobRepository for InMemoryJobRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Job>, sqlx::Error> {
        let jobs = self.jobs.lock().unwrap();
        Ok(jobs.iter().find(|job| job.id == id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Job>, sqlx::Error> {
        let jobs = self.jobs.lock().unwrap();
        Ok(jobs.iter().rev().cloned().collect())
    }

    async fn create(&self, req: CreateJob) -> Result<Job, sqlx::Error> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(sqlx::Error::PoolClosed);
        }

        let now = chrono::Utc::now();
        let job = Job {
            id: Uuid::new_v4(),
            name: req.name,
            timezone: req.timezone,
            schedule: req
                .schedule
                .into_iter()
                .map(|expression| Cron {
                    id: Uuid::new_v4(),
                    expression,
                })
                .collect(),
            container_id: req.container_id,
            created_at: now,
            updated_at: now,
        };

        self.jobs.lock().unwrap().push(job.clone());
        Ok(job)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(sqlx::Error::PoolClosed);
        }

        let mut jobs = self.jobs.lock().unwrap();
        let before = jobs.len();
        jobs.retain(|job| job.id != id);
        Ok(jobs.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, schedule: &[&str]) -> CreateJob {
        CreateJob {
            name: name.to_string(),
            timezone: "UTC".to_string(),
            schedule: schedule.iter().map(|s| s.to_string()).collect(),
            container_id: Uuid::new_v4().to_string(),
        }
    }

    #[tokio::test]
    async fn test_list_returns_every_job_with_schedule() {
        let repo = InMemoryJobRepository::new();
        repo.create(request("a", &["* * * * *"])).await.unwrap();
        repo.create(request("b", &["0 0 * * *", "0 12 * * *"]))
            .await
            .unwrap();
        repo.create(request("c", &[])).await.unwrap();

        let jobs = repo.list_all().await.unwrap();
        assert_eq!(jobs.len(), 3);

        let b = jobs.iter().find(|j| j.name == "b").unwrap();
        assert_eq!(b.expressions(), vec!["0 0 * * *", "0 12 * * *"]);
    }

    #[tokio::test]
    async fn test_failed_create_persists_nothing() {
        let repo = InMemoryJobRepository::new();
        repo.fail_create(true);

        assert!(repo.create(request("a", &["* * * * *"])).await.is_err());
        assert_eq!(repo.len(), 0);
    }

    #[tokio::test]
    async fn test_delete_unknown_returns_false() {
        let repo = InMemoryJobRepository::new();
        assert!(!repo.delete(Uuid::new_v4()).await.unwrap());
    }
}

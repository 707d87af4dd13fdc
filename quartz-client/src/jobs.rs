//! Job-related API endpoints

use crate::OrchestratorClient;
use crate::error::Result;
use quartz_core::domain::job::Job;
use quartz_core::dto::job::JobCreated;
use reqwest::multipart::{Form, Part};
use uuid::Uuid;

impl OrchestratorClient {
    /// Deploy a job archive
    ///
    /// # Arguments
    /// * `file_name` - Archive file name; its extension selects the format (`.tar.gz`, `.tgz`, `.tar`)
    /// * `bytes` - The archive contents
    ///
    /// # Example
    /// ```no_run
    /// # use quartz_client::OrchestratorClient;
    /// # async fn example() -> quartz_client::Result<()> {
    /// let client = OrchestratorClient::new("http://localhost:8080");
    /// let bytes = std::fs::read("report.tar.gz").unwrap();
    /// let created = client.deploy_job("report.tar.gz", bytes).await?;
    /// println!("{} running in {}", created.id, created.container_id);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn deploy_job(
        &self,
        file_name: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<JobCreated> {
        let url = format!("{}/api/v0/jobs", self.base_url);
        let part = Part::bytes(bytes).file_name(file_name.into());
        let form = Form::new().part("file", part);

        let response = self.client.post(&url).multipart(form).send().await?;

        self.handle_response(response).await
    }

    /// Get a job by ID
    pub async fn get_job(&self, job_id: Uuid) -> Result<Job> {
        let url = format!("{}/api/v0/jobs/{}", self.base_url, job_id);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }

    /// List all jobs, newest first
    pub async fn list_jobs(&self) -> Result<Vec<Job>> {
        let url = format!("{}/api/v0/jobs", self.base_url);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }

    /// Delete a job, removing its container and image
    pub async fn delete_job(&self, job_id: Uuid) -> Result<()> {
        let url = format!("{}/api/v0/jobs/{}", self.base_url, job_id);
        let response = self.client.delete(&url).send().await?;

        self.handle_empty_response(response).await
    }
}

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::scan_types::{ScheduledJob, SchedulerError};

/// Recurring check jobs held by an external scheduler
#[async_trait]
pub trait JobScheduler: Send + Sync {
    /// Delete a job so it stops firing
    async fn delete_job(&self, job_name: &str) -> Result<(), SchedulerError>;

    /// List the currently scheduled jobs
    async fn list_jobs(&self) -> Result<Vec<ScheduledJob>, SchedulerError>;
}

/// Client for the Cloud Scheduler REST API
pub struct CloudSchedulerClient {
    client: Client,
    base_url: String,
    parent: String,
    access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListJobsResponse {
    #[serde(default)]
    jobs: Vec<ScheduledJob>,
    next_page_token: Option<String>,
}

impl CloudSchedulerClient {
    /// Create a client for jobs under `projects/{project_id}/locations/{location}`
    pub fn new(
        base_url: &str,
        project_id: &str,
        location: &str,
        access_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, SchedulerError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SchedulerError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            parent: format!("projects/{}/locations/{}", project_id, location),
            access_token,
        })
    }

    /// Full resource name for a job; names already qualified are kept
    fn job_resource_name(&self, job_name: &str) -> String {
        if job_name.starts_with("projects/") {
            job_name.to_string()
        } else {
            format!("{}/jobs/{}", self.parent, urlencoding::encode(job_name))
        }
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.access_token {
            Some(ref token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl JobScheduler for CloudSchedulerClient {
    async fn delete_job(&self, job_name: &str) -> Result<(), SchedulerError> {
        let resource = self.job_resource_name(job_name);
        let url = format!("{}/{}", self.base_url, resource);

        debug!("Deleting scheduler job {}", resource);

        let response = self
            .authorize(self.client.delete(&url))
            .send()
            .await
            .map_err(|e| SchedulerError::Network(format!("Delete request failed: {}", e)))?;

        check_status(response, job_name).await?;

        info!("Deleted scheduler job {}", resource);
        Ok(())
    }

    async fn list_jobs(&self) -> Result<Vec<ScheduledJob>, SchedulerError> {
        let url = format!("{}/{}/jobs", self.base_url, self.parent);
        let mut jobs = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self.authorize(self.client.get(&url));
            if let Some(ref token) = page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let response = request
                .send()
                .await
                .map_err(|e| SchedulerError::Network(format!("List request failed: {}", e)))?;

            let page: ListJobsResponse = check_status(response, &self.parent)
                .await?
                .json()
                .await
                .map_err(|e| SchedulerError::DataFormat(format!("Failed to parse jobs: {}", e)))?;

            jobs.extend(page.jobs);

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        debug!("Listed {} scheduler jobs under {}", jobs.len(), self.parent);
        Ok(jobs)
    }
}

async fn check_status(response: Response, resource: &str) -> Result<Response, SchedulerError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read response body".to_string());
    warn!("Scheduler request failed with status {}: {}", status, body);

    match status.as_u16() {
        401 | 403 => Err(SchedulerError::AuthenticationFailed),
        404 => Err(SchedulerError::NotFound(resource.to_string())),
        _ => Err(SchedulerError::Api(format!("HTTP {} - {}", status, body))),
    }
}

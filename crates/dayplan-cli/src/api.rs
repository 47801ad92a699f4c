use anyhow::{bail, Result};
use chrono::NaiveDate;

use dayplan_shared::schemas::{Task, TaskDraft, TaskPatch};

use crate::config::Configuration;

/// HTTP API client for the dayplan hub.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

/// Result of triggering the daily summary remotely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryStatus {
    Queued,
    NoTasks,
}

impl ApiClient {
    pub fn new(config: &Configuration) -> Result<Self> {
        Ok(Self {
            http: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .build()?,
            base_url: config.api_url.clone(),
        })
    }

    pub async fn list_tasks(&self) -> Result<Vec<Task>> {
        self.get_tasks(format!("{}/api/tasks", self.base_url)).await
    }

    pub async fn tasks_by_date(&self, date: NaiveDate) -> Result<Vec<Task>> {
        self.get_tasks(format!("{}/api/tasks?date={date}", self.base_url))
            .await
    }

    pub async fn tasks_between(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<Task>> {
        self.get_tasks(format!(
            "{}/api/tasks?from={from}&to={to}",
            self.base_url
        ))
        .await
    }

    async fn get_tasks(&self, url: String) -> Result<Vec<Task>> {
        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            bail!("GET /api/tasks failed ({status}): {text}");
        }
        Ok(resp.json().await?)
    }

    pub async fn create_task(&self, draft: &TaskDraft) -> Result<Task> {
        let resp = self
            .http
            .post(format!("{}/api/tasks", self.base_url))
            .json(draft)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            bail!("POST /api/tasks failed ({status}): {text}");
        }
        Ok(resp.json().await?)
    }

    /// `Ok(None)` when the hub does not know the id.
    pub async fn update_task(&self, id: &str, patch: &TaskPatch) -> Result<Option<Task>> {
        let resp = self
            .http
            .put(format!("{}/api/tasks/{id}", self.base_url))
            .json(patch)
            .send()
            .await?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            bail!("PUT /api/tasks/{id} failed ({status}): {text}");
        }
        Ok(Some(resp.json().await?))
    }

    /// `Ok(false)` when the hub does not know the id.
    pub async fn delete_task(&self, id: &str) -> Result<bool> {
        let resp = self
            .http
            .delete(format!("{}/api/tasks/{id}", self.base_url))
            .send()
            .await?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(false);
        }
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            bail!("DELETE /api/tasks/{id} failed ({status}): {text}");
        }
        Ok(true)
    }

    pub async fn trigger_daily_summary(
        &self,
        date: Option<NaiveDate>,
        recipients: &[String],
    ) -> Result<SummaryStatus> {
        let mut body = serde_json::json!({});
        if let Some(date) = date {
            body["date"] = serde_json::Value::String(date.to_string());
        }
        if !recipients.is_empty() {
            body["recipients"] = serde_json::json!(recipients);
        }

        let resp = self
            .http
            .post(format!("{}/api/notifications/daily", self.base_url))
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        match status {
            reqwest::StatusCode::ACCEPTED => Ok(SummaryStatus::Queued),
            reqwest::StatusCode::NO_CONTENT => Ok(SummaryStatus::NoTasks),
            _ => {
                let text = resp.text().await.unwrap_or_default();
                bail!("POST /api/notifications/daily failed ({status}): {text}");
            }
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

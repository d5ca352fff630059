//! HTTP planner client implementation
//!
//! Talks to the planning service's REST surface with a bearer token. The
//! board does not own the wire protocol; this module only follows the
//! service's existing shapes (collections wrapped in a `value` array,
//! camelCase fields).

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use async_trait::async_trait;

use crate::client::PlannerClient;
use crate::error::PlannerError;
use crate::types::{NewTask, Plan, Task};

/// Configuration for the HTTP planner client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Base URL of the planning service API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Environment variable holding the bearer token
    #[serde(default = "default_token_env")]
    pub token_env: String,

    /// Per-request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_base_url() -> String {
    "https://graph.microsoft.com/v1.0".to_string()
}

fn default_token_env() -> String {
    "PLANNER_TOKEN".to_string()
}

fn default_timeout_ms() -> u64 {
    30_000
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token_env: default_token_env(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

/// Collections come back wrapped in a `value` array
#[derive(Debug, Deserialize)]
struct ListResponse<T> {
    value: Vec<T>,
}

/// reqwest-backed planner client
pub struct HttpPlannerClient {
    base_url: String,
    token: String,
    http: Client,
    timeout: Duration,
}

impl HttpPlannerClient {
    /// Create a new client from configuration
    ///
    /// Reads the bearer token from the environment variable named in config.
    /// A missing token is reported as `NotSignedIn` so callers degrade the
    /// same way they do for a signed-out session.
    pub fn from_config(config: &ServiceConfig) -> Result<Self, PlannerError> {
        debug!(base_url = %config.base_url, token_env = %config.token_env, "from_config: called");
        let token = std::env::var(&config.token_env).map_err(|_| PlannerError::NotSignedIn)?;

        let timeout = Duration::from_millis(config.timeout_ms);
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(PlannerError::Network)?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token,
            http,
            timeout,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn map_send_error(&self, err: reqwest::Error) -> PlannerError {
        if err.is_timeout() {
            PlannerError::Timeout(self.timeout)
        } else {
            PlannerError::Network(err)
        }
    }

    /// Turn a non-success response into a typed error
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, PlannerError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_else(|_| String::new());
        Err(PlannerError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, PlannerError> {
        debug!(%path, "get_json: called");
        let response = self
            .http
            .get(self.url(path))
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        let response = Self::check(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| PlannerError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl PlannerClient for HttpPlannerClient {
    async fn get_all_my_plans(&self) -> Result<Vec<Plan>, PlannerError> {
        let list: ListResponse<Plan> = self.get_json("/me/planner/plans").await?;
        Ok(list.value)
    }

    async fn get_single_plan(&self, id: &str) -> Result<Plan, PlannerError> {
        self.get_json(&format!("/planner/plans/{}", id)).await
    }

    async fn get_tasks_for_plan(&self, plan_id: &str) -> Result<Vec<Task>, PlannerError> {
        let list: ListResponse<Task> = self
            .get_json(&format!("/planner/plans/{}/tasks", plan_id))
            .await?;
        Ok(list.value)
    }

    async fn add_task(&self, plan_id: &str, task: NewTask) -> Result<Task, PlannerError> {
        debug!(%plan_id, title = %task.title, "add_task: called");
        let response = self
            .http
            .post(self.url("/planner/tasks"))
            .bearer_auth(&self.token)
            .json(&task)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        let response = Self::check(response).await?;
        response
            .json::<Task>()
            .await
            .map_err(|e| PlannerError::InvalidResponse(e.to_string()))
    }

    async fn set_task_complete(&self, task_id: &str) -> Result<(), PlannerError> {
        debug!(%task_id, "set_task_complete: called");
        let body = serde_json::json!({ "percentComplete": 100 });
        let response = self
            .http
            .patch(self.url(&format!("/planner/tasks/{}", task_id)))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        Self::check(response).await?;
        Ok(())
    }

    async fn remove_task(&self, task_id: &str) -> Result<(), PlannerError> {
        debug!(%task_id, "remove_task: called");
        let response = self
            .http
            .delete(self.url(&format!("/planner/tasks/{}", task_id)))
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        Self::check(response).await?;
        Ok(())
    }
}

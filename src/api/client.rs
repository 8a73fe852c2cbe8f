//! Reqwest-backed implementation of the commit gateway.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;
use uuid::Uuid;

use super::types::{BranchDataResponse, CommitRequest, CommitResponse, GatewayError};
use super::CommitGateway;

/// Default request timeout in seconds. Exceeding it surfaces as a
/// transport failure; the workflow never retries.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client version (from Cargo.toml)
const VERSION: &str = env!("CARGO_PKG_VERSION");

fn build_user_agent() -> String {
    format!("commitflow/{}", VERSION)
}

/// API client for a GitLab-style server.
pub struct ApiClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
    user_agent: String,
    session_id: String,
}

impl ApiClient {
    /// Create a client against `base_url`, e.g. `https://gitlab.example.com/api/v4/`.
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self, GatewayError> {
        let base_url = Url::parse(base_url)
            .map_err(|err| GatewayError::Url(format!("{}: {}", base_url, err)))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("Failed to build HTTP client");

        Ok(Self {
            client,
            base_url,
            token,
            user_agent: build_user_agent(),
            session_id: Uuid::new_v4().to_string(),
        })
    }

    /// Build an endpoint URL from path segments, percent-encoding each one
    /// (project ids and branch names may contain `/`).
    fn endpoint_url(&self, segments: &[&str]) -> Result<Url, GatewayError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| GatewayError::Url(format!("cannot-be-a-base: {}", self.base_url)))?;
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    fn apply_headers(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let request_id = Uuid::new_v4().to_string();
        let mut request = request
            .header("User-Agent", &self.user_agent)
            .header("x-request-id", request_id)
            .header("x-request-session-id", &self.session_id);

        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        request
    }

    async fn decode_response<R>(response: reqwest::Response) -> Result<R, GatewayError>
    where
        R: DeserializeOwned,
    {
        let status = response.status();
        debug!("=== API Response ===");
        debug!("Status: {}", status);

        let body = response.text().await?;
        if !status.is_success() {
            return Err(GatewayError::Http {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl CommitGateway for ApiClient {
    async fn fetch_branch_reference(
        &self,
        project_id: &str,
        branch_id: &str,
    ) -> Result<String, GatewayError> {
        let url =
            self.endpoint_url(&["projects", project_id, "repository", "branches", branch_id])?;
        debug!("=== Branch Request ===");
        debug!("URL: {}", url);

        let response = self.apply_headers(self.client.get(url)).send().await?;
        let branch: BranchDataResponse = Self::decode_response(response).await?;
        Ok(branch.commit.id)
    }

    async fn submit_commit(
        &self,
        project_id: &str,
        request: &CommitRequest,
    ) -> Result<CommitResponse, GatewayError> {
        let url = self.endpoint_url(&["projects", project_id, "repository", "commits"])?;
        debug!("=== Commit Request ===");
        debug!("URL: {}", url);
        debug!("Branch: {}", request.branch);
        debug!("Actions: {}", request.actions.len());

        let response = self
            .apply_headers(self.client.post(url))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await?;
        Self::decode_response(response).await
    }
}

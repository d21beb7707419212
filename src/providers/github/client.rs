use async_trait::async_trait;
use log::debug;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT};
use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

use crate::auth::Token;
use crate::context::Repository;
use crate::error::{Result, WaitError};
use crate::providers::DeploymentApi;

use super::types::{Deployment, DeploymentStatus, PullRequest};

const API_VERSION: &str = "2022-11-28";
const PAGE_SIZE: &str = "100";

/// GitHub REST API client scoped to a single repository.
pub struct GitHubClient {
    client: Client,
    /// `{base}/repos/{owner}/{repo}/`
    repo_url: Url,
    token: Option<Token>,
}

impl GitHubClient {
    /// Create a new GitHub API client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - GitHub API base URL (e.g., "https://api.github.com" or
    ///   "https://ghe.example.com/api/v3")
    /// * `repository` - Repository the deployments belong to
    /// * `token` - Optional GitHub token
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the base URL is invalid.
    pub fn new(base_url: &str, repository: &Repository, token: Option<Token>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            HeaderName::from_static("x-github-api-version"),
            HeaderValue::from_static(API_VERSION),
        );

        let client = Client::builder()
            .user_agent(concat!("deploywait/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(|e| WaitError::Config(format!("Failed to create HTTP client: {e}")))?;

        // Url::join drops the last path segment unless the base ends with a slash
        let mut base = base_url.trim_end_matches('/').to_string();
        base.push('/');

        let repo_url = Url::parse(&base)
            .map_err(|e| WaitError::Config(format!("Invalid API base URL: {e}")))?
            .join(&format!("repos/{}/{}/", repository.owner, repository.name))
            .map_err(|e| WaitError::Config(format!("Invalid repository URL: {e}")))?;

        Ok(Self {
            client,
            repo_url,
            token,
        })
    }

    fn auth_request(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(token) = &self.token {
            request.bearer_auth(token.as_str())
        } else {
            request
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.repo_url
            .join(path)
            .map_err(|e| WaitError::Config(format!("Invalid endpoint '{path}': {e}")))
    }

    /// Issue a GET and decode the JSON body.
    ///
    /// Non-2xx responses become [`WaitError::Api`]; bodies that do not match `T`
    /// become [`WaitError::Json`].
    async fn get_json<T>(&self, url: Url) -> Result<T>
    where
        T: DeserializeOwned,
    {
        debug!("GET {url}");

        let response = self.auth_request(self.client.get(url)).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(WaitError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl DeploymentApi for GitHubClient {
    async fn list_deployments(
        &self,
        sha: &str,
        environment: Option<&str>,
    ) -> Result<Vec<Deployment>> {
        let mut url = self.endpoint("deployments")?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("sha", sha);
            if let Some(environment) = environment {
                query.append_pair("environment", environment);
            }
            query.append_pair("per_page", PAGE_SIZE);
        }

        self.get_json(url).await
    }

    async fn list_deployment_statuses(&self, deployment_id: u64) -> Result<Vec<DeploymentStatus>> {
        let mut url = self.endpoint(&format!("deployments/{deployment_id}/statuses"))?;
        url.query_pairs_mut().append_pair("per_page", PAGE_SIZE);

        self.get_json(url).await
    }

    async fn get_pull_request(&self, number: u64) -> Result<PullRequest> {
        let url = self.endpoint(&format!("pulls/{number}"))?;
        self.get_json(url).await
    }
}

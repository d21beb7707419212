mod github;

use async_trait::async_trait;

use crate::error::Result;

pub use github::{Deployment, DeploymentState, DeploymentStatus, GitHubClient, PullRequest};

#[cfg(test)]
pub use github::{Actor, PullRequestHead};

/// Read-only view of the source-control API used while waiting on a deployment.
///
/// Every call is a single request; retrying is the caller's business.
#[async_trait]
pub trait DeploymentApi: Send + Sync {
    /// Lists deployments for `sha`, optionally narrowed to one environment, in API order.
    async fn list_deployments(&self, sha: &str, environment: Option<&str>)
        -> Result<Vec<Deployment>>;

    /// Lists the status history of a deployment, newest entry first.
    async fn list_deployment_statuses(&self, deployment_id: u64) -> Result<Vec<DeploymentStatus>>;

    async fn get_pull_request(&self, number: u64) -> Result<PullRequest>;
}

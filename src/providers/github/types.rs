use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A GitHub deployment.
///
/// Only the fields the wait loop needs are modelled. All are required except `creator`,
/// which GitHub reports as `null` when the creating account no longer exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deployment {
    /// Unique identifier for the deployment
    pub id: u64,
    /// Commit SHA the deployment was created for
    pub sha: String,
    /// Target environment name (e.g., "preview", "production")
    pub environment: String,
    /// Account that created the deployment
    #[serde(default)]
    pub creator: Option<Actor>,
    /// When the deployment was created
    pub created_at: DateTime<Utc>,
}

/// A GitHub account as embedded in deployment payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    /// Login name (e.g., "vercel[bot]")
    pub login: String,
}

/// Lifecycle state reported by a deployment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentState {
    Success,
    Inactive,
    Pending,
    Queued,
    InProgress,
    Error,
    Failure,
    #[serde(other)]
    Other,
}

impl std::fmt::Display for DeploymentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Success => "success",
            Self::Inactive => "inactive",
            Self::Pending => "pending",
            Self::Queued => "queued",
            Self::InProgress => "in_progress",
            Self::Error => "error",
            Self::Failure => "failure",
            Self::Other => "other",
        };
        f.write_str(label)
    }
}

/// A single entry from a deployment's status history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentStatus {
    /// Unique identifier for the status entry
    pub id: u64,
    /// Reported state
    pub state: DeploymentState,
    /// Public URL of the deployed environment, when the deployer reports one
    #[serde(default)]
    pub environment_url: Option<String>,
    /// When the status was reported
    pub created_at: DateTime<Utc>,
}

/// A pull request, reduced to what commit resolution needs.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub head: PullRequestHead,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PullRequestHead {
    /// SHA of the latest commit on the PR branch
    pub sha: String,
    #[serde(rename = "ref")]
    pub ref_: String,
}

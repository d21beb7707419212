use std::fmt;
use std::path::Path;
use std::str::FromStr;

use log::{debug, info};
use serde::Deserialize;

use crate::error::{Result, WaitError};
use crate::providers::DeploymentApi;

/// Repository coordinates in `owner/name` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub owner: String,
    pub name: String,
}

impl FromStr for Repository {
    type Err = WaitError;

    fn from_str(value: &str) -> Result<Self> {
        let parts: Vec<&str> = value.split('/').collect();
        match parts.as_slice() {
            [owner, name] if !owner.is_empty() && !name.is_empty() => Ok(Self {
                owner: (*owner).to_string(),
                name: (*name).to_string(),
            }),
            _ => Err(WaitError::Config(format!(
                "Repository must be in format 'owner/repo', got '{value}'"
            ))),
        }
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// What triggered this run: the commit pushed, or the pull request it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerContext {
    pub repository: Repository,
    pub sha: Option<String>,
    pub pr_number: Option<u64>,
}

/// The slice of a GitHub Actions event payload needed to find a pull request number.
#[derive(Debug, Deserialize)]
struct EventPayload {
    #[serde(default)]
    pull_request: Option<EventPullRequest>,
    #[serde(default)]
    number: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct EventPullRequest {
    number: u64,
}

const PULL_REQUEST_EVENTS: [&str; 2] = ["pull_request", "pull_request_target"];

impl TriggerContext {
    pub fn new(repository: Repository, sha: Option<String>, pr_number: Option<u64>) -> Self {
        Self {
            repository,
            sha: sha.filter(|s| !s.trim().is_empty()),
            pr_number,
        }
    }

    /// Fills in the pull request number from a GitHub Actions event payload.
    ///
    /// Only pull-request events carry a number worth resolving; any other event leaves the
    /// context untouched. An explicit number already on the context is kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload file cannot be read or parsed.
    pub fn with_event(mut self, event_name: Option<&str>, event_path: Option<&Path>) -> Result<Self> {
        if self.pr_number.is_some() {
            return Ok(self);
        }

        let (Some(event_name), Some(event_path)) = (event_name, event_path) else {
            return Ok(self);
        };

        if !PULL_REQUEST_EVENTS.contains(&event_name) {
            debug!("Event '{event_name}' is not a pull request event, using commit SHA");
            return Ok(self);
        }

        let contents = std::fs::read_to_string(event_path)?;
        let payload: EventPayload = serde_json::from_str(&contents)?;

        self.pr_number = payload.pull_request.map(|pr| pr.number).or(payload.number);
        debug!("Pull request number from event payload: {:?}", self.pr_number);

        Ok(self)
    }

    /// Resolves the commit whose deployment should be awaited.
    ///
    /// A pull request is looked up once to get its head SHA, since the SHA of a
    /// pull-request run is the synthetic merge commit. Without a pull request the
    /// pushed SHA is used as is. Nothing here retries.
    ///
    /// # Errors
    ///
    /// Returns [`WaitError::MissingCommit`] if neither source yields a SHA.
    pub async fn resolve_commit(&self, api: &dyn DeploymentApi) -> Result<String> {
        if let Some(number) = self.pr_number {
            let pr = api.get_pull_request(number).await.map_err(|e| {
                WaitError::MissingCommit(format!("failed to load pull request #{number}: {e}"))
            })?;
            info!("Resolved pull request #{number} to head commit {}", pr.head.sha);
            return Ok(pr.head.sha);
        }

        self.sha.clone().ok_or_else(|| {
            WaitError::MissingCommit(
                "no pull request number or commit SHA in the trigger context".to_string(),
            )
        })
    }
}

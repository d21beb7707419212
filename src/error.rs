use thiserror::Error;

#[derive(Error, Debug)]
pub enum WaitError {
    #[error("API request failed with status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not resolve the commit SHA to wait on: {0}")]
    MissingCommit(String),

    #[error("No deployment created by '{actor}' was found for commit {sha} after {attempts} attempts")]
    DeploymentNotFound {
        actor: String,
        sha: String,
        attempts: u64,
    },

    #[error("Deployment {deployment_id} did not reach a successful state after {attempts} attempts")]
    StatusTimeout { deployment_id: u64, attempts: u64 },

    #[error("Deployment {deployment_id} succeeded but reported no environment URL")]
    MissingEnvironmentUrl { deployment_id: u64 },

    #[error("Deployment environment URL '{url}' is invalid: {reason}")]
    InvalidEnvironmentUrl { url: String, reason: String },

    #[error("{url} did not become reachable after {attempts} attempts")]
    Unreachable { url: String, attempts: u64 },
}

pub type Result<T> = std::result::Result<T, WaitError>;

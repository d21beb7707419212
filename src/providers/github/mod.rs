mod client;
mod types;


pub use client::GitHubClient;
pub use types::{Deployment, DeploymentState, DeploymentStatus, PullRequest};

#[cfg(test)]
pub use types::{Actor, PullRequestHead};

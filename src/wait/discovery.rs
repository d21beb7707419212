use super::budget::PollConfig;
use super::poller::{poll, Attempt, PollOutcome};
use crate::providers::{Deployment, DeploymentApi};

/// Picks the first deployment created by `actor`, keeping API order.
pub fn find_by_actor(deployments: Vec<Deployment>, actor: &str) -> Option<Deployment> {
    deployments
        .into_iter()
        .find(|d| d.creator.as_ref().is_some_and(|c| c.login == actor))
}

/// Polls until a deployment for `sha` created by `actor` shows up.
///
/// The deployer often starts after this process does, so an empty list, a list without
/// a matching creator and a failed request are all treated as "not there yet".
pub async fn discover_deployment(
    api: &dyn DeploymentApi,
    sha: &str,
    environment: Option<&str>,
    actor: &str,
    config: &PollConfig,
) -> PollOutcome<Deployment> {
    poll("deployment", config, |_| async move {
        match api.list_deployments(sha, environment).await {
            Ok(deployments) => {
                let total = deployments.len();
                match find_by_actor(deployments, actor) {
                    Some(deployment) => Attempt::Ready(deployment),
                    None => Attempt::NotYetReady(format!(
                        "{total} deployment(s) for {sha}, none created by '{actor}'"
                    )),
                }
            }
            Err(e) => Attempt::Failed(e),
        }
    })
    .await
}

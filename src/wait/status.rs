use super::budget::PollConfig;
use super::poller::{poll, Attempt, PollOutcome};
use crate::providers::{DeploymentApi, DeploymentState, DeploymentStatus};

/// Decides whether a deployment's status history means it is live.
///
/// Only the newest entry (first in the list) is considered:
/// 1. no entries: not ready
/// 2. `inactive` with `allow_inactive`: ready
/// 3. anything but `success`: not ready
/// 4. `success`: ready
pub fn classify(statuses: Vec<DeploymentStatus>, allow_inactive: bool) -> Attempt<DeploymentStatus> {
    let Some(latest) = statuses.into_iter().next() else {
        return Attempt::NotYetReady("no statuses reported yet".to_string());
    };

    match latest.state {
        DeploymentState::Inactive if allow_inactive => Attempt::Ready(latest),
        DeploymentState::Success => Attempt::Ready(latest),
        state => Attempt::NotYetReady(format!("latest status is '{state}'")),
    }
}

/// Polls the status history of `deployment_id` until [`classify`] reports it ready.
pub async fn await_status(
    api: &dyn DeploymentApi,
    deployment_id: u64,
    allow_inactive: bool,
    config: &PollConfig,
) -> PollOutcome<DeploymentStatus> {
    let label = format!("deployment {deployment_id} status");
    poll(&label, config, |_| async move {
        match api.list_deployment_statuses(deployment_id).await {
            Ok(statuses) => classify(statuses, allow_inactive),
            Err(e) => Attempt::Failed(e),
        }
    })
    .await
}

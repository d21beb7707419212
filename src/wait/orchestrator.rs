use std::fmt;
use std::future::Future;
use std::time::Instant;

use chrono::Utc;
use log::info;
use serde::Serialize;
use url::Url;

use super::budget::PollConfig;
use super::discovery::discover_deployment;
use super::poller::PollOutcome;
use super::reachability::{await_reachable, target_url, Probe};
use super::status::await_status;
use crate::context::TriggerContext;
use crate::error::{Result, WaitError};
use crate::output::StageProgress;
use crate::providers::DeploymentApi;
use crate::report::{StageReport, WaitReport};

/// Ordered stages of a wait run. Each one starts only after the previous one succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    ResolveCommit,
    DiscoverDeployment,
    AwaitStatus,
    AwaitReachable,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::ResolveCommit => "resolve commit",
            Self::DiscoverDeployment => "discover deployment",
            Self::AwaitStatus => "await status",
            Self::AwaitReachable => "await reachable",
        };
        f.write_str(label)
    }
}

/// Caller-supplied knobs, already validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitOptions {
    pub environment: Option<String>,
    pub actor: String,
    pub allow_inactive: bool,
    pub path: String,
    /// Budget for each polling stage, not for the whole run
    pub max_timeout_secs: u64,
    pub interval_ms: u64,
}

impl WaitOptions {
    fn poll_config(&self) -> PollConfig {
        PollConfig::new(self.max_timeout_secs, self.interval_ms)
    }
}

/// Extracts the host component of a deployment's environment URL.
///
/// # Errors
///
/// Returns [`WaitError::InvalidEnvironmentUrl`] if the URL does not parse or has no host.
pub fn parse_host(environment_url: &str) -> Result<String> {
    let invalid = |reason: String| WaitError::InvalidEnvironmentUrl {
        url: environment_url.to_string(),
        reason,
    };

    let url = Url::parse(environment_url).map_err(|e| invalid(e.to_string()))?;
    url.host_str()
        .map(ToString::to_string)
        .ok_or_else(|| invalid("URL has no host".to_string()))
}

/// Sequences commit resolution, deployment discovery, status polling and the
/// reachability check, threading each stage's result into the next.
pub struct WaitOrchestrator<'a> {
    api: &'a dyn DeploymentApi,
    probe: &'a dyn Probe,
    context: TriggerContext,
    options: WaitOptions,
}

impl<'a> WaitOrchestrator<'a> {
    pub fn new(
        api: &'a dyn DeploymentApi,
        probe: &'a dyn Probe,
        context: TriggerContext,
        options: WaitOptions,
    ) -> Self {
        Self {
            api,
            probe,
            context,
            options,
        }
    }

    /// Runs every stage in order.
    ///
    /// Any timeout or missing value ends the run with the matching fatal [`WaitError`];
    /// no stage is retried once it has given up.
    ///
    /// # Errors
    ///
    /// - [`WaitError::MissingCommit`] if no commit could be resolved
    /// - [`WaitError::DeploymentNotFound`] if the actor's deployment never appears
    /// - [`WaitError::StatusTimeout`] if the deployment never succeeds
    /// - [`WaitError::MissingEnvironmentUrl`] / [`WaitError::InvalidEnvironmentUrl`] if the
    ///   successful status has no usable URL
    /// - [`WaitError::Unreachable`] if the URL never answers
    pub async fn run(&self) -> Result<WaitReport> {
        let config = self.options.poll_config();
        let mut stages = Vec::with_capacity(4);

        info!(
            "Waiting on {} for a deployment by '{}'",
            self.context.repository, self.options.actor
        );

        let started = Instant::now();
        let sha = self.context.resolve_commit(self.api).await?;
        stages.push(stage_report(Stage::ResolveCommit, 1, started));
        info!("Stage {}: using commit {sha}", Stage::ResolveCommit);

        StageProgress::print_header();

        let progress = StageProgress::start(
            1,
            &format!("Discovering deployment for {}", short_sha(&sha)),
        );
        let (outcome, report) = timed(
            Stage::DiscoverDeployment,
            discover_deployment(
                self.api,
                &sha,
                self.options.environment.as_deref(),
                &self.options.actor,
                &config,
            ),
        )
        .await;
        stages.push(report);
        let deployment = match outcome {
            PollOutcome::Ready { value, .. } => value,
            PollOutcome::TimedOut { attempts } => {
                progress.fail("No matching deployment found");
                return Err(WaitError::DeploymentNotFound {
                    actor: self.options.actor.clone(),
                    sha,
                    attempts,
                });
            }
        };
        progress.finish(&format!("Found deployment {}", deployment.id));

        let progress = StageProgress::start(
            2,
            &format!("Waiting for deployment {} to succeed", deployment.id),
        );
        let (outcome, report) = timed(
            Stage::AwaitStatus,
            await_status(
                self.api,
                deployment.id,
                self.options.allow_inactive,
                &config,
            ),
        )
        .await;
        stages.push(report);
        let status = match outcome {
            PollOutcome::Ready { value, .. } => value,
            PollOutcome::TimedOut { attempts } => {
                progress.fail("Deployment did not succeed");
                return Err(WaitError::StatusTimeout {
                    deployment_id: deployment.id,
                    attempts,
                });
            }
        };

        let Some(url) = status
            .environment_url
            .clone()
            .filter(|url| !url.trim().is_empty())
        else {
            progress.fail("Deployment reported no environment URL");
            return Err(WaitError::MissingEnvironmentUrl {
                deployment_id: deployment.id,
            });
        };
        let host = match parse_host(&url) {
            Ok(host) => host,
            Err(e) => {
                progress.fail("Deployment reported an invalid environment URL");
                return Err(e);
            }
        };
        progress.finish(&format!("Deployment {} is {}", deployment.id, status.state));

        let target = target_url(&url, &self.options.path);
        let progress = StageProgress::start(3, &format!("Waiting for {target} to respond"));
        let (outcome, report) = timed(
            Stage::AwaitReachable,
            await_reachable(self.probe, &target, &config),
        )
        .await;
        stages.push(report);
        if let PollOutcome::TimedOut { attempts } = outcome {
            progress.fail("URL never became reachable");
            return Err(WaitError::Unreachable {
                url: target,
                attempts,
            });
        }
        progress.finish(&format!("{target} is live"));

        info!("Deployment {} is live at {url}", deployment.id);

        Ok(WaitReport {
            repository: self.context.repository.to_string(),
            sha,
            deployment_id: deployment.id,
            environment: deployment.environment,
            creator: deployment
                .creator
                .map(|c| c.login)
                .unwrap_or_default(),
            state: status.state,
            url,
            host,
            stages,
            completed_at: Utc::now(),
        })
    }
}

async fn timed<T, Fut>(stage: Stage, poll: Fut) -> (PollOutcome<T>, StageReport)
where
    Fut: Future<Output = PollOutcome<T>>,
{
    let started = Instant::now();
    info!("Stage {stage}: starting");
    let outcome = poll.await;
    let report = stage_report(stage, outcome.attempts(), started);
    (outcome, report)
}

fn stage_report(stage: Stage, attempts: u64, started: Instant) -> StageReport {
    StageReport {
        stage,
        attempts,
        elapsed_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
    }
}

fn short_sha(sha: &str) -> &str {
    sha.get(..7).unwrap_or(sha)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Repository;
    use crate::providers::DeploymentState;
    use crate::wait::reachability::ProbeError;
    use crate::wait::testing::{deployment, status, ScriptedApi, ScriptedProbe};

    const URL: &str = "https://preview-42.example.com";

    fn context(sha: Option<&str>, pr_number: Option<u64>) -> TriggerContext {
        let repository: Repository = "octo/site".parse().unwrap();
        TriggerContext::new(repository, sha.map(ToString::to_string), pr_number)
    }

    fn options(allow_inactive: bool) -> WaitOptions {
        WaitOptions {
            environment: Some("preview".to_string()),
            actor: "bot-x".to_string(),
            allow_inactive,
            path: "/".to_string(),
            max_timeout_secs: 1,
            interval_ms: 10,
        }
    }

    mod parse_host {
        use super::*;

        #[test]
        fn returns_host_without_scheme_or_path() {
            assert_eq!(
                parse_host("https://preview-42.example.com/some/path").unwrap(),
                "preview-42.example.com"
            );
        }

        #[test]
        fn drops_port() {
            assert_eq!(parse_host("http://localhost:3000").unwrap(), "localhost");
        }

        #[test]
        fn rejects_relative_url() {
            let err = parse_host("preview-42.example.com").unwrap_err();
            assert!(matches!(err, WaitError::InvalidEnvironmentUrl { .. }));
        }

        #[test]
        fn rejects_url_without_host() {
            let err = parse_host("mailto:someone@example.com").unwrap_err();
            assert!(matches!(err, WaitError::InvalidEnvironmentUrl { .. }));
        }
    }

    #[tokio::test]
    async fn end_to_end_preview_becomes_live() {
        let api = ScriptedApi::new()
            .deployments(Ok(vec![]))
            .deployments(Ok(vec![]))
            .deployments(Ok(vec![deployment(42, "bot-x")]))
            .statuses(Ok(vec![status(1, DeploymentState::Pending, None)]))
            .statuses(Ok(vec![
                status(2, DeploymentState::Success, Some(URL)),
                status(1, DeploymentState::Pending, None),
            ]));
        let probe = ScriptedProbe::new(vec![
            Err(ProbeError::NoResponse("connection refused".to_string())),
            Ok(200),
        ]);

        let orchestrator =
            WaitOrchestrator::new(&api, &probe, context(Some("abc123"), None), options(false));
        let report = orchestrator.run().await.unwrap();

        assert_eq!(report.url, "https://preview-42.example.com");
        assert_eq!(report.host, "preview-42.example.com");
        assert_eq!(report.deployment_id, 42);
        assert_eq!(report.sha, "abc123");
        assert_eq!(report.state, DeploymentState::Success);
        assert_eq!(
            probe.requests(),
            vec![
                "https://preview-42.example.com/".to_string(),
                "https://preview-42.example.com/".to_string()
            ]
        );
        assert_eq!(api.deployment_calls(), 3);
        assert_eq!(api.status_queries(), vec![42, 42]);

        let attempts: Vec<(Stage, u64)> =
            report.stages.iter().map(|s| (s.stage, s.attempts)).collect();
        assert_eq!(
            attempts,
            vec![
                (Stage::ResolveCommit, 1),
                (Stage::DiscoverDeployment, 3),
                (Stage::AwaitStatus, 2),
                (Stage::AwaitReachable, 2),
            ]
        );

        let outputs: Vec<(&str, String)> = report.outputs().into_iter().collect();
        assert_eq!(
            outputs,
            vec![
                ("url", "https://preview-42.example.com".to_string()),
                ("host", "preview-42.example.com".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn inactive_status_is_accepted_when_allowed() {
        let api = ScriptedApi::new()
            .deployments(Ok(vec![deployment(42, "bot-x")]))
            .statuses(Ok(vec![status(9, DeploymentState::Inactive, Some(URL))]));
        let probe = ScriptedProbe::new(vec![Ok(200)]);

        let orchestrator =
            WaitOrchestrator::new(&api, &probe, context(Some("abc123"), None), options(true));
        let report = orchestrator.run().await.unwrap();

        assert_eq!(report.state, DeploymentState::Inactive);
        assert_eq!(report.stages[2].attempts, 1);
        assert_eq!(api.status_calls(), 1);
    }

    #[tokio::test]
    async fn discovery_timeout_is_fatal_and_skips_reachability() {
        let api = ScriptedApi::new().deployments(Ok(vec![deployment(1, "someone")]));
        let probe = ScriptedProbe::new(vec![Ok(200)]);

        let orchestrator =
            WaitOrchestrator::new(&api, &probe, context(Some("abc123"), None), options(false));
        let err = orchestrator.run().await.unwrap_err();

        assert!(matches!(
            err,
            WaitError::DeploymentNotFound { attempts: 100, .. }
        ));
        assert_eq!(api.status_calls(), 0);
        assert!(probe.requests().is_empty());
    }

    #[tokio::test]
    async fn status_timeout_is_fatal() {
        let api = ScriptedApi::new()
            .deployments(Ok(vec![deployment(42, "bot-x")]))
            .statuses(Ok(vec![status(1, DeploymentState::Inactive, Some(URL))]));
        let probe = ScriptedProbe::new(vec![Ok(200)]);

        let orchestrator =
            WaitOrchestrator::new(&api, &probe, context(Some("abc123"), None), options(false));
        let err = orchestrator.run().await.unwrap_err();

        assert!(matches!(
            err,
            WaitError::StatusTimeout {
                deployment_id: 42,
                ..
            }
        ));
        assert_eq!(api.deployment_calls(), 1, "discovery must not be re-run");
        assert!(probe.requests().is_empty());
    }

    #[tokio::test]
    async fn missing_environment_url_is_fatal() {
        let api = ScriptedApi::new()
            .deployments(Ok(vec![deployment(42, "bot-x")]))
            .statuses(Ok(vec![status(2, DeploymentState::Success, Some(""))]));
        let probe = ScriptedProbe::new(vec![Ok(200)]);

        let orchestrator =
            WaitOrchestrator::new(&api, &probe, context(Some("abc123"), None), options(false));
        let err = orchestrator.run().await.unwrap_err();

        assert!(matches!(
            err,
            WaitError::MissingEnvironmentUrl { deployment_id: 42 }
        ));
        assert!(probe.requests().is_empty());
    }

    #[tokio::test]
    async fn unreachable_url_is_fatal() {
        let api = ScriptedApi::new()
            .deployments(Ok(vec![deployment(42, "bot-x")]))
            .statuses(Ok(vec![status(2, DeploymentState::Success, Some(URL))]));
        let probe = ScriptedProbe::new(vec![Err(ProbeError::ErrorResponse(502))]);
        let mut options = options(false);
        options.path = "/health".to_string();
        options.interval_ms = 250;

        let orchestrator =
            WaitOrchestrator::new(&api, &probe, context(Some("abc123"), None), options);
        let err = orchestrator.run().await.unwrap_err();

        match err {
            WaitError::Unreachable { url, attempts } => {
                assert_eq!(url, "https://preview-42.example.com/health");
                assert_eq!(attempts, 4);
            }
            other => panic!("expected unreachable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_commit_is_fatal_before_any_polling() {
        let api = ScriptedApi::new().deployments(Ok(vec![deployment(42, "bot-x")]));
        let probe = ScriptedProbe::new(vec![Ok(200)]);

        let orchestrator = WaitOrchestrator::new(&api, &probe, context(None, None), options(false));
        let err = orchestrator.run().await.unwrap_err();

        assert!(matches!(err, WaitError::MissingCommit(_)));
        assert_eq!(api.deployment_calls(), 0);
    }

    #[tokio::test]
    async fn pull_request_head_is_used_for_discovery() {
        let api = ScriptedApi::new()
            .pull_request_head("head999")
            .deployments(Ok(vec![deployment(42, "bot-x")]))
            .statuses(Ok(vec![status(2, DeploymentState::Success, Some(URL))]));
        let probe = ScriptedProbe::new(vec![Ok(200)]);

        let orchestrator = WaitOrchestrator::new(
            &api,
            &probe,
            context(Some("merge000"), Some(12)),
            options(false),
        );
        let report = orchestrator.run().await.unwrap();

        assert_eq!(report.sha, "head999");
        assert_eq!(
            api.deployment_queries(),
            vec![("head999".to_string(), Some("preview".to_string()))]
        );
    }

    #[test]
    fn short_sha_truncates_long_values_only() {
        assert_eq!(short_sha("abcdef0123456789"), "abcdef0");
        assert_eq!(short_sha("abc"), "abc");
    }
}

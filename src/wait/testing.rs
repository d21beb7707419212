//! Scripted collaborators for exercising the poll loops without a network.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use super::reachability::{Probe, ProbeError};
use crate::error::{Result, WaitError};
use crate::providers::{
    Actor, Deployment, DeploymentApi, DeploymentState, DeploymentStatus, PullRequest,
    PullRequestHead,
};

pub fn deployment(id: u64, login: &str) -> Deployment {
    Deployment {
        id,
        sha: "abc123".to_string(),
        environment: "preview".to_string(),
        creator: Some(Actor {
            login: login.to_string(),
        }),
        created_at: Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap(),
    }
}

pub fn status(id: u64, state: DeploymentState, environment_url: Option<&str>) -> DeploymentStatus {
    DeploymentStatus {
        id,
        state,
        environment_url: environment_url.map(ToString::to_string),
        created_at: Utc.with_ymd_and_hms(2024, 5, 1, 10, 5, 0).unwrap(),
    }
}

/// Replays queued responses in order; the last one repeats once the queue runs dry.
struct Script<T> {
    queue: VecDeque<Result<T>>,
    calls: usize,
}

impl<T: Clone> Script<T> {
    fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            calls: 0,
        }
    }

    fn next(&mut self) -> Result<T> {
        self.calls += 1;
        if self.queue.len() > 1 {
            return self.queue.pop_front().unwrap();
        }
        match self.queue.front() {
            Some(Ok(value)) => Ok(value.clone()),
            Some(Err(e)) => Err(WaitError::Config(format!("replayed: {e}"))),
            None => Err(WaitError::Config("nothing scripted".to_string())),
        }
    }
}

pub struct ScriptedApi {
    deployments: Mutex<Script<Vec<Deployment>>>,
    statuses: Mutex<Script<Vec<DeploymentStatus>>>,
    deployment_queries: Mutex<Vec<(String, Option<String>)>>,
    status_queries: Mutex<Vec<u64>>,
    pull_request_head: Option<String>,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self {
            deployments: Mutex::new(Script::new()),
            statuses: Mutex::new(Script::new()),
            deployment_queries: Mutex::new(Vec::new()),
            status_queries: Mutex::new(Vec::new()),
            pull_request_head: None,
        }
    }

    pub fn deployments(self, response: Result<Vec<Deployment>>) -> Self {
        self.deployments.lock().unwrap().queue.push_back(response);
        self
    }

    pub fn statuses(self, response: Result<Vec<DeploymentStatus>>) -> Self {
        self.statuses.lock().unwrap().queue.push_back(response);
        self
    }

    pub fn pull_request_head(mut self, sha: &str) -> Self {
        self.pull_request_head = Some(sha.to_string());
        self
    }

    pub fn deployment_calls(&self) -> usize {
        self.deployments.lock().unwrap().calls
    }

    pub fn status_calls(&self) -> usize {
        self.statuses.lock().unwrap().calls
    }

    pub fn deployment_queries(&self) -> Vec<(String, Option<String>)> {
        self.deployment_queries.lock().unwrap().clone()
    }

    pub fn status_queries(&self) -> Vec<u64> {
        self.status_queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl DeploymentApi for ScriptedApi {
    async fn list_deployments(
        &self,
        sha: &str,
        environment: Option<&str>,
    ) -> Result<Vec<Deployment>> {
        self.deployment_queries
            .lock()
            .unwrap()
            .push((sha.to_string(), environment.map(ToString::to_string)));
        self.deployments.lock().unwrap().next()
    }

    async fn list_deployment_statuses(&self, deployment_id: u64) -> Result<Vec<DeploymentStatus>> {
        self.status_queries.lock().unwrap().push(deployment_id);
        self.statuses.lock().unwrap().next()
    }

    async fn get_pull_request(&self, number: u64) -> Result<PullRequest> {
        match &self.pull_request_head {
            Some(sha) => Ok(PullRequest {
                number,
                head: PullRequestHead {
                    sha: sha.clone(),
                    ref_: "feature".to_string(),
                },
            }),
            None => Err(WaitError::Api {
                status: 404,
                message: "Not Found".to_string(),
            }),
        }
    }
}

pub struct ScriptedProbe {
    responses: Mutex<VecDeque<std::result::Result<u16, ProbeError>>>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedProbe {
    pub fn new(responses: Vec<std::result::Result<u16, ProbeError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Probe for ScriptedProbe {
    async fn get(&self, url: &str) -> std::result::Result<u16, ProbeError> {
        self.requests.lock().unwrap().push(url.to_string());
        let mut responses = self.responses.lock().unwrap();
        if responses.len() > 1 {
            return responses.pop_front().unwrap_or(Ok(200));
        }
        responses.front().cloned().unwrap_or(Ok(200))
    }
}

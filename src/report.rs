use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;

use crate::providers::DeploymentState;
use crate::wait::Stage;

#[derive(Debug, Clone, Serialize)]
pub struct WaitReport {
    pub repository: String,
    pub sha: String,
    pub deployment_id: u64,
    pub environment: String,
    pub creator: String,
    pub state: DeploymentState,
    pub url: String,
    pub host: String,
    pub stages: Vec<StageReport>,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageReport {
    pub stage: Stage,
    pub attempts: u64,
    pub elapsed_ms: u64,
}

impl WaitReport {
    /// Values handed to the calling pipeline, in emission order.
    pub fn outputs(&self) -> IndexMap<&'static str, String> {
        let mut outputs = IndexMap::new();
        outputs.insert("url", self.url.clone());
        outputs.insert("host", self.host.clone());
        outputs
    }
}

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

use super::budget::PollConfig;
use super::poller::{poll, Attempt, PollOutcome};
use crate::error::{Result, WaitError};

/// Why a GET did not count as reachable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    #[error("error response received (HTTP {0})")]
    ErrorResponse(u16),

    #[error("no response received: {0}")]
    NoResponse(String),

    #[error("request failed: {0}")]
    Request(String),
}

/// Minimal HTTP GET used to check that a deployed URL serves traffic.
#[async_trait]
pub trait Probe: Send + Sync {
    /// Returns the final status code of an accepted response.
    async fn get(&self, url: &str) -> std::result::Result<u16, ProbeError>;
}

/// [`Probe`] backed by reqwest, treating any 4xx/5xx as an error response.
pub struct HttpProbe {
    client: Client,
}

impl HttpProbe {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("deploywait/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| WaitError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Probe for HttpProbe {
    async fn get(&self, url: &str) -> std::result::Result<u16, ProbeError> {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) if e.is_connect() || e.is_timeout() => {
                return Err(ProbeError::NoResponse(e.to_string()))
            }
            Err(e) => return Err(ProbeError::Request(e.to_string())),
        };

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(ProbeError::ErrorResponse(status.as_u16()));
        }

        Ok(status.as_u16())
    }
}

/// Joins an environment URL and a request path with exactly one slash between them.
pub fn target_url(base_url: &str, path: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}

/// Polls `url` until a GET is answered without error.
pub async fn await_reachable(probe: &dyn Probe, url: &str, config: &PollConfig) -> PollOutcome<u16> {
    poll(url, config, |_| async move {
        match probe.get(url).await {
            Ok(status) => Attempt::<u16, ProbeError>::Ready(status),
            Err(e) => Attempt::Failed(e),
        }
    })
    .await
}

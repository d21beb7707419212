use std::fmt::Display;
use std::future::Future;

use log::{debug, info, warn};

use super::budget::PollConfig;
use crate::error::WaitError;

/// Result of a single poll attempt.
#[derive(Debug)]
pub enum Attempt<T, E = WaitError> {
    /// The awaited condition holds.
    Ready(T),
    /// The fetch worked but the resource is not in the desired state yet.
    NotYetReady(String),
    /// The fetch itself failed. Retried like `NotYetReady`.
    Failed(E),
}

/// Terminal result of a bounded poll loop: exactly one of these per invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    Ready { value: T, attempts: u64 },
    TimedOut { attempts: u64 },
}

impl<T> PollOutcome<T> {
    pub fn attempts(&self) -> u64 {
        match self {
            Self::Ready { attempts, .. } | Self::TimedOut { attempts } => *attempts,
        }
    }
}

/// Runs `attempt` up to `config.iterations()` times, sleeping one interval between tries.
///
/// Returns as soon as an attempt is `Ready`. Not-ready results and errors are logged and
/// consume one iteration each; nothing an attempt returns can end the loop early except
/// success. There is no sleep after the final attempt.
pub async fn poll<T, E, F, Fut>(label: &str, config: &PollConfig, mut attempt: F) -> PollOutcome<T>
where
    E: Display,
    F: FnMut(u64) -> Fut,
    Fut: Future<Output = Attempt<T, E>>,
{
    let iterations = config.iterations();
    info!(
        "Waiting for {label}: up to {iterations} attempts, {:?} apart",
        config.interval()
    );

    for n in 1..=iterations {
        match attempt(n).await {
            Attempt::Ready(value) => {
                info!("{label}: ready after {n} attempt(s)");
                return PollOutcome::Ready { value, attempts: n };
            }
            Attempt::NotYetReady(reason) => {
                debug!("{label}: not ready ({n}/{iterations}): {reason}");
            }
            Attempt::Failed(e) => {
                warn!("{label}: attempt {n}/{iterations} failed: {e}");
            }
        }

        if n < iterations {
            tokio::time::sleep(config.interval()).await;
        }
    }

    warn!("{label}: gave up after {iterations} attempts");
    PollOutcome::TimedOut {
        attempts: iterations,
    }
}

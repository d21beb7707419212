mod budget;
mod discovery;
mod orchestrator;
mod poller;
mod reachability;
mod status;

#[cfg(test)]
mod testing;

pub use orchestrator::{Stage, WaitOptions, WaitOrchestrator};
pub use reachability::HttpProbe;

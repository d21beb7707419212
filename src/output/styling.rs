use std::fmt::Display;

use console::{style, StyledObject};

use crate::providers::DeploymentState;

/// Colour roles shared by the banner, stage spinners and summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Waiting,
    Done,
    Failed,
    Accent,
    Muted,
    Heading,
    Brand,
}

impl Tone {
    pub fn paint(self, text: impl Display) -> StyledObject<String> {
        let styled = style(text.to_string());
        match self {
            Self::Waiting => styled.bright().yellow(),
            Self::Done => styled.bright().green(),
            Self::Failed => styled.bright().red(),
            Self::Accent => styled.cyan(),
            Self::Muted => styled.dim(),
            Self::Heading => styled.bright(),
            Self::Brand => styled.magenta().bold(),
        }
    }
}

impl From<DeploymentState> for Tone {
    fn from(state: DeploymentState) -> Self {
        match state {
            DeploymentState::Success => Self::Done,
            DeploymentState::Inactive
            | DeploymentState::Pending
            | DeploymentState::Queued
            | DeploymentState::InProgress => Self::Waiting,
            DeploymentState::Error | DeploymentState::Failure => Self::Failed,
            DeploymentState::Other => Self::Muted,
        }
    }
}

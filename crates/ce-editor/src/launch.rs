// launch.rs — The confirm-then-submit launch workflow.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Where the launch flow currently is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaunchState {
    /// The user is editing the form.
    #[default]
    Editing,

    /// The record passed validation; awaiting the user's confirmation.
    Confirming,

    /// The launch submit is in flight.
    Submitting,

    /// Submitted as active. Carries the remote id as confirmation token.
    Launched { challenge_id: String },
}

impl fmt::Display for LaunchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaunchState::Editing => write!(f, "editing"),
            LaunchState::Confirming => write!(f, "confirming"),
            LaunchState::Submitting => write!(f, "submitting"),
            LaunchState::Launched { .. } => write!(f, "launched"),
        }
    }
}

impl LaunchState {
    /// Check whether transitioning from this state to `next` is valid.
    ///
    ///   Editing → Confirming → Submitting → Launched
    ///   Confirming → Editing (cancel)
    ///   Submitting → Confirming (submit failed, user may retry)
    pub fn can_transition_to(&self, next: &LaunchState) -> bool {
        matches!(
            (self, next),
            (LaunchState::Editing, LaunchState::Confirming)
                | (LaunchState::Confirming, LaunchState::Editing)
                | (LaunchState::Confirming, LaunchState::Submitting)
                | (LaunchState::Submitting, LaunchState::Launched { .. })
                | (LaunchState::Submitting, LaunchState::Confirming)
        )
    }

    pub fn is_launched(&self) -> bool {
        matches!(self, LaunchState::Launched { .. })
    }
}

//! Worker lifecycle state machine.
//!
//! ```text
//! Parsed -> Installing -> Installed -> Activating -> Activated
//!    \           \            \             \            \
//!     `-----------`------------`-------------`------------`--> Redundant
//! ```
//!
//! Install calls skip-waiting, so an installed worker may activate
//! immediately instead of waiting for older clients to close.

use std::fmt;

use serde::Serialize;

/// Where the worker is in its lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerState {
    #[default]
    Parsed,
    Installing,
    Installed,
    Activating,
    Activated,
    /// Install failed, or the worker was replaced or terminated.
    Redundant,
}

/// A lifecycle step the worker was asked to take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    BeginInstall,
    FinishInstall,
    BeginActivate,
    FinishActivate,
    Discard,
}

impl WorkerState {
    /// State after `transition`, or `None` if the step is not allowed here.
    #[must_use]
    pub const fn next(self, transition: Transition) -> Option<Self> {
        match (self, transition) {
            (Self::Parsed, Transition::BeginInstall) => Some(Self::Installing),
            (Self::Installing, Transition::FinishInstall) => Some(Self::Installed),
            (Self::Installed, Transition::BeginActivate) => Some(Self::Activating),
            (Self::Activating, Transition::FinishActivate) => Some(Self::Activated),
            (_, Transition::Discard) => Some(Self::Redundant),
            _ => None,
        }
    }

    /// Whether fetch events are routed through the worker.
    #[must_use]
    pub const fn controls_fetches(self) -> bool {
        matches!(self, Self::Activated)
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Parsed => "parsed",
            Self::Installing => "installing",
            Self::Installed => "installed",
            Self::Activating => "activating",
            Self::Activated => "activated",
            Self::Redundant => "redundant",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let steps = [
            Transition::BeginInstall,
            Transition::FinishInstall,
            Transition::BeginActivate,
            Transition::FinishActivate,
        ];
        let mut state = WorkerState::default();
        for step in steps {
            state = state.next(step).unwrap_or(WorkerState::Redundant);
        }
        assert_eq!(state, WorkerState::Activated);
        assert!(state.controls_fetches());
    }

    #[test]
    fn test_out_of_order_steps_rejected() {
        assert_eq!(WorkerState::Parsed.next(Transition::BeginActivate), None);
        assert_eq!(WorkerState::Activated.next(Transition::BeginInstall), None);
        assert_eq!(WorkerState::Redundant.next(Transition::BeginInstall), None);
    }

    #[test]
    fn test_discard_from_anywhere() {
        for state in [WorkerState::Parsed, WorkerState::Installing, WorkerState::Activated] {
            assert_eq!(state.next(Transition::Discard), Some(WorkerState::Redundant));
        }
    }

    #[test]
    fn test_only_activated_controls_fetches() {
        assert!(!WorkerState::Installed.controls_fetches());
        assert!(!WorkerState::Redundant.controls_fetches());
    }
}

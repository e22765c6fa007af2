//! Deployment states.
//!
//! The order is fixed: Idle -> FactoryResolved -> Submitted -> Confirmed -> Reported.
//! Any non-terminal state may instead fail straight to `Reported(Failure)`.

use derive_more::Display;

/// How a deployment attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Outcome {
    Success,
    Failure,
}

/// Where a deployment attempt currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum DeploymentState {
    #[display("idle")]
    Idle,
    #[display("factory-resolved")]
    FactoryResolved,
    #[display("submitted")]
    Submitted,
    #[display("confirmed")]
    Confirmed,
    #[display("reported({_0})")]
    Reported(Outcome),
}

impl DeploymentState {
    /// The state that follows this one when everything goes well.
    ///
    /// `Reported` is terminal and has no successor.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Idle => Some(Self::FactoryResolved),
            Self::FactoryResolved => Some(Self::Submitted),
            Self::Submitted => Some(Self::Confirmed),
            Self::Confirmed => Some(Self::Reported(Outcome::Success)),
            Self::Reported(_) => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Reported(_))
    }

    /// Whether moving from `self` to `to` is a legal transition.
    pub fn can_transition_to(self, to: Self) -> bool {
        match to {
            Self::Reported(Outcome::Failure) => !self.is_terminal() && self != Self::Confirmed,
            to => self.next() == Some(to),
        }
    }
}

/// Records the states a deployment went through.
#[derive(Debug, Clone)]
pub(crate) struct StateTracker {
    history: Vec<DeploymentState>,
}

impl StateTracker {
    pub(crate) fn new() -> Self {
        Self {
            history: vec![DeploymentState::Idle],
        }
    }

    pub(crate) fn current(&self) -> DeploymentState {
        self.history
            .last()
            .copied()
            .unwrap_or(DeploymentState::Idle)
    }

    pub(crate) fn history(&self) -> &[DeploymentState] {
        &self.history
    }

    pub(crate) fn advance(&mut self, to: DeploymentState) {
        let from = self.current();
        debug_assert!(
            from.can_transition_to(to),
            "illegal deployment transition {from} -> {to}"
        );
        tracing::debug!(%from, %to, "Deployment state transition");
        self.history.push(to);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_order() {
        let mut state = DeploymentState::Idle;
        let mut visited = vec![state];
        while let Some(next) = state.next() {
            state = next;
            visited.push(state);
        }

        assert_eq!(
            visited,
            vec![
                DeploymentState::Idle,
                DeploymentState::FactoryResolved,
                DeploymentState::Submitted,
                DeploymentState::Confirmed,
                DeploymentState::Reported(Outcome::Success),
            ]
        );
    }

    #[test]
    fn test_failure_transitions() {
        let failure = DeploymentState::Reported(Outcome::Failure);
        assert!(DeploymentState::Idle.can_transition_to(failure));
        assert!(DeploymentState::FactoryResolved.can_transition_to(failure));
        assert!(DeploymentState::Submitted.can_transition_to(failure));
        assert!(!DeploymentState::Confirmed.can_transition_to(failure));
        assert!(!failure.can_transition_to(failure));
        assert!(!DeploymentState::Idle.can_transition_to(DeploymentState::Submitted));
    }

    #[test]
    fn test_display() {
        assert_eq!(DeploymentState::FactoryResolved.to_string(), "factory-resolved");
        assert_eq!(
            DeploymentState::Reported(Outcome::Failure).to_string(),
            "reported(failure)"
        );
    }
}

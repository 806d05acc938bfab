use schemars::JsonSchema;
use serde::Serialize;

use crate::error::PulseError;

/// Coarse progress label of a problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, JsonSchema)]
pub enum Lifecycle {
    Emerging,
    Escalating,
    Stabilizing,
    Resolved,
}

labelled_enum!(Lifecycle {
    Emerging => "Emerging",
    Escalating => "Escalating",
    Stabilizing => "Stabilizing",
    Resolved => "Resolved",
});

impl Lifecycle {
    /// Whether the transition table admits `self → to`. Self-loops are always allowed.
    pub fn can_transition(self, to: Lifecycle) -> bool {
        use Lifecycle::*;

        self == to
            || matches!(
                (self, to),
                (Emerging, Escalating)
                    | (Emerging, Stabilizing)
                    | (Escalating, Stabilizing)
                    | (Stabilizing, Escalating)
                    | (Stabilizing, Resolved)
                    // A new solution reopens a resolved problem.
                    | (Resolved, Stabilizing)
            )
    }

    pub fn transition(self, to: Lifecycle) -> Result<Lifecycle, PulseError> {
        if self.can_transition(to) {
            Ok(to)
        } else {
            Err(PulseError::InvalidTransition { from: self, to })
        }
    }

    /// State after a solution is attached. Stabilizing is reachable from
    /// every state, so this never fails.
    pub fn on_solution(self) -> Lifecycle {
        Lifecycle::Stabilizing
    }

    /// Position on the tracker, 0 (Emerging) to 3 (Resolved).
    pub fn progress(self) -> u8 {
        match self {
            Lifecycle::Emerging => 0,
            Lifecycle::Escalating => 1,
            Lifecycle::Stabilizing => 2,
            Lifecycle::Resolved => 3,
        }
    }
}

//! Unit-of-work states and outcomes.

use std::fmt;

use autoinput_ids::{ApplicationId, InputSourceId};

use crate::SwitchFailure;

/// Lifecycle of one unit of work.
///
/// `Idle -> Scheduled -> Executing -> Completed | Failed`. Units that end
/// before scheduling go straight from `Idle` to a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitState {
    /// Created, not yet planned.
    Idle,
    /// Waiting for its settle deadline; may be superseded.
    Scheduled,
    /// Issuing the selection; runs to completion.
    Executing,
    /// Finished without error.
    Completed,
    /// Finished with a [`SwitchFailure`].
    Failed,
}

/// Why a unit completed without error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// No mapping (and no applicable default); nothing to do.
    Unmapped,
    /// The target was already the current source; no OS call was made.
    AlreadyActive(InputSourceId),
    /// The OS accepted the selection.
    Switched(InputSourceId),
}

/// Terminal result of a unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitOutcome {
    /// Finished without error.
    Completed(Completion),
    /// Lookup or selection failed; the current source is unchanged.
    Failed(SwitchFailure),
    /// Replaced by a newer event while still scheduled; no OS call was made.
    Superseded,
}

impl UnitOutcome {
    /// The terminal state this outcome corresponds to.
    ///
    /// Superseded units were abandoned without error and count as completed.
    pub fn state(&self) -> UnitState {
        match self {
            Self::Failed(_) => UnitState::Failed,
            Self::Completed(_) | Self::Superseded => UnitState::Completed,
        }
    }

    /// True when the OS selection call was issued and succeeded.
    pub fn switched(&self) -> bool {
        matches!(self, Self::Completed(Completion::Switched(_)))
    }
}

/// Diagnostic record published for every finished unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchReport {
    /// Monotonic unit sequence number, starting at 1.
    pub seq: u64,
    /// Application whose activation created the unit.
    pub app: ApplicationId,
    /// How the unit ended.
    pub outcome: UnitOutcome,
}

impl fmt::Display for SwitchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}: ", self.seq, self.app)?;
        match &self.outcome {
            UnitOutcome::Completed(Completion::Unmapped) => write!(f, "unmapped"),
            UnitOutcome::Completed(Completion::AlreadyActive(id)) => {
                write!(f, "already on {id}")
            }
            UnitOutcome::Completed(Completion::Switched(id)) => write!(f, "switched to {id}"),
            UnitOutcome::Failed(e) => write!(f, "failed: {e}"),
            UnitOutcome::Superseded => write!(f, "superseded"),
        }
    }
}

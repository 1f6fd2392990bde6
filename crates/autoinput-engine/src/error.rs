use std::result::Result as StdResult;

use autoinput_ids::InputSourceId;
use mac_inputsource::SwitchError;
use thiserror::Error;

/// Result type for the steps of one unit of work.
pub type Result<T> = StdResult<T, SwitchFailure>;

/// Why a unit of work ended in `Failed`.
///
/// Every failure is terminal for its unit. Nothing is retried; the next
/// foreground change (including re-activating the same application) is the
/// retry trigger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SwitchFailure {
    /// The mapped source is no longer installed or enabled.
    #[error("mapped input source {0} not found")]
    NotFound(InputSourceId),

    /// The registry could not be queried at all.
    #[error("input source registry unavailable: {0}")]
    Registry(mac_inputsource::Error),

    /// The selection call did not take effect.
    #[error(transparent)]
    Switch(#[from] SwitchError),
}

impl From<mac_inputsource::Error> for SwitchFailure {
    fn from(e: mac_inputsource::Error) -> Self {
        match e {
            mac_inputsource::Error::NotFound(id) => Self::NotFound(id),
            other => Self::Registry(other),
        }
    }
}

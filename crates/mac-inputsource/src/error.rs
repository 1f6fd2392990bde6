use std::result::Result as StdResult;

use autoinput_ids::InputSourceId;
use thiserror::Error;

/// Result type for registry queries.
pub type Result<T> = StdResult<T, Error>;

/// Result of a selection attempt.
pub type SwitchResult = StdResult<(), SwitchError>;

/// Errors raised while querying the input source registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// No enabled input source carries this identifier.
    #[error("input source not found: {0}")]
    NotFound(InputSourceId),

    /// The OS did not report a current keyboard input source.
    #[error("current input source unavailable")]
    UnknownState,

    /// The OS omitted a property every input source must carry.
    #[error("input source is missing required property {0}")]
    MissingProperty(&'static str),

    /// The OS refused to produce an input source list.
    #[error("input source list unavailable")]
    ListUnavailable,

    /// Input source services are not available on this platform.
    #[error("input sources are not supported on this platform")]
    Unsupported,
}

/// Reasons a `select` request did not change the active input source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SwitchError {
    /// The source is not select-capable; no OS call was made.
    #[error("input source {0} is not selectable")]
    NotSelectable(InputSourceId),

    /// The OS call failed with the given status code.
    #[error("OS rejected selection of {id}: status {code}")]
    OsRejected {
        /// Source we tried to select.
        id: InputSourceId,
        /// OSStatus returned by the OS.
        code: i32,
    },

    /// The source disappeared between lookup and selection.
    #[error("input source {0} vanished before selection")]
    Vanished(InputSourceId),

    /// Input source services are not available on this platform.
    #[error("input sources are not supported on this platform")]
    Unsupported,
}

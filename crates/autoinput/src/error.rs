//! Error handling for the autoinput binary.

use std::{io, result};

use autoinput_ids::InputSourceId;
use thiserror::Error;

/// Convenient result type for autoinput operations.
pub type Result<T> = result::Result<T, Error>;

/// Errors that end a command.
#[derive(Debug, Error)]
pub enum Error {
    /// Wrapper for standard I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// Configuration parsing or resolution errors.
    #[error("{}", .0.pretty())]
    Config(#[from] config::Error),
    /// Reading or writing the preference file failed.
    #[error("Preference store error: {0}")]
    Store(#[from] prefstore::Error),
    /// Input source services failed.
    #[error("Input source error: {0}")]
    Registry(#[from] mac_inputsource::Error),
    /// The foreground watcher could not be started.
    #[error("Foreground watcher error: {0}")]
    Watcher(#[from] mac_focus_watcher::Error),
    /// The named source is not installed or not enabled.
    #[error("unknown input source {0}; run `autoinput sources --all` to list them")]
    UnknownSource(InputSourceId),
    /// The named source cannot be selected.
    #[error("input source {0} is not selectable; pass --force to map it anyway")]
    NotSelectable(InputSourceId),
    /// The daemon only runs on macOS.
    #[error("the autoinput daemon requires macOS")]
    Unsupported,
}

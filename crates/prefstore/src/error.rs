use std::{io, path::PathBuf, result::Result as StdResult};

use thiserror::Error;

/// Result type for preference store operations.
pub type Result<T> = StdResult<T, Error>;

/// Errors raised while loading or persisting preferences.
#[derive(Debug, Error)]
pub enum Error {
    /// Reading or writing the preference file failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// File being accessed.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },

    /// The preference file is not valid JSON or does not match the schema.
    #[error("malformed preference file {}: {source}", path.display())]
    Parse {
        /// File being parsed.
        path: PathBuf,
        /// Underlying error.
        source: serde_json::Error,
    },

    /// The file was written by a newer schema than this build understands.
    #[error(
        "preference file {} has schema version {found}; newest supported is {supported}",
        path.display()
    )]
    UnsupportedVersion {
        /// File being parsed.
        path: PathBuf,
        /// Version found in the file.
        found: u64,
        /// Newest version this build reads.
        supported: u32,
    },
}

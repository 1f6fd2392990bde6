//! Runtime configuration for autoinput.
//!
//! The file is RON, e.g. `~/.autoinput/config.ron`:
//!
//! ```ron
//! (
//!     settle_delay_ms: 150,
//!     unmapped: RestoreDefault,
//! )
//! ```
//!
//! Every field is optional.

use std::{
    env, fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use tracing::debug;

mod error;

pub use error::{Error, excerpt_at};

/// Default settle delay between a foreground change and the switch.
pub const DEFAULT_SETTLE_MS: u64 = 100;
/// Smallest accepted settle delay.
pub const MIN_SETTLE_MS: u64 = 10;
/// Largest accepted settle delay.
pub const MAX_SETTLE_MS: u64 = 2000;

/// What to do when the newly active application has no mapping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnmappedPolicy {
    /// Leave the current input source alone.
    #[default]
    Ignore,
    /// Switch to the store's default source, if one is set.
    RestoreDefault,
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Settle delay in milliseconds; see [`Config::settle_delay`].
    pub settle_delay_ms: u64,
    /// Policy for applications without a mapping.
    pub unmapped: UnmappedPolicy,
    /// Preference file override.
    pub store_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            settle_delay_ms: DEFAULT_SETTLE_MS,
            unmapped: UnmappedPolicy::default(),
            store_path: None,
        }
    }
}

impl Config {
    /// Effective settle delay, clamped to `[MIN_SETTLE_MS, MAX_SETTLE_MS]`.
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms.clamp(MIN_SETTLE_MS, MAX_SETTLE_MS))
    }
}

/// Determine the preferred user config path (`~/.autoinput/config.ron`).
pub fn default_config_path() -> PathBuf {
    let mut p = PathBuf::from(env::var_os("HOME").unwrap_or_default());
    p.push(".autoinput");
    p.push("config.ron");
    p
}

/// Resolve which file to load.
///
/// Policy:
/// 1) Use `explicit` when provided, even if it does not exist (loading then fails).
/// 2) Else use `~/.autoinput/config.ron` when it exists.
/// 3) Else `None`: run with defaults.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let preferred = default_config_path();
    preferred.exists().then_some(preferred)
}

/// Parse configuration text. `path` is only used for diagnostics.
pub fn parse_str(text: &str, path: Option<&Path>) -> Result<Config, Error> {
    ron::from_str(text).map_err(|e| {
        let line = e.span.start.line;
        let col = e.span.start.col;
        Error::Parse {
            path: path.map(Path::to_path_buf),
            line,
            col,
            message: e.code.to_string(),
            excerpt: excerpt_at(text, line, col),
        }
    })
}

/// Load configuration from `path`.
pub fn load_from_path(path: &Path) -> Result<Config, Error> {
    let text = fs::read_to_string(path).map_err(|e| Error::Read {
        path: Some(path.to_path_buf()),
        message: match e.kind() {
            io::ErrorKind::NotFound => format!("config file {} not found", path.display()),
            _ => e.to_string(),
        },
    })?;
    let cfg = parse_str(&text, Some(path))?;
    debug!(path = %path.display(), ?cfg, "loaded config");
    Ok(cfg)
}

/// Resolve and load, falling back to defaults when no file applies.
pub fn load(explicit: Option<&Path>) -> Result<Config, Error> {
    match resolve_config_path(explicit) {
        Some(path) => load_from_path(&path),
        None => {
            debug!("no config file; using defaults");
            Ok(Config::default())
        }
    }
}

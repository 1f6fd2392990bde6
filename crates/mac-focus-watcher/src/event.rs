//! Event types emitted by the focus watcher.

use autoinput_ids::ApplicationId;
use tokio::time::Instant;
use tracing::debug;

/// The foreground application changed.
///
/// Only activations that carry a bundle identifier become events; anything
/// else (helper processes, command-line tools) is dropped at the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForegroundEvent {
    /// Newly activated application.
    pub app: ApplicationId,
    /// When the activation was observed.
    pub at: Instant,
}

impl ForegroundEvent {
    /// Build an event from a raw bundle identifier as reported by the OS.
    ///
    /// Returns `None` when the identifier is absent or blank.
    pub fn from_bundle_id(bundle_id: Option<&str>, at: Instant) -> Option<Self> {
        match bundle_id.map(str::trim) {
            Some(id) if !id.is_empty() => Some(Self {
                app: ApplicationId::new(id),
                at,
            }),
            other => {
                debug!(bundle_id = ?other, "dropping activation without bundle id");
                None
            }
        }
    }
}

/// A regular (Dock-visible) application that is currently running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunningApp {
    /// Bundle identifier.
    pub app: ApplicationId,
    /// Localized display name, if the OS reports one.
    pub name: Option<String>,
}

impl RunningApp {
    /// Display name, falling back to the bundle identifier.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(self.app.as_str())
    }
}

//! prefstore: the user's preferred input source for each application.
//!
//! Absence of a mapping is not an error: [`PreferenceStore::get`] returns
//! `None` and callers treat the application as unconfigured. Setting a
//! mapping replaces any earlier one, and removing a missing mapping is a
//! no-op.

use std::{collections::BTreeMap, env, path::PathBuf};

use autoinput_ids::{ApplicationId, InputSourceId};

mod error;
mod file;
mod memory;
pub mod schema;

pub use error::{Error, Result};
pub use file::FileStore;
pub use memory::MemoryStore;

/// Durable map from application to preferred input source.
pub trait PreferenceStore: Send + Sync {
    /// The preferred source for `app`, if one is configured.
    fn get(&self, app: &ApplicationId) -> Option<InputSourceId>;

    /// Record `source` as the preference for `app`, replacing any earlier one.
    fn set(&self, app: ApplicationId, source: InputSourceId) -> Result<()>;

    /// Forget the preference for `app`.
    fn remove(&self, app: &ApplicationId) -> Result<()>;

    /// Source restored for applications with no mapping, if configured.
    fn get_default(&self) -> Option<InputSourceId>;

    /// Set or clear the fallback source.
    fn set_default(&self, source: Option<InputSourceId>) -> Result<()>;

    /// Snapshot of every mapping, ordered by application id.
    fn mappings(&self) -> BTreeMap<ApplicationId, InputSourceId>;
}

/// Default preference file location (`~/.autoinput/preferences.json`).
pub fn default_store_path() -> PathBuf {
    let mut p = PathBuf::from(env::var_os("HOME").unwrap_or_default());
    p.push(".autoinput");
    p.push("preferences.json");
    p
}

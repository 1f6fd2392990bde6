//! mac-inputsource: query and select macOS text input sources.
//!
//! The [`InputSourceRegistry`] trait is the only surface the rest of the
//! workspace sees; selection goes through [`SelectInputSource`]. Every query returns a fresh snapshot; nothing is cached
//! between calls because the OS may install, remove, enable or disable
//! sources at any time.
//!
//! Backends:
//! - [`TisRegistry`] (macOS): Carbon Text Input Sources services.
//! - [`MockRegistry`]: scripted, in-memory registry for tests.
//! - [`default_registry`] picks the platform backend; on other platforms it
//!   returns a registry that reports [`Error::Unsupported`].

use std::sync::Arc;

use autoinput_ids::InputSourceId;

mod error;
mod handle;
mod mock;
#[cfg(target_os = "macos")]
mod tis;

pub use error::{Error, Result, SwitchError, SwitchResult};
pub use handle::{Filter, InputSourceHandle};
pub use mock::MockRegistry;
#[cfg(target_os = "macos")]
pub use tis::TisRegistry;

/// Access to the OS input source registry.
pub trait InputSourceRegistry: Send + Sync {
    /// List the sources currently known to the OS that pass `filter`.
    fn list_input_sources(&self, filter: Filter) -> Result<Vec<InputSourceHandle>>;

    /// Look up one enabled source by exact identifier match.
    fn find(&self, id: &InputSourceId) -> Result<InputSourceHandle> {
        self.list_input_sources(Filter::enabled())?
            .into_iter()
            .find(|h| &h.id == id)
            .ok_or_else(|| Error::NotFound(id.clone()))
    }

    /// The currently active keyboard input source.
    fn current_input_source(&self) -> Result<InputSourceHandle>;

    /// Issue the OS selection call for `handle`.
    ///
    /// Callers go through [`SelectInputSource::select`], which enforces the
    /// selectability precondition first.
    fn os_select(&self, handle: &InputSourceHandle) -> SwitchResult;
}

/// Selection entry point for every registry.
///
/// Implemented once for all [`InputSourceRegistry`] types; backends cannot
/// provide their own `select`, so the selectability check always runs.
pub trait SelectInputSource {
    /// Make `handle` the active input source.
    ///
    /// Never issues an OS call for a source that is not select-capable.
    fn select(&self, handle: &InputSourceHandle) -> SwitchResult;
}

impl<R: InputSourceRegistry + ?Sized> SelectInputSource for R {
    fn select(&self, handle: &InputSourceHandle) -> SwitchResult {
        if !handle.is_selectable {
            return Err(SwitchError::NotSelectable(handle.id.clone()));
        }
        self.os_select(handle)
    }
}

/// Construct the registry backend for the current platform.
pub fn default_registry() -> Arc<dyn InputSourceRegistry> {
    #[cfg(target_os = "macos")]
    {
        Arc::new(TisRegistry::new())
    }
    #[cfg(not(target_os = "macos"))]
    {
        Arc::new(UnsupportedRegistry)
    }
}

/// Registry used where no OS backend exists; every call reports `Unsupported`.
#[cfg(not(target_os = "macos"))]
struct UnsupportedRegistry;

#[cfg(not(target_os = "macos"))]
impl InputSourceRegistry for UnsupportedRegistry {
    fn list_input_sources(&self, _filter: Filter) -> Result<Vec<InputSourceHandle>> {
        Err(Error::Unsupported)
    }

    fn current_input_source(&self) -> Result<InputSourceHandle> {
        Err(Error::Unsupported)
    }

    fn os_select(&self, _handle: &InputSourceHandle) -> SwitchResult {
        Err(SwitchError::Unsupported)
    }
}

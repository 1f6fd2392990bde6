//! Scripted in-memory registry.

use std::sync::Arc;

use autoinput_ids::InputSourceId;
use parking_lot::Mutex;

use crate::{
    Error, Filter, InputSourceHandle, InputSourceRegistry, Result, SwitchError, SwitchResult,
};

/// In-memory registry for tests.
///
/// Successful selections update the current source, the way the OS would.
/// Every call that reaches the OS boundary (`os_select`) is recorded.
#[derive(Clone, Default)]
pub struct MockRegistry {
    /// Installed sources, enabled or not.
    sources: Arc<Mutex<Vec<InputSourceHandle>>>,
    /// Active source; `None` reads back as `UnknownState`.
    current: Arc<Mutex<Option<InputSourceId>>>,
    /// Ids passed to `os_select`.
    select_calls: Arc<Mutex<Vec<InputSourceId>>>,
    /// Status code returned by every `os_select` while set.
    fail_select: Arc<Mutex<Option<i32>>>,
}

impl MockRegistry {
    /// Create an empty registry with no current source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding `sources`, with no current source.
    pub fn with_sources(sources: Vec<InputSourceHandle>) -> Self {
        let reg = Self::new();
        *reg.sources.lock() = sources;
        reg
    }

    /// Install another source.
    pub fn add_source(&self, handle: InputSourceHandle) {
        self.sources.lock().push(handle);
    }

    /// Drop a source, as if the user uninstalled it.
    pub fn remove_source(&self, id: &str) {
        self.sources.lock().retain(|h| h.id.as_str() != id);
    }

    /// Set the current source; `None` simulates the OS reporting nothing.
    pub fn set_current(&self, id: Option<&str>) {
        *self.current.lock() = id.map(InputSourceId::new);
    }

    /// Identifier of the current source, if any.
    pub fn current_id(&self) -> Option<InputSourceId> {
        self.current.lock().clone()
    }

    /// Make subsequent OS selections fail with `code`, or succeed with `None`.
    pub fn set_fail_select(&self, code: Option<i32>) {
        *self.fail_select.lock() = code;
    }

    /// Identifiers passed to the OS selection call, in order.
    pub fn select_calls(&self) -> Vec<InputSourceId> {
        self.select_calls.lock().clone()
    }

    /// Number of OS selection calls so far.
    pub fn select_count(&self) -> usize {
        self.select_calls.lock().len()
    }
}

impl InputSourceRegistry for MockRegistry {
    fn list_input_sources(&self, filter: Filter) -> Result<Vec<InputSourceHandle>> {
        Ok(self
            .sources
            .lock()
            .iter()
            .filter(|h| filter.matches(h))
            .cloned()
            .collect())
    }

    fn current_input_source(&self) -> Result<InputSourceHandle> {
        let Some(id) = self.current.lock().clone() else {
            return Err(Error::UnknownState);
        };
        self.sources
            .lock()
            .iter()
            .find(|h| h.id == id)
            .cloned()
            .ok_or(Error::UnknownState)
    }

    fn os_select(&self, handle: &InputSourceHandle) -> SwitchResult {
        self.select_calls.lock().push(handle.id.clone());
        if let Some(code) = *self.fail_select.lock() {
            return Err(SwitchError::OsRejected {
                id: handle.id.clone(),
                code,
            });
        }
        let present = self
            .sources
            .lock()
            .iter()
            .any(|h| h.id == handle.id && h.is_enabled);
        if !present {
            return Err(SwitchError::Vanished(handle.id.clone()));
        }
        *self.current.lock() = Some(handle.id.clone());
        Ok(())
    }
}

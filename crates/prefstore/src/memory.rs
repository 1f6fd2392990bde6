//! Volatile store.

use std::{collections::BTreeMap, sync::Arc};

use autoinput_ids::{ApplicationId, InputSourceId};
use parking_lot::Mutex;

use crate::{PreferenceStore, Result, schema::Document};

/// In-memory store, used in tests and when persistence is not wanted.
#[derive(Clone, Default)]
pub struct MemoryStore {
    /// Shared between clones.
    doc: Arc<Mutex<Document>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store with `(app, source)` pairs.
    pub fn with_mappings<I, A, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (A, S)>,
        A: Into<ApplicationId>,
        S: Into<InputSourceId>,
    {
        let store = Self::new();
        store
            .doc
            .lock()
            .mappings
            .extend(pairs.into_iter().map(|(a, s)| (a.into(), s.into())));
        store
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, app: &ApplicationId) -> Option<InputSourceId> {
        self.doc.lock().mappings.get(app).cloned()
    }

    fn set(&self, app: ApplicationId, source: InputSourceId) -> Result<()> {
        self.doc.lock().mappings.insert(app, source);
        Ok(())
    }

    fn remove(&self, app: &ApplicationId) -> Result<()> {
        self.doc.lock().mappings.remove(app);
        Ok(())
    }

    fn get_default(&self) -> Option<InputSourceId> {
        self.doc.lock().default_source.clone()
    }

    fn set_default(&self, source: Option<InputSourceId>) -> Result<()> {
        self.doc.lock().default_source = source;
        Ok(())
    }

    fn mappings(&self) -> BTreeMap<ApplicationId, InputSourceId> {
        self.doc.lock().mappings.clone()
    }
}

use std::sync::Arc;

use mac_inputsource::InputSourceRegistry;
use prefstore::PreferenceStore;

/// External services the coordinator reads from and acts on.
///
/// Both are externally owned and independently consistent; the coordinator
/// never locks across them.
#[derive(Clone)]
pub struct Services {
    /// OS input source registry.
    pub registry: Arc<dyn InputSourceRegistry>,
    /// User mappings.
    pub prefs: Arc<dyn PreferenceStore>,
}

//! Plain-data view of one OS input source.

use autoinput_ids::InputSourceId;

/// A snapshot of one input source as reported by the OS.
///
/// Handles are produced fresh by every registry query and are never cached:
/// the OS may add or remove sources at any time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputSourceHandle {
    /// OS identifier (`kTISPropertyInputSourceID`).
    pub id: InputSourceId,
    /// Localized, user-facing name.
    pub display_name: String,
    /// Whether the source can be made the active source.
    pub is_selectable: bool,
    /// Whether the user has enabled the source.
    pub is_enabled: bool,
    /// Input mode identifier for input-method modes, when present.
    pub input_mode_id: Option<String>,
    /// Source category (keyboard, palette, ink), when present.
    pub category: Option<String>,
}

impl InputSourceHandle {
    /// Build a selectable, enabled handle with no optional properties.
    pub fn new(id: impl Into<InputSourceId>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            is_selectable: true,
            is_enabled: true,
            input_mode_id: None,
            category: None,
        }
    }

    /// Mark the handle as select-capable or not.
    #[must_use]
    pub fn selectable(mut self, v: bool) -> Self {
        self.is_selectable = v;
        self
    }

    /// Mark the handle as enabled or not.
    #[must_use]
    pub fn enabled(mut self, v: bool) -> Self {
        self.is_enabled = v;
        self
    }

    /// True when both handles name the same OS source.
    pub fn same_source(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

/// Narrowing applied to a registry listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Filter {
    /// Include installed but disabled sources.
    pub include_disabled: bool,
    /// Only return sources that can be selected.
    pub selectable_only: bool,
}

impl Filter {
    /// Enabled sources only; the set the OS would let the user switch between.
    pub const fn enabled() -> Self {
        Self {
            include_disabled: false,
            selectable_only: false,
        }
    }

    /// Every installed source.
    pub const fn all() -> Self {
        Self {
            include_disabled: true,
            selectable_only: false,
        }
    }

    /// Returns true if `handle` passes this filter.
    pub fn matches(&self, handle: &InputSourceHandle) -> bool {
        (self.include_disabled || handle.is_enabled)
            && (!self.selectable_only || handle.is_selectable)
    }
}

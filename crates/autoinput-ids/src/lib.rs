//! Shared identifiers for applications and input sources.
#![warn(missing_docs)]
#![warn(unsafe_op_in_unsafe_fn)]

use std::{
    borrow::Borrow,
    fmt::{self, Display, Formatter},
};

use serde::{Deserialize, Serialize};

/// Stable identifier for an application: the OS bundle identifier
/// (e.g. `com.apple.Safari`).
///
/// This is the key of the preference mapping. Identifiers are compared by
/// exact string match; no case folding is applied.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(String);

impl ApplicationId {
    /// Wrap a bundle identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the identifier, returning the owned string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

/// Opaque identifier the OS assigns to an installed input source
/// (e.g. `com.apple.keylayout.ABC`).
///
/// Issued by the OS and never minted here; a value read back from the
/// preference store may refer to a source that no longer exists.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputSourceId(String);

impl InputSourceId {
    /// Wrap an OS input source identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the identifier, returning the owned string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl Display for ApplicationId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Display for InputSourceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ApplicationId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ApplicationId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for InputSourceId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for InputSourceId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Borrow<str> for ApplicationId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for InputSourceId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn serializes_as_plain_strings() {
        let mut map = BTreeMap::new();
        map.insert(
            ApplicationId::new("com.example.Chat"),
            InputSourceId::new("com.vendor.ime.pinyin"),
        );
        let json = serde_json::to_string(&map).expect("serialize");
        assert_eq!(json, r#"{"com.example.Chat":"com.vendor.ime.pinyin"}"#);
    }

    #[test]
    fn map_lookup_by_str() {
        let mut map = BTreeMap::new();
        map.insert(ApplicationId::new("a.b"), 1);
        assert_eq!(map.get("a.b"), Some(&1));
        assert_eq!(map.get("A.B"), None);
    }
}

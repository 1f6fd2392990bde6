//! On-disk document format.
//!
//! Version 1:
//!
//! ```json
//! {
//!   "version": 1,
//!   "mappings": { "com.tencent.xinWeChat": "com.apple.inputmethod.SCIM.ITABC" },
//!   "default_source": "com.apple.keylayout.ABC"
//! }
//! ```
//!
//! Files without a `version` key are the legacy format: a bare object mapping
//! application ids to source ids. They are read as version 1 with no default.

use std::{collections::BTreeMap, path::Path};

use autoinput_ids::{ApplicationId, InputSourceId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

/// Newest schema version this build reads and the only one it writes.
pub const CURRENT_VERSION: u32 = 1;

/// The full contents of a preference file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Schema version.
    pub version: u32,
    /// Preferred source per application.
    #[serde(default)]
    pub mappings: BTreeMap<ApplicationId, InputSourceId>,
    /// Source to restore for unmapped applications, when enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_source: Option<InputSourceId>,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            mappings: BTreeMap::new(),
            default_source: None,
        }
    }
}

/// How a document was read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Already in the current format.
    Current,
    /// Upgraded from the unversioned legacy format.
    Legacy,
    /// File was blank.
    Empty,
}

/// Parse `text`, read from `path`, into a current-version document.
pub fn parse(text: &str, path: &Path) -> Result<(Document, Origin)> {
    if text.trim().is_empty() {
        return Ok((Document::default(), Origin::Empty));
    }
    let parse_err = |source| Error::Parse {
        path: path.to_path_buf(),
        source,
    };
    let value: Value = serde_json::from_str(text).map_err(parse_err)?;

    match value.get("version").and_then(Value::as_u64) {
        Some(found) if found > u64::from(CURRENT_VERSION) => Err(Error::UnsupportedVersion {
            path: path.to_path_buf(),
            found,
            supported: CURRENT_VERSION,
        }),
        Some(_) => {
            let mut doc: Document = serde_json::from_value(value).map_err(parse_err)?;
            doc.version = CURRENT_VERSION;
            Ok((doc, Origin::Current))
        }
        None if value.get("version").is_some() => {
            // Present but not an unsigned integer; let serde report it.
            let doc: Document = serde_json::from_value(value).map_err(parse_err)?;
            Ok((doc, Origin::Current))
        }
        None => {
            let mappings: BTreeMap<ApplicationId, InputSourceId> =
                serde_json::from_value(value).map_err(parse_err)?;
            Ok((
                Document {
                    mappings,
                    ..Document::default()
                },
                Origin::Legacy,
            ))
        }
    }
}

/// Render a document for writing.
pub fn render(doc: &Document) -> serde_json::Result<String> {
    let mut out = serde_json::to_string_pretty(doc)?;
    out.push('\n');
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p() -> &'static Path {
        Path::new("prefs.json")
    }

    #[test]
    fn blank_is_empty_document() {
        let (doc, origin) = parse("  \n", p()).unwrap();
        assert_eq!(doc, Document::default());
        assert_eq!(origin, Origin::Empty);
    }

    #[test]
    fn legacy_object_is_migrated() {
        let text = r#"{"com.tencent.xinWeChat": "com.apple.inputmethod.SCIM.ITABC"}"#;
        let (doc, origin) = parse(text, p()).unwrap();
        assert_eq!(origin, Origin::Legacy);
        assert_eq!(doc.version, CURRENT_VERSION);
        assert_eq!(
            doc.mappings.get("com.tencent.xinWeChat").map(InputSourceId::as_str),
            Some("com.apple.inputmethod.SCIM.ITABC")
        );
        assert!(doc.default_source.is_none());
    }

    #[test]
    fn newer_version_is_rejected() {
        let err = parse(r#"{"version": 7, "mappings": {}}"#, p()).unwrap_err();
        assert!(matches!(err, Error::UnsupportedVersion { found: 7, .. }));
    }

    #[test]
    fn garbage_is_a_parse_error() {
        let err = parse("{not json", p()).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
        let err = parse(r#"{"version": "one"}"#, p()).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn render_then_parse_keeps_default() {
        let mut doc = Document::default();
        doc.mappings.insert("a.b".into(), "x.y".into());
        doc.default_source = Some("com.apple.keylayout.ABC".into());
        let (back, origin) = parse(&render(&doc).unwrap(), p()).unwrap();
        assert_eq!(origin, Origin::Current);
        assert_eq!(back, doc);
    }
}

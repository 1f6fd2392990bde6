//! Loading configuration files from disk.

use std::{fs, path::PathBuf, time::Duration};

use config::{Config, Error, UnmappedPolicy, load, load_from_path, parse_str};

#[test]
fn full_file_parses() {
    let cfg = parse_str(
        r#"(
            settle_delay_ms: 250,
            unmapped: RestoreDefault,
            store_path: Some("/tmp/prefs.json"),
        )"#,
        None,
    )
    .unwrap();
    assert_eq!(cfg.settle_delay(), Duration::from_millis(250));
    assert_eq!(cfg.unmapped, UnmappedPolicy::RestoreDefault);
    assert_eq!(cfg.store_path, Some(PathBuf::from("/tmp/prefs.json")));
}

#[test]
fn partial_file_keeps_defaults() {
    let cfg = parse_str("(unmapped: Ignore)", None).unwrap();
    assert_eq!(cfg, Config::default());
}

#[test]
fn unknown_field_is_a_parse_error_with_location() {
    let text = "(\n    settle_delay: 5,\n)\n";
    let err = parse_str(text, None).unwrap_err();
    match err {
        Error::Parse { line, excerpt, .. } => {
            assert!((1..=3).contains(&line));
            assert!(excerpt.contains("settle_delay: 5"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn load_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.ron");
    fs::write(&path, "(settle_delay_ms: 40)").unwrap();
    let cfg = load(Some(&path)).unwrap();
    assert_eq!(cfg.settle_delay(), Duration::from_millis(40));
}

#[test]
fn explicit_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.ron");
    let err = load_from_path(&path).unwrap_err();
    assert!(matches!(err, Error::Read { .. }));
    assert!(err.pretty().contains("not found"));
}

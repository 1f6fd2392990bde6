//! Bundle-id normalisation for foreground events.

use mac_focus_watcher::{ForegroundEvent, RunningApp};
use tokio::time::Instant;

#[test]
fn bundle_id_becomes_event() {
    let at = Instant::now();
    let ev = ForegroundEvent::from_bundle_id(Some("com.tencent.xinWeChat"), at).unwrap();
    assert_eq!(ev.app.as_str(), "com.tencent.xinWeChat");
    assert_eq!(ev.at, at);
}

#[test]
fn missing_or_blank_ids_are_dropped() {
    let at = Instant::now();
    assert!(ForegroundEvent::from_bundle_id(None, at).is_none());
    assert!(ForegroundEvent::from_bundle_id(Some(""), at).is_none());
    assert!(ForegroundEvent::from_bundle_id(Some("   "), at).is_none());
}

#[test]
fn surrounding_whitespace_is_trimmed() {
    let ev = ForegroundEvent::from_bundle_id(Some(" com.apple.Terminal\n"), Instant::now()).unwrap();
    assert_eq!(ev.app.as_str(), "com.apple.Terminal");
}

#[test]
fn running_app_label_falls_back_to_bundle_id() {
    let named = RunningApp {
        app: "com.apple.Safari".into(),
        name: Some("Safari".into()),
    };
    let bare = RunningApp {
        app: "com.example.Tool".into(),
        name: None,
    };
    assert_eq!(named.label(), "Safari");
    assert_eq!(bare.label(), "com.example.Tool");
}

use std::{sync::Arc, time::Duration};

use autoinput_engine::{
    Completion, Coordinator, ForegroundEvent, Services, Settings, SwitchFailure, SwitchReport,
    UnitOutcome, UnitState, UnmappedPolicy,
};
use autoinput_ids::ApplicationId;
use mac_inputsource::{InputSourceHandle, MockRegistry, SwitchError};
use prefstore::{FileStore, MemoryStore, PreferenceStore};
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
    time::{self, Instant},
};
use tokio_util::sync::CancellationToken;

const CHAT: &str = "com.example.Chat";
const EDITOR: &str = "com.example.Editor";
const TERMINAL: &str = "com.apple.Terminal";
const LOCKED_APP: &str = "com.example.Locked";
const STALE_APP: &str = "com.example.Stale";
const UNMAPPED: &str = "com.example.Unmapped";

const ABC: &str = "com.apple.keylayout.ABC";
const PINYIN: &str = "com.vendor.ime.pinyin";
const KANA: &str = "com.vendor.ime.kana";
const LOCKED: &str = "com.vendor.ime.locked";
const GONE: &str = "com.vendor.ime.uninstalled";

const SETTLE: Duration = Duration::from_millis(100);

struct Fixture {
    coord: Coordinator,
    reg: MockRegistry,
    prefs: MemoryStore,
}

fn fixture_with(unmapped: UnmappedPolicy) -> Fixture {
    let reg = MockRegistry::with_sources(vec![
        InputSourceHandle::new(ABC, "ABC"),
        InputSourceHandle::new(PINYIN, "Pinyin - Simplified"),
        InputSourceHandle::new(KANA, "Kana"),
        InputSourceHandle::new(LOCKED, "Locked").selectable(false),
    ]);
    reg.set_current(Some(ABC));
    let prefs = MemoryStore::with_mappings([
        (CHAT, PINYIN),
        (EDITOR, KANA),
        (TERMINAL, ABC),
        (LOCKED_APP, LOCKED),
        (STALE_APP, GONE),
    ]);
    let services = Services {
        registry: Arc::new(reg.clone()),
        prefs: Arc::new(prefs.clone()),
    };
    let settings = Settings {
        settle_delay: SETTLE,
        unmapped,
    };
    Fixture {
        coord: Coordinator::new(services, settings),
        reg,
        prefs,
    }
}

fn fixture() -> Fixture {
    fixture_with(UnmappedPolicy::Ignore)
}

fn ev(app: &str) -> ForegroundEvent {
    ForegroundEvent::from_bundle_id(Some(app), Instant::now()).unwrap()
}

fn outcome(report: Option<SwitchReport>) -> UnitOutcome {
    report.expect("unit should have finished").outcome
}

/// Spawn the event loop; returns the sender, shutdown token and report watch.
fn spawn(
    coord: Coordinator,
) -> (
    mpsc::UnboundedSender<ForegroundEvent>,
    CancellationToken,
    watch::Receiver<Option<SwitchReport>>,
    JoinHandle<()>,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    let token = CancellationToken::new();
    let reports = coord.last_report();
    let handle = tokio::spawn(coord.run(rx, token.clone()));
    (tx, token, reports, handle)
}

fn ids(reg: &MockRegistry) -> Vec<String> {
    reg.select_calls().into_iter().map(|id| id.into_string()).collect()
}

#[tokio::test(start_paused = true)]
async fn mapped_app_switches_after_settle_delay() {
    let Fixture { coord, reg, .. } = fixture();
    let (tx, _token, reports, _h) = spawn(coord);

    tx.send(ev(CHAT)).unwrap();
    time::sleep(SETTLE / 2).await;
    assert_eq!(reg.select_count(), 0, "must wait for the settle delay");

    time::sleep(SETTLE).await;
    assert_eq!(ids(&reg), vec![PINYIN]);
    assert_eq!(reg.current_id().unwrap().as_str(), PINYIN);
    let report = reports.borrow().clone().unwrap();
    assert_eq!(report.app.as_str(), CHAT);
    assert_eq!(
        report.outcome,
        UnitOutcome::Completed(Completion::Switched(PINYIN.into()))
    );
}

#[test]
fn already_current_source_is_a_no_op() {
    let Fixture { mut coord, reg, .. } = fixture();
    reg.set_current(Some(PINYIN));
    let out = outcome(coord.handle_event(ev(CHAT)));
    assert_eq!(out, UnitOutcome::Completed(Completion::AlreadyActive(PINYIN.into())));
    assert_eq!(coord.pending_state(), UnitState::Idle);
    assert_eq!(reg.select_count(), 0);
}

#[test]
fn mapping_saved_by_another_process_applies_on_next_activation() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("preferences.json");
    let reg = MockRegistry::with_sources(vec![
        InputSourceHandle::new(ABC, "ABC"),
        InputSourceHandle::new(PINYIN, "Pinyin - Simplified"),
    ]);
    reg.set_current(Some(ABC));
    let services = Services {
        registry: Arc::new(reg.clone()),
        prefs: Arc::new(FileStore::open(&path).unwrap()),
    };
    let mut coord = Coordinator::new(
        services,
        Settings {
            settle_delay: SETTLE,
            unmapped: UnmappedPolicy::Ignore,
        },
    );

    let cli = FileStore::open(&path).unwrap();
    cli.set(CHAT.into(), PINYIN.into()).unwrap();

    assert!(coord.handle_event(ev(CHAT)).is_none());
    assert!(outcome(coord.execute_pending()).switched());
    assert_eq!(ids(&reg), vec![PINYIN]);
}

#[test]
fn unmapped_app_is_silent() {
    let Fixture { mut coord, reg, .. } = fixture();
    let out = outcome(coord.handle_event(ev(UNMAPPED)));
    assert_eq!(out, UnitOutcome::Completed(Completion::Unmapped));
    assert_eq!(out.state(), UnitState::Completed);
    assert_eq!(reg.select_count(), 0);
}

#[test]
fn stale_mapping_fails_without_select() {
    let Fixture { mut coord, reg, .. } = fixture();
    let out = outcome(coord.handle_event(ev(STALE_APP)));
    assert_eq!(out, UnitOutcome::Failed(SwitchFailure::NotFound(GONE.into())));
    assert_eq!(reg.select_count(), 0);
}

#[test]
fn uninstalled_source_makes_mapping_stale() {
    let Fixture { mut coord, reg, .. } = fixture();
    reg.remove_source(PINYIN);
    let out = outcome(coord.handle_event(ev(CHAT)));
    assert_eq!(out, UnitOutcome::Failed(SwitchFailure::NotFound(PINYIN.into())));
}

#[test]
fn non_selectable_source_never_reaches_the_os() {
    let Fixture { mut coord, reg, .. } = fixture();
    assert!(coord.handle_event(ev(LOCKED_APP)).is_none());
    assert_eq!(coord.pending_state(), UnitState::Scheduled);
    let out = outcome(coord.execute_pending());
    assert_eq!(
        out,
        UnitOutcome::Failed(SwitchFailure::Switch(SwitchError::NotSelectable(LOCKED.into())))
    );
    assert_eq!(out.state(), UnitState::Failed);
    assert_eq!(reg.select_count(), 0);
}

#[test]
fn unknown_current_source_still_switches() {
    let Fixture { mut coord, reg, .. } = fixture();
    reg.set_current(None);
    assert!(coord.handle_event(ev(CHAT)).is_none());
    assert!(outcome(coord.execute_pending()).switched());
    assert_eq!(ids(&reg), vec![PINYIN]);
}

#[test]
fn newer_event_supersedes_scheduled_unit() {
    let Fixture { mut coord, reg, .. } = fixture();
    let mut reports = coord.last_report();
    assert!(coord.handle_event(ev(CHAT)).is_none());
    assert!(coord.handle_event(ev(EDITOR)).is_none());

    // The superseded unit was published before the new one was resolved.
    let superseded = reports.borrow_and_update().clone().unwrap();
    assert_eq!(superseded.seq, 1);
    assert_eq!(superseded.outcome, UnitOutcome::Superseded);

    let done = coord.execute_pending().unwrap();
    assert_eq!(done.seq, 2);
    assert_eq!(ids(&reg), vec![KANA]);
    assert!(coord.execute_pending().is_none());
}

#[tokio::test(start_paused = true)]
async fn rapid_switch_only_executes_latest() {
    let Fixture { coord, reg, .. } = fixture();
    let (tx, _token, _reports, _h) = spawn(coord);

    tx.send(ev(CHAT)).unwrap();
    time::sleep(SETTLE / 4).await;
    tx.send(ev(EDITOR)).unwrap();
    time::sleep(SETTLE * 3).await;

    assert_eq!(ids(&reg), vec![KANA]);
}

#[tokio::test(start_paused = true)]
async fn switch_to_unmapped_app_cancels_pending_switch() {
    let Fixture { coord, reg, .. } = fixture();
    let (tx, _token, reports, _h) = spawn(coord);

    tx.send(ev(CHAT)).unwrap();
    time::sleep(SETTLE / 4).await;
    tx.send(ev(UNMAPPED)).unwrap();
    time::sleep(SETTLE * 3).await;

    assert_eq!(reg.select_count(), 0);
    let last = reports.borrow().clone().unwrap();
    assert_eq!(last.app.as_str(), UNMAPPED);
}

#[tokio::test(start_paused = true)]
async fn a_b_a_within_delay_switches_once_for_a() {
    let Fixture { coord, reg, .. } = fixture();
    let (tx, _token, _reports, _h) = spawn(coord);

    for app in [CHAT, EDITOR, CHAT] {
        tx.send(ev(app)).unwrap();
        time::sleep(SETTLE / 5).await;
    }
    time::sleep(SETTLE * 2).await;

    assert_eq!(ids(&reg), vec![PINYIN]);
}

#[tokio::test(start_paused = true)]
async fn spaced_events_each_execute() {
    let Fixture { coord, reg, .. } = fixture();
    let (tx, _token, _reports, _h) = spawn(coord);

    for app in [CHAT, EDITOR, TERMINAL] {
        tx.send(ev(app)).unwrap();
        time::sleep(SETTLE * 2).await;
    }

    assert_eq!(ids(&reg), vec![PINYIN, KANA, ABC]);
}

#[tokio::test(start_paused = true)]
async fn coordinator_survives_os_rejection() {
    let Fixture { coord, reg, .. } = fixture();
    let (tx, _token, reports, _h) = spawn(coord);

    reg.set_fail_select(Some(-50));
    tx.send(ev(CHAT)).unwrap();
    time::sleep(SETTLE * 2).await;
    let failed = reports.borrow().clone().unwrap();
    assert_eq!(
        failed.outcome,
        UnitOutcome::Failed(SwitchFailure::Switch(SwitchError::OsRejected {
            id: PINYIN.into(),
            code: -50,
        }))
    );
    assert_eq!(reg.current_id().unwrap().as_str(), ABC);

    // Re-activating the same app is the retry.
    reg.set_fail_select(None);
    tx.send(ev(CHAT)).unwrap();
    time::sleep(SETTLE * 2).await;
    assert_eq!(reg.current_id().unwrap().as_str(), PINYIN);
    assert_eq!(reg.select_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn shutdown_drops_scheduled_switch() {
    let Fixture { coord, reg, .. } = fixture();
    let (tx, token, _reports, handle) = spawn(coord);

    tx.send(ev(CHAT)).unwrap();
    time::sleep(SETTLE / 2).await;
    token.cancel();
    handle.await.unwrap();
    time::sleep(SETTLE * 2).await;

    assert_eq!(reg.select_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn closed_channel_flushes_scheduled_switch() {
    let Fixture { coord, reg, .. } = fixture();
    let (tx, _token, _reports, handle) = spawn(coord);

    tx.send(ev(CHAT)).unwrap();
    drop(tx);
    handle.await.unwrap();

    assert_eq!(ids(&reg), vec![PINYIN]);
}

#[test]
fn restore_default_policy_switches_unmapped_apps() {
    let Fixture {
        mut coord,
        reg,
        prefs,
    } = fixture_with(UnmappedPolicy::RestoreDefault);
    reg.set_current(Some(PINYIN));

    // No default configured yet: still silent.
    let out = outcome(coord.handle_event(ev(UNMAPPED)));
    assert_eq!(out, UnitOutcome::Completed(Completion::Unmapped));

    prefs.set_default(Some(ABC.into())).unwrap();
    assert!(coord.handle_event(ev(UNMAPPED)).is_none());
    assert!(outcome(coord.execute_pending()).switched());
    assert_eq!(ids(&reg), vec![ABC]);
}

#[test]
fn ignore_policy_ignores_default() {
    let Fixture {
        mut coord,
        reg,
        prefs,
    } = fixture();
    prefs.set_default(Some(KANA.into())).unwrap();
    let out = outcome(coord.handle_event(ev(UNMAPPED)));
    assert_eq!(out, UnitOutcome::Completed(Completion::Unmapped));
    assert_eq!(reg.select_count(), 0);
}

#[test]
fn mapping_edits_apply_to_next_event() {
    let Fixture {
        mut coord,
        reg,
        prefs,
    } = fixture();
    prefs
        .set(ApplicationId::new(UNMAPPED), KANA.into())
        .unwrap();
    assert!(coord.handle_event(ev(UNMAPPED)).is_none());
    coord.execute_pending();
    prefs.remove(&ApplicationId::new(CHAT)).unwrap();
    let out = outcome(coord.handle_event(ev(CHAT)));
    assert_eq!(out, UnitOutcome::Completed(Completion::Unmapped));
    assert_eq!(ids(&reg), vec![KANA]);
}

#[test]
fn active_app_and_sequence_track_events() {
    let Fixture { mut coord, .. } = fixture();
    let active = coord.active_app();
    assert!(active.borrow().is_none());

    coord.handle_event(ev(UNMAPPED));
    assert_eq!(active.borrow().as_ref().map(ApplicationId::as_str), Some(UNMAPPED));
    let r = coord.handle_event(ev(TERMINAL)).unwrap();
    assert_eq!(r.seq, 2);
    assert_eq!(active.borrow().as_ref().map(ApplicationId::as_str), Some(TERMINAL));
}

#[tokio::test(start_paused = true)]
async fn deadline_is_settle_delay_after_event() {
    let Fixture { mut coord, .. } = fixture();
    let e = ev(CHAT);
    let at = e.at;
    coord.handle_event(e);
    assert_eq!(coord.next_deadline(), Some(at + SETTLE));
}

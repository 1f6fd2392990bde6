use std::ptr::NonNull;

use block2::StackBlock;
use objc2_app_kit::{
    NSApplicationActivationPolicy, NSRunningApplication, NSWorkspace,
    NSWorkspaceApplicationKey, NSWorkspaceDidActivateApplicationNotification,
};
use objc2_foundation::NSNotification;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use tao::event_loop::EventLoopProxy;
use tokio::time::Instant;
use tracing::{debug, info, trace};

use crate::{Error, ForegroundEvent, RunningApp, sink};

/// Main-thread proxy used to schedule the observer install on the tao loop.
static MAIN_PROXY: Lazy<Mutex<Option<EventLoopProxy<()>>>> = Lazy::new(|| Mutex::new(None));

/// Set once the observer has been registered.
static INSTALLED: Mutex<bool> = Mutex::new(false);

/// Provide the tao main-thread `EventLoopProxy<()>`.
///
/// Call once on the main thread, after creating the event loop and before
/// [`crate::start_watcher`]. The watcher posts a `UserEvent(())` through this
/// proxy; the loop answers it by calling [`install_ns_workspace_observer`].
pub fn set_main_proxy(proxy: EventLoopProxy<()>) {
    *MAIN_PROXY.lock() = Some(proxy);
}

/// Post a `UserEvent(())` to the tao loop.
pub fn wake_main_loop() -> Result<(), Error> {
    match &*MAIN_PROXY.lock() {
        Some(p) => p.send_event(()).map_err(|_| Error::PostEventFailed),
        None => Err(Error::MainProxyNotSet),
    }
}

/// Bundle identifier of `app`, if any.
fn bundle_id(app: &NSRunningApplication) -> Option<String> {
    unsafe { app.bundleIdentifier() }.map(|s| s.to_string())
}

/// Forward one activation notification into the sink.
fn on_activate(notif: &NSNotification) {
    let app = unsafe {
        notif
            .userInfo()
            .and_then(|info| info.objectForKey(NSWorkspaceApplicationKey))
            .and_then(|obj| obj.downcast::<NSRunningApplication>().ok())
    };
    // Fall back to asking the workspace directly.
    let app = app.or_else(|| unsafe { NSWorkspace::sharedWorkspace().frontmostApplication() });
    let id = app.as_deref().and_then(bundle_id);
    let pid = app.as_deref().map(|a| unsafe { a.processIdentifier() });
    trace!(bundle_id = ?id, pid = ?pid, "didActivateApplication");
    if let Some(ev) = ForegroundEvent::from_bundle_id(id.as_deref(), Instant::now())
        && !sink::emit(ev)
    {
        debug!("activation dropped: no receiver");
    }
}

/// Install the NSWorkspace activation observer on the current (main) thread.
///
/// Idempotent: only the first call registers the observer.
pub fn install_ns_workspace_observer() -> Result<(), Error> {
    let mut installed = INSTALLED.lock();
    if *installed {
        return Ok(());
    }
    let center = unsafe { NSWorkspace::sharedWorkspace().notificationCenter() };
    let block = StackBlock::new(|notif: NonNull<NSNotification>| {
        on_activate(unsafe { notif.as_ref() });
    })
    .copy();
    unsafe {
        // The center retains the block for the life of the process.
        let _token = center.addObserverForName_object_queue_usingBlock(
            Some(NSWorkspaceDidActivateApplicationNotification),
            None,
            None,
            &block,
        );
    }
    *installed = true;
    info!("NSWorkspace observer installed");
    Ok(())
}

/// Bundle id of the frontmost application right now.
pub(crate) fn frontmost() -> Option<String> {
    unsafe { NSWorkspace::sharedWorkspace().frontmostApplication() }
        .as_deref()
        .and_then(bundle_id)
}

/// Regular applications currently running.
pub(crate) fn running_applications() -> Vec<RunningApp> {
    let apps = unsafe { NSWorkspace::sharedWorkspace().runningApplications() };
    let mut out: Vec<RunningApp> = apps
        .iter()
        .filter(|a| unsafe { a.activationPolicy() } == NSApplicationActivationPolicy::Regular)
        .filter_map(|a| {
            let id = bundle_id(&a)?;
            Some(RunningApp {
                app: id.into(),
                name: unsafe { a.localizedName() }.map(|n| n.to_string()),
            })
        })
        .collect();
    out.sort_by(|a, b| a.app.cmp(&b.app));
    out.dedup_by(|a, b| a.app == b.app);
    out
}

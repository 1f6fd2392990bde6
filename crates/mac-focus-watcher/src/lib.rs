//! mac-focus-watcher: observe foreground application changes on macOS.
//!
//! Activations come from NSWorkspace's `didActivateApplication` notification,
//! which must be observed from the main thread.
//!
//! Integration:
//! - Call [`set_main_proxy`] once on the tao main thread after creating the
//!   event loop.
//! - Call [`start_watcher`] from any thread with the sender that should
//!   receive [`ForegroundEvent`]s. It registers the sender and posts one
//!   `UserEvent(())` to the tao loop.
//! - In the loop's `Event::UserEvent(())` arm, call
//!   [`install_ns_workspace_observer`]. It is idempotent.
//!
//! Events are delivered in the order the OS reports them. Activations without
//! a bundle identifier are dropped before delivery. On other platforms the
//! entry points report [`Error::Unsupported`].

mod event;
#[cfg(target_os = "macos")]
mod ns;
mod sink;

pub use event::{ForegroundEvent, RunningApp};
#[cfg(target_os = "macos")]
pub use ns::{install_ns_workspace_observer, set_main_proxy, wake_main_loop};
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;

/// Errors that can occur when interacting with mac-focus-watcher public APIs.
#[derive(Debug, Error)]
pub enum Error {
    /// [`start_watcher`] ran before the main-thread proxy was provided.
    #[error("main proxy not set; call set_main_proxy() on the main thread first")]
    MainProxyNotSet,
    /// The tao event loop has gone away.
    #[error("failed to post install request to main thread")]
    PostEventFailed,
    /// Foreground tracking is only available on macOS.
    #[error("foreground application tracking is not supported on this platform")]
    Unsupported,
}

/// Start delivering foreground changes to `tx`.
///
/// Registers `tx` as the sink and asks the main thread to install the
/// NSWorkspace observer. May be called from any thread; a second call
/// replaces the sink.
pub fn start_watcher(tx: UnboundedSender<ForegroundEvent>) -> Result<(), Error> {
    sink::set(tx);
    request_install()
}

#[cfg(target_os = "macos")]
/// Post the install request to the tao loop.
fn request_install() -> Result<(), Error> {
    wake_main_loop()
}

#[cfg(not(target_os = "macos"))]
/// Post the install request to the tao loop.
fn request_install() -> Result<(), Error> {
    Err(Error::Unsupported)
}

/// Bundle identifier of the current foreground application, if it has one.
pub fn frontmost_application() -> Result<Option<ForegroundEvent>, Error> {
    #[cfg(target_os = "macos")]
    {
        Ok(ForegroundEvent::from_bundle_id(
            ns::frontmost().as_deref(),
            tokio::time::Instant::now(),
        ))
    }
    #[cfg(not(target_os = "macos"))]
    {
        Err(Error::Unsupported)
    }
}

/// Regular (Dock-visible) applications currently running, sorted by bundle id.
pub fn running_applications() -> Result<Vec<RunningApp>, Error> {
    #[cfg(target_os = "macos")]
    {
        Ok(ns::running_applications())
    }
    #[cfg(not(target_os = "macos"))]
    {
        Err(Error::Unsupported)
    }
}

#[cfg(test)]
mod tests {
    use tokio::{sync::mpsc, time::Instant};

    use super::*;

    #[test]
    fn sink_delivers_in_order() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        sink::set(tx);
        let now = Instant::now();
        for id in ["com.a", "com.b", "com.a"] {
            let ev = ForegroundEvent::from_bundle_id(Some(id), now).unwrap();
            assert!(sink::emit(ev));
        }
        let got: Vec<String> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|e| e.app.into_string())
            .collect();
        assert_eq!(got, vec!["com.a", "com.b", "com.a"]);
    }

    #[cfg(not(target_os = "macos"))]
    #[test]
    fn unsupported_off_macos() {
        assert!(matches!(running_applications(), Err(Error::Unsupported)));
        assert!(matches!(frontmost_application(), Err(Error::Unsupported)));
    }
}

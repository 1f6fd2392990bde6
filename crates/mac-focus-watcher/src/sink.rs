//! Process-global event sink shared with the main-thread observer.

use parking_lot::Mutex;
use tokio::sync::mpsc::UnboundedSender;

use crate::ForegroundEvent;

/// Where normalised activations are delivered.
static SINK: Mutex<Option<UnboundedSender<ForegroundEvent>>> = Mutex::new(None);

/// Replace the sink. Events emitted before this is called are dropped.
pub(crate) fn set(tx: UnboundedSender<ForegroundEvent>) {
    *SINK.lock() = Some(tx);
}

/// Deliver one event. Returns false when no receiver is listening.
#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
pub(crate) fn emit(event: ForegroundEvent) -> bool {
    match &*SINK.lock() {
        Some(tx) => tx.send(event).is_ok(),
        None => false,
    }
}

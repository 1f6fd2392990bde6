//! Background thread with a bounded stop.
//!
//! The coordinator thread can block on the main dispatch queue while a TIS
//! call is marshalled there. Once the main loop is tearing down that queue no
//! longer drains, so the main thread must never wait on the worker without a
//! limit.

#![cfg_attr(not(target_os = "macos"), allow(dead_code))]

use std::{
    sync::mpsc::{self, Receiver, RecvTimeoutError},
    thread::{self, JoinHandle},
    time::Duration,
};

use tracing::{error, trace, warn};

/// How long the main thread waits for the coordinator during shutdown.
pub const STOP_WAIT_TIMEOUT: Duration = Duration::from_millis(500);

/// A spawned thread that signals when its body returns.
pub struct Worker {
    /// Joined only after the done signal arrives.
    handle: JoinHandle<()>,
    /// Receives once the body finishes; disconnects if it panics.
    done_rx: Receiver<()>,
}

impl Worker {
    /// Run `body` on a new thread.
    pub fn spawn<F>(body: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let (done_tx, done_rx) = mpsc::channel::<()>();
        let handle = thread::spawn(move || {
            body();
            let _ = done_tx.send(());
        });
        Self { handle, done_rx }
    }

    /// Wait up to `timeout` for the thread to finish, then join it.
    ///
    /// Returns false if the thread is still running at the deadline; it is
    /// left detached.
    pub fn stop(self, timeout: Duration) -> bool {
        match self.done_rx.recv_timeout(timeout) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                if self.handle.join().is_err() {
                    error!("coordinator thread panicked");
                }
                trace!("worker_joined");
                true
            }
            Err(RecvTimeoutError::Timeout) => {
                warn!(
                    timeout_ms = timeout.as_millis(),
                    "coordinator thread did not stop in time, detaching"
                );
                false
            }
        }
    }
}

//! The long-running switcher.
//!
//! The tao event loop owns the main thread, where the NSWorkspace observer
//! lives. The coordinator runs on a worker thread with its own tokio runtime.
//! Either side can end the process: Ctrl-C cancels the shared token from the
//! worker, which then wakes the main loop so it can exit.

use autoinput_engine::{Coordinator, Services, Settings};
use tao::{
    event::Event,
    event_loop::{ControlFlow, EventLoop},
    platform::macos::{ActivationPolicy, EventLoopExtMacOS},
};
use tokio::{runtime, signal, sync::mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::{
    Result,
    worker::{STOP_WAIT_TIMEOUT, Worker},
};

/// Run until interrupted. Only returns on setup failure.
pub fn run(settings: Settings, services: Services) -> Result<()> {
    info!(
        settle_ms = settings.settle_delay.as_millis(),
        unmapped = ?settings.unmapped,
        "starting autoinput"
    );

    // Must be created on the main thread.
    let mut event_loop = EventLoop::new();
    let proxy = event_loop.create_proxy();
    mac_focus_watcher::set_main_proxy(proxy.clone());
    event_loop.set_activation_policy(ActivationPolicy::Accessory);

    let rt = runtime::Builder::new_current_thread().enable_all().build()?;
    let (tx, rx) = mpsc::unbounded_channel();
    let shutdown = CancellationToken::new();
    let coordinator = Coordinator::new(services, settings);

    let worker_shutdown = shutdown.clone();
    let worker = Worker::spawn(move || {
        rt.block_on(async {
            let on_signal = worker_shutdown.clone();
            tokio::spawn(async move {
                if signal::ctrl_c().await.is_ok() {
                    info!("interrupt received, shutting down");
                    on_signal.cancel();
                }
            });
            coordinator.run(rx, worker_shutdown.clone()).await;
        });
        worker_shutdown.cancel();
        // The main loop may be parked; wake it so it sees the cancellation.
        proxy.send_event(()).ok();
    });

    mac_focus_watcher::start_watcher(tx)?;

    let mut worker = Some(worker);
    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;
        match event {
            Event::LoopDestroyed => {
                // The main queue stops draining here, so a worker stuck in a
                // TIS call cannot finish; never wait on it unbounded.
                shutdown.cancel();
                if let Some(w) = worker.take() {
                    w.stop(STOP_WAIT_TIMEOUT);
                }
                info!("autoinput stopped");
                return;
            }
            Event::UserEvent(()) if !shutdown.is_cancelled() => {
                if let Err(e) = mac_focus_watcher::install_ns_workspace_observer() {
                    error!("failed to install NSWorkspace observer: {e}");
                    shutdown.cancel();
                }
            }
            _ => {}
        }
        if shutdown.is_cancelled() {
            debug!("shutdown requested, exiting event loop");
            *control_flow = ControlFlow::Exit;
        }
    })
}

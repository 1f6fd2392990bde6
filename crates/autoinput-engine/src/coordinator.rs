use std::{future, time::Duration};

use autoinput_ids::{ApplicationId, InputSourceId};
use config::UnmappedPolicy;
use mac_focus_watcher::ForegroundEvent;
use mac_inputsource::{Error as RegistryError, InputSourceHandle, SelectInputSource};
use tokio::{
    sync::{mpsc::UnboundedReceiver, watch},
    time::{self, Instant},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::{Completion, Result, Services, SwitchReport, UnitOutcome, UnitState};

/// Coordinator tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    /// Delay between a foreground change and the selection call.
    pub settle_delay: Duration,
    /// Policy for applications without a mapping.
    pub unmapped: UnmappedPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self::from(&config::Config::default())
    }
}

impl From<&config::Config> for Settings {
    fn from(cfg: &config::Config) -> Self {
        Self {
            settle_delay: cfg.settle_delay(),
            unmapped: cfg.unmapped,
        }
    }
}

/// The one unit of work allowed to wait for its settle delay.
#[derive(Debug)]
struct Pending {
    /// Unit sequence number.
    seq: u64,
    /// Application the unit belongs to.
    app: ApplicationId,
    /// Resolved target.
    handle: InputSourceHandle,
    /// When the selection call becomes due.
    deadline: Instant,
}

/// What resolution decided for a new unit.
enum Plan {
    /// Terminal without an OS call.
    Done(Completion),
    /// Select `handle` once the settle delay elapses.
    Switch(InputSourceHandle),
}

/// Turns foreground changes into input source switches.
///
/// Events are processed one at a time. Resolution (store lookup, registry
/// lookup, idempotence check) happens on receipt; the selection call runs
/// after the settle delay. At most one unit waits at a time: any new event
/// supersedes it. A unit that is executing always runs to completion, since
/// the selection call runs inline on the event loop.
pub struct Coordinator {
    /// Registry and preference store.
    services: Services,
    /// Timing and policy.
    settings: Settings,
    /// Last assigned unit sequence number.
    seq: u64,
    /// Unit waiting for its deadline, if any.
    pending: Option<Pending>,
    /// Most recently activated application.
    active_tx: watch::Sender<Option<ApplicationId>>,
    /// Most recent finished unit.
    report_tx: watch::Sender<Option<SwitchReport>>,
}

impl Coordinator {
    /// Create an idle coordinator over `services`.
    pub fn new(services: Services, settings: Settings) -> Self {
        let (active_tx, _) = watch::channel(None);
        let (report_tx, _) = watch::channel(None);
        Self {
            services,
            settings,
            seq: 0,
            pending: None,
            active_tx,
            report_tx,
        }
    }

    /// Observe the currently active application.
    pub fn active_app(&self) -> watch::Receiver<Option<ApplicationId>> {
        self.active_tx.subscribe()
    }

    /// Observe the outcome of the most recently finished unit.
    pub fn last_report(&self) -> watch::Receiver<Option<SwitchReport>> {
        self.report_tx.subscribe()
    }

    /// State of the newest unit that has not finished, if any.
    pub fn pending_state(&self) -> UnitState {
        match self.pending {
            Some(_) => UnitState::Scheduled,
            None => UnitState::Idle,
        }
    }

    /// When the scheduled unit becomes due.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    /// Process one foreground change.
    ///
    /// Supersedes any scheduled unit, then resolves the new one. Returns the
    /// new unit's report when it finished without needing the settle delay,
    /// or `None` when it was scheduled.
    pub fn handle_event(&mut self, ev: ForegroundEvent) -> Option<SwitchReport> {
        self.supersede();
        self.seq += 1;
        let seq = self.seq;
        let app = ev.app;
        self.active_tx.send_replace(Some(app.clone()));
        debug!(seq, app = %app, "foreground changed");

        match self.plan(&app) {
            Ok(Plan::Done(c)) => Some(self.finish(seq, app, UnitOutcome::Completed(c))),
            Ok(Plan::Switch(handle)) => {
                let deadline = ev.at + self.settings.settle_delay;
                trace!(seq, app = %app, target = %handle.id, "scheduled");
                self.pending = Some(Pending {
                    seq,
                    app,
                    handle,
                    deadline,
                });
                None
            }
            Err(e) => Some(self.finish(seq, app, UnitOutcome::Failed(e))),
        }
    }

    /// Execute the scheduled unit now, regardless of its deadline.
    pub fn execute_pending(&mut self) -> Option<SwitchReport> {
        let Pending {
            seq, app, handle, ..
        } = self.pending.take()?;
        trace!(seq, app = %app, target = %handle.id, state = ?UnitState::Executing, "executing");
        let outcome = match self.services.registry.select(&handle) {
            Ok(()) => UnitOutcome::Completed(Completion::Switched(handle.id)),
            Err(e) => UnitOutcome::Failed(e.into()),
        };
        Some(self.finish(seq, app, outcome))
    }

    /// Abandon the scheduled unit without an OS call.
    fn supersede(&mut self) {
        if let Some(p) = self.pending.take() {
            self.finish(p.seq, p.app, UnitOutcome::Superseded);
        }
    }

    /// Steps 1 to 3: mapping lookup, registry lookup, idempotence check.
    fn plan(&self, app: &ApplicationId) -> Result<Plan> {
        let Some(target) = self.target_for(app) else {
            return Ok(Plan::Done(Completion::Unmapped));
        };
        let handle = self.services.registry.find(&target)?;
        match self.services.registry.current_input_source() {
            Ok(current) if current.same_source(&handle) => {
                return Ok(Plan::Done(Completion::AlreadyActive(handle.id)));
            }
            Ok(_) => {}
            Err(RegistryError::UnknownState) => {
                debug!(app = %app, "current input source unknown; switching anyway");
            }
            Err(e) => warn!(app = %app, error = %e, "could not read current input source"),
        }
        Ok(Plan::Switch(handle))
    }

    /// Mapped source for `app`, or the default when the policy allows it.
    fn target_for(&self, app: &ApplicationId) -> Option<InputSourceId> {
        self.services.prefs.get(app).or_else(|| match self.settings.unmapped {
            UnmappedPolicy::Ignore => None,
            UnmappedPolicy::RestoreDefault => self.services.prefs.get_default(),
        })
    }

    /// Log and publish a terminal outcome.
    fn finish(&self, seq: u64, app: ApplicationId, outcome: UnitOutcome) -> SwitchReport {
        let report = SwitchReport { seq, app, outcome };
        match &report.outcome {
            UnitOutcome::Completed(Completion::Switched(id)) => {
                info!(seq, app = %report.app, source = %id, "switched input source");
            }
            UnitOutcome::Completed(c) => debug!(seq, app = %report.app, ?c, "nothing to do"),
            UnitOutcome::Superseded => debug!(seq, app = %report.app, "superseded"),
            UnitOutcome::Failed(e) => warn!(seq, app = %report.app, error = %e, "switch failed"),
        }
        self.report_tx.send_replace(Some(report.clone()));
        report
    }

    /// Drive the coordinator until `shutdown` fires or `rx` closes.
    ///
    /// Queued events are always taken before a due deadline, so a backlog
    /// collapses to its most recent event. When the channel closes, a
    /// scheduled unit still executes at its deadline. On shutdown it is
    /// dropped without an OS call.
    pub async fn run(
        mut self,
        mut rx: UnboundedReceiver<ForegroundEvent>,
        shutdown: CancellationToken,
    ) {
        info!(settle_ms = self.settings.settle_delay.as_millis(), "coordinator started");
        let mut open = true;
        loop {
            let deadline = self.next_deadline();
            if !open && deadline.is_none() {
                break;
            }
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    if let Some(p) = self.pending.take() {
                        debug!(seq = p.seq, app = %p.app, "dropping scheduled switch on shutdown");
                    }
                    break;
                }
                ev = rx.recv(), if open => match ev {
                    Some(ev) => {
                        self.handle_event(ev);
                    }
                    None => {
                        debug!("event channel closed");
                        open = false;
                    }
                },
                _ = sleep_until(deadline) => {
                    self.execute_pending();
                }
            }
        }
        info!("coordinator stopped");
    }
}

/// Sleep until `deadline`, or forever when there is none.
async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(d) => time::sleep_until(d).await,
        None => future::pending().await,
    }
}

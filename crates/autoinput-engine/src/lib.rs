//! autoinput engine
//!
//! The [`Coordinator`] consumes [`ForegroundEvent`]s and switches the active
//! input source to the one mapped for the newly active application.
//!
//! Per event:
//! 1. Look up the mapping. Unmapped applications are left alone (or get the
//!    store's default source under [`UnmappedPolicy::RestoreDefault`]).
//! 2. Resolve the mapped source in the registry. A missing source fails the
//!    unit; the mapping is stale until the user fixes it.
//! 3. If it is already current, finish without an OS call.
//! 4. Otherwise schedule the selection after the settle delay. A newer event
//!    arriving first abandons it (most recent wins).
//! 5. Select. Failures are reported and never retried.
//!
//! No failure stops the coordinator.

mod coordinator;
mod error;
mod services;
mod unit;

pub use config::UnmappedPolicy;
pub use coordinator::{Coordinator, Settings};
pub use error::{Result, SwitchFailure};
pub use mac_focus_watcher::ForegroundEvent;
pub use services::Services;
pub use unit::{Completion, SwitchReport, UnitOutcome, UnitState};

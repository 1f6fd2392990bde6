//! One-shot configuration commands.
//!
//! Each command writes human-readable output to `out` so it can be tested
//! against in-memory fakes.

use std::io::Write;

use autoinput_ids::{ApplicationId, InputSourceId};
use mac_focus_watcher::RunningApp;
use mac_inputsource::{Filter, InputSourceHandle, InputSourceRegistry};
use prefstore::PreferenceStore;
use tracing::info;

use crate::{Error, Result};

/// One listing line for an input source.
fn describe(h: &InputSourceHandle, current: Option<&InputSourceHandle>) -> String {
    let marker = if current.is_some_and(|c| c.same_source(h)) {
        '*'
    } else {
        ' '
    };
    let mut line = format!("{marker} {}  {}", h.id, h.display_name);
    if !h.is_enabled {
        line.push_str("  [disabled]");
    }
    if !h.is_selectable {
        line.push_str("  [not selectable]");
    }
    line
}

/// `sources [--all]`
pub fn sources(reg: &dyn InputSourceRegistry, all: bool, out: &mut impl Write) -> Result<()> {
    let filter = if all { Filter::all() } else { Filter::enabled() };
    let current = reg.current_input_source().ok();
    for h in reg.list_input_sources(filter)? {
        writeln!(out, "{}", describe(&h, current.as_ref()))?;
    }
    Ok(())
}

/// `current`
pub fn current(reg: &dyn InputSourceRegistry, out: &mut impl Write) -> Result<()> {
    let h = reg.current_input_source()?;
    writeln!(out, "{}  {}", h.id, h.display_name)?;
    Ok(())
}

/// `apps`
pub fn apps(
    prefs: &dyn PreferenceStore,
    running: &[RunningApp],
    frontmost: Option<&ApplicationId>,
    out: &mut impl Write,
) -> Result<()> {
    for app in running {
        let marker = if frontmost == Some(&app.app) { '*' } else { ' ' };
        let mapped = prefs
            .get(&app.app)
            .map_or_else(|| "-".to_string(), InputSourceId::into_string);
        writeln!(out, "{marker} {}  {}  -> {mapped}", app.app, app.label())?;
    }
    Ok(())
}

/// Check that `id` names an enabled, selectable source.
fn validate(reg: &dyn InputSourceRegistry, id: &InputSourceId) -> Result<()> {
    match reg.find(id) {
        Ok(h) if !h.is_selectable => Err(Error::NotSelectable(h.id)),
        Ok(_) => Ok(()),
        Err(mac_inputsource::Error::NotFound(id)) => Err(Error::UnknownSource(id)),
        Err(e) => Err(e.into()),
    }
}

/// `map <APP> <SOURCE> [--force]`
pub fn map(
    reg: &dyn InputSourceRegistry,
    prefs: &dyn PreferenceStore,
    app: &str,
    source: &str,
    force: bool,
    out: &mut impl Write,
) -> Result<()> {
    let app = ApplicationId::new(app.trim());
    let source = source.trim();
    if source.is_empty() {
        return unmap(prefs, app.as_str(), out);
    }
    let id = InputSourceId::new(source);
    if !force {
        validate(reg, &id)?;
    }
    prefs.set(app.clone(), id.clone())?;
    info!(app = %app, source = %id, "mapping saved");
    writeln!(out, "{app} -> {id}")?;
    Ok(())
}

/// `unmap <APP>`
pub fn unmap(prefs: &dyn PreferenceStore, app: &str, out: &mut impl Write) -> Result<()> {
    let app = ApplicationId::new(app.trim());
    prefs.remove(&app)?;
    info!(app = %app, "mapping removed");
    writeln!(out, "{app} -> -")?;
    Ok(())
}

/// `mappings`
pub fn mappings(prefs: &dyn PreferenceStore, out: &mut impl Write) -> Result<()> {
    for (app, source) in prefs.mappings() {
        writeln!(out, "{app} -> {source}")?;
    }
    if let Some(d) = prefs.get_default() {
        writeln!(out, "(default) -> {d}")?;
    }
    Ok(())
}

/// `default [SOURCE | --clear]`
pub fn default(
    reg: &dyn InputSourceRegistry,
    prefs: &dyn PreferenceStore,
    source: Option<&str>,
    clear: bool,
    out: &mut impl Write,
) -> Result<()> {
    if clear {
        prefs.set_default(None)?;
        writeln!(out, "default cleared")?;
        return Ok(());
    }
    match source.map(str::trim) {
        Some(s) if !s.is_empty() => {
            let id = InputSourceId::new(s);
            validate(reg, &id)?;
            prefs.set_default(Some(id.clone()))?;
            writeln!(out, "default -> {id}")?;
        }
        _ => match prefs.get_default() {
            Some(id) => writeln!(out, "{id}")?,
            None => writeln!(out, "(none)")?,
        },
    }
    Ok(())
}

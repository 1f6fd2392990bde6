#![warn(missing_docs)]

//! Entry point for the `autoinput` binary.

mod cli;
mod commands;
#[cfg(target_os = "macos")]
mod daemon;
mod error;
mod worker;

use std::{
    io::{self, Write},
    process,
    sync::Arc,
};

use autoinput_engine::{Services, Settings};
use clap::Parser;
use mac_inputsource::InputSourceRegistry;
use prefstore::FileStore;
use tracing::{debug, error};
use tracing_subscriber::{fmt, prelude::*, registry};

use crate::{
    cli::{Cli, Commands, RunArgs},
    error::{Error, Result},
};

fn main() {
    if let Err(err) = run() {
        error!("{err}");
        eprintln!("error: {err}");
        process::exit(1);
    }
}

/// Parse CLI arguments, install logging, and dispatch to the chosen subcommand.
fn run() -> Result<()> {
    let Cli {
        log,
        config: config_path,
        store,
        command,
    } = Cli::parse();
    let env_filter = logging::env_filter_from_spec(&log.spec());
    registry()
        .with(env_filter)
        .with(fmt::layer().without_time())
        .try_init()
        .ok();

    let mut cfg = config::load(config_path.as_deref())?;
    let store_path = store
        .or_else(|| cfg.store_path.clone())
        .unwrap_or_else(prefstore::default_store_path);
    debug!(path = %store_path.display(), "opening preference store");
    let prefs = Arc::new(FileStore::open(store_path)?);
    let backend = mac_inputsource::default_registry();
    let reg: &dyn InputSourceRegistry = backend.as_ref();
    let mut out = io::stdout();

    match command.unwrap_or_else(|| Commands::Run(RunArgs::default())) {
        Commands::Run(args) => {
            args.apply(&mut cfg);
            let services = Services {
                registry: backend.clone(),
                prefs,
            };
            start_daemon(Settings::from(&cfg), services)
        }
        Commands::Sources { all } => commands::sources(reg, all, &mut out),
        Commands::Current => commands::current(reg, &mut out),
        Commands::Apps => {
            let running = mac_focus_watcher::running_applications()?;
            let front = mac_focus_watcher::frontmost_application()?.map(|e| e.app);
            commands::apps(prefs.as_ref(), &running, front.as_ref(), &mut out)
        }
        Commands::Map { app, source, force } => {
            commands::map(reg, prefs.as_ref(), &app, &source, force, &mut out)
        }
        Commands::Unmap { app } => commands::unmap(prefs.as_ref(), &app, &mut out),
        Commands::Mappings => commands::mappings(prefs.as_ref(), &mut out),
        Commands::Default { source, clear } => {
            commands::default(reg, prefs.as_ref(), source.as_deref(), clear, &mut out)
        }
    }?;
    out.flush()?;
    Ok(())
}

#[cfg(target_os = "macos")]
/// Hand the main thread to the switcher.
fn start_daemon(settings: Settings, services: Services) -> Result<()> {
    daemon::run(settings, services)
}

#[cfg(not(target_os = "macos"))]
/// The switcher needs AppKit; refuse elsewhere.
fn start_daemon(_settings: Settings, _services: Services) -> Result<()> {
    Err(Error::Unsupported)
}

//! Command-line interface definitions for autoinput.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use config::{Config, UnmappedPolicy};
use logging::LogArgs;

/// Command-line interface for the `autoinput` binary.
#[derive(Parser, Debug)]
#[command(
    name = "autoinput",
    about = "Switch the input source when the foreground application changes",
    version
)]
pub struct Cli {
    /// Logging controls shared across autoinput binaries.
    #[command(flatten)]
    pub log: LogArgs,

    /// Config file (default: ~/.autoinput/config.ron when present).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Preference file (default: ~/.autoinput/preferences.json).
    #[arg(long, global = true, value_name = "PATH")]
    pub store: Option<PathBuf>,

    /// What to do; runs the daemon when omitted.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Watch the foreground application and switch input sources.
    Run(RunArgs),
    /// List input sources.
    Sources {
        /// Include disabled sources.
        #[arg(long)]
        all: bool,
    },
    /// Print the current input source.
    Current,
    /// List running applications with their mappings.
    Apps,
    /// Map an application to an input source. An empty SOURCE removes the mapping.
    Map {
        /// Application bundle identifier, e.g. com.apple.Terminal.
        app: String,
        /// Input source identifier, e.g. com.apple.keylayout.ABC.
        source: String,
        /// Skip checking that the source exists and is selectable.
        #[arg(long)]
        force: bool,
    },
    /// Remove the mapping for an application.
    Unmap {
        /// Application bundle identifier.
        app: String,
    },
    /// List all mappings.
    Mappings,
    /// Show, set or clear the default input source.
    Default {
        /// Input source to restore for unmapped applications.
        source: Option<String>,
        /// Clear the default.
        #[arg(long, conflicts_with = "source")]
        clear: bool,
    },
}

/// Arguments for the `run` subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Override the settle delay in milliseconds.
    #[arg(long, value_name = "MS")]
    pub settle_ms: Option<u64>,

    /// Switch unmapped applications to the default input source.
    #[arg(long)]
    pub restore_default: bool,
}

impl RunArgs {
    /// Apply command-line overrides on top of the loaded config.
    pub fn apply(&self, cfg: &mut Config) {
        if let Some(ms) = self.settle_ms {
            cfg.settle_delay_ms = ms;
        }
        if self.restore_default {
            cfg.unmapped = UnmappedPolicy::RestoreDefault;
        }
    }
}

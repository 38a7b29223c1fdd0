//! Command-line interface definitions for path-watcher.
//!
//! The CLI definitions are shared between the main binary and xtask, which
//! renders man pages from them.

#![allow(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Main CLI structure for path-watcher.
#[derive(Parser)]
#[command(
    name = "path-watcher",
    version = crate::VERSION,
    about = "Keep a live listing of watched directories",
    long_about = "Watches one or more directories and rewrites a plain-text listing of their \
                  entries whenever something is created, deleted or moved"
)]
pub struct Cli {
    /// Subcommand to execute (defaults to `watch`)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file [default: <install dir>/config/path_watcher.toml]
    #[arg(short, long, global = true, env = "PATH_WATCHER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log raw filesystem events to the log file as well
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// All available commands.
#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Watch the configured roots until interrupted
    Watch,

    /// Write the listing once and exit
    Snapshot {
        /// Print the listing instead of writing the output file
        #[arg(long)]
        stdout: bool,
    },

    /// Generate shell completions
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

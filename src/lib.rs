#![warn(missing_docs)]

//! # path-watcher - Directory Snapshot Tracker
//!
//! path-watcher keeps a plain-text listing of one or more directories up to
//! date. Every time an entry under a watch root is created, deleted or moved,
//! the root is traversed again and the listing file is rewritten atomically.
//!
//! ## Architecture
//!
//! - [`config`]: TOML configuration, validation and path resolution
//! - [`snapshot`]: traversal and listing rendering (one listing per root)
//! - [`tracker`]: `notify` subscriptions, event translation, the worker loop
//! - [`output`]: sinks for rendered listings (atomic file, in-memory)
//! - [`logging`]: `<timestamp> - <LEVEL> - <message>` log stream
//! - [`lock`]: single-writer lock on the output file
//! - [`commands`]: `watch` and `snapshot` command implementations
//!
//! ## Example Usage
//!
//! ```no_run
//! use path_watcher::output::FileSink;
//! use path_watcher::tracker;
//!
//! # fn main() -> anyhow::Result<()> {
//! let handle = tracker::start(
//!     vec!["/srv/inbox".into()],
//!     false,
//!     FileSink::new("/srv/inbox-listing.txt".into()),
//! )?;
//!
//! // ... later
//! handle.stop();
//! # Ok(())
//! # }
//! ```

/// Command-line interface definitions (argument parsing structures).
pub mod cli;

/// Command implementations.
pub mod commands;

/// Configuration parsing, validation, and resolution.
pub mod config;

/// Error taxonomy.
pub mod error;

/// Single-writer lock on the output artifact.
pub mod lock;

/// Log stream setup.
pub mod logging;

/// Output artifact sinks.
pub mod output;

/// Watch-root traversal and entry listings.
pub mod snapshot;

/// Filesystem subscriptions and the tracker state machine.
pub mod tracker;

/// Utility functions and helpers.
pub mod utils;

use config::validator::ConfigValidator;
use config::{Config, WatchSettings};
use error::Result;
use std::path::{Path, PathBuf};

/// Current version of the path-watcher binary.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration file, relative to the install directory.
pub const DEFAULT_CONFIG_FILE: &str = "config/path_watcher.toml";

/// Default output artifact, relative to the install directory.
pub const DEFAULT_OUTPUT_FILE: &str = "output/path_watcher_output.txt";

/// Default log file, relative to the install directory.
pub const DEFAULT_LOG_FILE: &str = "log/path_watcher_log.txt";

/// Loaded configuration plus the settings resolved from it.
#[derive(Debug, Clone)]
pub struct WatcherContext {
    /// Path the configuration was read from.
    pub config_path: PathBuf,

    /// Configuration as written in the file.
    pub config: Config,

    /// Absolute roots, output and log paths.
    pub settings: WatchSettings,
}

impl WatcherContext {
    /// Default configuration file location.
    ///
    /// # Errors
    ///
    /// Returns an error if the executable's directory cannot be determined.
    pub fn default_config_path() -> Result<PathBuf> {
        Ok(utils::install_dir()?.join(DEFAULT_CONFIG_FILE))
    }

    /// Load and resolve configuration from `config_path`, or from the default
    /// location when `None`.
    ///
    /// Unknown keys are reported on stderr but do not fail the load.
    ///
    /// # Errors
    ///
    /// Returns [`error::WatchError::Configuration`] if the file is missing or
    /// malformed, or a watch root is unusable.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config_path = match config_path {
            Some(path) => path.to_path_buf(),
            None => Self::default_config_path()?,
        };

        // A legacy flat file fails to load, so warn before loading.
        if config_path.exists() {
            let validator = ConfigValidator::new();
            if let Err(e) = validator.validate_config_file(&config_path) {
                eprintln!("Warning: Configuration validation failed: {e}");
            }
        }

        let config = Config::load(&config_path)?;

        Self::from_config(config_path, config, &utils::install_dir()?)
    }

    /// Resolve an already-parsed configuration against `base_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`error::WatchError::Configuration`] if a watch root is unusable.
    pub fn from_config(config_path: PathBuf, config: Config, base_dir: &Path) -> Result<Self> {
        let settings = config.resolve(base_dir)?;
        Ok(Self {
            config_path,
            config,
            settings,
        })
    }
}

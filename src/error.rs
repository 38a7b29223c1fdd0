//! Error taxonomy for the snapshot tracker.
//!
//! Startup-phase errors ([`WatchError::Configuration`], [`WatchError::Subscription`],
//! [`WatchError::Locked`]) are fatal. Steady-state errors ([`WatchError::Traversal`],
//! [`WatchError::Write`]) are contained to the event that produced them.

use std::path::{Path, PathBuf};

/// Categorized tracker errors.
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    /// Missing or malformed configuration, or an unusable watch root.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A single entry could not be enumerated during a snapshot rebuild.
    #[error("Failed to read entry {}: {source}", path.display())]
    Traversal {
        /// Entry (or root) that could not be read
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// The output artifact could not be overwritten.
    #[error("Failed to write snapshot to {}: {source}", path.display())]
    Write {
        /// Output artifact path
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// The notification subsystem could not attach to (or lost) a watch root.
    #[error("Failed to watch {}: {source}", path.display())]
    Subscription {
        /// Watch root
        path: PathBuf,
        /// Error reported by the notification backend
        #[source]
        source: notify::Error,
    },

    /// Another process already owns the output artifact.
    #[error(
        "Output {} is already being written by another watcher (lock: {})",
        output.display(),
        lock.display()
    )]
    Locked {
        /// Output artifact path
        output: PathBuf,
        /// Lock file path
        lock: PathBuf,
    },
}

impl WatchError {
    /// Shorthand for a configuration error with a formatted message.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Wraps an I/O failure on a single entry.
    pub fn traversal(path: &Path, source: std::io::Error) -> Self {
        Self::Traversal {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Wraps an I/O failure while writing the output artifact.
    pub fn write(path: &Path, source: std::io::Error) -> Self {
        Self::Write {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, WatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_path() {
        let err = WatchError::write(Path::new("/tmp/out.txt"), std::io::Error::other("disk full"));
        let message = err.to_string();
        assert!(message.contains("/tmp/out.txt"));
        assert!(message.contains("disk full"));
    }
}

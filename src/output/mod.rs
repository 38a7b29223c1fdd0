//! Output artifact sinks.
//!
//! A sink receives the full combined listing after every rebuild and replaces
//! whatever it held before. [`FileSink`] writes to a temporary file next to
//! the artifact and renames it into place, so readers never observe a
//! half-written listing.

use crate::error::{Result, WatchError};
use crate::lock::OutputLock;
use crate::utils::paths::ensure_parent_dirs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tempfile::Builder;

/// File name prefix of the temporary files [`FileSink`] renames into place
pub const TEMP_PREFIX: &str = ".path-watcher-";

/// Destination for rendered snapshots.
pub trait SnapshotSink: Send {
    /// Overwrite the sink with `lines`.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::Write`] if the listing cannot be stored.
    fn write_snapshot(&mut self, lines: &[String]) -> Result<()>;

    /// Human-readable destination for log messages.
    fn describe(&self) -> String;

    /// Files this sink keeps on disk, which must never appear in a listing.
    fn artifacts(&self) -> Vec<PathBuf> {
        Vec::new()
    }

    /// Whether `path` is something this sink creates while writing.
    fn owns(&self, path: &Path) -> bool {
        self.artifacts().iter().any(|artifact| artifact == path)
    }
}

/// Writes the listing to a text file, one entry per line, LF-joined.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    /// Sink writing to `path`
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Output artifact path
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotSink for FileSink {
    fn write_snapshot(&mut self, lines: &[String]) -> Result<()> {
        ensure_parent_dirs(&self.path)?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut temp = Builder::new()
            .prefix(TEMP_PREFIX)
            .tempfile_in(dir)
            .map_err(|e| WatchError::write(&self.path, e))?;
        temp.write_all(lines.join("\n").as_bytes())
            .and_then(|()| temp.as_file().sync_data())
            .map_err(|e| WatchError::write(&self.path, e))?;
        temp.persist(&self.path)
            .map_err(|e| WatchError::write(&self.path, e.error))?;
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn artifacts(&self) -> Vec<PathBuf> {
        vec![self.path.clone(), OutputLock::lock_path_for(&self.path)]
    }

    fn owns(&self, path: &Path) -> bool {
        if self.artifacts().iter().any(|artifact| artifact == path) {
            return true;
        }
        path.parent() == self.path.parent()
            && path
                .file_name()
                .is_some_and(|name| name.to_string_lossy().starts_with(TEMP_PREFIX))
    }
}

/// Keeps every written listing in memory. Clones share the same history.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    history: Arc<Mutex<Vec<Vec<String>>>>,
    failing: Arc<AtomicBool>,
}

impl MemorySink {
    /// Empty sink
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recently written listing
    #[must_use]
    pub fn latest(&self) -> Option<Vec<String>> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    /// Number of listings written so far
    #[must_use]
    pub fn writes(&self) -> usize {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Make subsequent writes fail with [`WatchError::Write`]
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl SnapshotSink for MemorySink {
    fn write_snapshot(&mut self, lines: &[String]) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(WatchError::write(
                Path::new("<memory>"),
                std::io::Error::other("sink is failing"),
            ));
        }
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(lines.to_vec());
        Ok(())
    }

    fn describe(&self) -> String {
        "<memory>".to_string()
    }
}

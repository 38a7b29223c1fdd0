//! Single-writer lock on the output artifact
//!
//! Two watcher processes pointed at the same output file would overwrite each
//! other's snapshots. The `watch` command holds an exclusive lock on
//! `<output>.lock` for its whole lifetime; the lock is released when dropped.

use crate::error::{Result, WatchError};
use crate::utils::paths::ensure_parent_dirs;
use fs4::fs_std::FileExt;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

/// Holds an exclusive lock on an output artifact
pub struct OutputLock {
    /// Lock file handle
    lock_file: File,
    /// Path to the lock file (for error messages)
    lock_path: PathBuf,
}

impl OutputLock {
    /// Lock file path for an output artifact
    #[must_use]
    pub fn lock_path_for(output: &Path) -> PathBuf {
        let mut name = output
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".lock");
        output.with_file_name(name)
    }

    /// Acquire the lock for `output`, retrying briefly if it is held
    ///
    /// # Errors
    ///
    /// - [`WatchError::Write`] if the lock file cannot be created
    /// - [`WatchError::Locked`] if another process keeps the lock past the retry window
    pub fn acquire(output: &Path) -> Result<Self> {
        let lock_path = Self::lock_path_for(output);
        ensure_parent_dirs(&lock_path)?;

        let lock_timeout = if cfg!(test) {
            Duration::from_millis(100)
        } else {
            Duration::from_secs(2)
        };
        let retry_interval = if cfg!(test) {
            Duration::from_millis(10)
        } else {
            Duration::from_millis(100)
        };

        let start = Instant::now();

        loop {
            // Opened without truncation so a losing attempt cannot wipe the holder's details.
            let file = File::options()
                .create(true)
                .write(true)
                .truncate(false)
                .open(&lock_path)
                .map_err(|e| WatchError::write(&lock_path, e))?;

            match file.try_lock_exclusive() {
                Ok(true) => {
                    Self::record_holder(&file);
                    return Ok(Self {
                        lock_file: file,
                        lock_path,
                    });
                }
                Ok(false) | Err(_) if start.elapsed() < lock_timeout => {
                    std::thread::sleep(retry_interval);
                }
                Ok(false) | Err(_) => {
                    return Err(WatchError::Locked {
                        output: output.to_path_buf(),
                        lock: lock_path,
                    });
                }
            }
        }
    }

    /// Write holder details into the lock file for debugging
    fn record_holder(file: &File) {
        let mut file_ref = file;
        let _ = file.set_len(0);
        let _ = writeln!(
            file_ref,
            "pid={}\ntime={}",
            std::process::id(),
            humantime::format_rfc3339(SystemTime::now())
        );
    }

    /// Lock file path
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.lock_path
    }
}

impl Drop for OutputLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.lock_file);

        if let Err(e) = fs::remove_file(&self.lock_path) {
            tracing::warn!(
                "Failed to remove lock file {}: {}",
                self.lock_path.display(),
                e
            );
        }
    }
}

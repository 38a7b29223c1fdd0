//! Directory snapshot tracker.
//!
//! [`start`] takes the first snapshot synchronously, subscribes one `notify`
//! watcher per root and hands every delivered event to a single worker
//! thread. The worker owns the [`Tracker`], so rebuilds and writes to the
//! sink are serialized no matter how many roots fire at once.
//!
//! ```text
//!  notify (root 0) ─┐
//!  notify (root 1) ─┼─> mpsc ─> worker: on_raw_event -> rebuild -> sink
//!  notify (root n) ─┘
//! ```

pub mod events;

pub use events::{FsEvent, FsEventKind};

use crate::error::{Result, WatchError};
use crate::output::SnapshotSink;
use crate::snapshot::Snapshot;
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info, warn};

/// Lifecycle of a tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    /// Taking the first snapshot
    Initializing,
    /// Rebuilding on every filesystem event
    Watching,
    /// Worker finished; no further writes
    Stopped,
}

/// Owns the per-root listings and the output sink.
pub struct Tracker<S: SnapshotSink> {
    snapshot: Snapshot,
    sink: S,
    state: TrackerState,
}

impl<S: SnapshotSink> Tracker<S> {
    /// Tracker for `roots`; the sink's own files are left out of every listing.
    #[must_use]
    pub fn new(roots: Vec<PathBuf>, recursive: bool, sink: S) -> Self {
        let mut snapshot = Snapshot::new(roots, recursive);
        snapshot.exclude(sink.artifacts());
        Self {
            snapshot,
            sink,
            state: TrackerState::Initializing,
        }
    }

    /// Current lifecycle state
    #[must_use]
    pub const fn state(&self) -> TrackerState {
        self.state
    }

    /// Current per-root listings
    #[must_use]
    pub const fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Output sink
    #[must_use]
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    /// Take the first full snapshot and write it.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::Write`] if the first snapshot cannot be written.
    pub fn initialize(&mut self) -> Result<()> {
        let problems = self.snapshot.rebuild_all();
        report_problems(problems);
        self.persist()?;
        self.state = TrackerState::Watching;
        Ok(())
    }

    /// Consume one listing-relevant event: rebuild every root it touches and
    /// overwrite the sink.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::Write`] if the sink rejects the new listing. The
    /// in-memory listing is updated regardless.
    pub fn on_event(&mut self, event: &FsEvent) -> Result<()> {
        info!("{event}");

        let mut affected: Vec<usize> = event
            .paths()
            .flat_map(|path| self.roots_containing(path))
            .collect();
        affected.sort_unstable();
        affected.dedup();
        if affected.is_empty() {
            affected = (0..self.snapshot.root_count()).collect();
        }

        for index in affected {
            match self.snapshot.rebuild_root(index) {
                Ok(skipped) => report_problems(skipped),
                Err(err) => warn!("Watch root is no longer readable, listing cleared: {err}"),
            }
        }

        self.persist()
    }

    /// Log a raw `notify` event and forward it if it can change a listing.
    ///
    /// Events that only touch the sink's own files are dropped, so writing
    /// the listing into a watched directory does not trigger another rebuild.
    ///
    /// # Errors
    ///
    /// Propagates write failures from [`Tracker::on_event`].
    pub fn on_raw_event(&mut self, event: &notify::Event) -> Result<()> {
        for path in &event.paths {
            let subject = if events::raw_is_dir(event, path) {
                "Directory"
            } else {
                "File"
            };
            debug!("{subject} changed: {}", path.display());
        }

        if !event.paths.is_empty() && event.paths.iter().all(|path| self.sink.owns(path)) {
            debug!("Ignoring {:?} event on the output artifact", event.kind);
            return Ok(());
        }

        match events::translate(event) {
            Some(fs_event) => self.on_event(&fs_event),
            None => {
                debug!("Ignoring {:?} event, the listing cannot change", event.kind);
                Ok(())
            }
        }
    }

    fn roots_containing(&self, path: &Path) -> Vec<usize> {
        self.snapshot
            .roots()
            .enumerate()
            .filter(|(_, root)| path.starts_with(root))
            .map(|(index, _)| index)
            .collect()
    }

    fn persist(&mut self) -> Result<()> {
        let lines = self.snapshot.lines();
        self.sink.write_snapshot(&lines)?;
        debug!(
            entries = lines.len(),
            output = %self.sink.describe(),
            "Snapshot written"
        );
        Ok(())
    }
}

pub(crate) fn report_problems(problems: Vec<WatchError>) {
    for problem in problems {
        match problem {
            WatchError::Traversal { .. } => debug!("Skipped entry: {problem}"),
            other => warn!("{other}"),
        }
    }
}

/// Messages delivered to the worker thread
enum Message {
    Fs {
        root: usize,
        result: notify::Result<notify::Event>,
    },
    Shutdown,
}

/// A running tracker. Dropping it stops the tracker as well.
pub struct TrackerHandle {
    watchers: Vec<RecommendedWatcher>,
    sender: Sender<Message>,
    worker: Option<JoinHandle<TrackerState>>,
    roots: Vec<PathBuf>,
}

impl TrackerHandle {
    /// Watch roots in configuration order
    #[must_use]
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Release every subscription, let the worker finish what it has queued,
    /// and wait for it. No writes happen after this returns.
    ///
    /// Returns the tracker's final state, [`TrackerState::Stopped`] unless the
    /// worker panicked.
    pub fn stop(mut self) -> TrackerState {
        self.shutdown()
    }

    fn shutdown(&mut self) -> TrackerState {
        let Some(worker) = self.worker.take() else {
            return TrackerState::Stopped;
        };

        // Dropping a watcher releases its subscription.
        self.watchers.clear();
        let _ = self.sender.send(Message::Shutdown);

        let state = worker.join().unwrap_or_else(|_| {
            error!("Tracker worker panicked");
            TrackerState::Watching
        });
        info!("Observer stopped.");
        state
    }
}

impl Drop for TrackerHandle {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}

/// Check that every root exists and can be listed.
///
/// # Errors
///
/// Returns [`WatchError::Configuration`] naming the first unusable root.
pub fn check_roots(roots: &[PathBuf]) -> Result<()> {
    if roots.is_empty() {
        return Err(WatchError::config("No watch root configured"));
    }
    for root in roots {
        if !root.is_dir() {
            return Err(WatchError::config(format!(
                "Watch path {} does not exist or is not a directory",
                root.display()
            )));
        }
        std::fs::read_dir(root).map_err(|e| {
            WatchError::config(format!("Watch path {} cannot be listed: {e}", root.display()))
        })?;
    }
    Ok(())
}

/// Start tracking `roots`.
///
/// Subscriptions are attached first so nothing that happens during the
/// initial snapshot is missed; queued events are replayed once the worker
/// starts.
///
/// # Errors
///
/// - [`WatchError::Configuration`] if a root is missing or unreadable
/// - [`WatchError::Subscription`] if `notify` cannot attach to a root
/// - [`WatchError::Write`] if the initial snapshot cannot be written
pub fn start<S>(roots: Vec<PathBuf>, recursive: bool, sink: S) -> Result<TrackerHandle>
where
    S: SnapshotSink + 'static,
{
    check_roots(&roots)?;
    info!("Starting observer...");

    let (sender, receiver) = mpsc::channel();
    let mode = if recursive {
        RecursiveMode::Recursive
    } else {
        RecursiveMode::NonRecursive
    };

    let mut watchers = Vec::with_capacity(roots.len());
    for (index, root) in roots.iter().enumerate() {
        watchers.push(subscribe(root, index, mode, sender.clone())?);
        debug!(root = %root.display(), recursive, "Subscribed");
    }

    let mut tracker = Tracker::new(roots.clone(), recursive, sink);
    tracker.initialize()?;
    info!(
        roots = roots.len(),
        entries = tracker.snapshot().lines().len(),
        "Initial snapshot written to {}",
        tracker.sink().describe()
    );

    let worker_roots = roots.clone();
    let worker = thread::Builder::new()
        .name("path-watcher".to_string())
        .spawn(move || run_worker(tracker, &receiver, &worker_roots).state())
        .map_err(|e| WatchError::Subscription {
            path: roots.first().cloned().unwrap_or_default(),
            source: notify::Error::io(e),
        })?;

    Ok(TrackerHandle {
        watchers,
        sender,
        worker: Some(worker),
        roots,
    })
}

fn subscribe(
    root: &Path,
    index: usize,
    mode: RecursiveMode,
    sender: Sender<Message>,
) -> Result<RecommendedWatcher> {
    let to_error = |source| WatchError::Subscription {
        path: root.to_path_buf(),
        source,
    };

    let mut watcher = notify::recommended_watcher(move |result: notify::Result<notify::Event>| {
        // The worker is gone only during shutdown; late events are dropped.
        let _ = sender.send(Message::Fs {
            root: index,
            result,
        });
    })
    .map_err(to_error)?;
    watcher.watch(root, mode).map_err(to_error)?;
    Ok(watcher)
}

/// Drain `receiver` until [`Message::Shutdown`] or until every sender is gone.
fn run_worker<S: SnapshotSink>(
    mut tracker: Tracker<S>,
    receiver: &Receiver<Message>,
    roots: &[PathBuf],
) -> Tracker<S> {
    for message in receiver {
        match message {
            Message::Fs {
                result: Ok(event), ..
            } => {
                if let Err(err) = tracker.on_raw_event(&event) {
                    error!("{err}");
                }
            }
            Message::Fs {
                root,
                result: Err(source),
            } => {
                // One root failing leaves the others running.
                let err = WatchError::Subscription {
                    path: roots.get(root).cloned().unwrap_or_default(),
                    source,
                };
                error!("{err}");
            }
            Message::Shutdown => break,
        }
    }
    tracker.state = TrackerState::Stopped;
    debug!("Tracker worker exiting");
    tracker
}

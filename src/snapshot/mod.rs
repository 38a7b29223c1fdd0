//! Watch-root traversal and entry listings.
//!
//! A [`Snapshot`] keeps one listing per watch root. Every rebuild replaces a
//! root's listing wholesale with a fresh traversal; nothing is patched in place.
//!
//! Rendering rules:
//! - directories carry a trailing [`DIR_MARKER`], files never do
//! - non-recursive listings hold immediate children only and skip symbolic links
//! - recursive listings hold every path below the root, relative to it, `/`-separated
//! - entries are sorted per root so consecutive rebuilds of a quiescent tree are identical
//!
//! With more than one root, [`Snapshot::lines`] prefixes each entry with its
//! root path and keeps roots in configuration order.

use crate::error::WatchError;
use crate::utils::paths::to_slash;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Suffix that marks an entry as a directory
pub const DIR_MARKER: char = '/';

/// Result of traversing one root
#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// Rendered entries, sorted
    pub entries: Vec<String>,
    /// Entries that could not be read and were left out
    pub skipped: Vec<WatchError>,
}

/// Traverse `root` and render its entries.
///
/// # Errors
///
/// Returns [`WatchError::Traversal`] if the root itself cannot be listed.
/// Failures on individual entries are collected in [`ScanOutcome::skipped`].
pub fn scan_root(root: &Path, recursive: bool) -> Result<ScanOutcome, WatchError> {
    fs::read_dir(root).map_err(|e| WatchError::traversal(root, e))?;

    let mut outcome = if recursive {
        scan_recursive(root)
    } else {
        scan_immediate(root)
    };
    outcome.entries.sort_unstable();
    Ok(outcome)
}

fn scan_immediate(root: &Path) -> ScanOutcome {
    let mut outcome = ScanOutcome::default();

    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                outcome.skipped.push(walk_error(root, err));
                continue;
            }
        };

        let file_type = entry.file_type();
        if file_type.is_symlink() {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if file_type.is_dir() {
            outcome.entries.push(format!("{name}{DIR_MARKER}"));
        } else if file_type.is_file() {
            outcome.entries.push(name.into_owned());
        }
    }

    outcome
}

fn scan_recursive(root: &Path) -> ScanOutcome {
    let mut outcome = ScanOutcome::default();

    for entry in WalkDir::new(root).min_depth(1).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                outcome.skipped.push(walk_error(root, err));
                continue;
            }
        };

        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let relative = to_slash(relative);

        let file_type = entry.file_type();
        // Links are listed but not descended; a link to a directory reads as one.
        let is_dir = if file_type.is_symlink() {
            fs::metadata(entry.path()).is_ok_and(|m| m.is_dir())
        } else {
            file_type.is_dir()
        };

        if is_dir {
            outcome.entries.push(format!("{relative}{DIR_MARKER}"));
        } else {
            outcome.entries.push(relative);
        }
    }

    outcome
}

fn walk_error(root: &Path, err: walkdir::Error) -> WatchError {
    let path = err.path().map_or_else(|| root.to_path_buf(), Path::to_path_buf);
    WatchError::traversal(&path, std::io::Error::from(err))
}

/// Listing for a single watch root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootListing {
    /// Absolute watch root
    pub root: PathBuf,
    /// Entries from the most recent rebuild
    pub entries: Vec<String>,
}

/// Per-root entry listings for every watch root
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Listings in configuration order
    roots: Vec<RootListing>,
    /// Whether traversals descend into subdirectories
    recursive: bool,
    /// Paths never listed (the output artifact and its lock)
    excluded: Vec<PathBuf>,
}

impl Snapshot {
    /// Create an empty snapshot for `roots`
    #[must_use]
    pub fn new(roots: Vec<PathBuf>, recursive: bool) -> Self {
        Self {
            roots: roots
                .into_iter()
                .map(|root| RootListing {
                    root,
                    entries: Vec::new(),
                })
                .collect(),
            recursive,
            excluded: Vec::new(),
        }
    }

    /// Leave `paths` out of every listing from the next rebuild on
    pub fn exclude(&mut self, paths: impl IntoIterator<Item = PathBuf>) {
        self.excluded.extend(paths);
    }

    /// Whether traversals descend into subdirectories
    #[must_use]
    pub const fn is_recursive(&self) -> bool {
        self.recursive
    }

    /// Watch roots in configuration order
    pub fn roots(&self) -> impl Iterator<Item = &Path> {
        self.roots.iter().map(|listing| listing.root.as_path())
    }

    /// Number of watch roots
    #[must_use]
    pub fn root_count(&self) -> usize {
        self.roots.len()
    }

    /// Most recent listing of the root at `index`
    #[must_use]
    pub fn listing(&self, index: usize) -> Option<&RootListing> {
        self.roots.get(index)
    }

    /// Replace the listing of the root at `index` with a fresh traversal.
    ///
    /// Returns the entries that were skipped. If the root itself cannot be
    /// listed its listing is cleared and the error is returned.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::Traversal`] if the root cannot be listed.
    pub fn rebuild_root(&mut self, index: usize) -> Result<Vec<WatchError>, WatchError> {
        let recursive = self.recursive;
        let excluded = &self.excluded;
        let Some(listing) = self.roots.get_mut(index) else {
            return Ok(Vec::new());
        };

        match scan_root(&listing.root, recursive) {
            Ok(mut outcome) => {
                if !excluded.is_empty() {
                    let root = &listing.root;
                    outcome.entries.retain(|entry| {
                        let path = root.join(entry.trim_end_matches(DIR_MARKER));
                        !excluded.contains(&path)
                    });
                }
                debug!(
                    root = %listing.root.display(),
                    entries = outcome.entries.len(),
                    skipped = outcome.skipped.len(),
                    "Rebuilt entry listing"
                );
                listing.entries = outcome.entries;
                Ok(outcome.skipped)
            }
            Err(err) => {
                listing.entries.clear();
                Err(err)
            }
        }
    }

    /// Rebuild every root, returning skipped entries and unreadable roots alike
    pub fn rebuild_all(&mut self) -> Vec<WatchError> {
        let mut problems = Vec::new();
        for index in 0..self.roots.len() {
            match self.rebuild_root(index) {
                Ok(skipped) => problems.extend(skipped),
                Err(err) => problems.push(err),
            }
        }
        problems
    }

    /// Combined listing, one entry per line.
    ///
    /// A single root is rendered verbatim; with several roots every entry is
    /// prefixed with `<root>/`.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        if let [only] = self.roots.as_slice() {
            return only.entries.clone();
        }

        self.roots
            .iter()
            .flat_map(|listing| {
                let prefix = root_prefix(&listing.root);
                listing
                    .entries
                    .iter()
                    .map(move |entry| format!("{prefix}{DIR_MARKER}{entry}"))
            })
            .collect()
    }

    /// Newline-joined listing, no trailing newline
    #[must_use]
    pub fn render(&self) -> String {
        self.lines().join("\n")
    }
}

fn root_prefix(root: &Path) -> String {
    let rendered = root.to_string_lossy();
    rendered.trim_end_matches(['/', '\\']).to_string()
}

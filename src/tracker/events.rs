//! Filesystem events as the tracker sees them.
//!
//! `notify` reports a much richer set of kinds than the tracker cares about.
//! Only changes that can alter a listing survive [`translate`]: creations,
//! removals and renames. Content, metadata and access events are dropped.

use notify::event::{CreateKind, ModifyKind, RemoveKind, RenameMode};
use notify::{Event, EventKind};
use std::fmt;
use std::path::{Path, PathBuf};

/// What happened to the subject path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FsEventKind {
    /// Came into existence (or was moved in from outside the watch)
    Created,
    /// Removed (or moved out of the watch)
    Deleted,
    /// Renamed or moved within the watch
    Moved {
        /// Destination path
        to: PathBuf,
    },
}

/// A single listing-relevant filesystem change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsEvent {
    /// What happened
    pub kind: FsEventKind,
    /// Subject path (the source path for moves)
    pub path: PathBuf,
    /// Whether the subject is a directory
    pub is_dir: bool,
}

impl FsEvent {
    /// `path` was created
    #[must_use]
    pub fn created(path: impl Into<PathBuf>, is_dir: bool) -> Self {
        Self {
            kind: FsEventKind::Created,
            path: path.into(),
            is_dir,
        }
    }

    /// `path` was removed
    #[must_use]
    pub fn deleted(path: impl Into<PathBuf>, is_dir: bool) -> Self {
        Self {
            kind: FsEventKind::Deleted,
            path: path.into(),
            is_dir,
        }
    }

    /// `from` was renamed to `to`
    #[must_use]
    pub fn moved(from: impl Into<PathBuf>, to: impl Into<PathBuf>, is_dir: bool) -> Self {
        Self {
            kind: FsEventKind::Moved { to: to.into() },
            path: from.into(),
            is_dir,
        }
    }

    /// Every path this event touches
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        let to = match &self.kind {
            FsEventKind::Moved { to } => Some(to.as_path()),
            _ => None,
        };
        std::iter::once(self.path.as_path()).chain(to)
    }

    /// `"Directory"` or `"File"`, for log lines
    #[must_use]
    pub const fn subject(&self) -> &'static str {
        if self.is_dir { "Directory" } else { "File" }
    }
}

impl fmt::Display for FsEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            FsEventKind::Created => {
                write!(f, "{} created: {}", self.subject(), self.path.display())
            }
            FsEventKind::Deleted => {
                write!(f, "{} deleted: {}", self.subject(), self.path.display())
            }
            FsEventKind::Moved { to } => write!(
                f,
                "{} moved: {} -> {}",
                self.subject(),
                self.path.display(),
                to.display()
            ),
        }
    }
}

/// Map a raw `notify` event onto a tracker event, or `None` if it cannot
/// change any listing.
#[must_use]
pub fn translate(event: &Event) -> Option<FsEvent> {
    let first = event.paths.first()?;

    match event.kind {
        EventKind::Create(kind) => {
            let is_dir = match kind {
                CreateKind::Folder => true,
                CreateKind::File => false,
                CreateKind::Any | CreateKind::Other => is_dir_now(first),
            };
            Some(FsEvent::created(first, is_dir))
        }
        EventKind::Remove(kind) => Some(FsEvent::deleted(first, kind == RemoveKind::Folder)),
        EventKind::Modify(ModifyKind::Name(mode)) => match (mode, event.paths.as_slice()) {
            (RenameMode::Both, [from, to, ..]) => Some(FsEvent::moved(from, to, is_dir_now(to))),
            (RenameMode::From, _) => Some(FsEvent::deleted(first, false)),
            (RenameMode::To, _) => Some(FsEvent::created(first, is_dir_now(first))),
            // Backends that cannot pair rename halves: whichever side still exists.
            _ => {
                if first.symlink_metadata().is_ok() {
                    Some(FsEvent::created(first, is_dir_now(first)))
                } else {
                    Some(FsEvent::deleted(first, false))
                }
            }
        },
        _ => None,
    }
}

/// Whether a raw event concerns a directory, as far as can be told now.
#[must_use]
pub fn raw_is_dir(event: &Event, path: &Path) -> bool {
    matches!(
        event.kind,
        EventKind::Create(CreateKind::Folder) | EventKind::Remove(RemoveKind::Folder)
    ) || is_dir_now(path)
}

fn is_dir_now(path: &Path) -> bool {
    path.symlink_metadata().is_ok_and(|m| m.is_dir())
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, DataChange, MetadataKind};
    use std::fs;
    use tempfile::TempDir;

    fn event(kind: EventKind, paths: &[&Path]) -> Event {
        paths
            .iter()
            .fold(Event::new(kind), |ev, p| ev.add_path(p.to_path_buf()))
    }

    #[test]
    fn test_create_file_and_folder() {
        let file = translate(&event(
            EventKind::Create(CreateKind::File),
            &[Path::new("/w/a.txt")],
        ))
        .unwrap();
        assert_eq!(file, FsEvent::created("/w/a.txt", false));

        let dir = translate(&event(
            EventKind::Create(CreateKind::Folder),
            &[Path::new("/w/sub")],
        ))
        .unwrap();
        assert_eq!(dir, FsEvent::created("/w/sub", true));
    }

    #[test]
    fn test_create_any_stats_the_path() {
        let temp = TempDir::new().unwrap();
        let sub = temp.path().join("sub");
        fs::create_dir(&sub).unwrap();

        let translated = translate(&event(EventKind::Create(CreateKind::Any), &[&sub])).unwrap();
        assert!(translated.is_dir);
    }

    #[test]
    fn test_remove() {
        let translated = translate(&event(
            EventKind::Remove(RemoveKind::Folder),
            &[Path::new("/w/sub")],
        ))
        .unwrap();
        assert_eq!(translated, FsEvent::deleted("/w/sub", true));
    }

    #[test]
    fn test_rename_both() {
        let translated = translate(&event(
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)),
            &[Path::new("/w/a.txt"), Path::new("/w/b.txt")],
        ))
        .unwrap();
        assert_eq!(translated, FsEvent::moved("/w/a.txt", "/w/b.txt", false));
        assert_eq!(translated.to_string(), "File moved: /w/a.txt -> /w/b.txt");
        assert_eq!(translated.paths().count(), 2);
    }

    #[test]
    fn test_rename_halves() {
        let from = translate(&event(
            EventKind::Modify(ModifyKind::Name(RenameMode::From)),
            &[Path::new("/w/a.txt")],
        ))
        .unwrap();
        assert_eq!(from.kind, FsEventKind::Deleted);

        let to = translate(&event(
            EventKind::Modify(ModifyKind::Name(RenameMode::To)),
            &[Path::new("/w/b.txt")],
        ))
        .unwrap();
        assert_eq!(to.kind, FsEventKind::Created);
    }

    #[test]
    fn test_rename_any_checks_existence() {
        let temp = TempDir::new().unwrap();
        let present = temp.path().join("here.txt");
        fs::write(&present, "x").unwrap();
        let absent = temp.path().join("gone.txt");

        let mode = EventKind::Modify(ModifyKind::Name(RenameMode::Any));
        assert_eq!(
            translate(&event(mode, &[&present])).unwrap().kind,
            FsEventKind::Created
        );
        assert_eq!(
            translate(&event(mode, &[&absent])).unwrap().kind,
            FsEventKind::Deleted
        );
    }

    #[test]
    fn test_irrelevant_kinds_are_dropped() {
        let path = Path::new("/w/a.txt");
        for kind in [
            EventKind::Modify(ModifyKind::Data(DataChange::Content)),
            EventKind::Modify(ModifyKind::Metadata(MetadataKind::Permissions)),
            EventKind::Access(AccessKind::Read),
            EventKind::Any,
            EventKind::Other,
        ] {
            assert!(translate(&event(kind, &[path])).is_none(), "{kind:?}");
        }
    }

    #[test]
    fn test_event_without_paths_is_dropped() {
        assert!(translate(&Event::new(EventKind::Create(CreateKind::File))).is_none());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            FsEvent::created("/w/sub", true).to_string(),
            "Directory created: /w/sub"
        );
        assert_eq!(
            FsEvent::deleted("/w/a.txt", false).to_string(),
            "File deleted: /w/a.txt"
        );
    }
}

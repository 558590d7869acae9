//! Reload documents when they change on disk.
//!
//! The watcher runs on notify's background thread and only forwards the
//! changed path through a callback; the event loop decides what to do with
//! it.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use vmd_types::error::{Result, VmdError};

pub struct DocumentWatcher {
    watcher: RecommendedWatcher,
    watched: BTreeSet<PathBuf>,
}

impl DocumentWatcher {
    /// Create a watcher that calls `on_change` for every modified file.
    pub fn new(on_change: impl Fn(PathBuf) + Send + 'static) -> Result<Self> {
        let watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                    for path in event.paths {
                        log::debug!("Change detected: {}", path.display());
                        on_change(path);
                    }
                }
            },
            Err(e) => log::error!("File watcher error: {e}"),
        })
        .map_err(watch_error)?;

        Ok(Self {
            watcher,
            watched: BTreeSet::new(),
        })
    }

    pub fn watched(&self) -> impl Iterator<Item = &Path> {
        self.watched.iter().map(PathBuf::as_path)
    }

    /// The watched path an event path refers to.
    ///
    /// Backends may report canonical paths (resolved symlinks, `/private`
    /// prefixes on macOS), so fall back to comparing canonical forms.
    pub fn resolve_event_path(&self, path: &Path) -> Option<PathBuf> {
        if self.watched.contains(path) {
            return Some(path.to_path_buf());
        }
        let canonical = std::fs::canonicalize(path).ok()?;
        self.watched
            .iter()
            .find(|w| std::fs::canonicalize(w).is_ok_and(|c| c == canonical))
            .cloned()
    }

    /// Watch exactly `paths`, adding and removing watches as needed.
    ///
    /// A path that cannot be watched does not stop the others; the first
    /// such failure is returned once every path has been tried.
    pub fn sync<'a>(&mut self, paths: impl IntoIterator<Item = &'a Path>) -> Result<()> {
        let wanted: BTreeSet<PathBuf> = paths.into_iter().map(Path::to_path_buf).collect();

        let stale: Vec<PathBuf> = self.watched.difference(&wanted).cloned().collect();
        for path in stale {
            if let Err(e) = self.watcher.unwatch(&path) {
                log::warn!("Failed to unwatch {}: {e}", path.display());
            }
            log::info!("Stopped watching {}", path.display());
            self.watched.remove(&path);
        }

        let added: Vec<PathBuf> = wanted.difference(&self.watched).cloned().collect();
        let mut first_error = None;
        for path in added {
            match self.watcher.watch(&path, RecursiveMode::NonRecursive) {
                Ok(()) => {
                    log::info!("Started watching {}", path.display());
                    self.watched.insert(path);
                },
                Err(e) => {
                    log::warn!("Cannot watch {}: {e}", path.display());
                    first_error.get_or_insert(watch_error(e));
                },
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

fn watch_error(err: notify::Error) -> VmdError {
    VmdError::Watch(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn sync_adds_and_removes_watches() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.md");
        let b = dir.path().join("b.md");
        std::fs::write(&a, "a").unwrap();
        std::fs::write(&b, "b").unwrap();

        let mut watcher = DocumentWatcher::new(|_| {}).unwrap();
        watcher.sync([a.as_path()]).unwrap();
        assert_eq!(watcher.watched().collect::<Vec<_>>(), vec![a.as_path()]);

        watcher.sync([b.as_path()]).unwrap();
        assert_eq!(watcher.watched().collect::<Vec<_>>(), vec![b.as_path()]);

        watcher.sync(std::iter::empty()).unwrap();
        assert_eq!(watcher.watched().count(), 0);
    }

    #[test]
    fn event_paths_resolve_to_watched_paths() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.md");
        std::fs::write(&file, "a").unwrap();

        let mut watcher = DocumentWatcher::new(|_| {}).unwrap();
        watcher.sync([file.as_path()]).unwrap();

        let canonical = std::fs::canonicalize(&file).unwrap();
        assert_eq!(watcher.resolve_event_path(&canonical), Some(file.clone()));
        assert_eq!(watcher.resolve_event_path(&file), Some(file.clone()));
        assert_eq!(watcher.resolve_event_path(&dir.path().join("b.md")), None);
    }

    #[test]
    fn missing_file_cannot_be_watched() {
        let dir = tempfile::tempdir().unwrap();
        let mut watcher = DocumentWatcher::new(|_| {}).unwrap();
        let err = watcher.sync([dir.path().join("missing.md").as_path()]).unwrap_err();
        assert!(matches!(err, VmdError::Watch(_)));
        assert_eq!(watcher.watched().count(), 0);
    }

    #[test]
    fn missing_file_does_not_block_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().join("a-gone.md");
        let live = dir.path().join("b-live.md");
        std::fs::write(&live, "b").unwrap();

        let mut watcher = DocumentWatcher::new(|_| {}).unwrap();
        let err = watcher.sync([gone.as_path(), live.as_path()]).unwrap_err();
        assert!(matches!(err, VmdError::Watch(_)));
        assert_eq!(watcher.watched().collect::<Vec<_>>(), vec![live.as_path()]);
    }

    #[test]
    fn modification_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.md");
        std::fs::write(&file, "one").unwrap();

        let (tx, rx) = mpsc::channel();
        let mut watcher = DocumentWatcher::new(move |path| {
            let _ = tx.send(path);
        })
        .unwrap();
        watcher.sync([file.as_path()]).unwrap();

        std::fs::write(&file, "two").unwrap();
        let changed = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(changed.file_name(), file.file_name());
    }
}

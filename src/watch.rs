//! Source tree watching for rebuild-on-change.
//!
//! The watcher keeps one non-recursive registration per path in the source
//! tree (every directory and every file) and regenerates the whole set after
//! each triggered rebuild, so the registrations always match the tree's
//! current shape: deleted paths lose their handle, new paths gain one.
//!
//! # Architecture
//!
//! ```text
//!              ┌──────────────┐  events   ┌──────────────────────────────┐
//!  backend ───▶│ mpsc channel │──────────▶│ run loop (single consumer)   │
//!  (notify)    └──────────────┘           │                              │
//!                                         │ Idle                         │
//!                                         │  └▶ Rebuilding      on_change│
//!                                         │      └▶ Resynchronizing      │
//!                                         │          └▶ Idle             │
//!                                         └──────────────────────────────┘
//! ```
//!
//! Events are consumed one at a time on the thread that calls [`Watcher::run`],
//! so at most one rebuild is ever in flight and no rebuild races the
//! registration set. Without a debounce window, a burst of N writes causes N
//! sequential rebuilds; with one, events arriving inside the window after a
//! trigger are folded into the same rebuild. Either way, identical copies of
//! the triggering event already queued behind it (a file and its directory
//! both report the same write) are dropped.
//!
//! # Walk Rules
//!
//! - Base names in the ignore list (e.g. `node_modules`) are neither
//!   registered nor descended into; neither are ignored paths such as the
//!   output directory.
//! - Hidden children are skipped. Children are visited in name order.
//! - A path whose registration fails is skipped without descending: the tree
//!   may be changing underneath the walk.
//! - Symlinks are registered but never followed.
//!
//! The walk uses an explicit stack, so tree depth never grows the call stack.

use notify::event::{MetadataKind, ModifyKind};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher as _};
use std::collections::BTreeMap;
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

#[derive(Error, Debug)]
pub enum WatchError {
    #[error("cannot watch {path}: {source}")]
    Register {
        path: PathBuf,
        source: notify::Error,
    },
    #[error("cannot start file watcher: {0}")]
    Backend(#[from] notify::Error),
}

/// Source of per-path change notifications.
pub trait WatchBackend {
    /// Start notifications for `path` itself, not its children.
    fn register(&mut self, path: &Path) -> Result<(), WatchError>;
    /// Stop notifications for `path`. Paths already gone from disk are fine.
    fn unregister(&mut self, path: &Path);
}

/// [`WatchBackend`] over the platform's native notification API.
pub struct NotifyBackend {
    inner: RecommendedWatcher,
}

/// Channel end that receives the backend's notifications.
pub type EventReceiver = Receiver<notify::Result<Event>>;

impl NotifyBackend {
    pub fn new() -> Result<(Self, EventReceiver), WatchError> {
        let (tx, rx) = mpsc::channel();
        let inner = notify::recommended_watcher(tx)?;
        Ok((Self { inner }, rx))
    }
}

impl WatchBackend for NotifyBackend {
    fn register(&mut self, path: &Path) -> Result<(), WatchError> {
        self.inner
            .watch(path, RecursiveMode::NonRecursive)
            .map_err(|source| WatchError::Register {
                path: path.to_path_buf(),
                source,
            })
    }

    fn unregister(&mut self, path: &Path) {
        if let Err(err) = self.inner.unwatch(path) {
            debug!(path = %path.display(), %err, "unwatch failed");
        }
    }
}

/// Where the run loop is in handling a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    Idle,
    Rebuilding,
    Resynchronizing,
}

/// An active registration.
#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    /// Generation that created it.
    pub generation: u64,
    pub is_dir: bool,
}

/// Result of regenerating the registration set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncSummary {
    pub generation: u64,
    /// Registrations from the previous generation that were released.
    pub released: usize,
    pub registered: usize,
    /// Paths skipped because they vanished or could not be registered.
    pub skipped: usize,
}

/// Result of one trigger: the rebuild's outcome and the resync that followed.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerOutcome {
    pub rebuilt: bool,
    pub sync: SyncSummary,
}

/// Recursive watcher owning the registration set for one source tree.
pub struct Watcher<B: WatchBackend> {
    root: PathBuf,
    ignore_names: Vec<String>,
    ignore_paths: Vec<PathBuf>,
    backend: B,
    registrations: BTreeMap<PathBuf, Registration>,
    generation: u64,
    state: WatchState,
}

impl<B: WatchBackend> Watcher<B> {
    /// A watcher for `root` with nothing registered yet; call [`Watcher::resync`].
    pub fn new(root: &Path, backend: B) -> Self {
        Self {
            root: root.to_path_buf(),
            ignore_names: Vec::new(),
            ignore_paths: Vec::new(),
            backend,
            registrations: BTreeMap::new(),
            generation: 0,
            state: WatchState::Idle,
        }
    }

    /// Skip entries with these base names anywhere in the tree.
    pub fn ignore_names<S: AsRef<str>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.ignore_names
            .extend(names.into_iter().map(|n| n.as_ref().to_string()));
        self
    }

    /// Skip this path and everything below it.
    pub fn ignore_path(mut self, path: &Path) -> Self {
        self.ignore_paths.push(path.to_path_buf());
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn state(&self) -> WatchState {
        self.state
    }

    /// Number of registration generations created so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn is_registered(&self, path: &Path) -> bool {
        self.registrations.contains_key(path)
    }

    pub fn registration(&self, path: &Path) -> Option<&Registration> {
        self.registrations.get(path)
    }

    /// Registered paths in sorted order.
    pub fn registered_paths(&self) -> impl Iterator<Item = &Path> {
        self.registrations.keys().map(PathBuf::as_path)
    }

    /// Release every registration and rebuild the set from the tree as it is now.
    pub fn resync(&mut self) -> SyncSummary {
        self.generation += 1;
        let mut summary = SyncSummary {
            generation: self.generation,
            released: self.registrations.len(),
            ..SyncSummary::default()
        };

        for path in std::mem::take(&mut self.registrations).into_keys() {
            self.backend.unregister(&path);
        }

        let mut stack = vec![self.root.clone()];
        while let Some(path) = stack.pop() {
            if self.is_ignored(&path) {
                debug!(path = %path.display(), "ignored");
                continue;
            }
            let meta = match fs::symlink_metadata(&path) {
                Ok(meta) => meta,
                Err(err) => {
                    debug!(path = %path.display(), %err, "vanished during walk");
                    summary.skipped += 1;
                    continue;
                }
            };

            if !self.registrations.contains_key(&path) {
                if let Err(err) = self.backend.register(&path) {
                    debug!(%err, "skipping unwatchable path");
                    summary.skipped += 1;
                    continue;
                }
                debug!(path = %path.display(), "registered");
                self.registrations.insert(
                    path.clone(),
                    Registration {
                        generation: self.generation,
                        is_dir: meta.is_dir(),
                    },
                );
                summary.registered += 1;
            }

            if !meta.is_dir() {
                continue;
            }
            match visible_children(&path) {
                // Reversed so the first child is popped first.
                Ok(children) => stack.extend(children.into_iter().rev()),
                Err(err) => debug!(path = %path.display(), %err, "cannot list directory"),
            }
        }

        summary
    }

    /// Run `on_change`, then regenerate the registration set regardless of its outcome.
    ///
    /// A failed rebuild is logged, never propagated.
    pub fn handle_trigger<F, E>(&mut self, on_change: &mut F) -> TriggerOutcome
    where
        F: FnMut() -> Result<(), E>,
        E: Display,
    {
        self.state = WatchState::Rebuilding;
        let rebuilt = match on_change() {
            Ok(()) => true,
            Err(err) => {
                error!(%err, "rebuild failed");
                false
            }
        };

        self.state = WatchState::Resynchronizing;
        let sync = self.resync();
        debug!(
            generation = sync.generation,
            registered = sync.registered,
            released = sync.released,
            "registrations regenerated"
        );

        self.state = WatchState::Idle;
        TriggerOutcome { rebuilt, sync }
    }

    /// Consume events until the channel closes, rebuilding once per trigger.
    ///
    /// Returns the number of triggers handled.
    pub fn run<F, E>(
        &mut self,
        events: &EventReceiver,
        debounce: Option<Duration>,
        mut on_change: F,
    ) -> usize
    where
        F: FnMut() -> Result<(), E>,
        E: Display,
    {
        let mut triggers = 0;
        let mut pending = None;
        loop {
            let event = match pending.take() {
                Some(event) => event,
                None => match events.recv() {
                    Ok(event) => event,
                    Err(_) => break,
                },
            };
            let Some(event) = self.trigger_event(event) else {
                continue;
            };
            if let Some(window) = debounce {
                let folded = coalesce(events, window);
                if folded > 0 {
                    debug!(folded, "coalesced events");
                }
            } else {
                pending = skip_repeats(events, &event);
            }
            info!("change detected, rebuilding");
            self.handle_trigger(&mut on_change);
            triggers += 1;
        }
        triggers
    }

    /// The event, if it should start a rebuild.
    fn trigger_event(&self, event: notify::Result<Event>) -> Option<Event> {
        let event = match event {
            Ok(event) => event,
            Err(err) => {
                warn!(%err, "watch error");
                return None;
            }
        };
        if !is_relevant(&event.kind) {
            return None;
        }
        // Rescan notices carry no paths.
        let triggers =
            event.paths.is_empty() || event.paths.iter().any(|p| !self.is_quiet_path(p));
        triggers.then_some(event)
    }

    /// Ignore names apply below the root only, never to the root itself.
    fn is_ignored(&self, path: &Path) -> bool {
        self.ignore_paths.iter().any(|p| p == path)
            || (path != self.root
                && path
                    .file_name()
                    .is_some_and(|name| self.is_ignored_name(name)))
    }

    fn is_ignored_name(&self, name: &std::ffi::OsStr) -> bool {
        self.ignore_names.iter().any(|n| name == n.as_str())
    }

    /// Paths whose changes never trigger a rebuild.
    fn is_quiet_path(&self, path: &Path) -> bool {
        let hidden = path
            .file_name()
            .is_some_and(|n| n.to_string_lossy().starts_with('.'));
        hidden
            || self.ignore_paths.iter().any(|p| path.starts_with(p))
            || path.strip_prefix(&self.root).is_ok_and(|rel| {
                rel.components()
                    .any(|c| self.is_ignored_name(c.as_os_str()))
            })
    }
}

/// Non-hidden entries of `dir`, sorted by name.
fn visible_children(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut children: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .filter(|e| !e.file_name().to_string_lossy().starts_with('.'))
        .map(|e| e.path())
        .collect();
    children.sort();
    Ok(children)
}

/// Only content changes trigger; reads caused by the build itself do not.
fn is_relevant(kind: &EventKind) -> bool {
    match kind {
        EventKind::Create(_) | EventKind::Remove(_) | EventKind::Any => true,
        EventKind::Modify(ModifyKind::Metadata(MetadataKind::AccessTime)) => false,
        EventKind::Modify(_) => true,
        EventKind::Access(_) | EventKind::Other => false,
    }
}

/// Drop already-queued copies of `trigger`, returning the first different event.
///
/// A write to a file is reported once by the file's own registration and
/// once by its directory's, as two identical events.
fn skip_repeats(events: &EventReceiver, trigger: &Event) -> Option<notify::Result<Event>> {
    loop {
        match events.try_recv() {
            Ok(Ok(event)) if event.kind == trigger.kind && event.paths == trigger.paths => {
                debug!(kind = ?event.kind, "dropped repeated event");
            }
            Ok(other) => return Some(other),
            Err(_) => return None,
        }
    }
}

/// Drain events until the channel stays quiet for `window`. Returns how many were folded.
fn coalesce(events: &EventReceiver, window: Duration) -> usize {
    let mut folded = 0;
    while events.recv_timeout(window).is_ok() {
        folded += 1;
    }
    folded
}

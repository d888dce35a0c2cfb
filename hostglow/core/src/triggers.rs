//! Manual Test Triggers
//!
//! Triggers let an operator fire any animation by hand, without waiting for
//! a real state change. Each trigger is consumed at most once: a trigger that
//! fires once produces exactly one synthetic event, even if the trigger tick
//! runs again before the operator notices.
//!
//! # File Layout
//!
//! ```text
//! {dir}/hostglow_trigger_supernova.txt   fire SUPERNOVA (any content)
//! {dir}/hostglow_trigger_hostlist.txt    log the host table
//! {dir}/hostglow_theme.txt               switch theme (content = theme name)
//! ```

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::DashSet;
use parking_lot::Mutex;

use crate::events::AnimationKind;

const FILE_PREFIX: &str = "hostglow_";
const HOSTLIST_TRIGGER: &str = "hostlist";
const THEME_FILE: &str = "theme";

/// Source of one-shot manual triggers
pub trait TriggerSource: Send + Sync {
    /// Consume the trigger for `kind`, returning whether it was present
    fn check_and_consume(&self, kind: AnimationKind) -> bool;

    /// Consume a pending theme switch request
    fn take_theme_request(&self) -> Option<String> {
        None
    }

    /// Consume a pending host list dump request
    fn take_hostlist_request(&self) -> bool {
        false
    }
}

/// Triggers backed by files in a directory
///
/// Consumption is the file removal itself: only the caller whose
/// `remove_file` succeeds sees the trigger, so concurrent consumers cannot
/// both fire it.
#[derive(Clone, Debug)]
pub struct FileTriggers {
    dir: PathBuf,
}

impl FileTriggers {
    /// Watch `dir` for trigger files
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory being watched
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the trigger file for a name such as `"supernova"`
    #[must_use]
    pub fn trigger_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{FILE_PREFIX}trigger_{name}.txt"))
    }

    /// Path of the theme request file
    #[must_use]
    pub fn theme_path(&self) -> PathBuf {
        self.dir.join(format!("{FILE_PREFIX}{THEME_FILE}.txt"))
    }

    fn consume(path: &Path) -> bool {
        match std::fs::remove_file(path) {
            Ok(()) => true,
            Err(e) if e.kind() == ErrorKind::NotFound => false,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Cannot consume trigger file");
                false
            }
        }
    }
}

impl TriggerSource for FileTriggers {
    fn check_and_consume(&self, kind: AnimationKind) -> bool {
        Self::consume(&self.trigger_path(kind.as_str()))
    }

    fn take_theme_request(&self) -> Option<String> {
        let path = self.theme_path();
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Cannot read theme request");
                return None;
            }
        };

        if !Self::consume(&path) {
            return None;
        }

        let name = content.trim().to_lowercase();
        (!name.is_empty()).then_some(name)
    }

    fn take_hostlist_request(&self) -> bool {
        Self::consume(&self.trigger_path(HOSTLIST_TRIGGER))
    }
}

/// In-process triggers, for embedding and tests
#[derive(Debug, Default)]
pub struct MemoryTriggers {
    pending: DashSet<AnimationKind>,
    hostlist: AtomicBool,
    theme: Mutex<Option<String>>,
}

impl MemoryTriggers {
    /// Create with nothing pending
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the trigger for `kind`
    pub fn fire(&self, kind: AnimationKind) {
        self.pending.insert(kind);
    }

    /// Request a host list dump
    pub fn request_hostlist(&self) {
        self.hostlist.store(true, Ordering::SeqCst);
    }

    /// Request a theme switch
    pub fn request_theme(&self, name: impl Into<String>) {
        *self.theme.lock() = Some(name.into());
    }

    /// Whether the trigger for `kind` is armed and not yet consumed
    #[must_use]
    pub fn is_pending(&self, kind: AnimationKind) -> bool {
        self.pending.contains(&kind)
    }
}

impl TriggerSource for MemoryTriggers {
    fn check_and_consume(&self, kind: AnimationKind) -> bool {
        self.pending.remove(&kind).is_some()
    }

    fn take_theme_request(&self) -> Option<String> {
        self.theme.lock().take()
    }

    fn take_hostlist_request(&self) -> bool {
        self.hostlist.swap(false, Ordering::SeqCst)
    }
}

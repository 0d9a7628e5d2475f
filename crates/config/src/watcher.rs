//! Filesystem watcher for the key file.
//!
//! Watches the directory holding the key file (editors often replace files
//! by rename, which a watch on the file itself would miss) and sends a
//! notification through a channel so the owner can reload its [`KeyRing`].
//!
//! [`KeyRing`]: strongbox_vault::KeyRing

use std::{ffi::OsString, path::Path, time::Duration};

use {
    notify_debouncer_full::{
        DebounceEventResult, Debouncer, RecommendedCache, new_debouncer,
        notify::{EventKind, RecommendedWatcher, RecursiveMode},
    },
    tokio::sync::mpsc,
    tracing::{debug, info, warn},
};

#[cfg(feature = "metrics")]
use strongbox_metrics::{counter, source as source_metrics};

use crate::error::{ConfigError, Result};

const DEBOUNCE: Duration = Duration::from_millis(500);

/// Events emitted by the key file watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyWatchEvent {
    /// The key file was created, modified, or deleted.
    Changed,
}

/// Watches one key file for changes with debouncing.
pub struct KeyFileWatcher {
    _debouncer: Debouncer<RecommendedWatcher, RecommendedCache>,
}

impl KeyFileWatcher {
    /// Start watching `path`. Returns the watcher and a receiver for events.
    ///
    /// The watcher must be kept alive (not dropped) for events to continue.
    pub fn start(path: &Path) -> Result<(Self, mpsc::UnboundedReceiver<KeyWatchEvent>)> {
        let file_name: OsString = path
            .file_name()
            .map(ToOwned::to_owned)
            .ok_or_else(|| ConfigError::UnsupportedFormat(path.display().to_string()))?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => std::env::current_dir().map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?,
        };

        let (tx, rx) = mpsc::unbounded_channel();

        let mut debouncer = new_debouncer(
            DEBOUNCE,
            None,
            move |result: DebounceEventResult| match result {
                Ok(events) => {
                    let changed = events.iter().any(|event| {
                        matches!(
                            event.kind,
                            EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
                        ) && event
                            .paths
                            .iter()
                            .any(|p| p.file_name() == Some(file_name.as_os_str()))
                    });
                    if changed {
                        debug!(file = ?file_name, "key file watcher event");
                        #[cfg(feature = "metrics")]
                        counter!(source_metrics::WATCH_EVENTS_TOTAL).increment(1);
                        let _ = tx.send(KeyWatchEvent::Changed);
                    }
                },
                Err(errors) => {
                    for e in errors {
                        warn!(error = %e, "key file watcher error");
                    }
                },
            },
        )?;

        debouncer.watch(&dir, RecursiveMode::NonRecursive)?;
        info!(dir = %dir.display(), "key file watcher: watching directory");

        Ok((
            Self {
                _debouncer: debouncer,
            },
            rx,
        ))
    }
}

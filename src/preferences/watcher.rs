//! Change watcher for the preferences file.
//!
//! Watches the workspace root (the file itself may not exist yet) through a
//! debounced recursive watch and bridges `wpilib_preferences.json` events
//! onto the runtime as calls into [`PreferencesEvents`]. Dropping the
//! watcher stops the watch.

use super::document::PREFERENCES_FILE_NAME;
use super::PreferencesEvents;
use anyhow::Result;
// Use notify through notify_debouncer_full to avoid version conflicts
use notify_debouncer_full::{
    new_debouncer,
    notify::{EventKind, RecursiveMode, Watcher},
    DebounceEventResult,
};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

const DEBOUNCE: Duration = Duration::from_millis(300);

pub struct PreferencesWatcher {
    // Hold the debouncer alive; dropping it stops the file watch.
    _debouncer: notify_debouncer_full::Debouncer<
        notify_debouncer_full::notify::RecommendedWatcher,
        notify_debouncer_full::FileIdMap,
    >,
}

impl PreferencesWatcher {
    /// Start watching `workspace_root` and dispatch preferences-file events
    /// into `events`. Must be called from within the runtime.
    pub fn start(workspace_root: &Path, events: PreferencesEvents) -> Result<Self> {
        let rt = tokio::runtime::Handle::current();

        let mut debouncer = new_debouncer(DEBOUNCE, None, move |result: DebounceEventResult| {
            match result {
                Ok(batch) => {
                    for event in batch {
                        let Some(path) = event.event.paths.first().cloned() else {
                            continue;
                        };
                        if path.file_name().and_then(|name| name.to_str())
                            != Some(PREFERENCES_FILE_NAME)
                        {
                            continue;
                        }

                        debug!(path = %path.display(), kind = ?event.event.kind, "preferences file event");
                        let events = events.clone();
                        match event.event.kind {
                            EventKind::Create(_) => {
                                rt.spawn(async move { events.on_created(path).await });
                            }
                            EventKind::Remove(_) => {
                                rt.spawn(async move { events.on_deleted().await });
                            }
                            EventKind::Modify(_) => {
                                rt.spawn(async move { events.on_changed().await });
                            }
                            _ => {}
                        }
                    }
                }
                Err(errors) => {
                    for e in errors {
                        warn!(err = %e, "preferences watcher error");
                    }
                }
            }
        })?;

        debouncer
            .watcher()
            .watch(workspace_root, RecursiveMode::Recursive)?;

        Ok(Self {
            _debouncer: debouncer,
        })
    }
}

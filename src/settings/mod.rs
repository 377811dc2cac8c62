//! Settings overlay — the host's hierarchical key/value settings store.
//!
//! This is the second configuration surface next to the mirrored
//! `wpilib_preferences.json`: boolean and string toggles that live in the
//! editor's own settings, scoped either globally or to the workspace folder.
//! The store only reads and writes through [`SettingsOverlay`]; it never
//! owns the storage.

pub mod bridge;

use async_trait::async_trait;
use std::path::PathBuf;

/// Where a settings write lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsScope {
    /// User-level settings, shared by every workspace.
    Global,
    /// Settings scoped to the current workspace folder.
    WorkspaceFolder,
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("could not read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("settings file {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("settings file {path} is not a JSON object")]
    NotAnObject { path: PathBuf },
    #[error("could not write settings file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("no user-level settings location on this platform")]
    NoUserSettings,
}

/// Hierarchical key/value settings store, keyed by fully-qualified names
/// such as `wpilib.skipTests`.
///
/// Reads resolve the workspace value first and fall back to the global one;
/// absence is `None`, and callers supply their documented defaults.
#[async_trait]
pub trait SettingsOverlay: Send + Sync {
    async fn get_bool(&self, key: &str) -> Option<bool>;

    async fn get_string(&self, key: &str) -> Option<String>;

    async fn set_bool(
        &self,
        key: &str,
        value: bool,
        scope: SettingsScope,
    ) -> Result<(), SettingsError>;
}

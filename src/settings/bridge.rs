// SPDX-License-Identifier: MIT
//! JSON-file-backed [`SettingsOverlay`].
//!
//! Reads and writes editor-style `settings.json` documents from the standard
//! locations: the platform user-level file for [`SettingsScope::Global`] and
//! `{workspace}/.vscode/settings.json` for [`SettingsScope::WorkspaceFolder`].
//! Workspace values shadow user-level values on read.
//!
//! Settings files are JSONC; comments are stripped before parsing and are
//! not preserved across a write.

use super::{SettingsError, SettingsOverlay, SettingsScope};
use crate::jsonc;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

// ─── Platform paths ───────────────────────────────────────────────────────────

/// Platform-specific path of the user-level `settings.json`.
///
/// - macOS: `~/Library/Application Support/Code/User/settings.json`
/// - Linux: `~/.config/Code/User/settings.json`
/// - Windows: `%APPDATA%\Code\User\settings.json`
pub fn user_settings_path() -> Option<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        let home = std::env::var("HOME").ok()?;
        Some(
            PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("Code")
                .join("User")
                .join("settings.json"),
        )
    }
    #[cfg(target_os = "linux")]
    {
        let config = std::env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var("HOME")
                    .ok()
                    .map(|h| PathBuf::from(h).join(".config"))
            })?;
        Some(config.join("Code").join("User").join("settings.json"))
    }
    #[cfg(target_os = "windows")]
    {
        let appdata = std::env::var("APPDATA").ok()?;
        Some(
            PathBuf::from(appdata)
                .join("Code")
                .join("User")
                .join("settings.json"),
        )
    }
    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    {
        None
    }
}

/// Path of the workspace-level `settings.json`.
pub fn workspace_settings_path(workspace_root: &Path) -> PathBuf {
    workspace_root.join(".vscode").join("settings.json")
}

// ─── Bridge ───────────────────────────────────────────────────────────────────

pub struct JsonSettingsBridge {
    user_settings: Option<PathBuf>,
    workspace_settings: PathBuf,
}

impl JsonSettingsBridge {
    /// Bridge for `workspace_root` using the platform user-settings location.
    pub fn new(workspace_root: &Path) -> Self {
        Self {
            user_settings: user_settings_path(),
            workspace_settings: workspace_settings_path(workspace_root),
        }
    }

    /// Bridge over explicit file locations instead of the platform defaults.
    pub fn with_paths(user_settings: Option<PathBuf>, workspace_settings: PathBuf) -> Self {
        Self {
            user_settings,
            workspace_settings,
        }
    }

    /// Resolve `key` workspace-first, then user-level.
    async fn lookup(&self, key: &str) -> Option<Value> {
        if let Some(value) = read_document(&self.workspace_settings).await.get(key) {
            return Some(value.clone());
        }
        let user = self.user_settings.as_ref()?;
        read_document(user).await.get(key).cloned()
    }

    fn path_for(&self, scope: SettingsScope) -> Result<PathBuf, SettingsError> {
        match scope {
            SettingsScope::WorkspaceFolder => Ok(self.workspace_settings.clone()),
            SettingsScope::Global => self
                .user_settings
                .clone()
                .ok_or(SettingsError::NoUserSettings),
        }
    }
}

#[async_trait]
impl SettingsOverlay for JsonSettingsBridge {
    async fn get_bool(&self, key: &str) -> Option<bool> {
        self.lookup(key).await.and_then(|v| v.as_bool())
    }

    async fn get_string(&self, key: &str) -> Option<String> {
        self.lookup(key)
            .await
            .and_then(|v| v.as_str().map(str::to_string))
    }

    async fn set_bool(
        &self,
        key: &str,
        value: bool,
        scope: SettingsScope,
    ) -> Result<(), SettingsError> {
        let path = self.path_for(scope)?;
        let mut document = load_for_update(&path).await?;
        document.insert(key.to_string(), Value::Bool(value));

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| SettingsError::Write {
                    path: path.clone(),
                    source,
                })?;
        }

        let contents = jsonc::to_pretty_string(&Value::Object(document)).map_err(|source| {
            SettingsError::Parse {
                path: path.clone(),
                source,
            }
        })?;
        tokio::fs::write(&path, contents)
            .await
            .map_err(|source| SettingsError::Write {
                path: path.clone(),
                source,
            })?;

        debug!(key, value, path = %path.display(), "settings write");
        Ok(())
    }
}

// ─── Documents ────────────────────────────────────────────────────────────────

/// Best-effort read for lookups. A missing or unparseable file reads as
/// empty; write paths use [`load_for_update`] instead so a malformed file is
/// never silently clobbered.
async fn read_document(path: &Path) -> Map<String, Value> {
    let Ok(contents) = tokio::fs::read_to_string(path).await else {
        return Map::new();
    };
    match serde_json::from_str::<Value>(&jsonc::strip_comments(&contents)) {
        Ok(Value::Object(map)) => map,
        Ok(_) | Err(_) => {
            warn!(path = %path.display(), "unparseable settings file ignored");
            Map::new()
        }
    }
}

async fn load_for_update(path: &Path) -> Result<Map<String, Value>, SettingsError> {
    let contents = match tokio::fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Map::new()),
        Err(source) => {
            return Err(SettingsError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    let value: Value =
        serde_json::from_str(&jsonc::strip_comments(&contents)).map_err(|source| {
            SettingsError::Parse {
                path: path.to_path_buf(),
                source,
            }
        })?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(SettingsError::NotAnObject {
            path: path.to_path_buf(),
        }),
    }
}

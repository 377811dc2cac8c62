//! The mirrored preferences document.

use crate::jsonc;
use serde::{Deserialize, Serialize};

/// Name of the per-workspace preferences file.
pub const PREFERENCES_FILE_NAME: &str = "wpilib_preferences.json";

/// Directory under the workspace root that holds the preferences file.
pub const CONFIG_FOLDER_NAME: &str = ".wpilib";

/// The four-field preferences record mirrored between memory and
/// `.wpilib/wpilib_preferences.json`.
///
/// The in-memory copy is always total: fields missing on disk resolve from
/// the default document, and unknown fields are dropped on read rather than
/// round-tripped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreferencesDocument {
    pub current_language: String,
    /// Negative means unset.
    pub team_number: i32,
    pub enable_cpp_intellisense: bool,
    pub project_year: String,
}

impl Default for PreferencesDocument {
    fn default() -> Self {
        Self {
            current_language: "none".to_string(),
            team_number: -1,
            enable_cpp_intellisense: false,
            project_year: "none".to_string(),
        }
    }
}

impl PreferencesDocument {
    /// Parse file contents. Comments are tolerated; malformed input yields
    /// `None` so callers can fall back to the default document.
    pub fn parse(contents: &str) -> Option<Self> {
        serde_json::from_str(&jsonc::strip_comments(contents)).ok()
    }

    /// The on-disk representation: pretty JSON, 4-space indent.
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        jsonc::to_pretty_string(self)
    }
}

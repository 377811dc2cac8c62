pub mod ide;
pub mod jsonc;
pub mod manifest;
pub mod preferences;
pub mod settings;

use std::path::{Path, PathBuf};

/// Paths belonging to the installed extension itself, as opposed to any
/// workspace it is attached to.
///
/// Passed explicitly into [`preferences::Preferences::create`] so nothing in
/// the crate reaches for process-wide state to find the manifest.
#[derive(Debug, Clone)]
pub struct ExtensionContext {
    extension_root: PathBuf,
}

impl ExtensionContext {
    pub fn new(extension_root: impl Into<PathBuf>) -> Self {
        Self {
            extension_root: extension_root.into(),
        }
    }

    pub fn extension_root(&self) -> &Path {
        &self.extension_root
    }

    /// Location of the extension manifest (`package.json`).
    pub fn manifest_path(&self) -> PathBuf {
        self.extension_root.join("package.json")
    }
}

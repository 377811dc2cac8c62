// SPDX-License-Identifier: MIT
//! Host bridge — the interactive surface of whatever IDE (or terminal) the
//! preferences store is embedded in.
//!
//! The store never talks to a concrete UI. Everything interactive goes
//! through [`HostBridge`], injected at construction, so the first-run flow
//! and the bulk settings picker are testable with a scripted implementation
//! and usable from the console binary with [`console::ConsoleHost`].

pub mod console;

use async_trait::async_trait;

/// Inline validator for text prompts. Returns `Some(message)` to reject the
/// entry and keep the prompt open, `None` to accept it.
pub type InputValidator = dyn Fn(&str) -> Option<String> + Send + Sync;

/// One entry in a multi-select pick list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickItem {
    pub label: String,
    pub description: String,
    /// Stable identity used to match picked entries back to their source.
    pub key: String,
    /// Whether the entry starts out selected.
    pub picked: bool,
}

/// Interactive host surface consumed by the preferences store.
///
/// Every prompt is cancellable: `None` means the user dismissed the dialog,
/// and callers treat that as a normal outcome, never an error.
#[async_trait]
pub trait HostBridge: Send + Sync {
    /// Modal message with action buttons. Returns the chosen action label.
    async fn show_message(&self, message: &str, actions: &[&str]) -> Option<String>;

    /// Single-line text input, validated inline before submission.
    async fn request_input(&self, prompt: &str, validate: &InputValidator) -> Option<String>;

    /// Multi-select pick list. Returns the picked subset; items absent from
    /// the result were left unpicked.
    async fn pick_many(&self, items: Vec<PickItem>) -> Option<Vec<PickItem>>;

    /// Publish a named boolean flag the host may use for UI conditionals.
    async fn set_context_flag(&self, key: &str, value: bool);
}

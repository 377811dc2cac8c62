//! Extension manifest — enumerates the boolean settings an extension
//! declares, for the bulk settings picker.
//!
//! The manifest is the extension's `package.json`; declared settings live
//! under `contributes.configuration.properties`. Only `"type": "boolean"`
//! entries are kept, in declaration order.

use crate::ide::PickItem;
use anyhow::{Context as _, Result};
use serde_json::Value;
use std::path::Path;

/// A boolean setting declared in the extension manifest.
///
/// Immutable value; the picker re-derives a fresh list (with `picked`
/// reflecting the live settings) on every invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingDescriptor {
    /// Human-readable name (`printName` in the manifest).
    pub label: String,
    pub description: String,
    /// Fully-qualified settings key, e.g. `wpilib.skipTests`.
    pub key: String,
    pub default_value: bool,
    /// Whether the setting is currently enabled.
    pub picked: bool,
}

impl SettingDescriptor {
    pub fn with_picked(&self, picked: bool) -> Self {
        Self {
            picked,
            ..self.clone()
        }
    }
}

impl From<&SettingDescriptor> for PickItem {
    fn from(descriptor: &SettingDescriptor) -> Self {
        PickItem {
            label: descriptor.label.clone(),
            description: descriptor.description.clone(),
            key: descriptor.key.clone(),
            picked: descriptor.picked,
        }
    }
}

/// Read the manifest once and collect every boolean setting it declares.
pub async fn boolean_settings(manifest_path: &Path) -> Result<Vec<SettingDescriptor>> {
    let contents = tokio::fs::read_to_string(manifest_path)
        .await
        .with_context(|| format!("could not read manifest {}", manifest_path.display()))?;
    let manifest: Value = serde_json::from_str(&contents)
        .with_context(|| format!("could not parse manifest {}", manifest_path.display()))?;

    let mut settings = Vec::new();
    let Some(properties) = manifest
        .pointer("/contributes/configuration/properties")
        .and_then(Value::as_object)
    else {
        return Ok(settings);
    };

    for (key, property) in properties {
        if property.get("type").and_then(Value::as_str) != Some("boolean") {
            continue;
        }
        settings.push(SettingDescriptor {
            label: property
                .get("printName")
                .and_then(Value::as_str)
                .unwrap_or(key)
                .to_string(),
            description: property
                .get("description")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            key: key.clone(),
            default_value: property.get("default").and_then(Value::as_bool).unwrap_or(false),
            picked: false,
        });
    }
    Ok(settings)
}

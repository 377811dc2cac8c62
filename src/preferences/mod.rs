//! Workspace preferences store.
//!
//! Mirrors `.wpilib/wpilib_preferences.json` into memory, keeps the mirror
//! current through a debounced file watcher, and layers typed accessors over
//! both the mirrored document and the host's settings overlay. One store per
//! workspace root; the watcher lives and dies with the store.

pub mod document;
pub mod watcher;

use crate::ide::{HostBridge, PickItem};
use crate::manifest::{self, SettingDescriptor};
use crate::settings::{SettingsError, SettingsOverlay, SettingsScope};
use crate::ExtensionContext;
use anyhow::{Context as _, Result};
use document::{PreferencesDocument, CONFIG_FOLDER_NAME, PREFERENCES_FILE_NAME};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};
use watcher::PreferencesWatcher;

/// Context flag pushed to the host whenever workspace classification changes.
pub const IS_WPILIB_PROJECT_FLAG: &str = "isWPILibProject";

/// Settings namespace for every overlay key this store owns.
const SETTINGS_NAMESPACE: &str = "wpilib";

fn setting_key(name: &str) -> String {
    format!("{SETTINGS_NAMESPACE}.{name}")
}

static TEAM_NUMBER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,5}$").expect("team number pattern is valid"));

/// Inline validator for the team-number prompt: one to five digits.
pub fn validate_team_number(entry: &str) -> Option<String> {
    if TEAM_NUMBER_PATTERN.is_match(entry) {
        None
    } else {
        Some("Invalid team number".to_string())
    }
}

/// Prompt for a team number through the host bridge. Cancellation yields -1.
pub async fn request_team_number(host: &dyn HostBridge) -> i32 {
    match host
        .request_input("Enter your team number", &validate_team_number)
        .await
    {
        Some(entry) => entry.parse().unwrap_or(-1),
        None => -1,
    }
}

// ─── Store state ──────────────────────────────────────────────────────────────

/// Mutable store state, shared with the watcher.
///
/// The original host delivered events one at a time on a single thread; on
/// the multi-threaded runtime that precondition becomes this lock. Setters
/// complete their in-memory read-modify-write before releasing it, and it is
/// never held across disk I/O.
#[derive(Debug)]
struct StoreState {
    document: PreferencesDocument,
    /// Bound preferences file; `None` until the workspace is recognized.
    preferences_file: Option<PathBuf>,
    is_wpilib_project: bool,
}

/// Watcher-facing half of the store: the reaction logic for file events,
/// invokable without a real filesystem watcher behind it.
#[derive(Clone)]
pub struct PreferencesEvents {
    state: Arc<RwLock<StoreState>>,
    host: Arc<dyn HostBridge>,
}

impl PreferencesEvents {
    /// The preferences file appeared: recognize the workspace, bind the
    /// file, and reload the mirror from disk.
    pub async fn on_created(&self, path: PathBuf) {
        info!(path = %path.display(), "preferences file created");
        self.host.set_context_flag(IS_WPILIB_PROJECT_FLAG, true).await;
        let document = load_document(&path).await;
        let mut state = self.state.write().await;
        state.is_wpilib_project = true;
        state.preferences_file = Some(path);
        state.document = document;
    }

    /// The preferences file disappeared: declassify the workspace, unbind,
    /// and reset the mirror to the default document. Nothing is deleted on
    /// disk.
    pub async fn on_deleted(&self) {
        info!("preferences file deleted");
        self.host
            .set_context_flag(IS_WPILIB_PROJECT_FLAG, false)
            .await;
        let mut state = self.state.write().await;
        state.is_wpilib_project = false;
        state.preferences_file = None;
        state.document = PreferencesDocument::default();
    }

    /// The preferences file changed in place: reload the mirror, leaving
    /// classification and binding untouched.
    pub async fn on_changed(&self) {
        let path = self.state.read().await.preferences_file.clone();
        let document = match path {
            Some(path) => load_document(&path).await,
            None => PreferencesDocument::default(),
        };
        self.state.write().await.document = document;
    }
}

async fn load_document(path: &Path) -> PreferencesDocument {
    match tokio::fs::read_to_string(path).await {
        Ok(contents) => match PreferencesDocument::parse(&contents) {
            Some(document) => document,
            None => {
                warn!(path = %path.display(), "malformed preferences file — using defaults");
                PreferencesDocument::default()
            }
        },
        Err(e) => {
            warn!(path = %path.display(), err = %e, "could not read preferences file — using defaults");
            PreferencesDocument::default()
        }
    }
}

// ─── Preferences ──────────────────────────────────────────────────────────────

/// Per-workspace preferences store.
pub struct Preferences {
    workspace_root: PathBuf,
    config_folder: PathBuf,
    state: Arc<RwLock<StoreState>>,
    overlay: Arc<dyn SettingsOverlay>,
    host: Arc<dyn HostBridge>,
    /// Boolean settings declared in the manifest, in declaration order.
    updatable_settings: Vec<SettingDescriptor>,
    watcher: Option<PreferencesWatcher>,
}

impl Preferences {
    /// Create the store for `workspace_root`: classify the workspace from
    /// the preferences file's existence, load the document (or install
    /// defaults), read the manifest's boolean settings once, and start the
    /// change watcher.
    pub async fn create(
        workspace_root: impl Into<PathBuf>,
        ctx: &ExtensionContext,
        overlay: Arc<dyn SettingsOverlay>,
        host: Arc<dyn HostBridge>,
    ) -> Result<Self> {
        let workspace_root = workspace_root.into();
        let config_folder = workspace_root.join(CONFIG_FOLDER_NAME);
        let preferences_file = config_folder.join(PREFERENCES_FILE_NAME);

        let exists = tokio::fs::try_exists(&preferences_file).await.unwrap_or(false);
        host.set_context_flag(IS_WPILIB_PROJECT_FLAG, exists).await;

        let document = if exists {
            load_document(&preferences_file).await
        } else {
            PreferencesDocument::default()
        };

        let state = Arc::new(RwLock::new(StoreState {
            document,
            preferences_file: exists.then(|| preferences_file.clone()),
            is_wpilib_project: exists,
        }));

        let updatable_settings = match manifest::boolean_settings(&ctx.manifest_path()).await {
            Ok(settings) => settings,
            Err(e) => {
                warn!(err = %e, "could not load extension manifest — bulk settings unavailable");
                Vec::new()
            }
        };

        let events = PreferencesEvents {
            state: Arc::clone(&state),
            host: Arc::clone(&host),
        };
        let watcher = match PreferencesWatcher::start(&workspace_root, events) {
            Ok(watcher) => Some(watcher),
            Err(e) => {
                warn!(err = %e, "preferences watcher failed to start — external edits will not be picked up");
                None
            }
        };

        Ok(Self {
            workspace_root,
            config_folder,
            state,
            overlay,
            host,
            updatable_settings,
            watcher,
        })
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    /// The event handlers the watcher dispatches into, exposed so the
    /// reaction logic can be driven directly.
    pub fn event_handlers(&self) -> PreferencesEvents {
        PreferencesEvents {
            state: Arc::clone(&self.state),
            host: Arc::clone(&self.host),
        }
    }

    /// Whether this workspace currently holds a recognized preferences file.
    pub async fn is_wpilib_project(&self) -> bool {
        self.state.read().await.is_wpilib_project
    }

    /// Snapshot of the mirrored document.
    pub async fn document(&self) -> PreferencesDocument {
        self.state.read().await.document.clone()
    }

    /// Release the watcher. Idempotent; the cached document stays readable.
    pub fn dispose(&mut self) {
        self.watcher = None;
    }

    // ─── Mirrored document accessors ──────────────────────────────────────────

    /// Resolve the team number.
    ///
    /// The `alwaysAskForTeamNumber` override bypasses the cache and prompts
    /// on every call. Otherwise the cached value wins when non-negative, and
    /// the first-run flow handles the rest. `-1` means unset or cancelled.
    pub async fn team_number(&self) -> Result<i32> {
        let always_ask = self
            .overlay
            .get_bool(&setting_key("alwaysAskForTeamNumber"))
            .await
            .unwrap_or(false);
        if always_ask {
            return Ok(request_team_number(self.host.as_ref()).await);
        }
        let cached = self.state.read().await.document.team_number;
        if cached < 0 {
            return self.no_team_number_flow().await;
        }
        Ok(cached)
    }

    pub async fn set_team_number(&self, team_number: i32) -> Result<()> {
        self.state.write().await.document.team_number = team_number;
        self.write_preferences().await
    }

    pub async fn current_language(&self) -> String {
        self.state.read().await.document.current_language.clone()
    }

    pub async fn set_current_language(&self, language: &str) -> Result<()> {
        self.state.write().await.document.current_language = language.to_string();
        self.write_preferences().await
    }

    pub async fn enable_cpp_intellisense(&self) -> bool {
        self.state.read().await.document.enable_cpp_intellisense
    }

    pub async fn set_enable_cpp_intellisense(&self, enable: bool) -> Result<()> {
        self.state.write().await.document.enable_cpp_intellisense = enable;
        self.write_preferences().await
    }

    pub async fn project_year(&self) -> String {
        self.state.read().await.document.project_year.clone()
    }

    pub async fn set_project_year(&self, year: &str) -> Result<()> {
        self.state.write().await.document.project_year = year.to_string();
        self.write_preferences().await
    }

    // ─── Settings overlay accessors ───────────────────────────────────────────

    pub async fn auto_start_rio_log(&self) -> bool {
        self.overlay
            .get_bool(&setting_key("autoStartRioLog"))
            .await
            .unwrap_or(false)
    }

    pub async fn set_auto_start_rio_log(
        &self,
        value: bool,
        scope: SettingsScope,
    ) -> Result<(), SettingsError> {
        self.overlay
            .set_bool(&setting_key("autoStartRioLog"), value, scope)
            .await
    }

    pub async fn online(&self) -> bool {
        self.overlay
            .get_bool(&setting_key("online"))
            .await
            .unwrap_or(false)
    }

    pub async fn set_online(&self, value: bool, scope: SettingsScope) -> Result<(), SettingsError> {
        self.overlay
            .set_bool(&setting_key("online"), value, scope)
            .await
    }

    pub async fn skip_tests(&self) -> bool {
        self.overlay
            .get_bool(&setting_key("skipTests"))
            .await
            .unwrap_or(false)
    }

    pub async fn set_skip_tests(
        &self,
        value: bool,
        scope: SettingsScope,
    ) -> Result<(), SettingsError> {
        self.overlay
            .set_bool(&setting_key("skipTests"), value, scope)
            .await
    }

    pub async fn auto_save_on_deploy(&self) -> bool {
        self.overlay
            .get_bool(&setting_key("autoSaveOnDeploy"))
            .await
            .unwrap_or(false)
    }

    pub async fn set_auto_save_on_deploy(
        &self,
        value: bool,
        scope: SettingsScope,
    ) -> Result<(), SettingsError> {
        self.overlay
            .set_bool(&setting_key("autoSaveOnDeploy"), value, scope)
            .await
    }

    pub async fn stop_simulation_on_entry(&self) -> bool {
        self.overlay
            .get_bool(&setting_key("stopSimulationOnEntry"))
            .await
            .unwrap_or(false)
    }

    pub async fn set_stop_simulation_on_entry(
        &self,
        value: bool,
        scope: SettingsScope,
    ) -> Result<(), SettingsError> {
        self.overlay
            .set_bool(&setting_key("stopSimulationOnEntry"), value, scope)
            .await
    }

    pub async fn additional_gradle_arguments(&self) -> String {
        self.overlay
            .get_string(&setting_key("additionalGradleArguments"))
            .await
            .unwrap_or_default()
    }

    // ─── Bulk settings picker ─────────────────────────────────────────────────

    /// Present every manifest-declared boolean setting as a multi-select and
    /// write back exactly the entries whose picked-state changed, in
    /// manifest order. Dismissal writes nothing.
    pub async fn update_bulk_settings(&self, scope: SettingsScope) -> Result<()> {
        let mut current = Vec::with_capacity(self.updatable_settings.len());
        for descriptor in &self.updatable_settings {
            let picked = self
                .overlay
                .get_bool(&descriptor.key)
                .await
                .unwrap_or(descriptor.default_value);
            current.push(descriptor.with_picked(picked));
        }

        let items: Vec<PickItem> = current.iter().map(PickItem::from).collect();
        let Some(picked) = self.host.pick_many(items).await else {
            return Ok(());
        };

        for descriptor in &current {
            let now_picked = picked.iter().any(|item| item.key == descriptor.key);
            if now_picked != descriptor.picked {
                self.overlay
                    .set_bool(&descriptor.key, now_picked, scope)
                    .await
                    .with_context(|| format!("could not update {}", descriptor.key))?;
            }
        }
        Ok(())
    }

    // ─── Persistence ──────────────────────────────────────────────────────────

    /// Full-document rewrite. Binds the preferences file and creates the
    /// config folder on the first write into an unrecognized workspace.
    async fn write_preferences(&self) -> Result<()> {
        let (path, contents, first_write) = {
            let mut state = self.state.write().await;
            let first_write = state.preferences_file.is_none();
            let path = state
                .preferences_file
                .get_or_insert_with(|| self.config_folder.join(PREFERENCES_FILE_NAME))
                .clone();
            (path, state.document.to_pretty_json()?, first_write)
        };

        if first_write {
            tokio::fs::create_dir_all(&self.config_folder)
                .await
                .with_context(|| {
                    format!("could not create {}", self.config_folder.display())
                })?;
        }
        tokio::fs::write(&path, contents)
            .await
            .with_context(|| format!("could not write {}", path.display()))?;
        Ok(())
    }

    /// First-run acquisition: offer to save a team number, then prompt for
    /// one. Answering "No" still prompts and returns the entered number, but
    /// deliberately skips persisting it.
    async fn no_team_number_flow(&self) -> Result<i32> {
        let answer = self
            .host
            .show_message(
                "No team number, would you like to save one?",
                &["Yes", "No"],
            )
            .await;
        let Some(answer) = answer else {
            return Ok(-1);
        };

        let team_number = request_team_number(self.host.as_ref()).await;
        if answer == "No" {
            return Ok(team_number);
        }
        if team_number >= 0 {
            self.set_team_number(team_number).await?;
        }
        Ok(team_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tempfile::TempDir;

    // ─── Scripted collaborators ───────────────────────────────────────────────

    /// Host bridge with canned answers and a record of what was asked.
    #[derive(Default)]
    struct ScriptedHost {
        /// Answer to `show_message`; `None` means the dialog is dismissed.
        message_answer: Option<&'static str>,
        /// Answer to `request_input`; `None` means the prompt is cancelled.
        input_answer: Option<&'static str>,
        /// Keys to select in `pick_many`; `None` means the pick is dismissed.
        pick_keys: Option<Vec<&'static str>>,
        input_prompts: Mutex<u32>,
        flags: Mutex<Vec<(String, bool)>>,
    }

    #[async_trait]
    impl HostBridge for ScriptedHost {
        async fn show_message(&self, _message: &str, actions: &[&str]) -> Option<String> {
            let answer = self.message_answer?;
            assert!(actions.contains(&answer), "scripted answer must be offered");
            Some(answer.to_string())
        }

        async fn request_input(
            &self,
            _prompt: &str,
            validate: &crate::ide::InputValidator,
        ) -> Option<String> {
            *self.input_prompts.lock().unwrap() += 1;
            let entry = self.input_answer?;
            assert!(validate(entry).is_none(), "scripted entry must validate");
            Some(entry.to_string())
        }

        async fn pick_many(&self, items: Vec<PickItem>) -> Option<Vec<PickItem>> {
            let keys = self.pick_keys.as_ref()?;
            Some(
                items
                    .into_iter()
                    .filter(|item| keys.contains(&item.key.as_str()))
                    .collect(),
            )
        }

        async fn set_context_flag(&self, key: &str, value: bool) {
            self.flags.lock().unwrap().push((key.to_string(), value));
        }
    }

    /// In-memory overlay recording every write in order.
    #[derive(Default)]
    struct MemoryOverlay {
        values: Mutex<HashMap<String, serde_json::Value>>,
        writes: Mutex<Vec<(String, bool, SettingsScope)>>,
    }

    impl MemoryOverlay {
        fn with_bools(pairs: &[(&str, bool)]) -> Self {
            let overlay = Self::default();
            {
                let mut values = overlay.values.lock().unwrap();
                for (key, value) in pairs {
                    values.insert(key.to_string(), serde_json::Value::Bool(*value));
                }
            }
            overlay
        }
    }

    #[async_trait]
    impl SettingsOverlay for MemoryOverlay {
        async fn get_bool(&self, key: &str) -> Option<bool> {
            self.values.lock().unwrap().get(key)?.as_bool()
        }

        async fn get_string(&self, key: &str) -> Option<String> {
            self.values
                .lock()
                .unwrap()
                .get(key)?
                .as_str()
                .map(str::to_string)
        }

        async fn set_bool(
            &self,
            key: &str,
            value: bool,
            scope: SettingsScope,
        ) -> Result<(), SettingsError> {
            self.values
                .lock()
                .unwrap()
                .insert(key.to_string(), serde_json::Value::Bool(value));
            self.writes
                .lock()
                .unwrap()
                .push((key.to_string(), value, scope));
            Ok(())
        }
    }

    async fn store_with(
        dir: &TempDir,
        host: ScriptedHost,
        overlay: MemoryOverlay,
    ) -> (Preferences, Arc<ScriptedHost>, Arc<MemoryOverlay>) {
        let host = Arc::new(host);
        let overlay = Arc::new(overlay);
        let prefs = Preferences::create(
            dir.path(),
            &ExtensionContext::new(dir.path()),
            Arc::clone(&overlay) as Arc<dyn SettingsOverlay>,
            Arc::clone(&host) as Arc<dyn HostBridge>,
        )
        .await
        .unwrap();
        (prefs, host, overlay)
    }

    // ─── Team number flows ────────────────────────────────────────────────────

    #[tokio::test]
    async fn cached_team_number_wins_without_prompting() {
        let dir = TempDir::new().unwrap();
        let (prefs, host, _) = store_with(&dir, ScriptedHost::default(), MemoryOverlay::default()).await;

        prefs.set_team_number(4512).await.unwrap();
        assert_eq!(prefs.team_number().await.unwrap(), 4512);
        assert_eq!(*host.input_prompts.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn always_ask_bypasses_the_cache_on_every_call() {
        let dir = TempDir::new().unwrap();
        let host = ScriptedHost {
            input_answer: Some("190"),
            ..Default::default()
        };
        let overlay = MemoryOverlay::with_bools(&[("wpilib.alwaysAskForTeamNumber", true)]);
        let (prefs, host, _) = store_with(&dir, host, overlay).await;

        prefs.set_team_number(4512).await.unwrap();
        assert_eq!(prefs.team_number().await.unwrap(), 190);
        assert_eq!(prefs.team_number().await.unwrap(), 190);
        assert_eq!(*host.input_prompts.lock().unwrap(), 2);
        // The prompted value is never written back.
        assert_eq!(prefs.document().await.team_number, 4512);
    }

    #[tokio::test]
    async fn first_run_yes_persists_the_entered_number() {
        let dir = TempDir::new().unwrap();
        let host = ScriptedHost {
            message_answer: Some("Yes"),
            input_answer: Some("254"),
            ..Default::default()
        };
        let (prefs, _, _) = store_with(&dir, host, MemoryOverlay::default()).await;

        assert_eq!(prefs.team_number().await.unwrap(), 254);
        assert_eq!(prefs.document().await.team_number, 254);

        let on_disk = std::fs::read_to_string(
            dir.path().join(".wpilib").join("wpilib_preferences.json"),
        )
        .unwrap();
        assert!(on_disk.contains("\"teamNumber\": 254"));
    }

    #[tokio::test]
    async fn first_run_no_returns_the_number_without_persisting() {
        let dir = TempDir::new().unwrap();
        let host = ScriptedHost {
            message_answer: Some("No"),
            input_answer: Some("1234"),
            ..Default::default()
        };
        let (prefs, host, _) = store_with(&dir, host, MemoryOverlay::default()).await;

        assert_eq!(prefs.team_number().await.unwrap(), 1234);
        // Still prompted, per the original flow.
        assert_eq!(*host.input_prompts.lock().unwrap(), 1);
        // Nothing persisted: document untouched, no file written.
        assert_eq!(prefs.document().await.team_number, -1);
        assert!(!dir.path().join(".wpilib").exists());
    }

    #[tokio::test]
    async fn first_run_dismissal_returns_minus_one_without_prompting_further() {
        let dir = TempDir::new().unwrap();
        let (prefs, host, _) = store_with(&dir, ScriptedHost::default(), MemoryOverlay::default()).await;

        assert_eq!(prefs.team_number().await.unwrap(), -1);
        assert_eq!(*host.input_prompts.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn cancelled_number_prompt_after_yes_persists_nothing() {
        let dir = TempDir::new().unwrap();
        let host = ScriptedHost {
            message_answer: Some("Yes"),
            input_answer: None,
            ..Default::default()
        };
        let (prefs, _, _) = store_with(&dir, host, MemoryOverlay::default()).await;

        assert_eq!(prefs.team_number().await.unwrap(), -1);
        assert!(!dir.path().join(".wpilib").exists());
    }

    #[test]
    fn team_number_validator_accepts_one_to_five_digits() {
        assert!(validate_team_number("1").is_none());
        assert!(validate_team_number("99999").is_none());
        assert!(validate_team_number("254").is_none());
        assert!(validate_team_number("").is_some());
        assert!(validate_team_number("123456").is_some());
        assert!(validate_team_number("-1").is_some());
        assert!(validate_team_number("12a").is_some());
    }

    // ─── Setters ──────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn set_then_get_round_trips_every_field() {
        let dir = TempDir::new().unwrap();
        let (prefs, _, _) = store_with(&dir, ScriptedHost::default(), MemoryOverlay::default()).await;

        prefs.set_current_language("java").await.unwrap();
        prefs.set_project_year("2024").await.unwrap();
        prefs.set_enable_cpp_intellisense(true).await.unwrap();
        prefs.set_team_number(190).await.unwrap();

        assert_eq!(prefs.current_language().await, "java");
        assert_eq!(prefs.project_year().await, "2024");
        assert!(prefs.enable_cpp_intellisense().await);
        assert_eq!(prefs.document().await.team_number, 190);
    }

    // ─── Overlay pass-throughs ────────────────────────────────────────────────

    #[tokio::test]
    async fn overlay_reads_fall_back_to_documented_defaults() {
        let dir = TempDir::new().unwrap();
        let (prefs, _, _) = store_with(&dir, ScriptedHost::default(), MemoryOverlay::default()).await;

        assert!(!prefs.auto_start_rio_log().await);
        assert!(!prefs.online().await);
        assert!(!prefs.skip_tests().await);
        assert!(!prefs.auto_save_on_deploy().await);
        assert!(!prefs.stop_simulation_on_entry().await);
        assert_eq!(prefs.additional_gradle_arguments().await, "");
    }

    #[tokio::test]
    async fn overlay_writes_carry_the_requested_scope() {
        let dir = TempDir::new().unwrap();
        let (prefs, _, overlay) =
            store_with(&dir, ScriptedHost::default(), MemoryOverlay::default()).await;

        prefs
            .set_skip_tests(true, SettingsScope::Global)
            .await
            .unwrap();
        prefs
            .set_online(true, SettingsScope::WorkspaceFolder)
            .await
            .unwrap();

        let writes = overlay.writes.lock().unwrap().clone();
        assert_eq!(
            writes,
            vec![
                ("wpilib.skipTests".to_string(), true, SettingsScope::Global),
                (
                    "wpilib.online".to_string(),
                    true,
                    SettingsScope::WorkspaceFolder
                ),
            ]
        );
    }

    // ─── Bulk settings picker ─────────────────────────────────────────────────

    const PICKER_MANIFEST: &str = r#"{
        "contributes": {
            "configuration": {
                "properties": {
                    "wpilib.a": {
                        "type": "boolean",
                        "printName": "A",
                        "description": "setting a",
                        "default": false
                    },
                    "wpilib.b": {
                        "type": "boolean",
                        "printName": "B",
                        "description": "setting b",
                        "default": false
                    }
                }
            }
        }
    }"#;

    async fn picker_store(
        dir: &TempDir,
        host: ScriptedHost,
        overlay: MemoryOverlay,
    ) -> (Preferences, Arc<MemoryOverlay>) {
        std::fs::write(dir.path().join("package.json"), PICKER_MANIFEST).unwrap();
        let overlay = Arc::new(overlay);
        let prefs = Preferences::create(
            dir.path(),
            &ExtensionContext::new(dir.path()),
            Arc::clone(&overlay) as Arc<dyn SettingsOverlay>,
            Arc::new(host) as Arc<dyn HostBridge>,
        )
        .await
        .unwrap();
        (prefs, overlay)
    }

    #[tokio::test]
    async fn bulk_picker_writes_only_the_deltas() {
        let dir = TempDir::new().unwrap();
        // Prior state: a picked, b unpicked. Selection toggles both.
        let host = ScriptedHost {
            pick_keys: Some(vec!["wpilib.b"]),
            ..Default::default()
        };
        let overlay = MemoryOverlay::with_bools(&[("wpilib.a", true), ("wpilib.b", false)]);
        let (prefs, overlay) = picker_store(&dir, host, overlay).await;

        prefs
            .update_bulk_settings(SettingsScope::WorkspaceFolder)
            .await
            .unwrap();

        let writes = overlay.writes.lock().unwrap().clone();
        assert_eq!(
            writes,
            vec![
                (
                    "wpilib.a".to_string(),
                    false,
                    SettingsScope::WorkspaceFolder
                ),
                ("wpilib.b".to_string(), true, SettingsScope::WorkspaceFolder),
            ]
        );
    }

    #[tokio::test]
    async fn bulk_picker_skips_unchanged_settings() {
        let dir = TempDir::new().unwrap();
        // Prior state matches the selection exactly; nothing to write.
        let host = ScriptedHost {
            pick_keys: Some(vec!["wpilib.a"]),
            ..Default::default()
        };
        let overlay = MemoryOverlay::with_bools(&[("wpilib.a", true), ("wpilib.b", false)]);
        let (prefs, overlay) = picker_store(&dir, host, overlay).await;

        prefs
            .update_bulk_settings(SettingsScope::Global)
            .await
            .unwrap();
        assert!(overlay.writes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn bulk_picker_dismissal_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let host = ScriptedHost {
            pick_keys: None,
            ..Default::default()
        };
        let overlay = MemoryOverlay::with_bools(&[("wpilib.a", true)]);
        let (prefs, overlay) = picker_store(&dir, host, overlay).await;

        prefs
            .update_bulk_settings(SettingsScope::Global)
            .await
            .unwrap();
        assert!(overlay.writes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn bulk_picker_uses_manifest_defaults_when_settings_are_unset() {
        let dir = TempDir::new().unwrap();
        // Neither setting exists in the overlay; defaults (false) apply, so
        // selecting b writes only b.
        let host = ScriptedHost {
            pick_keys: Some(vec!["wpilib.b"]),
            ..Default::default()
        };
        let (prefs, overlay) = picker_store(&dir, host, MemoryOverlay::default()).await;

        prefs
            .update_bulk_settings(SettingsScope::Global)
            .await
            .unwrap();
        let writes = overlay.writes.lock().unwrap().clone();
        assert_eq!(
            writes,
            vec![("wpilib.b".to_string(), true, SettingsScope::Global)]
        );
    }

    // ─── Classification ───────────────────────────────────────────────────────

    #[tokio::test]
    async fn classification_flag_is_pushed_at_create() {
        let dir = TempDir::new().unwrap();
        let (prefs, host, _) = store_with(&dir, ScriptedHost::default(), MemoryOverlay::default()).await;

        assert!(!prefs.is_wpilib_project().await);
        assert_eq!(
            host.flags.lock().unwrap().as_slice(),
            &[(IS_WPILIB_PROJECT_FLAG.to_string(), false)]
        );
    }

    #[tokio::test]
    async fn dispose_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let (mut prefs, _, _) =
            store_with(&dir, ScriptedHost::default(), MemoryOverlay::default()).await;
        prefs.dispose();
        prefs.dispose();
        assert_eq!(prefs.current_language().await, "none");
    }
}

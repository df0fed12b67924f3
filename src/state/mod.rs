// Settings state module
//
// This module provides the SettingsManager which owns the plugin settings together
// with the views derived from them, regenerates those views on every mutation, and
// emits change events for interested components.

use crate::filters::{RuntimeExportSettings, convert_all_to_runtime};
use crate::models::{
    ExportSettings, PluginSettings, VaultEntry, VaultFile, is_supported_content_file,
};
use indexmap::IndexSet;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::broadcast;

/// Change events emitted when settings are modified
///
/// These events let components that cache settings-dependent data (file menus,
/// rename/delete trackers) refresh without polling.
#[derive(Clone, Debug, PartialEq)]
pub enum SettingsChange {
    /// The auto export rule list changed and was recompiled
    AutoExportsChanged { rules: usize, active: usize },

    /// The export menu format list changed
    ExportFormatsChanged { formats: usize },

    /// The rendered format list changed
    SupportedFormatsChanged { formats: usize },

    /// The instant export rule changed
    InstantExportChanged,

    /// One of the feature toggles changed
    TogglesChanged,

    /// The whole settings object was replaced
    SettingsReplaced,
}

/// Settings together with everything derived from them.
///
/// Only ever touched while holding the manager's lock, so readers never observe
/// settings and derived views out of step.
#[derive(Debug)]
struct SettingsState {
    settings: PluginSettings,

    /// Lower-case formats the embed patcher renders.
    runtime_supported_formats: IndexSet<String>,

    /// Compiled auto export rules in configured order.
    runtime_auto_exports: Vec<Arc<RuntimeExportSettings>>,

    /// Export menu formats in both lower and upper case.
    runtime_export_supported_formats: IndexSet<String>,
}

impl SettingsState {
    fn new(settings: PluginSettings) -> Self {
        let mut state = Self {
            runtime_supported_formats: lowercase_set(&settings.supported_formats),
            settings,
            runtime_auto_exports: Vec::new(),
            runtime_export_supported_formats: IndexSet::new(),
        };
        state.regenerate();
        state
    }

    fn regenerate(&mut self) {
        self.runtime_auto_exports = convert_all_to_runtime(&self.settings);
        self.runtime_export_supported_formats = self
            .settings
            .export_menu_supported_formats
            .iter()
            .flat_map(|format| [format.to_lowercase(), format.to_uppercase()])
            .collect();

        tracing::debug!(
            "Regenerated runtime settings: {} auto exports, {} export formats",
            self.runtime_auto_exports.len(),
            self.runtime_export_supported_formats.len()
        );
    }
}

fn lowercase_set<'a>(formats: impl IntoIterator<Item = &'a String>) -> IndexSet<String> {
    formats
        .into_iter()
        .map(|format| format.trim_start_matches('.').to_lowercase())
        .collect()
}

/// Owner of the plugin settings and their derived views
///
/// This is the central settings component that:
/// - Owns the [`PluginSettings`] instance; there is no global settings object
/// - Compiles auto export rules into [`RuntimeExportSettings`] and caches them
/// - Regenerates every derived view synchronously inside [`update()`](Self::update)
/// - Emits [`SettingsChange`] events via a tokio broadcast channel
///
/// # Usage
///
/// - [`read()`](Self::read) for reading settings
/// - [`update()`](Self::update) for mutations; derived views are current when it returns
/// - [`find_runtime_auto_exports()`](Self::find_runtime_auto_exports) and
///   [`is_export_supported_format()`](Self::is_export_supported_format) from hot paths
///
/// `Clone` produces an independent deep copy; see [`deep_clone()`](Self::deep_clone).
pub struct SettingsManager {
    state: RwLock<SettingsState>,

    /// Broadcast channel for emitting settings change events
    change_tx: broadcast::Sender<SettingsChange>,
}

impl SettingsManager {
    /// Create a manager owning `settings` and derive its runtime views
    pub fn new(settings: PluginSettings) -> Self {
        let (change_tx, _) = broadcast::channel(100);
        Self {
            state: RwLock::new(SettingsState::new(settings)),
            change_tx,
        }
    }

    fn read_state(&self) -> RwLockReadGuard<'_, SettingsState> {
        if self.state.is_poisoned() {
            // Taking the write lock repairs the derived views
            drop(self.write_state());
        }
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Lock the state for writing, recovering from a panic in an earlier writer
    ///
    /// A recovered state gets its derived views rebuilt from the settings it
    /// holds before the guard is handed out.
    fn write_state(&self) -> RwLockWriteGuard<'_, SettingsState> {
        match self.state.write() {
            Ok(state) => state,
            Err(poisoned) => {
                let mut state = poisoned.into_inner();
                tracing::warn!("Settings lock was poisoned by a panicking writer, regenerating");
                state.regenerate();
                state.runtime_supported_formats = lowercase_set(&state.settings.supported_formats);
                self.state.clear_poison();
                state
            }
        }
    }

    /// Execute a function with read access to the settings
    ///
    /// # Example
    /// ```ignore
    /// let track = manager.read(|settings| settings.track_rename);
    /// ```
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&PluginSettings) -> R,
    {
        let state = self.read_state();
        f(&state.settings)
    }

    /// Mutate the settings, regenerate derived views and emit change events
    ///
    /// Regeneration finishes before this returns, so callers on synchronous hot
    /// paths always observe views matching the new settings.
    ///
    /// # Returns
    /// The SettingsChange events that were emitted
    pub fn update<F>(&self, update_fn: F) -> Vec<SettingsChange>
    where
        F: FnOnce(&mut PluginSettings),
    {
        let changes = {
            let mut state = self.write_state();

            // Committed only if the closure returns
            let mut updated = state.settings.clone();
            update_fn(&mut updated);
            let old = std::mem::replace(&mut state.settings, updated);

            let changes = detect_changes(&old, &state.settings);
            if changes.iter().any(|c| {
                matches!(
                    c,
                    SettingsChange::AutoExportsChanged { .. }
                        | SettingsChange::ExportFormatsChanged { .. }
                )
            }) {
                state.regenerate();
            }
            if changes
                .iter()
                .any(|c| matches!(c, SettingsChange::SupportedFormatsChanged { .. }))
            {
                state.runtime_supported_formats = lowercase_set(&state.settings.supported_formats);
            }
            changes
        };

        for change in &changes {
            // Ignore send errors - it's OK if no one is listening
            let _ = self.change_tx.send(change.clone());
        }

        changes
    }

    /// Replace the whole settings object, e.g. after reloading it from disk
    pub fn replace(&self, settings: PluginSettings) -> Vec<SettingsChange> {
        let mut changes = self.update(|current| *current = settings);

        let replaced = SettingsChange::SettingsReplaced;
        let _ = self.change_tx.send(replaced.clone());
        changes.push(replaced);

        changes
    }

    /// Rebuild every derived view from the current settings
    ///
    /// Idempotent: regenerating twice yields the same behaviour as once.
    pub fn regenerate(&self) {
        self.write_state().regenerate();
    }

    /// Subscribe to settings change events
    pub fn subscribe(&self) -> broadcast::Receiver<SettingsChange> {
        self.change_tx.subscribe()
    }

    /// Independent copy with its own settings and freshly compiled rules
    ///
    /// Compiled rules are rebuilt rather than shared. The runtime supported
    /// format set is copied as a distinct, equal set because it may hold an
    /// override that is not part of the settings.
    pub fn deep_clone(&self) -> Self {
        let (settings, runtime_formats) = {
            let state = self.read_state();
            (state.settings.clone(), state.runtime_supported_formats.clone())
        };

        let cloned = Self::new(settings);
        cloned.write_state().runtime_supported_formats = runtime_formats;
        cloned
    }

    /// Deep copy of the current settings
    pub fn settings_clone(&self) -> PluginSettings {
        self.read_state().settings.clone()
    }

    pub fn instant_export(&self) -> ExportSettings {
        self.read_state().settings.instant_export.clone()
    }

    pub fn supported_formats(&self) -> Vec<String> {
        self.read_state().settings.supported_formats.clone()
    }

    pub fn runtime_supported_formats(&self) -> IndexSet<String> {
        self.read_state().runtime_supported_formats.clone()
    }

    /// Override the set of formats the embed patcher renders
    ///
    /// Formats are stored lower-cased. The override lasts until
    /// `supported_formats` itself changes.
    pub fn set_runtime_supported_formats<I, S>(&self, formats: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let formats = formats
            .into_iter()
            .map(|format| format.as_ref().trim_start_matches('.').to_lowercase())
            .collect();
        self.write_state().runtime_supported_formats = formats;
    }

    /// Narrow `entry` to a file the embed patcher can render
    pub fn supported_content_file(&self, entry: &VaultEntry) -> Option<VaultFile> {
        let state = self.read_state();
        is_supported_content_file(entry, &state.runtime_supported_formats).cloned()
    }

    /// Whether files with extension `ext` can be exported from the file menu
    ///
    /// `None` and the empty string are never supported.
    pub fn is_export_supported_format(&self, ext: Option<&str>) -> bool {
        match ext {
            Some(ext) if !ext.is_empty() => self
                .read_state()
                .runtime_export_supported_formats
                .contains(&ext.to_lowercase()),
            _ => false,
        }
    }

    /// All compiled auto export rules, active or not, in configured order
    pub fn runtime_auto_exports(&self) -> Vec<Arc<RuntimeExportSettings>> {
        self.read_state().runtime_auto_exports.clone()
    }

    /// Active auto export rules whose source filters accept `entry`
    ///
    /// Directories never match.
    pub fn find_runtime_auto_exports(&self, entry: &VaultEntry) -> Vec<Arc<RuntimeExportSettings>> {
        let Some(file) = entry.as_file() else {
            return Vec::new();
        };

        self.read_state()
            .runtime_auto_exports
            .iter()
            .filter(|runtime| runtime.accepts(file))
            .cloned()
            .collect()
    }
}

/// Detect what changed between two settings objects and generate events
fn detect_changes(old: &PluginSettings, new: &PluginSettings) -> Vec<SettingsChange> {
    let mut changes = Vec::new();

    if old.auto_export_list != new.auto_export_list {
        changes.push(SettingsChange::AutoExportsChanged {
            rules: new.auto_export_list.len(),
            active: new.auto_export_list.iter().filter(|r| r.active).count(),
        });
    }

    if old.export_menu_supported_formats != new.export_menu_supported_formats {
        changes.push(SettingsChange::ExportFormatsChanged {
            formats: new.export_menu_supported_formats.len(),
        });
    }

    if old.supported_formats != new.supported_formats {
        changes.push(SettingsChange::SupportedFormatsChanged {
            formats: new.supported_formats.len(),
        });
    }

    if old.instant_export != new.instant_export {
        changes.push(SettingsChange::InstantExportChanged);
    }

    if old.render_markdown_inline_link != new.render_markdown_inline_link
        || old.render_markdown_img_tag != new.render_markdown_img_tag
        || old.override_drag_and_drop != new.override_drag_and_drop
        || old.use_blob != new.use_blob
        || old.excalidraw_stretch_embed != new.excalidraw_stretch_embed
        || old.track_rename != new.track_rename
        || old.track_delete != new.track_delete
        || old.preview_link != new.preview_link
        || old.support_md_image_size_format != new.support_md_image_size_format
    {
        changes.push(SettingsChange::TogglesChanged);
    }

    changes
}

impl Default for SettingsManager {
    fn default() -> Self {
        Self::new(PluginSettings::default())
    }
}

impl Clone for SettingsManager {
    fn clone(&self) -> Self {
        self.deep_clone()
    }
}

impl std::fmt::Debug for SettingsManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsManager")
            .field("state", &*self.read_state())
            .finish_non_exhaustive()
    }
}

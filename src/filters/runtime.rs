use std::sync::Arc;

use super::source::SourceFilter;
use crate::models::{ExportSettings, PluginSettings, VaultFile};

/// An export rule paired with its compiled source filter.
///
/// Never persisted. Rebuilt from [`ExportSettings`] whenever the settings change.
#[derive(Debug, Clone)]
pub struct RuntimeExportSettings {
    pub settings: ExportSettings,
    source_filter: SourceFilter,
}

impl RuntimeExportSettings {
    pub fn new(settings: ExportSettings) -> Self {
        let source_filter = SourceFilter::compile(&settings.path_opts);
        Self {
            settings,
            source_filter,
        }
    }

    pub fn name(&self) -> &str {
        &self.settings.name
    }

    /// Whether `file` is selected by this rule's source filters.
    ///
    /// Ignores the rule's `active` flag; see [`Self::accepts`].
    pub fn source_filter_matches(&self, file: &VaultFile) -> bool {
        self.source_filter.matches(file)
    }

    /// Whether this rule is active and selects `file`.
    pub fn accepts(&self, file: &VaultFile) -> bool {
        self.settings.active && self.source_filter.matches(file)
    }
}

/// Compile every rule of `settings.auto_export_list`, keeping configured order.
pub fn convert_all_to_runtime(settings: &PluginSettings) -> Vec<Arc<RuntimeExportSettings>> {
    settings
        .auto_export_list
        .iter()
        .cloned()
        .map(|rule| Arc::new(RuntimeExportSettings::new(rule)))
        .collect()
}

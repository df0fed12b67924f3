use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexSet;

use super::compiled::CompiledFilter;
use crate::models::{ExportPath, FileFilterType, VaultFile};

/// The compiled source selection of one export rule.
///
/// Built once from an [`ExportPath`] and applied to every candidate file.
/// All checks must pass for a file to match.
#[derive(Debug, Clone)]
pub struct SourceFilter {
    source_dir: Utf8PathBuf,
    recursive: bool,
    /// Lower-case extensions without the leading dot; empty allows any.
    extensions: IndexSet<String>,
    filters: Vec<CompiledFilter>,
}

impl SourceFilter {
    pub fn compile(opts: &ExportPath) -> Self {
        let extensions = opts
            .source_exts
            .iter()
            .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();

        let mut filters = Vec::new();

        if opts.use_built_in_source_filters {
            for built_in in opts.built_in_source_filters.iter().filter(|f| f.active) {
                match built_in.filter_type {
                    FileFilterType::DoubleExtsBlocker => {
                        filters.push(CompiledFilter::double_exts_blocker())
                    }
                    other => tracing::debug!("Ignoring built-in filter of type {:?}", other),
                }
            }
        }

        filters.extend(
            opts.source_filters
                .iter()
                .filter(|f| f.active)
                .map(CompiledFilter::compile_or_reject),
        );

        Self {
            source_dir: Utf8PathBuf::from(opts.source_dir.trim().trim_matches('/')),
            recursive: opts.recursive_sources,
            extensions,
            filters,
        }
    }

    pub fn matches(&self, file: &VaultFile) -> bool {
        self.in_source_dir(file)
            && self.has_allowed_extension(file)
            && self.filters.iter().all(|f| f.matches(file.path()))
    }

    fn in_source_dir(&self, file: &VaultFile) -> bool {
        if self.recursive {
            self.source_dir.as_str().is_empty() || file.path().starts_with(&self.source_dir)
        } else {
            file.parent().unwrap_or_else(|| Utf8Path::new("")) == self.source_dir.as_path()
        }
    }

    fn has_allowed_extension(&self, file: &VaultFile) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        file.extension()
            .is_some_and(|ext| self.extensions.contains(&ext.to_lowercase()))
    }
}

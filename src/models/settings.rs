use serde::{Deserialize, Serialize};

use super::export::ExportSettings;

/// Formats offered in the export menu by default.
pub const DEFAULT_EXPORT_SUPPORTED_FORMATS: &[&str] = &[
    "psd", "xcf", "tif", "tiff", "dcm", "dds", "hdr", "heic", "mng", "pbm", "pcx", "pfm", "pgm",
    "pnm", "ppm", "sgi", "xbm", "avif", "jpg", "png", "bmp", "webp", "gif",
];

/// Formats rendered by the plugin by default.
///
/// Formats the host already displays natively (avif, jpg, png, webp) are left out.
pub const DEFAULT_SUPPORTED_FORMATS: &[&str] = &[
    "psd", "xcf", "tif", "tiff", "dcm", "dds", "hdr", "heic", "mng", "pbm", "pcx", "pfm", "pgm",
    "pnm", "ppm", "sgi", "xbm",
];

fn to_owned_list(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Top-level persisted plugin configuration.
///
/// Every field has a default so older settings files load with the new
/// fields filled in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PluginSettings {
    pub supported_formats: Vec<String>,
    pub export_menu_supported_formats: Vec<String>,

    pub auto_export_list: Vec<ExportSettings>,
    pub instant_export: ExportSettings,

    pub render_markdown_inline_link: bool,
    pub render_markdown_img_tag: bool,
    pub override_drag_and_drop: bool,
    pub use_blob: bool,

    pub excalidraw_stretch_embed: bool,

    pub track_rename: bool,
    pub track_delete: bool,

    pub preview_link: bool,
    /// Honour the `[[IMAGE|SIZE]]` image size syntax.
    pub support_md_image_size_format: bool,
}

impl Default for PluginSettings {
    fn default() -> Self {
        Self {
            supported_formats: to_owned_list(DEFAULT_SUPPORTED_FORMATS),
            export_menu_supported_formats: to_owned_list(DEFAULT_EXPORT_SUPPORTED_FORMATS),
            auto_export_list: Vec::new(),
            instant_export: ExportSettings::default(),
            render_markdown_inline_link: true,
            render_markdown_img_tag: true,
            override_drag_and_drop: true,
            use_blob: true,
            excalidraw_stretch_embed: true,
            track_rename: true,
            track_delete: true,
            preview_link: true,
            support_md_image_size_format: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plugin_settings_defaults() {
        let settings = PluginSettings::default();
        assert!(settings.auto_export_list.is_empty());
        assert!(settings.track_rename);
        assert!(settings.support_md_image_size_format);
        assert!(settings.supported_formats.contains(&"psd".to_string()));
        assert!(!settings.supported_formats.contains(&"png".to_string()));
        assert!(
            settings
                .export_menu_supported_formats
                .contains(&"png".to_string())
        );
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let yaml = "trackRename: false\nsupportedFormats: [psd]\n";
        let settings: PluginSettings = serde_yaml_ng::from_str(yaml).unwrap();

        assert!(!settings.track_rename);
        assert!(settings.track_delete);
        assert_eq!(settings.supported_formats, vec!["psd".to_string()]);
        assert_eq!(
            settings.export_menu_supported_formats.len(),
            DEFAULT_EXPORT_SUPPORTED_FORMATS.len()
        );
        assert_eq!(settings.instant_export.path_opts.export_dir_abs, "Exported Images");
    }

    #[test]
    fn test_partial_rule_takes_defaults() {
        let yaml = r#"
autoExportList:
  - name: psd to png
    active: true
    pathOpts:
      sourceDir: Art
      sourceFilters:
        - active: true
          type: 2
          content: "^Art/"
"#;
        let settings: PluginSettings = serde_yaml_ng::from_str(yaml).unwrap();
        let rule = &settings.auto_export_list[0];

        assert_eq!(rule.name, "psd to png");
        assert!(rule.active);
        assert_eq!(rule.format.ext, "png");
        assert_eq!(rule.path_opts.source_dir, "Art");
        assert!(rule.path_opts.use_built_in_source_filters);
        assert_eq!(rule.path_opts.source_filters[0].flags, "");
        assert!(!rule.path_opts.source_filters[0].is_reversed);
    }
}

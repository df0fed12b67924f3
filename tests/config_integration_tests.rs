//! Integration tests for ConfigManager and settings file handling
//!
//! These tests verify:
//! - Settings loading and saving
//! - Default settings when the file is missing
//! - Defaults merged into partial files
//! - Integration with SettingsManager

use camino::Utf8PathBuf;
use imgexport::models::{FileFilterType, ImageSize, SizeAdjustType, TextFilter};
use imgexport::{ConfigManager, ExportSettings, PluginSettings, SettingsManager, VaultEntry};
use std::fs;
use tempfile::TempDir;

fn create_test_config_dir() -> (TempDir, Utf8PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let config_path = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    (temp_dir, config_path)
}

fn sample_rule() -> ExportSettings {
    let mut rule = ExportSettings {
        name: "Art to webp".to_string(),
        active: true,
        ..ExportSettings::default()
    };
    rule.format.ext = "webp".to_string();
    rule.format.mime_type = "image/webp".to_string();
    rule.format.display = "webp".to_string();
    rule.img_props.quality = 0.8;
    rule.img_props.size_adjustments.push(ImageSize {
        x: Some(1024.0),
        y: None,
        adjust_type: SizeAdjustType::Maximum,
    });
    rule.path_opts.source_dir = "Art".to_string();
    rule.path_opts.recursive_sources = true;
    rule.path_opts.source_exts = vec!["psd".to_string(), "xcf".to_string()];
    rule.path_opts.source_filters.push(TextFilter {
        flags: "i".to_string(),
        is_reversed: true,
        ..TextFilter::new(FileFilterType::Includes, "draft")
    });
    rule
}

#[test]
fn test_create_config_manager() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path).unwrap();

    assert_eq!(manager.config_dir(), config_path.as_path());
}

#[test]
fn test_load_default_settings() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path).unwrap();

    // Settings file doesn't exist, should return defaults
    let settings = manager.load_settings().unwrap();

    assert!(settings.auto_export_list.is_empty());
    assert!(settings.render_markdown_inline_link);
    assert!(settings.export_menu_supported_formats.contains(&"gif".to_string()));
}

#[test]
fn test_save_and_load_settings() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path).unwrap();

    let mut settings = PluginSettings::default();
    settings.auto_export_list.push(sample_rule());
    settings.override_drag_and_drop = false;

    manager.save_settings(&settings).unwrap();
    let loaded = manager.load_settings().unwrap();

    assert_eq!(loaded, settings);
}

#[test]
fn test_saved_file_uses_camel_case_keys() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path).unwrap();

    manager.init_settings().unwrap();
    let contents = fs::read_to_string(manager.settings_path()).unwrap();

    assert!(contents.contains("exportMenuSupportedFormats:"));
    assert!(contents.contains("useBuiltInSourceFilters: true"));
    assert!(contents.contains("exportDirAbs: Exported Images"));
}

#[test]
fn test_partial_settings_file_merges_defaults() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path).unwrap();

    let content = r#"
trackDelete: false
exportMenuSupportedFormats: [psd, tiff]
autoExportList:
  - name: scans
    active: true
    pathOpts:
      sourceDir: Scans
      sourceExts: [tiff]
"#;
    fs::write(manager.settings_path(), content).unwrap();

    let settings = manager.load_settings().unwrap();

    assert!(!settings.track_delete);
    assert!(settings.track_rename);
    assert_eq!(settings.auto_export_list[0].format.ext, "png");
    assert_eq!(
        settings.auto_export_list[0].path_opts.custom_file_name_format,
        "${name}.${ext}.export.${dst_ext}"
    );
}

#[test]
fn test_config_integration_with_settings_manager() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path).unwrap();

    let mut settings = PluginSettings::default();
    settings.auto_export_list.push(sample_rule());
    manager.save_settings(&settings).unwrap();

    let settings = SettingsManager::new(manager.load_settings().unwrap());

    let found = settings.find_runtime_auto_exports(&VaultEntry::file("Art/2024/cover.PSD", 0));
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name(), "Art to webp");

    // The reversed "draft" include rejects drafts in any case
    assert!(
        settings
            .find_runtime_auto_exports(&VaultEntry::file("Art/DRAFT-cover.psd", 0))
            .is_empty()
    );
    // Not in the extension allow-list
    assert!(
        settings
            .find_runtime_auto_exports(&VaultEntry::file("Art/cover.png", 0))
            .is_empty()
    );

    let file = VaultEntry::file("Art/2024/cover.PSD", 0);
    assert_eq!(
        found[0].settings.export_destination(file.as_file().unwrap()),
        Utf8PathBuf::from("Exported Images/cover.PSD.export.webp")
    );
}

#[test]
fn test_invalid_yaml_handling() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path).unwrap();

    fs::write(manager.settings_path(), "invalid: yaml: content: {{").unwrap();

    let result = manager.load_settings();
    assert!(result.is_err(), "Should fail to parse invalid YAML");
}

#[test]
fn test_malformed_filter_entry_keeps_other_rules() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path).unwrap();

    let content = r#"
autoExportList:
  - name: healthy
    active: true
    pathOpts:
      recursiveSources: true
  - name: future
    active: true
    pathOpts:
      recursiveSources: true
      sourceFilters:
        - active: true
          type: 9
          content: x
  - name: sparse
    active: true
    pathOpts:
      recursiveSources: true
      sourceFilters:
        - content: Art/
"#;
    fs::write(manager.settings_path(), content).unwrap();

    let loaded = manager.load_settings().unwrap();
    assert_eq!(loaded.auto_export_list.len(), 3);
    assert_eq!(
        loaded.auto_export_list[1].path_opts.source_filters[0].filter_type,
        FileFilterType::Unknown(9)
    );

    let settings = SettingsManager::new(loaded);
    let names = |path: &str| -> Vec<String> {
        settings
            .find_runtime_auto_exports(&VaultEntry::file(path, 0))
            .iter()
            .map(|r| r.name().to_string())
            .collect()
    };

    // The unknown filter only disables its own rule
    assert_eq!(names("Art/a.psd"), vec!["healthy", "sparse"]);
    assert_eq!(names("Notes/a.psd"), vec!["healthy"]);
}

//! Integration tests for SettingsManager and rule derivation
//!
//! These tests verify:
//! - Export menu format lookups are case-insensitive
//! - Source directory, extension and text filters select the right files
//! - Derived views follow every settings mutation
//! - Deep clones are fully independent

use imgexport::models::{FileFilterType, TextFilter};
use imgexport::{ExportSettings, PluginSettings, SettingsChange, SettingsManager, VaultEntry};
use proptest::prelude::*;

fn rule(name: &str, source_dir: &str, recursive: bool) -> ExportSettings {
    let mut rule = ExportSettings {
        name: name.to_string(),
        active: true,
        ..ExportSettings::default()
    };
    rule.path_opts.source_dir = source_dir.to_string();
    rule.path_opts.recursive_sources = recursive;
    rule
}

fn manager_with(rules: Vec<ExportSettings>) -> SettingsManager {
    SettingsManager::new(PluginSettings {
        auto_export_list: rules,
        ..PluginSettings::default()
    })
}

fn matches(manager: &SettingsManager, path: &str) -> Vec<String> {
    manager
        .find_runtime_auto_exports(&VaultEntry::file(path, 0))
        .iter()
        .map(|r| r.name().to_string())
        .collect()
}

#[test]
fn test_non_recursive_source_dir() {
    let manager = manager_with(vec![rule("images", "Images", false)]);

    assert!(matches(&manager, "Images/Sub/pic.png").is_empty());
    assert_eq!(matches(&manager, "Images/pic.png"), vec!["images"]);
}

#[test]
fn test_recursive_source_dir() {
    let manager = manager_with(vec![rule("images", "Images", true)]);

    assert_eq!(matches(&manager, "Images/Sub/pic.png"), vec!["images"]);
    assert_eq!(matches(&manager, "Images/pic.png"), vec!["images"]);
}

#[test]
fn test_double_exts_blocker() {
    let manager = manager_with(vec![rule("all", "", true)]);

    assert!(matches(&manager, "photo.png.export.png").is_empty());
    assert_eq!(matches(&manager, "photo.png"), vec!["all"]);
}

#[test]
fn test_regex_match_filter_and_reversal() {
    let mut assets = rule("assets", "", true);
    assets
        .path_opts
        .source_filters
        .push(TextFilter::new(FileFilterType::RegexMatch, "^assets/"));
    let manager = manager_with(vec![assets]);

    assert_eq!(matches(&manager, "assets/a.png"), vec!["assets"]);
    assert!(matches(&manager, "other/a.png").is_empty());

    manager.update(|s| s.auto_export_list[0].path_opts.source_filters[0].is_reversed = true);

    assert!(matches(&manager, "assets/a.png").is_empty());
    assert_eq!(matches(&manager, "other/a.png"), vec!["assets"]);
}

#[test]
fn test_bad_rule_does_not_disable_other_rules() {
    let mut broken = rule("broken", "", true);
    broken.path_opts.source_filters.push(TextFilter {
        flags: "q".to_string(),
        ..TextFilter::new(FileFilterType::RegexMatch, ".*")
    });
    let manager = manager_with(vec![broken, rule("healthy", "", true)]);

    assert_eq!(matches(&manager, "a.psd"), vec!["healthy"]);
}

#[test]
fn test_clone_mutation_leaves_original_untouched() {
    let original = manager_with(vec![rule("a", "", true), rule("b", "Art", false)]);
    let before = matches(&original, "Art/x.psd");

    let cloned = original.deep_clone();
    cloned.update(|s| {
        s.auto_export_list.remove(0);
        s.auto_export_list[0].path_opts.source_dir = "Elsewhere".to_string();
    });

    assert_eq!(matches(&original, "Art/x.psd"), before);
    assert!(matches(&cloned, "Art/x.psd").is_empty());
}

#[test]
fn test_update_events_reach_subscribers() {
    let manager = SettingsManager::default();
    let mut rx = manager.subscribe();

    manager.update(|s| {
        s.auto_export_list.push(rule("new", "", true));
        s.export_menu_supported_formats.push("svg".to_string());
    });

    assert_eq!(
        rx.try_recv().unwrap(),
        SettingsChange::AutoExportsChanged {
            rules: 1,
            active: 1
        }
    );
    assert!(matches!(
        rx.try_recv().unwrap(),
        SettingsChange::ExportFormatsChanged { .. }
    ));
    assert!(manager.is_export_supported_format(Some("SVG")));
}

proptest! {
    #[test]
    fn prop_export_format_lookup_ignores_case(ext in "[a-zA-Z]{1,6}") {
        let manager = SettingsManager::default();
        let as_is = manager.is_export_supported_format(Some(&ext));

        prop_assert_eq!(as_is, manager.is_export_supported_format(Some(&ext.to_uppercase())));
        prop_assert_eq!(as_is, manager.is_export_supported_format(Some(&ext.to_lowercase())));
    }

    #[test]
    fn prop_configured_formats_are_found_in_any_case(ext in "[a-zA-Z]{1,6}") {
        let manager = SettingsManager::new(PluginSettings {
            export_menu_supported_formats: vec![ext.clone()],
            ..PluginSettings::default()
        });

        prop_assert!(manager.is_export_supported_format(Some(&ext.to_lowercase())));
        prop_assert!(manager.is_export_supported_format(Some(&ext.to_uppercase())));
    }

    #[test]
    fn prop_regeneration_is_idempotent(
        dirs in proptest::collection::vec("[A-C]{0,1}", 1..4),
        recursive in proptest::collection::vec(any::<bool>(), 4),
        paths in proptest::collection::vec("([A-C]/){0,2}[a-c]{1,3}\\.(png|psd)", 1..8),
    ) {
        let rules = dirs
            .iter()
            .enumerate()
            .map(|(i, dir)| rule(&format!("r{i}"), dir, recursive[i % recursive.len()]))
            .collect();
        let manager = manager_with(rules);

        let once: Vec<_> = paths.iter().map(|p| matches(&manager, p)).collect();
        manager.regenerate();
        manager.regenerate();
        let twice: Vec<_> = paths.iter().map(|p| matches(&manager, p)).collect();

        prop_assert_eq!(once, twice);
    }
}

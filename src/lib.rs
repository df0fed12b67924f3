// imgexport - Image export rules and live preview embed patching
//
// This is the library crate containing the settings model, the rule derivation
// engine and the embed patcher. The binary crate (main.rs) provides a CLI for
// inspecting a persisted settings file.

pub mod config;
pub mod embed;
pub mod filters;
pub mod logging;
pub mod models;
pub mod state;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use filters::RuntimeExportSettings;
pub use models::{ExportSettings, PluginSettings, VaultEntry, VaultFile};
pub use state::{SettingsChange, SettingsManager};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

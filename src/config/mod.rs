use crate::models::PluginSettings;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// File name of the persisted settings inside the config directory.
pub const SETTINGS_FILE_NAME: &str = "settings.yaml";

/// Configuration manager for loading and saving the plugin settings file.
///
/// Settings are stored as YAML with camelCase keys. Fields missing from the file
/// take their defaults when loading, so files written by older versions keep
/// working.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: Utf8PathBuf,
    settings_path: Utf8PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager with the specified configuration directory.
    ///
    /// The directory is created if it does not exist yet.
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref().to_path_buf();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {}", config_dir))?;
        }

        Ok(Self {
            settings_path: config_dir.join(SETTINGS_FILE_NAME),
            config_dir,
        })
    }

    /// Load the settings file.
    ///
    /// # Returns
    /// The loaded PluginSettings, or defaults if the file doesn't exist
    pub fn load_settings(&self) -> Result<PluginSettings> {
        if !self.settings_path.exists() {
            tracing::warn!(
                "Settings file not found at {}, using defaults",
                self.settings_path
            );
            return Ok(PluginSettings::default());
        }

        let file_contents = fs::read_to_string(&self.settings_path)
            .with_context(|| format!("Failed to read settings: {}", self.settings_path))?;

        // An empty file is a valid "all defaults" document
        if file_contents.trim().is_empty() {
            tracing::info!("Settings file {} is empty, using defaults", self.settings_path);
            return Ok(PluginSettings::default());
        }

        let settings: PluginSettings = serde_yaml_ng::from_str(&file_contents)
            .with_context(|| format!("Failed to parse settings: {}", self.settings_path))?;

        tracing::info!(
            "Loaded settings from {} ({} auto export rules)",
            self.settings_path,
            settings.auto_export_list.len()
        );
        Ok(settings)
    }

    /// Save the settings file.
    pub fn save_settings(&self, settings: &PluginSettings) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(settings).context("Failed to serialize settings to YAML")?;

        fs::write(&self.settings_path, yaml_string)
            .with_context(|| format!("Failed to write settings: {}", self.settings_path))?;

        tracing::info!("Saved settings to {}", self.settings_path);
        Ok(())
    }

    /// Write default settings unless a settings file already exists.
    ///
    /// # Returns
    /// `true` if a new file was written
    pub fn init_settings(&self) -> Result<bool> {
        if self.settings_path.exists() {
            tracing::info!("Settings file {} already exists", self.settings_path);
            return Ok(false);
        }

        self.save_settings(&PluginSettings::default())?;
        Ok(true)
    }

    /// Get the configuration directory path.
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }

    /// Get the settings file path.
    pub fn settings_path(&self) -> &Utf8Path {
        &self.settings_path
    }
}

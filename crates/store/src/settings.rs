//! Editor settings persistence
//!
//! Loads and saves the [`EditorConfig`] as pretty JSON. A missing or
//! malformed file yields the defaults.

use crate::Result;
use edit_engine::EditorConfig;
use std::path::PathBuf;

/// File name of the settings file inside the app data directory
pub const SETTINGS_FILE: &str = "editor.json";

/// Settings manager for loading, saving, and updating editor settings
pub struct SettingsManager {
    settings_path: PathBuf,
    /// Current settings (cached)
    current: EditorConfig,
}

impl SettingsManager {
    /// Create a new settings manager with the given app data directory
    pub fn new(app_data_dir: PathBuf) -> Self {
        Self {
            settings_path: app_data_dir.join(SETTINGS_FILE),
            current: EditorConfig::default(),
        }
    }

    pub fn settings_path(&self) -> &PathBuf {
        &self.settings_path
    }

    /// Load settings from disk, or return defaults if the file doesn't exist
    pub async fn load(&mut self) -> Result<&EditorConfig> {
        self.current = if tokio::fs::try_exists(&self.settings_path).await? {
            let content = tokio::fs::read_to_string(&self.settings_path).await?;
            parse_or_default(&content)
        } else {
            EditorConfig::default()
        };
        Ok(&self.current)
    }

    /// Load settings synchronously (for use during startup)
    pub fn load_sync(&mut self) -> Result<&EditorConfig> {
        self.current = if self.settings_path.exists() {
            let content = std::fs::read_to_string(&self.settings_path)?;
            parse_or_default(&content)
        } else {
            EditorConfig::default()
        };
        Ok(&self.current)
    }

    /// Save current settings to disk
    pub async fn save(&self) -> Result<()> {
        if let Some(parent) = self.settings_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(&self.current)?;
        tokio::fs::write(&self.settings_path, content).await?;
        Ok(())
    }

    pub fn save_sync(&self) -> Result<()> {
        if let Some(parent) = self.settings_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(&self.current)?;
        std::fs::write(&self.settings_path, content)?;
        Ok(())
    }

    pub fn get(&self) -> &EditorConfig {
        &self.current
    }

    /// Update settings and save to disk
    pub async fn update(&mut self, config: EditorConfig) -> Result<()> {
        self.current = config;
        self.save().await
    }

    pub fn update_sync(&mut self, config: EditorConfig) -> Result<()> {
        self.current = config;
        self.save_sync()
    }

    /// Reset settings to defaults and save
    pub async fn reset(&mut self) -> Result<&EditorConfig> {
        self.current = EditorConfig::default();
        self.save().await?;
        Ok(&self.current)
    }

    pub fn reset_sync(&mut self) -> Result<&EditorConfig> {
        self.current = EditorConfig::default();
        self.save_sync()?;
        Ok(&self.current)
    }
}

fn parse_or_default(content: &str) -> EditorConfig {
    serde_json::from_str(content).unwrap_or_else(|e| {
        tracing::warn!("Failed to parse settings file, using defaults: {}", e);
        EditorConfig::default()
    })
}

//! Application configuration

use app_fs::vpath;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub desktop: DesktopConfig,
    pub ai: AiConfig,
    pub menu: MenuConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Product alias appended to share text
    pub alias: String,
    /// Origin used to build share links
    pub origin: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            alias: "ContextShell".to_string(),
            origin: "https://localhost".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DesktopConfig {
    pub path: String,
    /// Shortcut on the desktop that stands for the file system root
    pub root_shortcut: String,
}

impl Default for DesktopConfig {
    fn default() -> Self {
        Self {
            path: "/Users/Public/Desktop".to_string(),
            root_shortcut: "My PC.url".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Initial value of the session AI flag
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuConfig {
    /// Editors offered under "Open with" for every regular file
    pub text_editors: Vec<String>,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            text_editors: vec!["MonacoEditor".to_string(), "Vim".to_string()],
        }
    }
}

impl AppConfig {
    /// Load configuration from the default location
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from `path`, falling back to defaults when absent
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            tracing::info!("Configuration loaded from {:?}", path);
            Ok(config)
        } else {
            tracing::info!("Using default configuration");
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        tracing::info!("Configuration saved to {:?}", path);
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> PathBuf {
        ProjectDirs::from("com", "ContextShell", "ContextShell")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("./config.toml"))
    }

    /// Absolute path of the root shortcut on the desktop
    pub fn root_shortcut_path(&self) -> String {
        vpath::join(&self.desktop.path, &self.desktop.root_shortcut)
    }
}

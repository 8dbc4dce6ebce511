//! Configuration for the window menu
//!
//! Loads configuration from TOML file at `~/.config/area/winmenu.toml`
//! Auto-generates default config file on first run if missing.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub menu: MenuConfig,
    pub layout: LayoutConfig,
}

impl Config {
    /// Load configuration from file, or use defaults if file doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            info!("Config file not found at {:?}, using defaults", config_path);
            // Auto-generate default config file
            if let Err(e) = Self::save_default(&config_path) {
                warn!("Failed to create default config file: {}", e);
            }
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)
            .context("Failed to read config file")?;

        let config = Self::from_toml_str(&content)?;

        info!("Configuration loaded from {:?}", config_path);
        debug!("Config: {:?}", config);

        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config file")
    }

    /// Get the path to the config file
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("area");

        Ok(config_dir.join("winmenu.toml"))
    }

    /// Save default configuration to file
    fn save_default(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }

        let toml_string = toml::to_string_pretty(&Self::default())
            .context("Failed to serialize default config")?;

        fs::write(path, toml_string)
            .context("Failed to write default config file")?;

        info!("Created default config file at {:?}", path);
        Ok(())
    }
}

/// Menu content configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuConfig {
    /// Desktop count when the window manager doesn't publish one
    pub desktop_count: u32,
    /// Desktop names when the window manager doesn't publish them
    pub desktop_names: Vec<String>,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            desktop_count: 4,
            desktop_names: Vec::new(),
        }
    }
}

/// Text layout metrics for menu sizing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Width of one label character in pixels
    pub char_width: u32,
    /// Height of a normal or submenu item in pixels
    pub item_height: u32,
    /// Height of a separator in pixels
    pub separator_height: u32,
    /// Padding around the item list in pixels
    pub padding: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            char_width: 7,
            item_height: 20,
            separator_height: 6,
            padding: 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_roundtrips() {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        assert_eq!(Config::from_toml_str(&text).unwrap(), Config::default());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config = Config::from_toml_str(
            r#"
            [menu]
            desktop_names = ["Web", "Code"]

            [layout]
            char_width = 9
            "#,
        )
        .unwrap();

        assert_eq!(config.menu.desktop_count, 4);
        assert_eq!(config.menu.desktop_names, vec!["Web", "Code"]);
        assert_eq!(config.layout.char_width, 9);
        assert_eq!(config.layout.item_height, 20);
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        assert!(Config::from_toml_str("[layout]\nchar_width = \"wide\"").is_err());
    }
}

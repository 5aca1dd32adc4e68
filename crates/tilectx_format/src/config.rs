//! Editor configuration loaded from TOML

use std::path::Path;

use serde::{Deserialize, Serialize};
use tilectx_core::{MapData, MapDefaults};
use tracing::{debug, info};

use crate::json::JsonMapStorage;
use crate::FormatError;

/// Editor settings
///
/// ```toml
/// pretty_json = true
///
/// [defaults]
/// base_context_name = "Day"
/// initial_layer_name = "Ground"
/// length = 40
/// height = 30
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Settings for newly created maps
    pub defaults: MapDefaults,
    /// Write indented map documents
    pub pretty_json: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            defaults: MapDefaults::default(),
            pretty_json: true,
        }
    }
}

impl EditorConfig {
    /// Parse and validate a configuration
    pub fn from_toml_str(content: &str) -> Result<Self, FormatError> {
        let config: EditorConfig = toml::from_str(content)?;
        config
            .defaults
            .validate()
            .map_err(|e| FormatError::InvalidFormat(e.to_string()))?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FormatError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded editor config from {:?}", path);
        Ok(config)
    }

    /// Load a configuration file, falling back to the defaults if it does not exist
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, FormatError> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("No editor config at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn to_toml_string(&self) -> Result<String, FormatError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write the configuration, creating parent directories as needed
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), FormatError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    /// Map storage matching the configured output style
    pub fn storage(&self) -> JsonMapStorage {
        JsonMapStorage::with_pretty(self.pretty_json)
    }

    /// An empty map that will be created with the configured defaults
    pub fn new_map(&self) -> MapData {
        MapData::with_defaults(self.defaults.clone())
    }
}

//! File formats for tilectx
//!
//! This crate connects the tilectx data model to the filesystem:
//! - `JsonMapStorage` - the `MapStorage` backend that reads and writes `.map.json` documents
//! - `EditorConfig` - editor settings loaded from TOML, including the defaults for new maps
//!
//! # Example
//!
//! ```rust,ignore
//! use tilectx_core::MapData;
//! use tilectx_format::{EditorConfig, JsonMapStorage};
//!
//! let config = EditorConfig::load_or_default("tilectx.toml")?;
//! let mut map = config.new_map();
//! map.load_data(&config.storage(), "village.map.json")?;
//! ```

mod config;
mod json;

pub use config::EditorConfig;
pub use json::{load_map_from_bytes, load_map_from_str, map_to_string, JsonMapStorage, MAP_EXTENSION};

use thiserror::Error;

/// Errors that can occur when reading or writing tilectx files
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("Failed to access file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Failed to write TOML: {0}")]
    TomlWrite(#[from] toml::ser::Error),
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

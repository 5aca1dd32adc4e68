//! Defaults applied when creating new map data

use serde::{Deserialize, Serialize};

use crate::error::MapError;
use crate::layer::grid_cell_count;

/// Settings used by [`MapData::create_data`](crate::MapData::create_data)
///
/// Every field falls back to its default when missing from a config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapDefaults {
    /// Name of the base context every new map starts with
    pub base_context_name: String,
    /// Name of the first tile layer
    pub initial_layer_name: String,
    /// Whether the first tile layer contributes to collision
    pub initial_layer_collision: bool,
    /// Length (in tiles) used by `create_default`
    pub length: u32,
    /// Height (in tiles) used by `create_default`
    pub height: u32,
}

impl Default for MapDefaults {
    fn default() -> Self {
        Self {
            base_context_name: "Base".to_string(),
            initial_layer_name: "Ground".to_string(),
            initial_layer_collision: true,
            length: 64,
            height: 48,
        }
    }
}

impl MapDefaults {
    /// Check that the defaults can produce a valid map
    pub fn validate(&self) -> Result<(), MapError> {
        if self.base_context_name.is_empty() || self.initial_layer_name.is_empty() {
            return Err(MapError::EmptyName);
        }
        if grid_cell_count(self.length, self.height).map_or(true, |count| count == 0) {
            return Err(MapError::InvalidDimensions {
                length: self.length,
                height: self.height,
            });
        }
        Ok(())
    }
}

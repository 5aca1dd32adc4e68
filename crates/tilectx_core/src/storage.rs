//! Flat map document exchanged with storage backends
//!
//! `MapData` keeps its invariants in a packed, shared representation. Before saving
//! it is flattened into a `MapSnapshot`; after loading, a snapshot is validated
//! and rebuilt into `MapData`. The on-disk layout belongs to the `MapStorage`
//! implementation.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::Display;
use std::path::Path;

use crate::context::{ContextId, MAX_CONTEXTS};
use crate::layer::{grid_cell_count, TileLayerProperties, TileRef};
use crate::tileset::Tileset;

/// Current snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;

/// Loads and saves map snapshots
pub trait MapStorage {
    type Error: Display;

    fn load(&self, path: &Path) -> Result<MapSnapshot, Self::Error>;

    fn save(&self, path: &Path, snapshot: &MapSnapshot) -> Result<(), Self::Error>;
}

/// One context in a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextSnapshot {
    pub name: String,
    /// Id (position + 1) of the parent context, 0 for a base context
    #[serde(default)]
    pub inherits: ContextId,
    /// Row-major tiles for each layer, in layer order
    pub layers: Vec<Vec<Option<TileRef>>>,
}

/// The complete, flattened state of a map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapSnapshot {
    pub version: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub designers: String,
    #[serde(default)]
    pub description: String,
    pub length: u32,
    pub height: u32,
    #[serde(default)]
    pub tilesets: Vec<Tileset>,
    pub layers: Vec<TileLayerProperties>,
    pub contexts: Vec<ContextSnapshot>,
}

impl MapSnapshot {
    /// Validate that the snapshot describes a consistent map
    pub fn validate(&self) -> Result<(), String> {
        if self.version > SNAPSHOT_VERSION {
            return Err(format!(
                "Unsupported map version {} (newest supported is {})",
                self.version, SNAPSHOT_VERSION
            ));
        }
        if self.length == 0 || self.height == 0 {
            return Err(format!(
                "Map dimensions must be non-zero (got {}x{})",
                self.length, self.height
            ));
        }
        let Some(cell_count) = grid_cell_count(self.length, self.height) else {
            return Err(format!(
                "Map dimensions {}x{} are too large",
                self.length, self.height
            ));
        };

        self.validate_tilesets()?;

        if self.layers.is_empty() {
            return Err("Map has no tile layers".to_string());
        }
        check_unique_names("tile layer", self.layers.iter().map(|l| l.name.as_str()))?;

        if self.contexts.is_empty() {
            return Err("Map has no tile contexts".to_string());
        }
        if self.contexts.len() > MAX_CONTEXTS {
            return Err(format!(
                "Map has {} tile contexts (maximum is {})",
                self.contexts.len(),
                MAX_CONTEXTS
            ));
        }
        check_unique_names("tile context", self.contexts.iter().map(|c| c.name.as_str()))?;

        for context in &self.contexts {
            if context.layers.len() != self.layers.len() {
                return Err(format!(
                    "Context '{}' has {} layers, expected {}",
                    context.name,
                    context.layers.len(),
                    self.layers.len()
                ));
            }
            for (layer_index, tiles) in context.layers.iter().enumerate() {
                if tiles.len() != cell_count {
                    return Err(format!(
                        "Layer {} of context '{}' has {} tiles, expected {}",
                        layer_index,
                        context.name,
                        tiles.len(),
                        cell_count
                    ));
                }
                if let Some(tile) = tiles
                    .iter()
                    .flatten()
                    .find(|t| t.tileset as usize >= self.tilesets.len())
                {
                    return Err(format!(
                        "Layer {} of context '{}' references missing tileset {}",
                        layer_index, context.name, tile.tileset
                    ));
                }
            }
        }

        self.validate_inheritance()
    }

    fn validate_tilesets(&self) -> Result<(), String> {
        let mut ids = HashSet::new();
        let mut paths = HashSet::new();
        for tileset in &self.tilesets {
            if !tileset.is_initialized() {
                return Err(format!("Tileset '{}' has no definition or image", tileset.name));
            }
            if !ids.insert(tileset.id) {
                return Err(format!("Tileset id {} appears more than once", tileset.id));
            }
            if !paths.insert(tileset.definition_path.as_str()) {
                return Err(format!(
                    "Tileset definition '{}' appears more than once",
                    tileset.definition_path
                ));
            }
            tileset.validate()?;
        }
        Ok(())
    }

    fn validate_inheritance(&self) -> Result<(), String> {
        for (index, context) in self.contexts.iter().enumerate() {
            let mut current = context.inherits;
            let mut steps = 0;
            while let Some(parent) = current.index() {
                if parent >= self.contexts.len() {
                    return Err(format!(
                        "Context '{}' inherits from missing context {}",
                        context.name, current
                    ));
                }
                if parent == index || steps >= MAX_CONTEXTS {
                    return Err(format!(
                        "Context '{}' is part of an inheritance cycle",
                        context.name
                    ));
                }
                current = self.contexts[parent].inherits;
                steps += 1;
            }
        }
        Ok(())
    }
}

fn check_unique_names<'a>(kind: &str, names: impl Iterator<Item = &'a str>) -> Result<(), String> {
    let mut seen = HashSet::new();
    for name in names {
        if name.is_empty() {
            return Err(format!("A {kind} has an empty name"));
        }
        if !seen.insert(name) {
            return Err(format!("More than one {kind} is named '{name}'"));
        }
    }
    Ok(())
}

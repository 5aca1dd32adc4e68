//! The map data custodian
//!
//! `MapData` owns every tileset, tile context and tile layer of an open map and is the
//! only way to modify them. Its job is to keep the map consistent:
//! - every context has exactly one layer per layer index, all sized to the map
//! - layer and context names are unique
//! - context ids are always `1..=count` with no gaps
//! - inheritance between contexts forms a forest with at least one base context
//!
//! Operations either apply completely or return an error and change nothing. The
//! compiled collision map is rebuilt before any mutating call returns.

mod contexts;
mod layers;
mod persist;
mod tilesets;

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::collision::CollisionMap;
use crate::config::MapDefaults;
use crate::context::{ContextId, TileContext, INVALID_CONTEXT, MAX_CONTEXTS};
use crate::error::MapError;
use crate::layer::{grid_cell_count, TileLayer, TileLayerProperties, TileRef};
use crate::tileset::Tileset;

/// All data for an open map
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "bevy", derive(bevy::prelude::Resource))]
pub struct MapData {
    /// Where the map was last loaded from or saved to
    filename: Option<PathBuf>,
    name: String,
    /// Comma-delimited designer names
    designers: String,
    description: String,
    /// Map size in tiles
    length: u32,
    height: u32,
    modified: bool,
    tilesets: Vec<Tileset>,
    /// Packed contexts; the context at index i has id i + 1
    contexts: Vec<TileContext>,
    /// Shared properties, one per layer index
    layer_properties: Vec<TileLayerProperties>,
    /// Blank layer kept at the current map size, cloned for new layers and contexts
    empty_layer: TileLayer,
    selected_context: Option<ContextId>,
    selected_layer: Option<usize>,
    collision: CollisionMap,
    /// Bumped on every structural change
    generation: u64,
    defaults: MapDefaults,
}

impl MapData {
    /// Create an empty, uninitialized map
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty map that will use `defaults` when created
    pub fn with_defaults(defaults: MapDefaults) -> Self {
        Self {
            defaults,
            ..Self::default()
        }
    }

    pub fn defaults(&self) -> &MapDefaults {
        &self.defaults
    }

    /// Check if any map data is being stored
    pub fn is_initialized(&self) -> bool {
        !self.contexts.is_empty()
    }

    // ---------------------------------------------------------------------
    // Metadata
    // ---------------------------------------------------------------------

    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    pub fn set_filename(&mut self, filename: impl Into<PathBuf>) {
        self.filename = Some(filename.into());
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.modified = true;
    }

    pub fn designers(&self) -> &str {
        &self.designers
    }

    pub fn set_designers(&mut self, designers: impl Into<String>) {
        self.designers = designers.into();
        self.modified = true;
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
        self.modified = true;
    }

    /// Map length in tiles
    pub fn length(&self) -> u32 {
        self.length
    }

    /// Map height in tiles
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Check if the map has changes that have not been saved
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn set_modified(&mut self, modified: bool) {
        self.modified = modified;
    }

    /// Counter that changes whenever contexts, layers or tilesets change structurally
    ///
    /// Ids and indices cached by a view are only meaningful for the generation they
    /// were read at.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The compiled collision grid for all contexts
    pub fn collision_map(&self) -> &CollisionMap {
        &self.collision
    }

    // ---------------------------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------------------------

    /// Initialize a new map with one base context and one tile layer
    ///
    /// Fails if data is already stored; call [`destroy_data`](Self::destroy_data) first.
    pub fn create_data(&mut self, length: u32, height: u32) -> Result<(), MapError> {
        if self.is_initialized() {
            return Err(MapError::AlreadyInitialized);
        }
        check_dimensions(length, height)?;
        self.defaults.validate()?;

        self.length = length;
        self.height = height;
        self.empty_layer = TileLayer::new(length, height);
        self.layer_properties = vec![TileLayerProperties::new(
            self.defaults.initial_layer_name.clone(),
            self.defaults.initial_layer_collision,
        )];
        self.contexts = vec![TileContext::new(
            ContextId::from_index(0),
            self.defaults.base_context_name.clone(),
            INVALID_CONTEXT,
            vec![self.empty_layer.clone()],
        )];
        self.selected_context = Some(ContextId::from_index(0));
        self.selected_layer = Some(0);
        self.modified = false;
        self.generation += 1;
        self.recompile_collision();

        info!("Created {}x{} map data", length, height);
        Ok(())
    }

    /// Initialize a new map using the configured default dimensions
    pub fn create_default(&mut self) -> Result<(), MapError> {
        let (length, height) = (self.defaults.length, self.defaults.height);
        self.create_data(length, height)
    }

    /// Release every tileset, context and layer
    ///
    /// Safe to call when nothing is stored.
    pub fn destroy_data(&mut self) {
        let defaults = std::mem::take(&mut self.defaults);
        let generation = self.generation;
        *self = Self {
            defaults,
            generation: generation + 1,
            ..Self::default()
        };
        debug!("Destroyed map data");
    }

    /// Resize the map, adding or removing rows at the bottom and columns at the right
    pub fn resize_map(&mut self, length: u32, height: u32) -> Result<(), MapError> {
        self.require_initialized()?;
        check_dimensions(length, height)?;
        if length == self.length && height == self.height {
            return Ok(());
        }

        self.for_each_layer(|layer| layer.resize(length, height));
        self.empty_layer = TileLayer::new(length, height);
        self.length = length;
        self.height = height;
        self.touch();

        info!("Resized map to {}x{}", length, height);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Tiles
    // ---------------------------------------------------------------------

    /// Get the tile placed in a context's layer (None if unset or out of range)
    pub fn tile(&self, context_id: ContextId, layer_index: usize, x: u32, y: u32) -> Option<TileRef> {
        self.find_tile_context_by_id(context_id)?
            .layer(layer_index)?
            .get(x, y)
    }

    /// Get the tile shown at a position, following inheritance for unset cells
    pub fn resolved_tile(
        &self,
        context_id: ContextId,
        layer_index: usize,
        x: u32,
        y: u32,
    ) -> Option<TileRef> {
        let mut current = context_id;
        for _ in 0..MAX_CONTEXTS {
            let context = self.find_tile_context_by_id(current)?;
            if let Some(tile) = context.layer(layer_index)?.get(x, y) {
                return Some(tile);
            }
            current = context.inherits_from()?;
        }
        None
    }

    /// Place (or clear, with `None`) a tile
    pub fn set_tile(
        &mut self,
        context_id: ContextId,
        layer_index: usize,
        x: u32,
        y: u32,
        tile: Option<TileRef>,
    ) -> Result<(), MapError> {
        self.set_tiles(context_id, layer_index, [(x, y, tile)])
    }

    /// Place several tiles at once; nothing changes if any placement is invalid
    pub fn set_tiles(
        &mut self,
        context_id: ContextId,
        layer_index: usize,
        tiles: impl IntoIterator<Item = (u32, u32, Option<TileRef>)>,
    ) -> Result<(), MapError> {
        self.require_initialized()?;
        let context_index = self.context_index(context_id)?;
        self.check_layer_index(layer_index)?;

        let tiles: Vec<_> = tiles.into_iter().collect();
        for (x, y, tile) in &tiles {
            self.check_position(*x, *y)?;
            if let Some(tile) = tile {
                self.check_tile_ref(*tile)?;
            }
        }

        let layer = &mut self.contexts[context_index].layers_mut()[layer_index];
        for (x, y, tile) in tiles {
            layer.set(x, y, tile);
        }
        self.modified = true;
        self.recompile_collision();
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Selection
    // ---------------------------------------------------------------------

    /// Change the selected context; the selected layer index is kept
    pub fn change_selected_tile_context(
        &mut self,
        context_id: ContextId,
    ) -> Result<&TileContext, MapError> {
        let index = self.context_index(context_id)?;
        self.selected_context = Some(context_id);
        Ok(&self.contexts[index])
    }

    /// Change the selected layer of the selected context
    pub fn change_selected_tile_layer(&mut self, layer_index: usize) -> Result<&TileLayer, MapError> {
        self.require_initialized()?;
        self.check_layer_index(layer_index)?;
        self.selected_layer = Some(layer_index);
        self.selected_tile_layer()
            .ok_or(MapError::InvalidLayerIndex(layer_index))
    }

    pub fn selected_context_id(&self) -> Option<ContextId> {
        self.selected_context
    }

    pub fn selected_layer_index(&self) -> Option<usize> {
        self.selected_layer
    }

    pub fn selected_tile_context(&self) -> Option<&TileContext> {
        self.find_tile_context_by_id(self.selected_context?)
    }

    pub fn selected_tile_layer(&self) -> Option<&TileLayer> {
        self.selected_tile_context()?.layer(self.selected_layer?)
    }

    pub fn selected_tile_layer_properties(&self) -> Option<&TileLayerProperties> {
        self.layer_properties.get(self.selected_layer?)
    }

    // ---------------------------------------------------------------------
    // Internal helpers
    // ---------------------------------------------------------------------

    fn require_initialized(&self) -> Result<(), MapError> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(MapError::NotInitialized)
        }
    }

    /// Record a structural change and rebuild collision
    fn touch(&mut self) {
        self.modified = true;
        self.generation += 1;
        self.recompile_collision();
    }

    fn recompile_collision(&mut self) {
        self.collision = CollisionMap::compile(
            &self.contexts,
            &self.layer_properties,
            &self.tilesets,
            self.length,
            self.height,
        );
    }

    fn for_each_layer(&mut self, mut f: impl FnMut(&mut TileLayer)) {
        for context in &mut self.contexts {
            for layer in context.layers_mut() {
                f(layer);
            }
        }
    }

    fn context_index(&self, context_id: ContextId) -> Result<usize, MapError> {
        context_id
            .index()
            .filter(|i| *i < self.contexts.len())
            .ok_or(MapError::InvalidContextId(context_id))
    }

    fn check_layer_index(&self, layer_index: usize) -> Result<(), MapError> {
        if layer_index < self.layer_properties.len() {
            Ok(())
        } else {
            Err(MapError::InvalidLayerIndex(layer_index))
        }
    }

    fn check_position(&self, x: u32, y: u32) -> Result<(), MapError> {
        if x < self.length && y < self.height {
            Ok(())
        } else {
            Err(MapError::TileOutOfBounds {
                x,
                y,
                length: self.length,
                height: self.height,
            })
        }
    }

    fn check_tile_ref(&self, tile: TileRef) -> Result<(), MapError> {
        if (tile.tileset as usize) < self.tilesets.len() {
            Ok(())
        } else {
            Err(MapError::InvalidTilesetIndex(tile.tileset as usize))
        }
    }
}

/// Check that a map of this size is non-empty and addressable
fn check_dimensions(length: u32, height: u32) -> Result<(), MapError> {
    match grid_cell_count(length, height) {
        Some(count) if count > 0 => Ok(()),
        _ => Err(MapError::InvalidDimensions { length, height }),
    }
}

//! Tile layer grids and their shared properties

use serde::{Deserialize, Serialize};

use crate::collision::QuadrantGrid;
use crate::tileset::{quadrant, Tileset};

/// A placed tile: which tileset, and which of its 256 sub-tiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileRef {
    /// Index of the tileset in the map's tileset list
    pub tileset: u32,
    /// Sub-tile index inside the tileset (row * 16 + column)
    pub tile: u8,
}

impl TileRef {
    pub fn new(tileset: u32, tile: u8) -> Self {
        Self { tileset, tile }
    }
}

/// Metadata for one layer index, shared by the layer at that index in every context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileLayerProperties {
    pub name: String,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default = "default_true")]
    pub collision_enabled: bool,
}

fn default_true() -> bool {
    true
}

impl TileLayerProperties {
    pub fn new(name: impl Into<String>, collision_enabled: bool) -> Self {
        Self {
            name: name.into(),
            visible: true,
            collision_enabled,
        }
    }
}

/// Number of tiles in a `length` x `height` grid
///
/// Returns None when the grid, or its quadrant grid with four cells per tile, can not be
/// addressed with `u32` indices. Every grid size a map uses passes this check first.
pub fn grid_cell_count(length: u32, height: u32) -> Option<usize> {
    let quadrants = length.checked_mul(2)?.checked_mul(height.checked_mul(2)?)?;
    usize::try_from(quadrants).ok()?;
    Some((quadrants / 4) as usize)
}

/// A length x height grid of tile placements for one context
///
/// `None` marks an unset cell. In a context that inherits from another, unset cells
/// show (and collide like) the parent's tile at the same position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TileLayer {
    length: u32,
    height: u32,
    tiles: Vec<Option<TileRef>>,
}

impl TileLayer {
    /// Create a layer with every cell unset
    ///
    /// The size must already have passed [`grid_cell_count`].
    pub(crate) fn new(length: u32, height: u32) -> Self {
        Self {
            length,
            height,
            tiles: vec![None; (length * height) as usize],
        }
    }

    /// Build a layer from row-major tile data
    ///
    /// Returns None if the data does not match the dimensions.
    pub fn from_tiles(length: u32, height: u32, tiles: Vec<Option<TileRef>>) -> Option<Self> {
        if grid_cell_count(length, height) != Some(tiles.len()) {
            return None;
        }
        Some(Self {
            length,
            height,
            tiles,
        })
    }

    pub fn length(&self) -> u32 {
        self.length
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row-major tile data
    pub fn tiles(&self) -> &[Option<TileRef>] {
        &self.tiles
    }

    /// Check if no cell has a tile
    pub fn is_empty(&self) -> bool {
        self.tiles.iter().all(|t| t.is_none())
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x < self.length && y < self.height
    }

    /// Get the tile at a position (None if unset or out of bounds)
    pub fn get(&self, x: u32, y: u32) -> Option<TileRef> {
        if !self.contains(x, y) {
            return None;
        }
        self.tiles[self.cell_index(x, y)]
    }

    /// Set the tile at a position, returns false if out of bounds
    pub fn set(&mut self, x: u32, y: u32, tile: Option<TileRef>) -> bool {
        if !self.contains(x, y) {
            return false;
        }
        let idx = self.cell_index(x, y);
        self.tiles[idx] = tile;
        true
    }

    /// Resize the grid, adding or removing rows at the bottom and columns at the right
    pub(crate) fn resize(&mut self, length: u32, height: u32) {
        let mut tiles = vec![None; (length * height) as usize];
        for y in 0..height.min(self.height) {
            for x in 0..length.min(self.length) {
                tiles[(y * length + x) as usize] = self.tiles[self.cell_index(x, y)];
            }
        }
        self.length = length;
        self.height = height;
        self.tiles = tiles;
    }

    /// Insert `count` unset rows before row `at`
    pub(crate) fn insert_rows(&mut self, at: u32, count: u32) {
        let at = at.min(self.height);
        let start = (at * self.length) as usize;
        let blank = std::iter::repeat(None).take((count * self.length) as usize);
        self.tiles.splice(start..start, blank);
        self.height += count;
    }

    /// Remove `count` rows starting at row `at`
    pub(crate) fn remove_rows(&mut self, at: u32, count: u32) {
        let at = at.min(self.height);
        let count = count.min(self.height - at);
        let start = (at * self.length) as usize;
        let end = ((at + count) * self.length) as usize;
        self.tiles.drain(start..end);
        self.height -= count;
    }

    /// Insert `count` unset columns before column `at`
    pub(crate) fn insert_columns(&mut self, at: u32, count: u32) {
        let at = at.min(self.length);
        let length = self.length + count;
        let mut tiles = Vec::with_capacity((length * self.height) as usize);
        for row in self.tiles.chunks(self.length.max(1) as usize) {
            tiles.extend_from_slice(&row[..at as usize]);
            tiles.extend(std::iter::repeat(None).take(count as usize));
            tiles.extend_from_slice(&row[at as usize..]);
        }
        self.length = length;
        self.tiles = tiles;
    }

    /// Remove `count` columns starting at column `at`
    pub(crate) fn remove_columns(&mut self, at: u32, count: u32) {
        let at = at.min(self.length);
        let count = count.min(self.length - at);
        let length = self.length - count;
        let mut tiles = Vec::with_capacity((length * self.height) as usize);
        for row in self.tiles.chunks(self.length.max(1) as usize) {
            tiles.extend_from_slice(&row[..at as usize]);
            tiles.extend_from_slice(&row[(at + count) as usize..]);
        }
        self.length = length;
        self.tiles = tiles;
    }

    /// Fill every unset cell with the tile at the same position in `parent`
    pub(crate) fn fill_unset_from(&mut self, parent: &TileLayer) {
        for y in 0..self.height {
            for x in 0..self.length {
                let idx = self.cell_index(x, y);
                if self.tiles[idx].is_none() {
                    self.tiles[idx] = parent.get(x, y);
                }
            }
        }
    }

    /// Rewrite tileset indices; tiles whose tileset maps to None are cleared
    pub(crate) fn remap_tilesets(&mut self, remap: impl Fn(u32) -> Option<u32>) {
        for slot in &mut self.tiles {
            if let Some(tile) = *slot {
                *slot = remap(tile.tileset).map(|tileset| TileRef::new(tileset, tile.tile));
            }
        }
    }

    /// Check if any placed tile uses the given tileset
    pub fn uses_tileset(&self, tileset: u32) -> bool {
        self.tiles.iter().flatten().any(|t| t.tileset == tileset)
    }

    /// Compute this layer's collision at quadrant resolution (2x in each direction)
    ///
    /// Tiles referencing a missing tileset contribute no collision.
    pub(crate) fn quadrant_grid(&self, tilesets: &[Tileset]) -> QuadrantGrid {
        let mut grid = QuadrantGrid::new(self.length * 2, self.height * 2);
        for y in 0..self.height {
            for x in 0..self.length {
                let Some(tile) = self.tiles[self.cell_index(x, y)] else {
                    continue;
                };
                let Some(tileset) = tilesets.get(tile.tileset as usize) else {
                    continue;
                };
                let value = tileset.collision(tile.tile);
                for dy in 0..2 {
                    for dx in 0..2 {
                        if value & quadrant::bit(dx, dy) != 0 {
                            grid.set_blocked(x * 2 + dx, y * 2 + dy, true);
                        }
                    }
                }
            }
        }
        grid
    }

    fn cell_index(&self, x: u32, y: u32) -> usize {
        (y * self.length + x) as usize
    }
}

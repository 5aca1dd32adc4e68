//! Collision grids at quadrant resolution
//!
//! Every tile is split into four quadrants, so collision grids are twice as long and
//! twice as high as the tile grid:
//! - `QuadrantGrid` - blocked/unblocked quadrants for a single layer
//! - `CollisionMap` - the compiled grid for all contexts, one bit per context

use crate::context::{ContextId, TileContext, MAX_CONTEXTS};
use crate::layer::{TileLayer, TileLayerProperties};
use crate::tileset::Tileset;

/// Blocked quadrants of a single layer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuadrantGrid {
    length: u32,
    height: u32,
    cells: Vec<bool>,
}

impl QuadrantGrid {
    pub(crate) fn new(length: u32, height: u32) -> Self {
        Self {
            length,
            height,
            cells: vec![false; (length * height) as usize],
        }
    }

    pub fn length(&self) -> u32 {
        self.length
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Check if the quadrant cell blocks movement (false when out of bounds)
    pub fn is_blocked(&self, x: u32, y: u32) -> bool {
        x < self.length && y < self.height && self.cells[(y * self.length + x) as usize]
    }

    pub fn set_blocked(&mut self, x: u32, y: u32, blocked: bool) {
        if x < self.length && y < self.height {
            self.cells[(y * self.length + x) as usize] = blocked;
        }
    }

    /// Number of blocked quadrant cells
    pub fn blocked_count(&self) -> usize {
        self.cells.iter().filter(|c| **c).count()
    }
}

/// Compiled collision for every context of a map
///
/// Each quadrant cell holds a `u32` in which bit `id - 1` is set when the context
/// with that id blocks the cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollisionMap {
    length: u32,
    height: u32,
    cells: Vec<u32>,
}

impl CollisionMap {
    /// Create a grid of the given quadrant dimensions with nothing blocked
    pub(crate) fn new(length: u32, height: u32) -> Self {
        Self {
            length,
            height,
            cells: vec![0; (length * height) as usize],
        }
    }

    /// Compile collision for every context
    ///
    /// For each context, every collision-enabled layer is resolved against the
    /// inheritance chain (unset cells take the parent's tile) and its quadrant grid is
    /// OR-ed into that context's bit. The map size must already have passed
    /// [`grid_cell_count`](crate::grid_cell_count).
    pub(crate) fn compile(
        contexts: &[TileContext],
        properties: &[TileLayerProperties],
        tilesets: &[Tileset],
        map_length: u32,
        map_height: u32,
    ) -> Self {
        let mut map = CollisionMap::new(map_length * 2, map_height * 2);
        if !properties.iter().any(|p| p.collision_enabled) {
            return map;
        }

        // Only inheriting contexts get a resolved copy; base contexts are read in place
        let mut resolved: Vec<Option<Vec<TileLayer>>> = vec![None; contexts.len()];
        for (index, context) in contexts.iter().enumerate() {
            resolve_layers(contexts, index, &mut resolved);
            let layers = resolved[index].as_deref().unwrap_or(context.layers());
            for (layer, props) in layers.iter().zip(properties) {
                if props.collision_enabled {
                    map.overlay(&layer.quadrant_grid(tilesets), context.id());
                }
            }
        }
        map
    }

    /// Quadrant columns (twice the map length)
    pub fn length(&self) -> u32 {
        self.length
    }

    /// Quadrant rows (twice the map height)
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get the context mask of a quadrant cell (0 when out of bounds)
    pub fn get(&self, x: u32, y: u32) -> u32 {
        if x < self.length && y < self.height {
            self.cells[(y * self.length + x) as usize]
        } else {
            0
        }
    }

    /// Check if a context blocks a quadrant cell
    pub fn blocks(&self, context: ContextId, x: u32, y: u32) -> bool {
        self.get(x, y) & context.bit() != 0
    }

    /// Row-major cell masks
    pub fn cells(&self) -> &[u32] {
        &self.cells
    }

    /// Iterate over rows of cell masks
    pub fn rows(&self) -> impl Iterator<Item = &[u32]> {
        self.cells.chunks(self.length.max(1) as usize)
    }

    /// Extract the bit-plane of a single context
    pub fn context_grid(&self, context: ContextId) -> QuadrantGrid {
        let bit = context.bit();
        QuadrantGrid {
            length: self.length,
            height: self.height,
            cells: self.cells.iter().map(|c| c & bit != 0).collect(),
        }
    }

    fn overlay(&mut self, grid: &QuadrantGrid, context: ContextId) {
        let bit = context.bit();
        for (cell, blocked) in self.cells.iter_mut().zip(&grid.cells) {
            if *blocked {
                *cell |= bit;
            }
        }
    }
}

/// Resolve the layers of `contexts[index]` and of every inheriting ancestor not yet resolved
///
/// Base contexts are left as `None` in `resolved`.
fn resolve_layers(
    contexts: &[TileContext],
    index: usize,
    resolved: &mut [Option<Vec<TileLayer>>],
) {
    let mut chain = Vec::new();
    let mut current = index;
    while resolved[current].is_none() && chain.len() < MAX_CONTEXTS {
        let parent = contexts[current]
            .inherits_from()
            .and_then(|id| id.index())
            .filter(|i| *i < contexts.len());
        let Some(parent) = parent else {
            break;
        };
        chain.push((current, parent));
        current = parent;
    }

    for &(child, parent) in chain.iter().rev() {
        if resolved[child].is_some() {
            continue;
        }
        let mut layers = contexts[child].layers().to_vec();
        let parent_layers = resolved[parent]
            .as_deref()
            .unwrap_or(contexts[parent].layers());
        for (layer, parent) in layers.iter_mut().zip(parent_layers) {
            layer.fill_unset_from(parent);
        }
        resolved[child] = Some(layers);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::INVALID_CONTEXT;
    use crate::layer::TileRef;
    use crate::tileset::quadrant;

    fn solid_tileset() -> Tileset {
        Tileset::new("Solid", "solid.lua", "solid.png")
            .with_collision(0, quadrant::ALL)
            .with_collision(1, quadrant::TOP_LEFT)
    }

    fn context(id: u32, parent: ContextId, layer: TileLayer) -> TileContext {
        TileContext::new(ContextId::new(id), format!("C{id}"), parent, vec![layer])
    }

    #[test]
    fn test_single_blocked_tile() {
        let mut layer = TileLayer::new(1, 1);
        layer.set(0, 0, Some(TileRef::new(0, 0)));
        let contexts = vec![context(1, INVALID_CONTEXT, layer)];
        let mut props = vec![TileLayerProperties::new("Ground", true)];

        let map = CollisionMap::compile(&contexts, &props, &[solid_tileset()], 1, 1);
        assert_eq!(map.length(), 2);
        assert_eq!(map.height(), 2);
        assert_eq!(map.cells(), &[0b1, 0b1, 0b1, 0b1]);

        props[0].collision_enabled = false;
        let map = CollisionMap::compile(&contexts, &props, &[solid_tileset()], 1, 1);
        assert_eq!(map.cells(), &[0, 0, 0, 0]);
    }

    #[test]
    fn test_contexts_use_separate_bits() {
        let mut first = TileLayer::new(2, 1);
        first.set(0, 0, Some(TileRef::new(0, 1)));
        let mut second = TileLayer::new(2, 1);
        second.set(1, 0, Some(TileRef::new(0, 0)));
        let contexts = vec![
            context(1, INVALID_CONTEXT, first),
            context(2, INVALID_CONTEXT, second),
        ];
        let props = vec![TileLayerProperties::new("Ground", true)];

        let map = CollisionMap::compile(&contexts, &props, &[solid_tileset()], 2, 1);
        assert_eq!(map.get(0, 0), 0b01);
        assert_eq!(map.get(1, 0), 0);
        assert_eq!(map.get(2, 0), 0b10);
        assert_eq!(map.get(3, 1), 0b10);
        assert!(map.blocks(ContextId::new(2), 2, 1));
        assert!(!map.blocks(ContextId::new(1), 2, 1));
        assert_eq!(map.context_grid(ContextId::new(2)).blocked_count(), 4);
    }

    #[test]
    fn test_inherited_cells_fall_back_to_parent() {
        let mut base = TileLayer::new(2, 1);
        base.set(0, 0, Some(TileRef::new(0, 0)));
        base.set(1, 0, Some(TileRef::new(0, 0)));
        // Child overrides the right tile with a walkable one and leaves the left unset
        let mut child = TileLayer::new(2, 1);
        child.set(1, 0, Some(TileRef::new(0, 2)));
        // Grandchild leaves everything unset
        let grandchild = TileLayer::new(2, 1);

        let contexts = vec![
            context(1, INVALID_CONTEXT, base),
            context(2, ContextId::new(1), child),
            context(3, ContextId::new(2), grandchild),
        ];
        let props = vec![TileLayerProperties::new("Ground", true)];

        let map = CollisionMap::compile(&contexts, &props, &[solid_tileset()], 2, 1);
        assert_eq!(map.get(0, 0), 0b111);
        assert_eq!(map.get(2, 0), 0b001);
        assert_eq!(map.rows().count(), 2);
    }

    #[test]
    fn test_only_inheriting_contexts_are_resolved() {
        let mut base = TileLayer::new(1, 1);
        base.set(0, 0, Some(TileRef::new(0, 0)));
        let contexts = vec![
            context(1, INVALID_CONTEXT, base),
            context(2, INVALID_CONTEXT, TileLayer::new(1, 1)),
            context(3, ContextId::new(1), TileLayer::new(1, 1)),
            context(4, ContextId::new(3), TileLayer::new(1, 1)),
        ];

        let mut resolved = vec![None; contexts.len()];
        resolve_layers(&contexts, 3, &mut resolved);
        assert!(resolved[0].is_none());
        assert!(resolved[1].is_none());
        assert_eq!(resolved[2].as_ref().unwrap()[0].get(0, 0), Some(TileRef::new(0, 0)));
        assert_eq!(resolved[3].as_ref().unwrap()[0].get(0, 0), Some(TileRef::new(0, 0)));

        resolve_layers(&contexts, 1, &mut resolved);
        assert!(resolved[1].is_none());
    }

    #[test]
    fn test_missing_tileset_contributes_nothing() {
        let mut layer = TileLayer::new(1, 1);
        layer.set(0, 0, Some(TileRef::new(3, 0)));
        let contexts = vec![context(1, INVALID_CONTEXT, layer)];
        let props = vec![TileLayerProperties::new("Ground", true)];

        let map = CollisionMap::compile(&contexts, &props, &[solid_tileset()], 1, 1);
        assert!(map.cells().iter().all(|c| *c == 0));
    }
}

//! Tile layer management
//!
//! Every operation here applies to the layer at the same index in every context.

use tracing::debug;

use super::MapData;
use crate::error::MapError;
use crate::layer::{grid_cell_count, TileLayer, TileLayerProperties};
use crate::naming::clone_name;

impl MapData {
    pub fn tile_layer_count(&self) -> usize {
        self.layer_properties.len()
    }

    /// Ordered list of the names of all tile layers
    pub fn tile_layer_names(&self) -> Vec<String> {
        self.layer_properties
            .iter()
            .map(|p| p.name.clone())
            .collect()
    }

    /// Ordered list of the shared layer properties
    pub fn tile_layer_properties(&self) -> &[TileLayerProperties] {
        &self.layer_properties
    }

    pub fn tile_layer_property(&self, layer_index: usize) -> Option<&TileLayerProperties> {
        self.layer_properties.get(layer_index)
    }

    /// Add a new tile layer to every context
    ///
    /// Returns the index of the new layer.
    pub fn add_tile_layer(
        &mut self,
        name: impl Into<String>,
        collision_enabled: bool,
    ) -> Result<usize, MapError> {
        self.require_initialized()?;
        let name = name.into();
        self.check_layer_name(&name, None)?;

        debug!("Adding tile layer '{}'", name);
        self.layer_properties
            .push(TileLayerProperties::new(name, collision_enabled));
        let empty = self.empty_layer.clone();
        for context in &mut self.contexts {
            context.layers_mut().push(empty.clone());
        }
        self.touch();
        Ok(self.layer_properties.len() - 1)
    }

    /// Remove a tile layer from every context
    ///
    /// The last remaining layer can not be removed.
    pub fn delete_tile_layer(&mut self, layer_index: usize) -> Result<(), MapError> {
        self.require_initialized()?;
        self.check_layer_index(layer_index)?;
        if self.layer_properties.len() == 1 {
            return Err(MapError::LastTileLayer(
                self.layer_properties[layer_index].name.clone(),
            ));
        }

        let removed = self.layer_properties.remove(layer_index);
        for context in &mut self.contexts {
            context.layers_mut().remove(layer_index);
        }
        let remaining = self.layer_properties.len();
        self.selected_layer = self.selected_layer.map(|selected| {
            if selected > layer_index || selected >= remaining {
                selected.saturating_sub(1)
            } else {
                selected
            }
        });
        self.touch();

        debug!("Deleted tile layer '{}'", removed.name);
        Ok(())
    }

    /// Duplicate a tile layer (properties and per-context data) under a new name
    ///
    /// The clone is appended after all existing layers. Returns its index.
    pub fn clone_tile_layer(&mut self, layer_index: usize) -> Result<usize, MapError> {
        self.require_initialized()?;
        self.check_layer_index(layer_index)?;

        let source = &self.layer_properties[layer_index];
        let name = clone_name(
            &source.name,
            self.layer_properties.iter().map(|p| p.name.as_str()),
        );
        let properties = TileLayerProperties {
            name,
            ..source.clone()
        };

        debug!("Cloning tile layer {} as '{}'", layer_index, properties.name);
        self.layer_properties.push(properties);
        for context in &mut self.contexts {
            let copy = context.layers()[layer_index].clone();
            context.layers_mut().push(copy);
        }
        self.touch();
        Ok(self.layer_properties.len() - 1)
    }

    /// Rename a tile layer; the name must be unique among all layers
    pub fn rename_tile_layer(
        &mut self,
        layer_index: usize,
        name: impl Into<String>,
    ) -> Result<(), MapError> {
        self.require_initialized()?;
        self.check_layer_index(layer_index)?;
        let name = name.into();
        self.check_layer_name(&name, Some(layer_index))?;

        self.layer_properties[layer_index].name = name;
        self.modified = true;
        self.generation += 1;
        Ok(())
    }

    /// Swap the order position of two tile layers in every context
    pub fn swap_tile_layers(&mut self, first: usize, second: usize) -> Result<(), MapError> {
        self.require_initialized()?;
        self.check_layer_index(first)?;
        self.check_layer_index(second)?;
        if first == second {
            return Ok(());
        }

        self.layer_properties.swap(first, second);
        for context in &mut self.contexts {
            context.layers_mut().swap(first, second);
        }
        self.selected_layer = self.selected_layer.map(|selected| match selected {
            s if s == first => second,
            s if s == second => first,
            s => s,
        });
        self.touch();
        Ok(())
    }

    /// Move a tile layer one position toward the front; fails for the first layer
    pub fn move_tile_layer_up(&mut self, layer_index: usize) -> Result<(), MapError> {
        let target = layer_index
            .checked_sub(1)
            .ok_or(MapError::InvalidLayerIndex(layer_index))?;
        self.swap_tile_layers(layer_index, target)
    }

    /// Move a tile layer one position toward the back; fails for the last layer
    pub fn move_tile_layer_down(&mut self, layer_index: usize) -> Result<(), MapError> {
        self.swap_tile_layers(layer_index, layer_index + 1)
    }

    pub fn show_tile_layer(&mut self, layer_index: usize) -> Result<(), MapError> {
        self.update_layer_properties(layer_index, |p| p.visible = true)
    }

    pub fn hide_tile_layer(&mut self, layer_index: usize) -> Result<(), MapError> {
        self.update_layer_properties(layer_index, |p| p.visible = false)
    }

    pub fn toggle_tile_layer_visibility(&mut self, layer_index: usize) -> Result<(), MapError> {
        self.update_layer_properties(layer_index, |p| p.visible = !p.visible)
    }

    pub fn enable_tile_layer_collision(&mut self, layer_index: usize) -> Result<(), MapError> {
        self.update_layer_properties(layer_index, |p| p.collision_enabled = true)?;
        self.recompile_collision();
        Ok(())
    }

    pub fn disable_tile_layer_collision(&mut self, layer_index: usize) -> Result<(), MapError> {
        self.update_layer_properties(layer_index, |p| p.collision_enabled = false)?;
        self.recompile_collision();
        Ok(())
    }

    pub fn toggle_tile_layer_collision(&mut self, layer_index: usize) -> Result<(), MapError> {
        self.update_layer_properties(layer_index, |p| {
            p.collision_enabled = !p.collision_enabled
        })?;
        self.recompile_collision();
        Ok(())
    }

    /// Insert blank rows before `row` in every layer of every context
    ///
    /// Rows can not be added after the last row; use `resize_map` for that.
    pub fn insert_tile_layer_rows(&mut self, row: u32, count: u32) -> Result<(), MapError> {
        self.require_initialized()?;
        if count == 0 || row >= self.height {
            return Err(extent_error("row", row, count));
        }
        let height = grown(self.length, self.height, count)
            .ok_or_else(|| extent_error("row", row, count))?;

        self.for_each_layer(|layer| layer.insert_rows(row, count));
        self.height = height;
        self.empty_layer = TileLayer::new(self.length, self.height);
        self.touch();
        Ok(())
    }

    /// Remove rows starting at `row` from every layer of every context
    ///
    /// The removed range may not include the last row; use `resize_map` for that.
    pub fn remove_tile_layer_rows(&mut self, row: u32, count: u32) -> Result<(), MapError> {
        self.require_initialized()?;
        if count == 0 || row.checked_add(count).map_or(true, |end| end >= self.height) {
            return Err(extent_error("row", row, count));
        }

        self.for_each_layer(|layer| layer.remove_rows(row, count));
        self.height -= count;
        self.empty_layer = TileLayer::new(self.length, self.height);
        self.touch();
        Ok(())
    }

    /// Insert blank columns before `column` in every layer of every context
    ///
    /// Columns can not be added after the last column; use `resize_map` for that.
    pub fn insert_tile_layer_columns(&mut self, column: u32, count: u32) -> Result<(), MapError> {
        self.require_initialized()?;
        if count == 0 || column >= self.length {
            return Err(extent_error("column", column, count));
        }
        let length = grown(self.height, self.length, count)
            .ok_or_else(|| extent_error("column", column, count))?;

        self.for_each_layer(|layer| layer.insert_columns(column, count));
        self.length = length;
        self.empty_layer = TileLayer::new(self.length, self.height);
        self.touch();
        Ok(())
    }

    /// Remove columns starting at `column` from every layer of every context
    ///
    /// The removed range may not include the last column; use `resize_map` for that.
    pub fn remove_tile_layer_columns(&mut self, column: u32, count: u32) -> Result<(), MapError> {
        self.require_initialized()?;
        if count == 0
            || column
                .checked_add(count)
                .map_or(true, |end| end >= self.length)
        {
            return Err(extent_error("column", column, count));
        }

        self.for_each_layer(|layer| layer.remove_columns(column, count));
        self.length -= count;
        self.empty_layer = TileLayer::new(self.length, self.height);
        self.touch();
        Ok(())
    }

    fn update_layer_properties(
        &mut self,
        layer_index: usize,
        update: impl FnOnce(&mut TileLayerProperties),
    ) -> Result<(), MapError> {
        self.require_initialized()?;
        self.check_layer_index(layer_index)?;
        update(&mut self.layer_properties[layer_index]);
        self.modified = true;
        Ok(())
    }

    fn check_layer_name(&self, name: &str, ignore: Option<usize>) -> Result<(), MapError> {
        if name.is_empty() {
            return Err(MapError::EmptyName);
        }
        let taken = self
            .layer_properties
            .iter()
            .enumerate()
            .any(|(i, p)| Some(i) != ignore && p.name == name);
        if taken {
            return Err(MapError::DuplicateLayerName(name.to_string()));
        }
        Ok(())
    }
}

/// `size + count`, if a grid of `other` x `size + count` is still addressable
fn grown(other: u32, size: u32, count: u32) -> Option<u32> {
    let size = size.checked_add(count)?;
    grid_cell_count(other, size).map(|_| size)
}

fn extent_error(axis: &'static str, start: u32, count: u32) -> MapError {
    MapError::InvalidExtent {
        axis,
        start,
        end: start.saturating_add(count),
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{map, solid_tileset};
    use crate::context::{ContextId, INVALID_CONTEXT};
    use crate::layer::TileRef;
    use crate::{MapData, MapError};

    const BASE: ContextId = ContextId::new(1);

    fn assert_layers_uniform(map: &MapData) {
        for context in map.tile_contexts() {
            assert_eq!(context.layer_count(), map.tile_layer_count());
            for layer in context.layers() {
                assert_eq!(layer.length(), map.length());
                assert_eq!(layer.height(), map.height());
            }
        }
    }

    #[test]
    fn test_add_tile_layer_to_every_context() {
        let mut map = map(4, 3);
        map.add_tile_context("Night", INVALID_CONTEXT).unwrap();
        assert_eq!(map.add_tile_layer("Walls", true), Ok(1));
        map.add_tile_context("Rain", INVALID_CONTEXT).unwrap();
        assert_eq!(map.add_tile_layer("Roof", false), Ok(2));

        assert_eq!(map.tile_layer_names(), vec!["Ground", "Walls", "Roof"]);
        assert!(!map.tile_layer_property(2).unwrap().collision_enabled);
        assert_layers_uniform(&map);
    }

    #[test]
    fn test_add_tile_layer_rejects_duplicates() {
        let mut map = map(2, 2);
        assert_eq!(
            map.add_tile_layer("Ground", true),
            Err(MapError::DuplicateLayerName("Ground".to_string()))
        );
        assert_eq!(map.add_tile_layer("", true), Err(MapError::EmptyName));
        assert_eq!(map.tile_layer_count(), 1);
    }

    #[test]
    fn test_add_delete_sequences_stay_uniform() {
        let mut map = map(3, 3);
        map.add_tile_context("Night", INVALID_CONTEXT).unwrap();
        for i in 0..6 {
            map.add_tile_layer(format!("Layer {i}"), i % 2 == 0).unwrap();
            if i % 3 == 2 {
                map.delete_tile_layer(1).unwrap();
            }
            map.add_tile_context(format!("Context {i}"), INVALID_CONTEXT)
                .unwrap();
            assert_layers_uniform(&map);
        }
        assert_eq!(map.tile_layer_count(), 5);
    }

    #[test]
    fn test_delete_tile_layer() {
        let mut map = map(2, 2);
        map.add_tileset(solid_tileset()).unwrap();
        map.add_tile_layer("Walls", true).unwrap();
        map.set_tile(BASE, 1, 0, 0, Some(TileRef::new(0, 0))).unwrap();
        map.change_selected_tile_layer(1).unwrap();
        assert_eq!(map.collision_map().get(0, 0), 0b1);

        map.delete_tile_layer(1).unwrap();
        assert_eq!(map.tile_layer_names(), vec!["Ground"]);
        assert_eq!(map.selected_layer_index(), Some(0));
        assert_eq!(map.collision_map().get(0, 0), 0);
        assert_layers_uniform(&map);

        assert_eq!(
            map.delete_tile_layer(0),
            Err(MapError::LastTileLayer("Ground".to_string()))
        );
        assert_eq!(map.delete_tile_layer(1), Err(MapError::InvalidLayerIndex(1)));
    }

    #[test]
    fn test_clone_tile_layer() {
        let mut map = map(2, 2);
        map.add_tileset(solid_tileset()).unwrap();
        let night = map.add_tile_context("Night", INVALID_CONTEXT).unwrap();
        map.set_tile(night, 0, 1, 1, Some(TileRef::new(0, 3))).unwrap();
        map.hide_tile_layer(0).unwrap();

        assert_eq!(map.clone_tile_layer(0), Ok(1));
        assert_eq!(map.clone_tile_layer(0), Ok(2));
        assert_eq!(
            map.tile_layer_names(),
            vec!["Ground", "Ground (Clone)", "Ground (Clone #1)"]
        );
        assert!(!map.tile_layer_property(1).unwrap().visible);
        assert_eq!(map.tile(night, 1, 1, 1), Some(TileRef::new(0, 3)));
        assert_eq!(map.tile(BASE, 2, 1, 1), None);
        assert_layers_uniform(&map);
    }

    #[test]
    fn test_rename_tile_layer() {
        let mut map = map(2, 2);
        map.add_tile_layer("Walls", true).unwrap();
        map.rename_tile_layer(1, "Objects").unwrap();
        // Renaming to the current name is allowed
        map.rename_tile_layer(1, "Objects").unwrap();
        assert_eq!(
            map.rename_tile_layer(1, "Ground"),
            Err(MapError::DuplicateLayerName("Ground".to_string()))
        );
        assert_eq!(map.tile_layer_names(), vec!["Ground", "Objects"]);
    }

    #[test]
    fn test_swap_and_move_tile_layers() {
        let mut map = map(1, 1);
        map.add_tileset(solid_tileset()).unwrap();
        map.add_tile_layer("Walls", false).unwrap();
        map.add_tile_layer("Roof", true).unwrap();
        map.set_tile(BASE, 2, 0, 0, Some(TileRef::new(0, 9))).unwrap();
        map.change_selected_tile_layer(2).unwrap();

        map.move_tile_layer_up(2).unwrap();
        assert_eq!(map.tile_layer_names(), vec!["Ground", "Roof", "Walls"]);
        assert_eq!(map.tile(BASE, 1, 0, 0), Some(TileRef::new(0, 9)));
        assert_eq!(map.selected_layer_index(), Some(1));

        map.move_tile_layer_down(0).unwrap();
        assert_eq!(map.tile_layer_names(), vec!["Roof", "Ground", "Walls"]);

        assert_eq!(map.move_tile_layer_up(0), Err(MapError::InvalidLayerIndex(0)));
        assert_eq!(
            map.move_tile_layer_down(2),
            Err(MapError::InvalidLayerIndex(3))
        );
    }

    #[test]
    fn test_visibility_and_collision_flags() {
        let mut map = map(2, 2);
        map.hide_tile_layer(0).unwrap();
        assert!(!map.tile_layer_property(0).unwrap().visible);
        map.toggle_tile_layer_visibility(0).unwrap();
        assert!(map.tile_layer_property(0).unwrap().visible);
        map.show_tile_layer(0).unwrap();
        assert!(map.tile_layer_property(0).unwrap().visible);

        map.disable_tile_layer_collision(0).unwrap();
        assert!(!map.tile_layer_property(0).unwrap().collision_enabled);
        map.enable_tile_layer_collision(0).unwrap();
        assert!(map.tile_layer_property(0).unwrap().collision_enabled);

        // The layer count itself is out of range
        assert_eq!(map.show_tile_layer(1), Err(MapError::InvalidLayerIndex(1)));
        assert_eq!(
            map.toggle_tile_layer_collision(1),
            Err(MapError::InvalidLayerIndex(1))
        );
    }

    #[test]
    fn test_insert_and_remove_rows() {
        let mut map = map(2, 3);
        map.add_tileset(solid_tileset()).unwrap();
        let night = map.add_tile_context("Night", INVALID_CONTEXT).unwrap();
        map.set_tile(BASE, 0, 0, 1, Some(TileRef::new(0, 0))).unwrap();

        map.insert_tile_layer_rows(1, 2).unwrap();
        assert_eq!(map.height(), 5);
        assert_eq!(map.tile(BASE, 0, 0, 3), Some(TileRef::new(0, 0)));
        assert_eq!(map.collision_map().height(), 10);
        assert_eq!(map.collision_map().get(0, 6), 0b1);
        assert_layers_uniform(&map);

        map.remove_tile_layer_rows(1, 2).unwrap();
        assert_eq!(map.height(), 3);
        assert_eq!(map.tile(BASE, 0, 0, 1), Some(TileRef::new(0, 0)));
        assert_eq!(map.tile(night, 0, 0, 1), None);
        assert_layers_uniform(&map);
    }

    #[test]
    fn test_row_edits_refuse_trailing_boundary() {
        let mut map = map(2, 3);
        assert!(matches!(
            map.insert_tile_layer_rows(3, 1),
            Err(MapError::InvalidExtent { axis: "row", .. })
        ));
        assert!(map.remove_tile_layer_rows(2, 1).is_err());
        assert!(map.remove_tile_layer_rows(1, 2).is_err());
        assert!(map.remove_tile_layer_rows(0, 0).is_err());
        assert!(map.insert_tile_layer_rows(0, 0).is_err());
        assert_eq!(map.height(), 3);
        assert!(!map.is_modified());
    }

    #[test]
    fn test_huge_row_and_column_counts_are_rejected() {
        let mut map = map(3, 3);
        map.add_tileset(solid_tileset()).unwrap();
        map.set_tile(BASE, 0, 1, 1, Some(TileRef::new(0, 0))).unwrap();
        map.set_modified(false);

        assert_eq!(
            map.insert_tile_layer_rows(0, u32::MAX),
            Err(MapError::InvalidExtent {
                axis: "row",
                start: 0,
                end: u32::MAX
            })
        );
        assert!(matches!(
            map.insert_tile_layer_columns(2, u32::MAX),
            Err(MapError::InvalidExtent { axis: "column", .. })
        ));
        // No overflow in u32, but the quadrant grid would not fit
        assert!(map.insert_tile_layer_rows(1, u32::MAX / 4).is_err());
        assert!(map.insert_tile_layer_columns(1, u32::MAX / 4).is_err());
        assert!(map.remove_tile_layer_rows(1, u32::MAX).is_err());
        assert!(map.remove_tile_layer_columns(u32::MAX, 1).is_err());

        assert_eq!((map.length(), map.height()), (3, 3));
        assert_eq!(map.tile(BASE, 0, 1, 1), Some(TileRef::new(0, 0)));
        assert_eq!(map.collision_map().get(2, 2), 0b1);
        assert!(!map.is_modified());
        assert_layers_uniform(&map);
    }

    #[test]
    fn test_insert_and_remove_columns() {
        let mut map = map(3, 2);
        map.add_tileset(solid_tileset()).unwrap();
        map.set_tile(BASE, 0, 2, 0, Some(TileRef::new(0, 0))).unwrap();

        map.insert_tile_layer_columns(0, 1).unwrap();
        assert_eq!(map.length(), 4);
        assert_eq!(map.tile(BASE, 0, 3, 0), Some(TileRef::new(0, 0)));
        assert_eq!(map.collision_map().get(6, 0), 0b1);
        assert_layers_uniform(&map);

        map.remove_tile_layer_columns(1, 2).unwrap();
        assert_eq!(map.length(), 2);
        assert_eq!(map.tile(BASE, 0, 1, 0), Some(TileRef::new(0, 0)));
        assert_layers_uniform(&map);

        assert!(map.insert_tile_layer_columns(2, 1).is_err());
        assert!(map.remove_tile_layer_columns(1, 1).is_err());
        assert!(map.remove_tile_layer_columns(0, 1).is_ok());
        assert_eq!(map.length(), 1);
        // A single column is also the final column
        assert!(map.remove_tile_layer_columns(0, 1).is_err());
    }
}

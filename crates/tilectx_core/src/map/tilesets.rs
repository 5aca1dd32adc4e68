//! Tileset list management

use tracing::debug;

use super::MapData;
use crate::error::MapError;
use crate::tileset::Tileset;

impl MapData {
    pub fn tilesets(&self) -> &[Tileset] {
        &self.tilesets
    }

    pub fn tileset(&self, index: usize) -> Option<&Tileset> {
        self.tilesets.get(index)
    }

    /// Ordered list of the tileset definition filenames
    pub fn tileset_filenames(&self) -> Vec<String> {
        self.tilesets
            .iter()
            .map(|t| t.definition_path.clone())
            .collect()
    }

    /// Ordered list of the tileset display names
    pub fn tileset_names(&self) -> Vec<String> {
        self.tilesets.iter().map(|t| t.name.clone()).collect()
    }

    /// Add a tileset to the end of the list and take ownership of it
    ///
    /// Returns the index of the new tileset.
    pub fn add_tileset(&mut self, tileset: Tileset) -> Result<usize, MapError> {
        if !tileset.is_initialized() {
            return Err(MapError::TilesetNotInitialized(tileset.name));
        }
        if self.tilesets.iter().any(|t| t.id == tileset.id) {
            return Err(MapError::TilesetAlreadyAdded(tileset.name));
        }
        if self
            .tilesets
            .iter()
            .any(|t| t.definition_path == tileset.definition_path)
        {
            return Err(MapError::DuplicateTilesetFile(tileset.definition_path));
        }

        debug!("Added tileset '{}'", tileset.name);
        self.tilesets.push(tileset);
        self.modified = true;
        self.generation += 1;
        Ok(self.tilesets.len() - 1)
    }

    /// Remove a tileset and hand it back
    ///
    /// Tiles placed from the removed tileset are cleared in every layer of every
    /// context, and tiles from later tilesets are re-pointed at their new index.
    pub fn remove_tileset(&mut self, index: usize) -> Result<Tileset, MapError> {
        if index >= self.tilesets.len() {
            return Err(MapError::InvalidTilesetIndex(index));
        }

        let removed = self.tilesets.remove(index);
        let removed_index = index as u32;
        self.for_each_layer(|layer| {
            layer.remap_tilesets(|ts| match ts {
                ts if ts == removed_index => None,
                ts if ts > removed_index => Some(ts - 1),
                ts => Some(ts),
            })
        });
        self.touch();

        debug!("Removed tileset '{}'", removed.name);
        Ok(removed)
    }

    /// Move a tileset one position toward the front; does nothing for the first tileset
    pub fn move_tileset_up(&mut self, index: usize) -> Result<(), MapError> {
        if index >= self.tilesets.len() {
            return Err(MapError::InvalidTilesetIndex(index));
        }
        if index == 0 {
            return Ok(());
        }
        self.swap_tilesets(index, index - 1);
        Ok(())
    }

    /// Move a tileset one position toward the back; does nothing for the last tileset
    pub fn move_tileset_down(&mut self, index: usize) -> Result<(), MapError> {
        if index >= self.tilesets.len() {
            return Err(MapError::InvalidTilesetIndex(index));
        }
        if index + 1 == self.tilesets.len() {
            return Ok(());
        }
        self.swap_tilesets(index, index + 1);
        Ok(())
    }

    /// Swap two tilesets, keeping placed tiles pointed at the same tileset
    fn swap_tilesets(&mut self, a: usize, b: usize) {
        self.tilesets.swap(a, b);
        let (a, b) = (a as u32, b as u32);
        self.for_each_layer(|layer| {
            layer.remap_tilesets(|ts| match ts {
                ts if ts == a => Some(b),
                ts if ts == b => Some(a),
                ts => Some(ts),
            })
        });
        self.touch();
    }
}

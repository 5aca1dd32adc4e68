//! Loading and saving through a [`MapStorage`] backend

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::MapData;
use crate::context::{ContextId, TileContext};
use crate::error::MapError;
use crate::layer::TileLayer;
use crate::storage::{ContextSnapshot, MapSnapshot, MapStorage, SNAPSHOT_VERSION};

impl MapData {
    /// Flatten the map into a snapshot
    pub fn snapshot(&self) -> Result<MapSnapshot, MapError> {
        self.require_initialized()?;
        Ok(MapSnapshot {
            version: SNAPSHOT_VERSION,
            name: self.name.clone(),
            designers: self.designers.clone(),
            description: self.description.clone(),
            length: self.length,
            height: self.height,
            tilesets: self.tilesets.clone(),
            layers: self.layer_properties.clone(),
            contexts: self
                .contexts
                .iter()
                .map(|context| ContextSnapshot {
                    name: context.name().to_string(),
                    inherits: context.inherited_context_id(),
                    layers: context
                        .layers()
                        .iter()
                        .map(|layer| layer.tiles().to_vec())
                        .collect(),
                })
                .collect(),
        })
    }

    /// Replace empty map data with the contents of a snapshot
    ///
    /// The snapshot is validated first; on failure nothing changes.
    pub fn restore_snapshot(&mut self, snapshot: MapSnapshot) -> Result<(), MapError> {
        if self.is_initialized() {
            return Err(MapError::AlreadyInitialized);
        }
        snapshot.validate().map_err(MapError::InvalidSnapshot)?;

        let (length, height) = (snapshot.length, snapshot.height);
        let mut contexts = Vec::with_capacity(snapshot.contexts.len());
        for (index, context) in snapshot.contexts.into_iter().enumerate() {
            let layers = context
                .layers
                .into_iter()
                .map(|tiles| TileLayer::from_tiles(length, height, tiles))
                .collect::<Option<Vec<_>>>()
                .ok_or_else(|| {
                    MapError::InvalidSnapshot(format!("Context '{}' has malformed layers", context.name))
                })?;
            contexts.push(TileContext::new(
                ContextId::from_index(index),
                context.name,
                context.inherits,
                layers,
            ));
        }

        self.name = snapshot.name;
        self.designers = snapshot.designers;
        self.description = snapshot.description;
        self.length = length;
        self.height = height;
        self.tilesets = snapshot.tilesets;
        self.layer_properties = snapshot.layers;
        self.contexts = contexts;
        self.empty_layer = TileLayer::new(length, height);
        self.selected_context = Some(ContextId::from_index(0));
        self.selected_layer = Some(0);
        self.modified = false;
        self.generation += 1;
        self.recompile_collision();
        Ok(())
    }

    /// Load a map from `path`; the map must not hold any data
    pub fn load_data<S: MapStorage>(
        &mut self,
        storage: &S,
        path: impl AsRef<Path>,
    ) -> Result<(), MapError> {
        let path = path.as_ref();
        if self.is_initialized() {
            return Err(MapError::AlreadyInitialized);
        }

        let snapshot = storage.load(path).map_err(|e| {
            warn!("Failed to load map {:?}: {}", path, e);
            MapError::Storage(e.to_string())
        })?;
        if let Err(e) = self.restore_snapshot(snapshot) {
            warn!("Rejected map {:?}: {}", path, e);
            return Err(e);
        }
        self.filename = Some(path.to_path_buf());

        info!(
            "Loaded map '{}' ({}x{}, {} contexts, {} layers) from {:?}",
            self.name,
            self.length,
            self.height,
            self.contexts.len(),
            self.layer_properties.len(),
            path
        );
        Ok(())
    }

    /// Save the map to `path` and remember it as the map's filename
    pub fn save_data_as<S: MapStorage>(
        &mut self,
        storage: &S,
        path: impl Into<PathBuf>,
    ) -> Result<(), MapError> {
        let path = path.into();
        let snapshot = self.snapshot()?;
        storage.save(&path, &snapshot).map_err(|e| {
            warn!("Failed to save map {:?}: {}", path, e);
            MapError::Storage(e.to_string())
        })?;

        info!("Saved map '{}' to {:?}", self.name, path);
        self.filename = Some(path);
        self.modified = false;
        Ok(())
    }

    /// Save the map to the file it was loaded from or last saved to
    pub fn save_data<S: MapStorage>(&mut self, storage: &S) -> Result<(), MapError> {
        let path = self.filename.clone().ok_or(MapError::NoFilename)?;
        self.save_data_as(storage, path)
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{map, solid_tileset};
    use crate::context::ContextId;
    use crate::layer::TileRef;
    use crate::storage::{MapSnapshot, MapStorage};
    use crate::{MapData, MapError};
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};

    #[derive(Default)]
    struct MemoryStorage {
        files: RefCell<HashMap<PathBuf, MapSnapshot>>,
    }

    impl MapStorage for MemoryStorage {
        type Error = String;

        fn load(&self, path: &Path) -> Result<MapSnapshot, String> {
            self.files
                .borrow()
                .get(path)
                .cloned()
                .ok_or_else(|| format!("{} not found", path.display()))
        }

        fn save(&self, path: &Path, snapshot: &MapSnapshot) -> Result<(), String> {
            self.files
                .borrow_mut()
                .insert(path.to_path_buf(), snapshot.clone());
            Ok(())
        }
    }

    fn sample_map() -> MapData {
        let mut map = map(3, 2);
        map.set_name("Village");
        map.set_designers("Ann, Bo");
        map.add_tileset(solid_tileset()).unwrap();
        map.add_tile_layer("Walls", false).unwrap();
        let night = map.add_tile_context("Night", ContextId::new(1)).unwrap();
        map.set_tile(ContextId::new(1), 0, 2, 1, Some(TileRef::new(0, 0)))
            .unwrap();
        map.set_tile(night, 1, 0, 0, Some(TileRef::new(0, 7)))
            .unwrap();
        map
    }

    #[test]
    fn test_save_then_load() {
        let storage = MemoryStorage::default();
        let mut map = sample_map();
        map.save_data_as(&storage, "village.map").unwrap();
        assert!(!map.is_modified());
        assert_eq!(map.filename(), Some(Path::new("village.map")));

        let mut loaded = MapData::new();
        loaded.load_data(&storage, "village.map").unwrap();
        assert!(!loaded.is_modified());
        assert_eq!(loaded.name(), "Village");
        assert_eq!(loaded.designers(), "Ann, Bo");
        assert_eq!(loaded.tile_context_names(), map.tile_context_names());
        assert_eq!(loaded.inherited_tile_context_names(), vec!["", "Base"]);
        assert_eq!(loaded.tile_layer_properties(), map.tile_layer_properties());
        assert_eq!(loaded.tile(ContextId::new(2), 1, 0, 0), Some(TileRef::new(0, 7)));
        assert_eq!(loaded.collision_map(), map.collision_map());
        assert_eq!(loaded.snapshot(), map.snapshot());
        assert_eq!(loaded.selected_context_id(), Some(ContextId::new(1)));
    }

    #[test]
    fn test_load_requires_empty_map() {
        let storage = MemoryStorage::default();
        let mut map = sample_map();
        map.save_data_as(&storage, "village.map").unwrap();
        assert_eq!(
            map.load_data(&storage, "village.map"),
            Err(MapError::AlreadyInitialized)
        );
    }

    #[test]
    fn test_load_missing_file() {
        let storage = MemoryStorage::default();
        let mut map = MapData::new();
        assert_eq!(
            map.load_data(&storage, "nowhere.map"),
            Err(MapError::Storage("nowhere.map not found".to_string()))
        );
        assert!(!map.is_initialized());
    }

    #[test]
    fn test_load_rejects_invalid_snapshot() {
        let storage = MemoryStorage::default();
        let mut snapshot = sample_map().snapshot().unwrap();
        snapshot.contexts[0].inherits = ContextId::new(2);
        storage.save(Path::new("broken.map"), &snapshot).unwrap();

        let mut map = MapData::new();
        let err = map.load_data(&storage, "broken.map").unwrap_err();
        assert!(matches!(err, MapError::InvalidSnapshot(_)));
        assert!(!map.is_initialized());
        assert_eq!(map.filename(), None);
    }

    #[test]
    fn test_save_without_filename() {
        let storage = MemoryStorage::default();
        let mut map = sample_map();
        assert_eq!(map.save_data(&storage), Err(MapError::NoFilename));

        map.set_filename("village.map");
        map.save_data(&storage).unwrap();
        assert!(storage.files.borrow().contains_key(Path::new("village.map")));
    }

    #[test]
    fn test_snapshot_requires_data() {
        assert_eq!(MapData::new().snapshot(), Err(MapError::NotInitialized));
    }
}

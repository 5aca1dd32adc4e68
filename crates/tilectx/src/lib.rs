//! tilectx - the data model behind a context-aware tile map editor
//!
//! A map holds any number of tile layers, each present in up to 32 named contexts.
//! Contexts are alternate states of the same map (day and night, before and after an
//! event) and may inherit unset tiles from a single parent context. Collision is
//! compiled into one bitmask per quadrant cell with a bit per context.
//!
//! # Example
//!
//! ```rust,ignore
//! use tilectx::prelude::*;
//!
//! let mut map = MapData::new();
//! map.create_data(32, 24)?;
//! let town = map.add_tileset(Tileset::new("Town", "town.lua", "town.png"))?;
//! let night = map.add_tile_context("Night", ContextId::new(1))?;
//! map.set_tile(night, 0, 4, 4, Some(TileRef::new(town as u32, 17)))?;
//! map.save_data_as(&JsonMapStorage::pretty(), "village.map.json")?;
//! ```
//!
//! # Features
//!
//! - `json` (default): JSON map storage and TOML editor configuration
//! - `bevy`: `MapData` derives `Resource`

pub use tilectx_core::*;

#[cfg(feature = "json")]
pub use tilectx_format::{
    load_map_from_bytes, load_map_from_str, map_to_string, EditorConfig, FormatError,
    JsonMapStorage, MAP_EXTENSION,
};

/// Commonly used types
pub mod prelude {
    pub use tilectx_core::{
        quadrant, CollisionMap, ContextId, ErrorKind, MapData, MapDefaults, MapError,
        MapStorage, TileContext, TileLayer, TileLayerProperties, TileRef, Tileset,
        INVALID_CONTEXT, MAX_CONTEXTS,
    };

    #[cfg(feature = "json")]
    pub use tilectx_format::{EditorConfig, JsonMapStorage};
}

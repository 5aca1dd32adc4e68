//! Core data structures for tilectx
//!
//! This crate provides the in-memory model behind a context-aware tile map editor:
//! - `Tileset` - 16x16 catalog of sub-tiles with quadrant collision and animations
//! - `TileLayer` / `TileLayerProperties` - per-context tile grids and their shared metadata
//! - `TileContext` - a named alternate map state with optional single inheritance
//! - `MapData` - the custodian that keeps every context, layer and tileset consistent
//! - `CollisionMap` - per-quadrant bitmask with one bit per context
//! - `MapSnapshot` / `MapStorage` - the flat document exchanged with storage backends
//!
//! `MapData` is not internally synchronized. It is `Send + Sync` as plain data, but every
//! mutation goes through `&mut self`, so sharing it across threads needs an outer lock.

mod collision;
mod config;
mod context;
mod error;
mod layer;
mod map;
mod naming;
mod storage;
mod tileset;

pub use collision::{CollisionMap, QuadrantGrid};
pub use config::MapDefaults;
pub use context::{ContextId, TileContext, INVALID_CONTEXT, MAX_CONTEXTS};
pub use error::{ErrorKind, MapError};
pub use layer::{grid_cell_count, TileLayer, TileLayerProperties, TileRef};
pub use map::MapData;
pub use naming::clone_name;
pub use storage::{ContextSnapshot, MapSnapshot, MapStorage, SNAPSHOT_VERSION};
pub use tileset::{
    quadrant, AnimationFrame, TileAnimation, Tileset, TILESET_COLUMNS, TILESET_ROWS,
    TILESET_TILE_COUNT,
};

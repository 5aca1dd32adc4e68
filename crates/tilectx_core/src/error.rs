//! Error types returned by map data operations

use thiserror::Error;

use crate::context::{ContextId, MAX_CONTEXTS};

/// Broad classification of a [`MapError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad argument: duplicate name, invalid index, boundary violation, cycle
    Validation,
    /// A fixed capacity would be exceeded
    Capacity,
    /// The operation requires (or forbids) initialized map data
    State,
    /// A referenced tileset, layer or context does not exist
    NotFound,
}

/// Errors that can occur when editing map data
///
/// A failed operation never leaves partial changes behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
    #[error("Map data is already initialized")]
    AlreadyInitialized,
    #[error("Map data is not initialized")]
    NotInitialized,
    #[error("Map dimensions must be non-zero and fit a u32 quadrant grid (got {length}x{height})")]
    InvalidDimensions { length: u32, height: u32 },

    #[error("Tileset '{0}' has not been loaded")]
    TilesetNotInitialized(String),
    #[error("Tileset '{0}' was already added to the map")]
    TilesetAlreadyAdded(String),
    #[error("A tileset with definition file '{0}' already exists")]
    DuplicateTilesetFile(String),
    #[error("No tileset exists at index {0}")]
    InvalidTilesetIndex(usize),

    #[error("Names must not be empty")]
    EmptyName,
    #[error("A tile layer named '{0}' already exists")]
    DuplicateLayerName(String),
    #[error("No tile layer exists at index {0}")]
    InvalidLayerIndex(usize),
    #[error("'{0}' is the only tile layer and can not be deleted")]
    LastTileLayer(String),
    #[error("Tile ({x}, {y}) is outside the {length}x{height} map")]
    TileOutOfBounds {
        x: u32,
        y: u32,
        length: u32,
        height: u32,
    },
    #[error("Invalid {axis} range {start}..{end}: edits must stay inside the map and off its final {axis}")]
    InvalidExtent {
        axis: &'static str,
        start: u32,
        end: u32,
    },

    #[error("The maximum of {max} tile contexts has been reached", max = MAX_CONTEXTS)]
    ContextLimitReached,
    #[error("A tile context named '{0}' already exists")]
    DuplicateContextName(String),
    #[error("No tile context exists with id {0}")]
    InvalidContextId(ContextId),
    #[error("'{0}' is the last base context and can not be deleted")]
    LastBaseContext(String),
    #[error("'{context}' can not be deleted while '{inheritor}' inherits from it")]
    ContextHasInheritors { context: String, inheritor: String },
    #[error("A tile context can not inherit from itself")]
    SelfInheritance,
    #[error("Inheriting from '{parent}' would create a cycle through '{context}'")]
    InheritanceCycle { context: String, parent: String },

    #[error("No filename has been set for this map")]
    NoFilename,
    #[error("Invalid map document: {0}")]
    InvalidSnapshot(String),
    #[error("Storage error: {0}")]
    Storage(String),
}

impl MapError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            MapError::AlreadyInitialized | MapError::NotInitialized | MapError::NoFilename => {
                ErrorKind::State
            }
            MapError::ContextLimitReached => ErrorKind::Capacity,
            MapError::InvalidTilesetIndex(_)
            | MapError::InvalidLayerIndex(_)
            | MapError::InvalidContextId(_) => ErrorKind::NotFound,
            _ => ErrorKind::Validation,
        }
    }
}

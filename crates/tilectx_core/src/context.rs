//! Tile contexts: named alternate states of the map

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::layer::TileLayer;

/// Maximum number of contexts in a map; one bit of a `u32` per context
pub const MAX_CONTEXTS: usize = 32;

/// Context id meaning "no context", used for contexts that inherit from nothing
pub const INVALID_CONTEXT: ContextId = ContextId::INVALID;

/// Identifier of a tile context
///
/// Ids are always `index + 1` of the context in the map's context list, so they stay
/// contiguous (`1..=count`) and change when contexts are deleted or reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextId(u32);

impl ContextId {
    pub const INVALID: ContextId = ContextId(0);

    pub const fn new(raw: u32) -> Self {
        ContextId(raw)
    }

    /// The id of the context stored at `index`
    pub const fn from_index(index: usize) -> Self {
        ContextId(index as u32 + 1)
    }

    pub const fn get(self) -> u32 {
        self.0
    }

    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }

    /// Storage index of this id, None for [`INVALID_CONTEXT`]
    pub fn index(self) -> Option<usize> {
        self.0.checked_sub(1).map(|i| i as usize)
    }

    /// Bit of this context in a collision mask
    pub fn bit(self) -> u32 {
        match self.index() {
            Some(i) if i < MAX_CONTEXTS => 1 << i,
            _ => 0,
        }
    }
}

impl Default for ContextId {
    fn default() -> Self {
        ContextId::INVALID
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named map state holding one tile layer per layer index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileContext {
    id: ContextId,
    name: String,
    inherited_context_id: ContextId,
    layers: Vec<TileLayer>,
}

impl TileContext {
    pub(crate) fn new(
        id: ContextId,
        name: String,
        inherited_context_id: ContextId,
        layers: Vec<TileLayer>,
    ) -> Self {
        Self {
            id,
            name,
            inherited_context_id,
            layers,
        }
    }

    pub fn id(&self) -> ContextId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Id of the parent context, or [`INVALID_CONTEXT`] for a base context
    pub fn inherited_context_id(&self) -> ContextId {
        self.inherited_context_id
    }

    /// The parent context's id, if any
    pub fn inherits_from(&self) -> Option<ContextId> {
        self.inherited_context_id
            .is_valid()
            .then_some(self.inherited_context_id)
    }

    /// Check if this context inherits from nothing
    pub fn is_base(&self) -> bool {
        !self.inherited_context_id.is_valid()
    }

    pub fn layers(&self) -> &[TileLayer] {
        &self.layers
    }

    pub fn layer(&self, index: usize) -> Option<&TileLayer> {
        self.layers.get(index)
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub(crate) fn set_id(&mut self, id: ContextId) {
        self.id = id;
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub(crate) fn set_inherited_context_id(&mut self, id: ContextId) {
        self.inherited_context_id = id;
    }

    pub(crate) fn layers_mut(&mut self) -> &mut Vec<TileLayer> {
        &mut self.layers
    }
}

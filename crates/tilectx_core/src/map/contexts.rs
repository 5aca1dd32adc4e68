//! Tile context management
//!
//! Contexts are stored packed, so any delete or reorder renumbers ids. Inheritance
//! references and the selected context are remapped in the same step.

use tracing::debug;

use super::MapData;
use crate::context::{ContextId, TileContext, INVALID_CONTEXT, MAX_CONTEXTS};
use crate::error::MapError;
use crate::naming::clone_name;

impl MapData {
    pub fn tile_context_count(&self) -> usize {
        self.contexts.len()
    }

    pub fn tile_contexts(&self) -> &[TileContext] {
        &self.contexts
    }

    /// Ordered list of the names of all tile contexts
    pub fn tile_context_names(&self) -> Vec<String> {
        self.contexts.iter().map(|c| c.name().to_string()).collect()
    }

    /// Name of each context's parent, in context order (empty for base contexts)
    pub fn inherited_tile_context_names(&self) -> Vec<String> {
        self.contexts
            .iter()
            .map(|c| {
                c.inherits_from()
                    .and_then(|parent| self.find_tile_context_by_id(parent))
                    .map(|parent| parent.name().to_string())
                    .unwrap_or_default()
            })
            .collect()
    }

    pub fn find_tile_context_by_id(&self, id: ContextId) -> Option<&TileContext> {
        self.contexts.get(id.index()?)
    }

    pub fn find_tile_context_by_name(&self, name: &str) -> Option<&TileContext> {
        self.contexts.iter().find(|c| c.name() == name)
    }

    pub fn find_tile_context_by_index(&self, index: usize) -> Option<&TileContext> {
        self.contexts.get(index)
    }

    /// Add a new context, optionally inheriting from an existing one
    ///
    /// The new context gets a blank layer for every layer index and the next id.
    pub fn add_tile_context(
        &mut self,
        name: impl Into<String>,
        inherit: ContextId,
    ) -> Result<ContextId, MapError> {
        self.require_initialized()?;
        if self.contexts.len() >= MAX_CONTEXTS {
            return Err(MapError::ContextLimitReached);
        }
        let name = name.into();
        self.check_context_name(&name, None)?;
        if inherit.is_valid() {
            self.context_index(inherit)?;
        }

        let id = ContextId::from_index(self.contexts.len());
        let layers = vec![self.empty_layer.clone(); self.layer_properties.len()];
        debug!("Adding tile context '{}' with id {}", name, id);
        self.contexts
            .push(TileContext::new(id, name, inherit, layers));
        self.touch();
        Ok(id)
    }

    /// Delete a context and renumber the ones after it
    ///
    /// Fails if another context inherits from it or if it is the last base context.
    pub fn delete_tile_context(&mut self, id: ContextId) -> Result<(), MapError> {
        self.require_initialized()?;
        let index = self.context_index(id)?;
        let context = &self.contexts[index];

        if context.is_base() && self.contexts.iter().filter(|c| c.is_base()).count() == 1 {
            return Err(MapError::LastBaseContext(context.name().to_string()));
        }
        if let Some(inheritor) = self.contexts.iter().find(|c| c.inherits_from() == Some(id)) {
            return Err(MapError::ContextHasInheritors {
                context: context.name().to_string(),
                inheritor: inheritor.name().to_string(),
            });
        }

        let removed = self.contexts.remove(index);
        let shift = |other: ContextId| {
            if other > id {
                ContextId::new(other.get() - 1)
            } else {
                other
            }
        };
        for context in &mut self.contexts {
            let inherited = context.inherited_context_id();
            context.set_inherited_context_id(shift(inherited));
        }
        self.selected_context = self.selected_context.map(|selected| {
            if selected == id {
                ContextId::from_index(0)
            } else {
                shift(selected)
            }
        });
        self.renumber_contexts();
        self.touch();

        debug!("Deleted tile context '{}'", removed.name());
        Ok(())
    }

    /// Duplicate a context's layer data under a new name
    ///
    /// The clone is a base context and is appended after all existing contexts.
    pub fn clone_tile_context(&mut self, id: ContextId) -> Result<ContextId, MapError> {
        self.require_initialized()?;
        let index = self.context_index(id)?;
        if self.contexts.len() >= MAX_CONTEXTS {
            return Err(MapError::ContextLimitReached);
        }

        let source = &self.contexts[index];
        let name = clone_name(source.name(), self.contexts.iter().map(|c| c.name()));
        let layers = source.layers().to_vec();
        let clone_id = ContextId::from_index(self.contexts.len());

        debug!("Cloning tile context {} as '{}'", id, name);
        self.contexts
            .push(TileContext::new(clone_id, name, INVALID_CONTEXT, layers));
        self.touch();
        Ok(clone_id)
    }

    /// Rename a context; the name must be unique among all contexts
    pub fn rename_tile_context(
        &mut self,
        id: ContextId,
        name: impl Into<String>,
    ) -> Result<(), MapError> {
        self.require_initialized()?;
        let index = self.context_index(id)?;
        let name = name.into();
        self.check_context_name(&name, Some(index))?;

        self.contexts[index].set_name(name);
        self.modified = true;
        self.generation += 1;
        Ok(())
    }

    /// Make a context inherit from another, or from nothing with [`INVALID_CONTEXT`]
    pub fn change_inheritance_tile_context(
        &mut self,
        id: ContextId,
        inherit: ContextId,
    ) -> Result<(), MapError> {
        self.require_initialized()?;
        let index = self.context_index(id)?;

        if inherit.is_valid() {
            let parent_index = self.context_index(inherit)?;
            if inherit == id {
                return Err(MapError::SelfInheritance);
            }
            // Walk up from the new parent; reaching `id` would close a loop
            let mut current = Some(inherit);
            for _ in 0..MAX_CONTEXTS {
                let Some(ancestor) = current else {
                    break;
                };
                if ancestor == id {
                    return Err(MapError::InheritanceCycle {
                        context: self.contexts[index].name().to_string(),
                        parent: self.contexts[parent_index].name().to_string(),
                    });
                }
                current = self
                    .find_tile_context_by_id(ancestor)
                    .and_then(|c| c.inherits_from());
            }
        }

        if self.contexts[index].inherited_context_id() == inherit {
            return Ok(());
        }
        self.contexts[index].set_inherited_context_id(inherit);
        self.touch();
        Ok(())
    }

    /// Turn a context into a base context
    pub fn remove_inheritance_tile_context(&mut self, id: ContextId) -> Result<(), MapError> {
        self.change_inheritance_tile_context(id, INVALID_CONTEXT)
    }

    /// Swap the storage positions (and therefore the ids) of two contexts
    pub fn swap_tile_contexts(&mut self, first: ContextId, second: ContextId) -> Result<(), MapError> {
        self.require_initialized()?;
        let first_index = self.context_index(first)?;
        let second_index = self.context_index(second)?;
        if first == second {
            return Ok(());
        }

        let swap = |other: ContextId| match other {
            o if o == first => second,
            o if o == second => first,
            o => o,
        };
        self.contexts.swap(first_index, second_index);
        for context in &mut self.contexts {
            let inherited = context.inherited_context_id();
            context.set_inherited_context_id(swap(inherited));
        }
        self.selected_context = self.selected_context.map(swap);
        self.renumber_contexts();
        self.touch();
        Ok(())
    }

    /// Move a context one position toward the front; fails for the first context
    pub fn move_tile_context_up(&mut self, id: ContextId) -> Result<(), MapError> {
        let target = ContextId::new(id.get().saturating_sub(1));
        self.swap_tile_contexts(id, target)
    }

    /// Move a context one position toward the back; fails for the last context
    pub fn move_tile_context_down(&mut self, id: ContextId) -> Result<(), MapError> {
        let target = ContextId::new(id.get().saturating_add(1));
        self.swap_tile_contexts(id, target)
    }

    fn renumber_contexts(&mut self) {
        for (index, context) in self.contexts.iter_mut().enumerate() {
            context.set_id(ContextId::from_index(index));
        }
    }

    fn check_context_name(&self, name: &str, ignore: Option<usize>) -> Result<(), MapError> {
        if name.is_empty() {
            return Err(MapError::EmptyName);
        }
        let taken = self
            .contexts
            .iter()
            .enumerate()
            .any(|(i, c)| Some(i) != ignore && c.name() == name);
        if taken {
            return Err(MapError::DuplicateContextName(name.to_string()));
        }
        Ok(())
    }
}

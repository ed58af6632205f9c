use alloc::vec::Vec;

use super::{Colorspace, builtin};
use crate::error::RegistryError;

/// Colorspaces known to an application, looked up by id.
///
/// An explicit value, not a global: create one at startup, register what the
/// application supports, and share it read-only.
#[derive(Debug, Clone, Default)]
pub struct ColorspaceRegistry {
    entries: Vec<Colorspace>,
}

impl ColorspaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in colorspace.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for cs in builtin::all() {
            // Built-in ids are distinct.
            let _ = registry.register(cs.clone());
        }
        registry
    }

    /// Add a colorspace. Ids must be unique.
    pub fn register(&mut self, cs: Colorspace) -> Result<(), RegistryError> {
        if self.get(cs.id()).is_some() {
            return Err(RegistryError::Duplicate { id: cs.id() });
        }
        log::debug!(
            "registered colorspace {} ({}, {} bytes/pixel, {} ops)",
            cs.id(),
            cs.name(),
            cs.pixel_size(),
            cs.composite_ops().len()
        );
        self.entries.push(cs);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Colorspace> {
        self.entries.iter().find(|cs| cs.id() == id)
    }

    /// Registered ids, in registration order.
    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(Colorspace::id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Colorspace> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

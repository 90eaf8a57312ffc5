//! Entity identifier interning.
//!
//! Identifiers are opaque, hashable tokens (IP addresses, account names,
//! resource paths). Interning them to dense `u32` IDs lets every population
//! and per-target source set be a Roaring bitmap, so classification and
//! counting are set operations on integers instead of string comparisons.
//!
//! IDs are assigned in first-observation order, so iterating a bitmap of
//! interned IDs also yields entities in first-observation order.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Interned entity identifier (4 bytes instead of 24+ for String).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct EntityId(u32);

impl EntityId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Entity interner: maps identifier strings to compact IDs.
#[derive(Debug, Default, Clone)]
pub struct EntityInterner {
    /// Identifier to ID mapping.
    id_of: AHashMap<String, EntityId>,
    /// ID to identifier mapping (dense, for reverse lookup).
    entities: Vec<String>,
}

impl EntityInterner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern an identifier, returning its ID.
    pub fn intern(&mut self, entity: &str) -> EntityId {
        if let Some(&id) = self.id_of.get(entity) {
            return id;
        }

        let id = EntityId(self.entities.len() as u32);
        self.id_of.insert(entity.to_string(), id);
        self.entities.push(entity.to_string());
        id
    }

    /// ID of an already-interned identifier, if any.
    pub fn id_of(&self, entity: &str) -> Option<EntityId> {
        self.id_of.get(entity).copied()
    }

    /// Reverse lookup.
    pub fn lookup(&self, id: EntityId) -> Option<&str> {
        self.entities.get(id.0 as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

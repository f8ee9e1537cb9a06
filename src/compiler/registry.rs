//! Schema registry: named, shared definitions keyed by type identity.
//!
//! The identity is usually the canonical type. A type reached through a
//! member-level ignore list is keyed with that list appended, so it gets a
//! component of its own.
//!
//! Ownership of a registered node moves to the registry. Every other place the
//! type appears holds a reference node pointing at the registered name.

use crate::schema::{Schema, SchemaArena, SchemaId};
use crate::types::TypeRef;
use indexmap::IndexMap;
use log::debug;
use std::collections::{HashMap, HashSet};

/// One shared definition
#[derive(Debug, Clone, PartialEq)]
pub struct RegistryEntry {
    /// Component name the reference resolves to
    pub name: String,
    pub ty: TypeRef,
    pub schema: SchemaId,
}

/// Deduplicates composite schemas across one document
#[derive(Debug)]
pub struct SchemaRegistry {
    prefix: String,
    entries: IndexMap<String, RegistryEntry>,
    names: HashSet<String>,
    owners: HashMap<SchemaId, String>,
}

impl SchemaRegistry {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            entries: IndexMap::new(),
            names: HashSet::new(),
            owners: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.entries.contains_key(identity)
    }

    pub fn lookup(&self, identity: &str) -> Option<&RegistryEntry> {
        self.entries.get(identity)
    }

    /// Reference string for an already registered identity
    pub fn reference_to(&self, identity: &str) -> Option<String> {
        self.lookup(identity).map(|e| self.reference(&e.name))
    }

    /// Reference string for a node the registry owns
    pub fn reference_for_schema(&self, schema: SchemaId) -> Option<String> {
        self.owners.get(&schema).map(|name| self.reference(name))
    }

    /// Register `candidate` as the definition of `ty` under `identity` unless
    /// the identity is already known, and return the reference every embedding
    /// site should use.
    ///
    /// A second registration of the same identity keeps the first definition;
    /// the candidate is left unowned. `preferred_name` is used when it is still
    /// free. Taken preferred names of plain identities fall back to the type's
    /// own names; those of ignore-scoped identities get a numeric suffix.
    pub fn check_registration(
        &mut self,
        identity: &str,
        ty: &TypeRef,
        candidate: SchemaId,
        preferred_name: Option<&str>,
    ) -> String {
        if let Some(existing) = self.entries.get(identity) {
            debug!("{} already registered as {}", identity, existing.name);
            return self.reference(&existing.name);
        }

        let name = match preferred_name {
            Some(name) if !self.names.contains(name) => name.to_string(),
            Some(name) if identity != ty.canonical() => self.numbered(name),
            _ => self.unique_name(ty),
        };
        debug!("Registering {} as {}", identity, name);
        self.names.insert(name.clone());
        self.owners.insert(candidate, name.clone());
        self.entries.insert(
            identity.to_string(),
            RegistryEntry {
                name: name.clone(),
                ty: ty.clone(),
                schema: candidate,
            },
        );
        self.reference(&name)
    }

    /// Registered definitions, materialized in registration order
    pub fn components(&self, arena: &SchemaArena) -> IndexMap<String, Schema> {
        self.entries
            .values()
            .map(|entry| {
                let schema = arena.materialize(entry.schema, &|id| self.reference_for_schema(id));
                (entry.name.clone(), schema)
            })
            .collect()
    }

    fn reference(&self, name: &str) -> String {
        format!("{}{}", self.prefix, name)
    }

    /// Simple name first, then the qualified name, then a numeric suffix
    fn unique_name(&self, ty: &TypeRef) -> String {
        let simple = ty.simple_name();
        if !self.names.contains(&simple) {
            return simple;
        }

        let qualified: String = ty
            .canonical()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect::<String>()
            .split('_')
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("_");
        if !self.names.contains(&qualified) {
            return qualified;
        }
        self.numbered(&qualified)
    }

    fn numbered(&self, base: &str) -> String {
        (1..)
            .map(|n| format!("{}{}", base, n))
            .find(|candidate| !self.names.contains(candidate))
            .unwrap_or_else(|| base.to_string())
    }
}

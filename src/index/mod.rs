//! Type index: the read-only lookup service the compiler queries.
//!
//! The compiler only ever sees the [`TypeIndex`] trait. [`InMemoryIndex`] is the
//! map-backed implementation filled by the two loaders:
//!
//! - [`descriptor`] reads declarative YAML/JSON type descriptor files
//! - [`rust_source`] parses Rust source files with `syn`

pub mod descriptor;
pub mod rust_source;

use crate::annotation::SchemaAnnotation;
use crate::error::{Error, Result};
use crate::types::{TypeParameter, TypeRef};
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// What kind of declaration a class descriptor describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassKind {
    #[default]
    Class,
    Interface,
    Enum,
}

/// A member (field/property) declared by a class
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    /// Declared type; may mention the owning class's type variables
    pub ty: TypeRef,
    pub is_static: bool,
    pub is_transient: bool,
    /// `Some(true)` ignores the member, `Some(false)` explicitly keeps it
    pub ignore: Option<bool>,
    pub schema: Option<SchemaAnnotation>,
    /// Properties to hide on the type this member leads to
    pub ignore_properties: Vec<String>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            is_static: false,
            is_transient: false,
            ignore: None,
            schema: None,
            ignore_properties: Vec::new(),
        }
    }
}

/// Everything the index knows about one class, interface or enum
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassDescriptor {
    /// Fully-qualified name
    pub name: String,
    pub kind: ClassKind,
    pub type_parameters: Vec<TypeParameter>,
    pub superclass: Option<TypeRef>,
    pub interfaces: Vec<TypeRef>,
    pub fields: Vec<FieldDescriptor>,
    pub enum_constants: Vec<String>,
    /// Class-level schema annotation
    pub schema: Option<SchemaAnnotation>,
    /// Property names this class hides, wherever they were declared
    pub ignore_properties: Vec<String>,
}

impl ClassDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn is_enum(&self) -> bool {
        self.kind == ClassKind::Enum
    }

    /// Supertypes in lookup order: superclass first, then interfaces
    pub fn supertypes(&self) -> impl Iterator<Item = &TypeRef> {
        self.superclass.iter().chain(self.interfaces.iter())
    }
}

/// Read-only type lookup service.
///
/// Lookups of types outside the indexed universe return `None`; they never fail.
pub trait TypeIndex: Send + Sync {
    /// Look up a class by fully-qualified name
    fn class(&self, name: &str) -> Option<&ClassDescriptor>;

    /// All indexed classes
    fn classes(&self) -> Vec<&ClassDescriptor>;

    fn contains(&self, name: &str) -> bool {
        self.class(name).is_some()
    }

    /// Whether `sub` is `sup` or reaches it through superclass/interface edges
    fn is_subtype(&self, sub: &str, sup: &str) -> bool {
        let mut pending = vec![sub.to_string()];
        let mut seen = HashSet::new();
        while let Some(name) = pending.pop() {
            if name == sup {
                return true;
            }
            if !seen.insert(name.clone()) {
                continue;
            }
            if let Some(class) = self.class(&name) {
                pending.extend(class.supertypes().filter_map(|t| t.name().map(String::from)));
            }
        }
        false
    }
}

/// Map-backed [`TypeIndex`]
#[derive(Debug, Default, Clone)]
pub struct InMemoryIndex {
    classes: IndexMap<String, ClassDescriptor>,
}

impl InMemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a class; a name may only be indexed once
    pub fn insert(&mut self, class: ClassDescriptor) -> Result<()> {
        if self.classes.contains_key(&class.name) {
            return Err(Error::DuplicateType(class.name));
        }
        debug!("Indexing type: {}", class.name);
        self.classes.insert(class.name.clone(), class);
        Ok(())
    }

    /// Merge another index into this one
    pub fn extend(&mut self, other: InMemoryIndex) -> Result<()> {
        for (_, class) in other.classes {
            self.insert(class)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl TypeIndex for InMemoryIndex {
    fn class(&self, name: &str) -> Option<&ClassDescriptor> {
        self.classes.get(name)
    }

    fn classes(&self) -> Vec<&ClassDescriptor> {
        self.classes.values().collect()
    }
}

//! Schema model.
//!
//! Two shapes live here:
//!
//! - [`SchemaNode`]s are the mutable fragments the compiler builds. They are
//!   stored in a [`SchemaArena`] and point at their children by [`SchemaId`], so
//!   a queued node can be wired into its parent before it has been filled in.
//! - [`Schema`] is the owned, serializable tree produced once compilation is done.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON schema type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
    Null,
}

/// Discriminator object for polymorphic schemas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discriminator {
    pub property_name: String,
}

/// Scalar attributes shared by nodes under construction and finished schemas
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub write_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_minimum: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_maximum: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_items: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_properties: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_properties: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<Discriminator>,
}

/// Handle to a node in a [`SchemaArena`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaId(usize);

/// A schema fragment under construction.
///
/// A node is either a reference or an inline definition, never both.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaNode {
    reference: Option<String>,
    pub schema_type: Option<SchemaType>,
    pub attributes: SchemaAttributes,
    pub properties: IndexMap<String, SchemaId>,
    pub required: Vec<String>,
    pub items: Option<SchemaId>,
    pub additional_properties: Option<SchemaId>,
    pub enum_values: Option<Vec<Value>>,
    pub all_of: Vec<SchemaId>,
}

impl SchemaNode {
    pub fn of_type(schema_type: SchemaType) -> Self {
        Self {
            schema_type: Some(schema_type),
            ..Default::default()
        }
    }

    /// A node holding nothing but a pointer to a shared definition
    pub fn reference_to(reference: impl Into<String>) -> Self {
        Self {
            reference: Some(reference.into()),
            ..Default::default()
        }
    }

    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    pub fn is_reference(&self) -> bool {
        self.reference.is_some()
    }
}

/// Owns every node built during compilation
#[derive(Debug, Default)]
pub struct SchemaArena {
    nodes: Vec<SchemaNode>,
}

impl SchemaArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, node: SchemaNode) -> SchemaId {
        self.nodes.push(node);
        SchemaId(self.nodes.len() - 1)
    }

    pub fn alloc_empty(&mut self) -> SchemaId {
        self.alloc(SchemaNode::default())
    }

    pub fn get(&self, id: SchemaId) -> &SchemaNode {
        &self.nodes[id.0]
    }

    pub fn get_mut(&mut self, id: SchemaId) -> &mut SchemaNode {
        &mut self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Build the owned tree rooted at `id`.
    ///
    /// `embedded_reference` is consulted for every node below the root: when it
    /// returns a reference, the node is owned elsewhere and only the reference is
    /// emitted.
    pub fn materialize<F>(&self, id: SchemaId, embedded_reference: &F) -> Schema
    where
        F: Fn(SchemaId) -> Option<String>,
    {
        let node = self.get(id);
        if let Some(reference) = node.reference() {
            return Schema::reference_to(reference);
        }

        let child = |child_id: SchemaId| match embedded_reference(child_id) {
            Some(reference) => Schema::reference_to(reference),
            None => self.materialize(child_id, embedded_reference),
        };

        Schema {
            reference: None,
            schema_type: node.schema_type,
            attributes: node.attributes.clone(),
            enum_values: node.enum_values.clone(),
            properties: node
                .properties
                .iter()
                .map(|(name, &prop)| (name.clone(), child(prop)))
                .collect(),
            required: node.required.clone(),
            items: node.items.map(|i| Box::new(child(i))),
            additional_properties: node.additional_properties.map(|a| Box::new(child(a))),
            all_of: node.all_of.iter().map(|&a| child(a)).collect(),
        }
    }
}

/// A finished schema, ready to serialize
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<SchemaType>,
    #[serde(flatten)]
    pub attributes: SchemaAttributes,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, Schema>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<Box<Schema>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub all_of: Vec<Schema>,
}

impl Schema {
    pub fn reference_to(reference: impl Into<String>) -> Self {
        Self {
            reference: Some(reference.into()),
            ..Default::default()
        }
    }

    /// Name component of the reference (`Pet` for `#/components/schemas/Pet`)
    pub fn reference_name(&self) -> Option<&str> {
        self.reference
            .as_deref()
            .and_then(|r| r.rsplit('/').next())
    }

    /// True when the schema constrains nothing at all
    pub fn is_unconstrained(&self) -> bool {
        *self == Schema::default()
    }
}

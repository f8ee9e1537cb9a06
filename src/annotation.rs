//! Annotation metadata: the sparse set of schema overrides declared on a type or member.
//!
//! Every attribute is optional; `None` means "keep whatever was inferred".

use crate::schema::SchemaType;
use crate::types::{TypeParameter, TypeRef};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Schema overrides attached to a class or member
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SchemaAnnotation {
    /// Property name override (members) or component name (classes)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<SchemaType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
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
    /// Closed set of allowed values
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enumeration: Option<Vec<String>>,
    /// Property name used to tell subtypes apart
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discriminator_property: Option<String>,
    /// Properties the class declares as required (class-level only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_properties: Option<Vec<String>>,
    /// Explicit reference; replaces all inferred structure
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// Type to classify instead of the declared one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub implementation: Option<TypeRef>,
    /// Drop the annotated element from the generated schema
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
}

impl SchemaAnnotation {
    /// Whether any attribute that would be copied onto a schema is set.
    ///
    /// `name`, `required`, `ref`, `implementation` and `hidden` steer the
    /// compiler rather than landing on the schema, so they do not count.
    pub fn has_schema_attributes(&self) -> bool {
        let mut steering = self.clone();
        steering.name = None;
        steering.required = None;
        steering.reference = None;
        steering.implementation = None;
        steering.hidden = None;
        steering != SchemaAnnotation::default()
    }

    /// Resolve names of the declaring class's type parameters inside
    /// `implementation` to type variables
    pub fn bind_variables(mut self, params: &[TypeParameter]) -> Self {
        self.implementation = self.implementation.map(|ty| ty.bind_variables(params));
        self
    }
}

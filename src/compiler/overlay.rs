//! Annotation overlay: explicit attributes on top of inferred structure.
//!
//! Most attributes merge field by field, a set annotation value replacing the
//! inferred one. `ref` and `implementation` replace the node wholesale and are
//! handled by the caller through [`replacement`].

use super::{DiagnosticKind, Diagnostics};
use crate::annotation::SchemaAnnotation;
use crate::schema::{Discriminator, SchemaNode};
use crate::types::TypeRef;
use serde_json::Value;

/// Wholesale replacement requested by an annotation
#[derive(Debug, Clone, PartialEq)]
pub enum Replacement {
    Reference(String),
    Implementation(TypeRef),
}

/// The replacing attribute of `annotation`, if any.
///
/// When both are present the reference wins and the conflict is recorded.
pub fn replacement(
    annotation: &SchemaAnnotation,
    prefix: &str,
    subject: &str,
    diagnostics: &mut Diagnostics,
) -> Option<Replacement> {
    match (&annotation.reference, &annotation.implementation) {
        (Some(reference), implementation) => {
            if let Some(implementation) = implementation {
                diagnostics.report(
                    DiagnosticKind::ConflictingOverride,
                    subject,
                    format!(
                        "both ref '{}' and implementation '{}' are set; using the ref",
                        reference, implementation
                    ),
                );
            }
            Some(Replacement::Reference(qualify_reference(reference, prefix)))
        }
        (None, Some(implementation)) => Some(Replacement::Implementation(implementation.clone())),
        (None, None) => None,
    }
}

/// Bare component names get the reference prefix; anything with a `/` is kept
pub fn qualify_reference(reference: &str, prefix: &str) -> String {
    if reference.contains('/') {
        reference.to_string()
    } else {
        format!("{}{}", prefix, reference)
    }
}

/// Copy every set attribute of `annotation` onto `node`
pub fn apply(
    node: &mut SchemaNode,
    annotation: &SchemaAnnotation,
    subject: &str,
    diagnostics: &mut Diagnostics,
) {
    if annotation.schema_type.is_some() {
        node.schema_type = annotation.schema_type;
    }
    if let Some(values) = &annotation.enumeration {
        node.enum_values = Some(values.iter().cloned().map(Value::String).collect());
    }

    let attrs = &mut node.attributes;
    set(&mut attrs.title, &annotation.title);
    set(&mut attrs.description, &annotation.description);
    set(&mut attrs.format, &annotation.format);
    set(&mut attrs.nullable, &annotation.nullable);
    set(&mut attrs.example, &annotation.example);
    set(&mut attrs.default, &annotation.default);
    set(&mut attrs.read_only, &annotation.read_only);
    set(&mut attrs.write_only, &annotation.write_only);
    set(&mut attrs.deprecated, &annotation.deprecated);
    set(&mut attrs.minimum, &annotation.minimum);
    set(&mut attrs.maximum, &annotation.maximum);
    set(&mut attrs.exclusive_minimum, &annotation.exclusive_minimum);
    set(&mut attrs.exclusive_maximum, &annotation.exclusive_maximum);
    set(&mut attrs.min_length, &annotation.min_length);
    set(&mut attrs.max_length, &annotation.max_length);
    set(&mut attrs.pattern, &annotation.pattern);
    set(&mut attrs.min_items, &annotation.min_items);
    set(&mut attrs.max_items, &annotation.max_items);
    set(&mut attrs.unique_items, &annotation.unique_items);
    set(&mut attrs.min_properties, &annotation.min_properties);
    set(&mut attrs.max_properties, &annotation.max_properties);
    if let Some(property_name) = &annotation.discriminator_property {
        attrs.discriminator = Some(Discriminator {
            property_name: property_name.clone(),
        });
    }

    if attrs.read_only == Some(true) && attrs.write_only == Some(true) {
        diagnostics.report(
            DiagnosticKind::ReadWriteConflict,
            subject,
            "both readOnly and writeOnly are set; keeping readOnly",
        );
        attrs.write_only = None;
    }
}

fn set<T: Clone>(slot: &mut Option<T>, value: &Option<T>) {
    if let Some(v) = value {
        *slot = Some(v.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaType;

    #[test]
    fn test_set_attributes_replace_inferred_ones() {
        let mut node = SchemaNode::of_type(SchemaType::String);
        node.attributes.format = Some("date-time".to_string());
        node.attributes.description = Some("inferred".to_string());
        let annotation = SchemaAnnotation {
            format: Some("date".to_string()),
            max_length: Some(10),
            ..Default::default()
        };

        let mut diagnostics = Diagnostics::default();
        apply(&mut node, &annotation, "Pet.birthday", &mut diagnostics);

        assert_eq!(node.schema_type, Some(SchemaType::String));
        assert_eq!(node.attributes.format.as_deref(), Some("date"));
        assert_eq!(node.attributes.description.as_deref(), Some("inferred"));
        assert_eq!(node.attributes.max_length, Some(10));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_read_write_conflict_keeps_read_only() {
        let mut node = SchemaNode::of_type(SchemaType::String);
        let annotation = SchemaAnnotation {
            read_only: Some(true),
            write_only: Some(true),
            ..Default::default()
        };

        let mut diagnostics = Diagnostics::default();
        apply(&mut node, &annotation, "User.password", &mut diagnostics);

        assert_eq!(node.attributes.read_only, Some(true));
        assert!(node.attributes.write_only.is_none());
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_reference_beats_implementation() {
        let annotation = SchemaAnnotation {
            reference: Some("Contact".to_string()),
            implementation: Some(TypeRef::class("com.acme.ContactImpl")),
            ..Default::default()
        };

        let mut diagnostics = Diagnostics::default();
        let replaced = replacement(&annotation, "#/components/schemas/", "Person.contact", &mut diagnostics);

        assert_eq!(
            replaced,
            Some(Replacement::Reference("#/components/schemas/Contact".to_string()))
        );
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics.iter().next().unwrap().kind, DiagnosticKind::ConflictingOverride);
    }

    #[test]
    fn test_qualified_reference_kept() {
        assert_eq!(
            qualify_reference("http://example.com/schemas/Pet", "#/components/schemas/"),
            "http://example.com/schemas/Pet"
        );
        assert_eq!(qualify_reference("Pet", "#/defs/"), "#/defs/Pet");
    }
}

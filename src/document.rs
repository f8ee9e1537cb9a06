//! Assembly of the final document from compiled roots and registry components.

use crate::compiler::{CompiledSchema, Diagnostic, SchemaCompiler};
use crate::schema::Schema;
use crate::types::TypeRef;
use indexmap::IndexMap;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

pub const OPENAPI_VERSION: &str = "3.0.1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    pub title: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Components {
    pub schemas: IndexMap<String, Schema>,
}

/// Schema document in OpenAPI layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApiDocument {
    pub openapi: String,
    pub info: Info,
    pub components: Components,
}

/// Collects compiled roots and turns them into an [`OpenApiDocument`].
///
/// Roots that were registered already appear among the compiler's
/// components. Roots that stayed inline (terminals, enumerations, collections,
/// or any composite when schema references are off) are added under their
/// simple name unless a component already uses it.
pub struct DocumentBuilder {
    info: Info,
    roots: Vec<(TypeRef, CompiledSchema)>,
}

impl DocumentBuilder {
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            info: Info {
                title: title.into(),
                version: version.into(),
                description: None,
            },
            roots: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.info.description = Some(description.into());
        self
    }

    pub fn add_root(&mut self, ty: TypeRef, compiled: CompiledSchema) {
        self.roots.push((ty, compiled));
    }

    /// Every diagnostic recorded while compiling the collected roots
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.roots.iter().flat_map(|(_, c)| c.diagnostics.iter())
    }

    pub fn build(self, compiler: &SchemaCompiler) -> OpenApiDocument {
        let mut schemas = compiler.components();
        debug!("Building document with {} registered components", schemas.len());

        for (ty, compiled) in self.roots {
            if compiled.root.reference_name().is_some() {
                continue;
            }
            let name = ty.simple_name();
            if schemas.contains_key(&name) {
                warn!("Inline schema for {} not added: name {} is already taken", ty, name);
                continue;
            }
            schemas.insert(name, compiled.root);
        }

        OpenApiDocument {
            openapi: OPENAPI_VERSION.to_string(),
            info: self.info,
            components: Components { schemas },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::CompilerConfig;
    use crate::index::{ClassDescriptor, FieldDescriptor, InMemoryIndex};
    use crate::schema::SchemaType;

    fn index() -> InMemoryIndex {
        let mut index = InMemoryIndex::new();
        let mut tag = ClassDescriptor::new("com.acme.Tag");
        tag.fields
            .push(FieldDescriptor::new("label", TypeRef::class("java.lang.String")));
        index.insert(tag).unwrap();
        let mut pet = ClassDescriptor::new("com.acme.Pet");
        pet.fields.push(FieldDescriptor::new(
            "tags",
            TypeRef::parse("java.util.List<com.acme.Tag>").unwrap(),
        ));
        index.insert(pet).unwrap();
        index
    }

    #[test]
    fn test_registered_roots_come_from_components() {
        let index = index();
        let mut compiler = SchemaCompiler::new(&index, CompilerConfig::default());
        let mut builder = DocumentBuilder::new("Pets", "1.0");
        let pet = TypeRef::class("com.acme.Pet");
        let compiled = compiler.compile(&pet);
        builder.add_root(pet, compiled);

        let doc = builder.build(&compiler);

        assert_eq!(doc.openapi, "3.0.1");
        let names: Vec<_> = doc.components.schemas.keys().cloned().collect();
        assert_eq!(names, vec!["Pet", "Tag"]);
    }

    #[test]
    fn test_inline_roots_keyed_by_simple_name() {
        let index = index();
        let config = CompilerConfig::default().with_schema_references(false);
        let mut compiler = SchemaCompiler::new(&index, config);
        let mut builder = DocumentBuilder::new("Pets", "1.0").with_description("inline");
        for root in ["com.acme.Pet", "java.util.List<com.acme.Tag>"] {
            let ty = TypeRef::parse(root).unwrap();
            let compiled = compiler.compile(&ty);
            builder.add_root(ty, compiled);
        }
        assert_eq!(builder.diagnostics().count(), 0);

        let doc = builder.build(&compiler);

        let schemas = &doc.components.schemas;
        assert_eq!(schemas.len(), 2);
        assert_eq!(schemas["Pet"].schema_type, Some(SchemaType::Object));
        assert_eq!(schemas["ListTag"].schema_type, Some(SchemaType::Array));
        assert_eq!(doc.info.description.as_deref(), Some("inline"));
    }
}

//! Declarative type descriptor files.
//!
//! A descriptor file is YAML or JSON with a top-level `types` list:
//!
//! ```yaml
//! types:
//!   - name: com.acme.Box
//!     typeParameters: [T, "N extends java.lang.Number"]
//!     superclass: com.acme.Base<T>
//!     fields:
//!       - name: value
//!         type: T
//!       - name: secret
//!         type: java.lang.String
//!         ignore: true
//!   - name: com.acme.Status
//!     kind: enum
//!     enumConstants: [ACTIVE, RETIRED]
//! ```
//!
//! Names matching one of the class's type parameters become type variables.

use super::{ClassDescriptor, ClassKind, FieldDescriptor, InMemoryIndex};
use crate::annotation::SchemaAnnotation;
use crate::error::Result;
use crate::types::{TypeParameter, TypeRef};
use log::{debug, info};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DescriptorFile {
    #[serde(default)]
    types: Vec<RawClass>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawClass {
    name: String,
    #[serde(default)]
    kind: ClassKind,
    #[serde(default)]
    type_parameters: Vec<String>,
    superclass: Option<String>,
    #[serde(default)]
    interfaces: Vec<String>,
    #[serde(default)]
    fields: Vec<RawField>,
    #[serde(default)]
    enum_constants: Vec<String>,
    schema: Option<SchemaAnnotation>,
    #[serde(default)]
    ignore_properties: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawField {
    name: String,
    #[serde(rename = "type")]
    ty: String,
    #[serde(default, rename = "static")]
    is_static: bool,
    #[serde(default, rename = "transient")]
    is_transient: bool,
    ignore: Option<bool>,
    schema: Option<SchemaAnnotation>,
    #[serde(default)]
    ignore_properties: Vec<String>,
}

/// Whether `path` looks like a descriptor file
pub fn is_descriptor_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml" | "json")
    )
}

/// Load one descriptor file, choosing the format by extension
pub fn load_file(path: &Path) -> Result<InMemoryIndex> {
    debug!("Loading type descriptors from {}", path.display());
    let content = fs::read_to_string(path)?;
    let index = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => parse_json(&content),
        _ => parse_yaml(&content),
    }
    .map_err(|e| e.in_file(path))?;
    info!("Loaded {} types from {}", index.len(), path.display());
    Ok(index)
}

pub fn parse_yaml(content: &str) -> Result<InMemoryIndex> {
    let file: DescriptorFile = serde_yaml::from_str(content)?;
    build_index(file)
}

pub fn parse_json(content: &str) -> Result<InMemoryIndex> {
    let file: DescriptorFile = serde_json::from_str(content)?;
    build_index(file)
}

fn build_index(file: DescriptorFile) -> Result<InMemoryIndex> {
    let mut index = InMemoryIndex::new();
    for raw in file.types {
        index.insert(convert_class(raw)?)?;
    }
    Ok(index)
}

fn convert_class(raw: RawClass) -> Result<ClassDescriptor> {
    let type_parameters = parse_type_parameters(&raw.type_parameters)?;
    let signature = |s: &str| -> Result<TypeRef> {
        Ok(TypeRef::parse(s)?.bind_variables(&type_parameters))
    };

    let superclass = raw.superclass.as_deref().map(signature).transpose()?;
    let interfaces = raw
        .interfaces
        .iter()
        .map(|i| signature(i))
        .collect::<Result<Vec<_>>>()?;
    let fields = raw
        .fields
        .into_iter()
        .map(|f| {
            Ok(FieldDescriptor {
                ty: signature(&f.ty)?,
                name: f.name,
                is_static: f.is_static,
                is_transient: f.is_transient,
                ignore: f.ignore,
                schema: f.schema.map(|a| a.bind_variables(&type_parameters)),
                ignore_properties: f.ignore_properties,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    let schema = raw.schema.map(|a| a.bind_variables(&type_parameters));

    Ok(ClassDescriptor {
        name: raw.name,
        kind: raw.kind,
        type_parameters,
        superclass,
        interfaces,
        fields,
        enum_constants: raw.enum_constants,
        schema,
        ignore_properties: raw.ignore_properties,
    })
}

/// `T` or `N extends java.lang.Number`; bounds may mention sibling parameters
fn parse_type_parameters(raw: &[String]) -> Result<Vec<TypeParameter>> {
    let split: Vec<(&str, Option<&str>)> = raw
        .iter()
        .map(|p| match p.split_once(" extends ") {
            Some((name, bound)) => (name.trim(), Some(bound.trim())),
            None => (p.trim(), None),
        })
        .collect();
    let names: Vec<TypeParameter> = split.iter().map(|(n, _)| TypeParameter::new(*n)).collect();

    split
        .iter()
        .map(|(name, bound)| match bound {
            Some(bound) => Ok(TypeParameter::bounded(
                *name,
                TypeRef::parse(bound)?.bind_variables(&names),
            )),
            None => Ok(TypeParameter::new(*name)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::index::TypeIndex;
    use std::io::Write;
    use tempfile::TempDir;

    const PETSTORE: &str = r#"
types:
  - name: com.acme.Box
    typeParameters: [T, "N extends java.lang.Number"]
    superclass: com.acme.Base<T>
    fields:
      - name: value
        type: T
      - name: amount
        type: N
      - name: secret
        type: java.lang.String
        ignore: true
        schema:
          description: Never shown
  - name: com.acme.Status
    kind: enum
    enumConstants: [ACTIVE, RETIRED]
"#;

    #[test]
    fn test_parse_yaml_binds_type_variables() {
        let index = parse_yaml(PETSTORE).unwrap();
        assert_eq!(index.len(), 2);

        let boxed = index.class("com.acme.Box").unwrap();
        assert_eq!(boxed.type_parameters.len(), 2);
        assert_eq!(
            boxed.type_parameters[1].bound,
            Some(TypeRef::class("java.lang.Number"))
        );
        assert!(matches!(&boxed.fields[0].ty, TypeRef::Variable { name, .. } if name == "T"));
        assert_eq!(
            boxed.superclass,
            Some(TypeRef::parameterized("com.acme.Base", vec![TypeRef::variable("T")]))
        );
        assert_eq!(boxed.fields[2].ignore, Some(true));
        assert_eq!(
            boxed.fields[2].schema.as_ref().unwrap().description.as_deref(),
            Some("Never shown")
        );

        let status = index.class("com.acme.Status").unwrap();
        assert!(status.is_enum());
        assert_eq!(status.enum_constants, vec!["ACTIVE", "RETIRED"]);
    }

    #[test]
    fn test_implementation_binds_type_variables() {
        let yaml = r#"
types:
  - name: com.acme.Wrapper
    typeParameters: [T]
    schema:
      implementation: java.util.List<T>
    fields:
      - name: value
        type: java.lang.Object
        schema:
          implementation: T
"#;
        let index = parse_yaml(yaml).unwrap();
        let wrapper = index.class("com.acme.Wrapper").unwrap();

        assert_eq!(
            wrapper.fields[0].schema.as_ref().unwrap().implementation,
            Some(TypeRef::variable("T"))
        );
        assert_eq!(
            wrapper.schema.as_ref().unwrap().implementation,
            Some(TypeRef::parameterized("java.util.List", vec![TypeRef::variable("T")]))
        );
    }

    #[test]
    fn test_parse_json() {
        let json = r#"{"types": [{"name": "Pet", "fields": [{"name": "tags", "type": "java.util.List<String>", "static": true}]}]}"#;
        let index = parse_json(json).unwrap();
        let pet = index.class("Pet").unwrap();
        assert!(pet.fields[0].is_static);
        assert_eq!(pet.fields[0].ty, TypeRef::parse("java.util.List<String>").unwrap());
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let err = parse_yaml("types:\n  - name: Pet\n    colour: red\n").unwrap_err();
        assert!(matches!(err, Error::SerializationError(_)));
    }

    #[test]
    fn test_bad_signature_reports_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("types.yaml");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(b"types:\n  - name: Pet\n    superclass: \"Base<\"\n").unwrap();

        let err = load_file(&path).unwrap_err();
        match err {
            Error::ParseError { file, message } => {
                assert_eq!(file, path);
                assert!(message.contains("Base<"));
            }
            other => panic!("Expected ParseError, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_type_rejected() {
        let err = parse_yaml("types:\n  - name: Pet\n  - name: Pet\n").unwrap_err();
        assert!(matches!(err, Error::DuplicateType(name) if name == "Pet"));
    }
}

//! Builds type descriptors from Rust source files using `syn`.
//!
//! Structs with named fields become classes and enums become enumerations.
//! Field types are mapped onto the names the compiler knows:
//!
//! - `Option<T>` is `T`, and the field is not required
//! - `Box`, `Rc`, `Arc`, `Cow` and references are transparent
//! - `[T; N]` and `[T]` are arrays
//! - other paths keep their last segment and type arguments
//!
//! Serde attributes are honoured where they change the serialized shape
//! (`rename`, `rename_all`, `skip`, `flatten`, `default`), and a
//! `#[schema(...)]` attribute carries explicit overrides.

use super::{ClassDescriptor, ClassKind, FieldDescriptor, InMemoryIndex};
use crate::annotation::SchemaAnnotation;
use crate::error::{Error, Result};
use crate::types::{TypeParameter, TypeRef};
use crate::well_known::is_terminal_name;
use log::{debug, info, warn};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use syn::ext::IdentExt;
use syn::meta::ParseNestedMeta;
use syn::{Attribute, Fields, GenericArgument, ItemEnum, ItemStruct, Lit, LitBool, LitStr, PathArguments, Token, Type};

/// Top type used for anything without a serializable shape
const VALUE: &str = "serde_json::Value";

/// Index every Rust file in `paths`.
///
/// Files that fail to parse and types that are declared twice are logged and
/// skipped, so one broken file does not hide the rest of the project.
pub fn load_files(paths: &[PathBuf]) -> InMemoryIndex {
    let mut index = InMemoryIndex::new();
    for path in paths {
        match load_file(path) {
            Ok(classes) => {
                for class in classes {
                    if let Err(e) = index.insert(class) {
                        warn!("Skipping type in {}: {}", path.display(), e);
                    }
                }
            }
            Err(e) => warn!("Failed to index {}: {}", path.display(), e),
        }
    }
    info!("Indexed {} types from {} Rust files", index.len(), paths.len());
    index
}

/// Descriptors for every struct and enum declared in one file
pub fn load_file(path: &Path) -> Result<Vec<ClassDescriptor>> {
    debug!("Parsing file: {}", path.display());
    let content = fs::read_to_string(path)?;
    parse_source(&content).map_err(|e| e.in_file(path))
}

pub fn parse_source(content: &str) -> Result<Vec<ClassDescriptor>> {
    let file = syn::parse_file(content)?;
    let mut classes = Vec::new();
    collect_items(&file.items, &mut classes)?;
    Ok(classes)
}

fn collect_items(items: &[syn::Item], classes: &mut Vec<ClassDescriptor>) -> Result<()> {
    for item in items {
        match item {
            syn::Item::Struct(item_struct) => {
                if let Some(class) = convert_struct(item_struct)? {
                    classes.push(class);
                }
            }
            syn::Item::Enum(item_enum) => classes.push(convert_enum(item_enum)?),
            syn::Item::Mod(module) => {
                if let Some((_, items)) = &module.content {
                    collect_items(items, classes)?;
                }
            }
            _ => {}
        }
    }
    Ok(())
}

fn convert_struct(item: &ItemStruct) -> Result<Option<ClassDescriptor>> {
    let Fields::Named(named) = &item.fields else {
        debug!("Skipping {}: no named fields", item.ident);
        return Ok(None);
    };
    let type_parameters: Vec<TypeParameter> = item
        .generics
        .type_params()
        .map(|p| TypeParameter::new(p.ident.unraw().to_string()))
        .collect();
    let container = SerdeAttributes::parse(&item.attrs);
    let container_schema = parse_schema_attribute(&item.attrs)?;

    let mut class = ClassDescriptor::new(item.ident.unraw().to_string());
    class.type_parameters = type_parameters.clone();
    let mut required = Vec::new();

    for field in &named.named {
        let Some(ident) = &field.ident else {
            continue;
        };
        let field_name = ident.unraw().to_string();
        let serde = SerdeAttributes::parse(&field.attrs);
        let (ty, optional) = map_type(&field.ty);
        let ty = ty.bind_variables(&type_parameters);

        if serde.flatten {
            debug!("{}.{} is flattened into its owner", class.name, field_name);
            if class.superclass.is_none() {
                class.superclass = Some(ty);
            } else {
                class.interfaces.push(ty);
            }
            continue;
        }

        let schema = parse_schema_attribute(&field.attrs)?.unwrap_or_default();
        let mut annotation = schema.annotation.bind_variables(&type_parameters);
        if annotation.name.is_none() {
            annotation.name = serde.rename.clone().or_else(|| {
                container
                    .rename_all
                    .as_deref()
                    .map(|rule| rename_field(&field_name, rule))
            });
        }
        if annotation.description.is_none() {
            annotation.description = doc_comment(&field.attrs);
        }

        let property = annotation.name.clone().unwrap_or_else(|| field_name.clone());
        if !optional && !serde.skip && !serde.default && !container.default && annotation.required.is_none() {
            required.push(property);
        }

        let mut descriptor = FieldDescriptor::new(field_name, ty);
        descriptor.ignore = if serde.skip { Some(true) } else { schema.ignore };
        descriptor.ignore_properties = schema.ignore_properties;
        if annotation != SchemaAnnotation::default() {
            descriptor.schema = Some(annotation);
        }
        class.fields.push(descriptor);
    }

    let container_schema = container_schema.unwrap_or_default();
    class.ignore_properties = container_schema.ignore_properties;
    let mut annotation = container_schema.annotation.bind_variables(&type_parameters);
    if annotation.description.is_none() {
        annotation.description = doc_comment(&item.attrs);
    }
    if !required.is_empty() {
        let list = annotation.required_properties.get_or_insert_with(Vec::new);
        for name in required {
            if !list.contains(&name) {
                list.push(name);
            }
        }
    }
    if annotation != SchemaAnnotation::default() {
        class.schema = Some(annotation);
    }

    debug!("Indexed struct {} with {} fields", class.name, class.fields.len());
    Ok(Some(class))
}

fn convert_enum(item: &ItemEnum) -> Result<ClassDescriptor> {
    let container = SerdeAttributes::parse(&item.attrs);
    let mut class = ClassDescriptor::new(item.ident.unraw().to_string());
    class.kind = ClassKind::Enum;
    class.enum_constants = item
        .variants
        .iter()
        .filter_map(|variant| {
            let serde = SerdeAttributes::parse(&variant.attrs);
            if serde.skip {
                return None;
            }
            let name = variant.ident.unraw().to_string();
            Some(serde.rename.unwrap_or_else(|| match container.rename_all.as_deref() {
                Some(rule) => rename_variant(&name, rule),
                None => name,
            }))
        })
        .collect();

    let mut annotation = parse_schema_attribute(&item.attrs)?
        .map(|s| s.annotation)
        .unwrap_or_default();
    if annotation.description.is_none() {
        annotation.description = doc_comment(&item.attrs);
    }
    if annotation != SchemaAnnotation::default() {
        class.schema = Some(annotation);
    }

    debug!("Indexed enum {} with {} variants", class.name, class.enum_constants.len());
    Ok(class)
}

/// Map a field type, reporting whether it was wrapped in `Option`
fn map_type(ty: &Type) -> (TypeRef, bool) {
    match ty {
        Type::Reference(r) => map_type(&r.elem),
        Type::Paren(p) => map_type(&p.elem),
        Type::Group(g) => map_type(&g.elem),
        Type::Array(a) => (array_of(map_type(&a.elem).0), false),
        Type::Slice(s) => (array_of(map_type(&s.elem).0), false),
        Type::Path(p) => map_path(&p.path),
        _ => (TypeRef::class(VALUE), false),
    }
}

fn map_path(path: &syn::Path) -> (TypeRef, bool) {
    let Some(segment) = path.segments.last() else {
        return (TypeRef::class(VALUE), false);
    };
    let name = segment.ident.unraw().to_string();
    let type_arguments: Vec<&Type> = match &segment.arguments {
        PathArguments::AngleBracketed(args) => args
            .args
            .iter()
            .filter_map(|arg| match arg {
                GenericArgument::Type(t) => Some(t),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };
    let first = || type_arguments.first().map(|t| map_type(t));

    match name.as_str() {
        "Option" => (first().map(|(t, _)| t).unwrap_or_else(|| TypeRef::class(VALUE)), true),
        "Box" | "Rc" | "Arc" | "Cow" | "RefCell" | "Cell" | "Mutex" | "RwLock" => {
            first().unwrap_or_else(|| (TypeRef::class(VALUE), false))
        }
        _ if is_terminal_name(&name) || type_arguments.is_empty() => (TypeRef::class(name), false),
        _ => {
            let arguments = type_arguments.iter().map(|t| map_type(t).0).collect();
            (TypeRef::parameterized(name, arguments), false)
        }
    }
}

fn array_of(component: TypeRef) -> TypeRef {
    match component {
        TypeRef::Array {
            component,
            dimensions,
        } => TypeRef::Array {
            component,
            dimensions: dimensions + 1,
        },
        other => TypeRef::array(other, 1),
    }
}

/// `///` lines joined with newlines
fn doc_comment(attrs: &[Attribute]) -> Option<String> {
    let lines: Vec<String> = attrs
        .iter()
        .filter(|a| a.path().is_ident("doc"))
        .filter_map(|a| match &a.meta {
            syn::Meta::NameValue(nv) => match &nv.value {
                syn::Expr::Lit(syn::ExprLit {
                    lit: Lit::Str(s), ..
                }) => Some(s.value().trim().to_string()),
                _ => None,
            },
            _ => None,
        })
        .collect();
    let joined = lines.join("\n").trim().to_string();
    (!joined.is_empty()).then_some(joined)
}

/// The serde attributes that change the serialized shape
#[derive(Debug, Clone, Default)]
struct SerdeAttributes {
    rename: Option<String>,
    rename_all: Option<String>,
    skip: bool,
    flatten: bool,
    default: bool,
}

impl SerdeAttributes {
    fn parse(attrs: &[Attribute]) -> Self {
        let mut serde = SerdeAttributes::default();
        for attr in attrs.iter().filter(|a| a.path().is_ident("serde")) {
            let result = attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    serde.rename = Some(serialized_name(&meta)?);
                } else if meta.path.is_ident("rename_all") {
                    serde.rename_all = Some(serialized_name(&meta)?);
                } else if meta.path.is_ident("skip") {
                    serde.skip = true;
                } else if meta.path.is_ident("flatten") {
                    serde.flatten = true;
                } else if meta.path.is_ident("default") {
                    serde.default = true;
                    skip_value(&meta)?;
                } else {
                    skip_value(&meta)?;
                }
                Ok(())
            });
            if let Err(e) = result {
                warn!("Ignoring unparseable serde attribute: {}", e);
            }
        }
        serde
    }
}

/// `rename = "x"` or the serialize side of `rename(serialize = "x", ...)`
fn serialized_name(meta: &ParseNestedMeta) -> syn::Result<String> {
    if meta.input.peek(Token![=]) {
        let lit: LitStr = meta.value()?.parse()?;
        return Ok(lit.value());
    }
    let mut name = None;
    meta.parse_nested_meta(|inner| {
        let lit: LitStr = inner.value()?.parse()?;
        if inner.path.is_ident("serialize") {
            name = Some(lit.value());
        }
        Ok(())
    })?;
    name.ok_or_else(|| meta.error("expected `serialize = \"...\"`"))
}

/// Consume whatever follows an attribute key we do not interpret
fn skip_value(meta: &ParseNestedMeta) -> syn::Result<()> {
    if meta.input.peek(Token![=]) {
        let _: syn::Expr = meta.value()?.parse()?;
    } else if meta.input.peek(syn::token::Paren) {
        let content;
        syn::parenthesized!(content in meta.input);
        content.step(|cursor| {
            let mut rest = *cursor;
            while let Some((_, next)) = rest.token_tree() {
                rest = next;
            }
            Ok(((), rest))
        })?;
    }
    Ok(())
}

/// Contents of `#[schema(...)]`
#[derive(Debug, Clone, Default)]
struct SchemaAttribute {
    annotation: SchemaAnnotation,
    ignore: Option<bool>,
    ignore_properties: Vec<String>,
}

fn parse_schema_attribute(attrs: &[Attribute]) -> Result<Option<SchemaAttribute>> {
    let mut found: Option<SchemaAttribute> = None;
    for attr in attrs.iter().filter(|a| a.path().is_ident("schema")) {
        let out = found.get_or_insert_with(SchemaAttribute::default);
        attr.parse_nested_meta(|meta| {
            let key = meta
                .path
                .get_ident()
                .map(|i| i.unraw().to_string())
                .unwrap_or_default();
            let a = &mut out.annotation;
            match key.as_str() {
                "name" => a.name = Some(string_value(&meta)?),
                "title" => a.title = Some(string_value(&meta)?),
                "description" => a.description = Some(string_value(&meta)?),
                "format" => a.format = Some(string_value(&meta)?),
                "pattern" => a.pattern = Some(string_value(&meta)?),
                "discriminator" => a.discriminator_property = Some(string_value(&meta)?),
                "ref" => a.reference = Some(string_value(&meta)?),
                "implementation" => {
                    let lit: LitStr = meta.value()?.parse()?;
                    let ty = TypeRef::parse(&lit.value())
                        .map_err(|e| syn::Error::new(lit.span(), e.to_string()))?;
                    a.implementation = Some(ty);
                }
                "example" => a.example = Some(json_value(&meta)?),
                "default" => a.default = Some(json_value(&meta)?),
                "nullable" => a.nullable = Some(flag(&meta)?),
                "required" => a.required = Some(flag(&meta)?),
                "read_only" => a.read_only = Some(flag(&meta)?),
                "write_only" => a.write_only = Some(flag(&meta)?),
                "deprecated" => a.deprecated = Some(flag(&meta)?),
                "hidden" => a.hidden = Some(flag(&meta)?),
                "unique_items" => a.unique_items = Some(flag(&meta)?),
                "minimum" => a.minimum = Some(number_value(&meta)?),
                "maximum" => a.maximum = Some(number_value(&meta)?),
                "min_length" => a.min_length = Some(count_value(&meta)?),
                "max_length" => a.max_length = Some(count_value(&meta)?),
                "min_items" => a.min_items = Some(count_value(&meta)?),
                "max_items" => a.max_items = Some(count_value(&meta)?),
                "required_properties" => a.required_properties = Some(list_value(&meta)?),
                "ignore" => out.ignore = Some(flag(&meta)?),
                "ignore_properties" => out.ignore_properties = list_value(&meta)?,
                _ => return Err(meta.error(format!("unsupported schema attribute `{}`", key))),
            }
            Ok(())
        })
        .map_err(Error::from)?;
    }
    Ok(found)
}

fn string_value(meta: &ParseNestedMeta) -> syn::Result<String> {
    let lit: LitStr = meta.value()?.parse()?;
    Ok(lit.value())
}

/// Comma separated names: `"id, name"`
fn list_value(meta: &ParseNestedMeta) -> syn::Result<Vec<String>> {
    Ok(string_value(meta)?
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect())
}

/// A bare key means `true`
fn flag(meta: &ParseNestedMeta) -> syn::Result<bool> {
    if meta.input.peek(Token![=]) {
        let lit: LitBool = meta.value()?.parse()?;
        Ok(lit.value)
    } else {
        Ok(true)
    }
}

fn number_value(meta: &ParseNestedMeta) -> syn::Result<f64> {
    let input = meta.value()?;
    let negative = input.peek(Token![-]);
    if negative {
        input.parse::<Token![-]>()?;
    }
    let value = match input.parse::<Lit>()? {
        Lit::Int(i) => i.base10_parse::<f64>()?,
        Lit::Float(f) => f.base10_parse::<f64>()?,
        other => return Err(syn::Error::new(other.span(), "expected a number")),
    };
    Ok(if negative { -value } else { value })
}

fn count_value(meta: &ParseNestedMeta) -> syn::Result<u64> {
    match meta.value()?.parse::<Lit>()? {
        Lit::Int(i) => i.base10_parse::<u64>(),
        other => Err(syn::Error::new(other.span(), "expected an integer")),
    }
}

fn json_value(meta: &ParseNestedMeta) -> syn::Result<Value> {
    let input = meta.value()?;
    let negative = input.peek(Token![-]);
    if negative {
        input.parse::<Token![-]>()?;
    }
    let sign = if negative { -1 } else { 1 };
    match input.parse::<Lit>()? {
        Lit::Str(s) => Ok(Value::String(s.value())),
        Lit::Bool(b) => Ok(Value::Bool(b.value)),
        Lit::Int(i) => Ok(Value::from(sign * i.base10_parse::<i64>()?)),
        Lit::Float(f) => Ok(serde_json::Number::from_f64(sign as f64 * f.base10_parse::<f64>()?)
            .map(Value::Number)
            .unwrap_or(Value::Null)),
        other => Err(syn::Error::new(other.span(), "expected a literal")),
    }
}

/// Apply a serde `rename_all` rule to a snake_case field name
fn rename_field(field: &str, rule: &str) -> String {
    match rule {
        "UPPERCASE" | "SCREAMING_SNAKE_CASE" => field.to_ascii_uppercase(),
        "PascalCase" => {
            let mut out = String::new();
            let mut capitalize = true;
            for ch in field.chars() {
                if ch == '_' {
                    capitalize = true;
                } else if capitalize {
                    out.push(ch.to_ascii_uppercase());
                    capitalize = false;
                } else {
                    out.push(ch);
                }
            }
            out
        }
        "camelCase" => lowercase_first(&rename_field(field, "PascalCase")),
        "kebab-case" => field.replace('_', "-"),
        "SCREAMING-KEBAB-CASE" => field.to_ascii_uppercase().replace('_', "-"),
        _ => field.to_string(),
    }
}

/// Apply a serde `rename_all` rule to a PascalCase variant name
fn rename_variant(variant: &str, rule: &str) -> String {
    match rule {
        "lowercase" => variant.to_ascii_lowercase(),
        "UPPERCASE" => variant.to_ascii_uppercase(),
        "camelCase" => lowercase_first(variant),
        "snake_case" => {
            let mut out = String::new();
            for (i, ch) in variant.char_indices() {
                if i > 0 && ch.is_uppercase() {
                    out.push('_');
                }
                out.push(ch.to_ascii_lowercase());
            }
            out
        }
        "SCREAMING_SNAKE_CASE" => rename_variant(variant, "snake_case").to_ascii_uppercase(),
        "kebab-case" => rename_variant(variant, "snake_case").replace('_', "-"),
        "SCREAMING-KEBAB-CASE" => rename_variant(variant, "SCREAMING_SNAKE_CASE").replace('_', "-"),
        _ => variant.to_string(),
    }
}

fn lowercase_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

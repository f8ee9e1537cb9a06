//! The type-graph-to-schema compiler.
//!
//! A [`SchemaCompiler`] owns the schema arena and the registry for one document.
//! Each call to [`SchemaCompiler::compile`] seeds a fresh traversal queue with
//! the root type and drains it iteratively:
//!
//! 1. pop a queued composite
//! 2. resolve its members through the inheritance and generic chain
//! 3. drop ignored members
//! 4. classify each member's type, queueing any composites it reaches
//! 5. apply member annotations and the class's required-properties list
//!
//! Compilation never fails. Problems are recorded as [`Diagnostic`]s and the
//! affected fragment degrades to an unconstrained schema.

pub mod deque;
pub mod ignore;
pub mod overlay;
pub mod registry;
pub mod type_processor;
pub mod type_resolver;

use crate::annotation::SchemaAnnotation;
use crate::index::TypeIndex;
use crate::schema::{Schema, SchemaArena, SchemaId, SchemaNode};
use crate::types::TypeRef;
use crate::well_known::WellKnownTypes;
use deque::{PathDeque, PathId};
use ignore::IgnorePolicy;
use indexmap::IndexMap;
use log::{debug, info, warn};
use overlay::Replacement;
use registry::SchemaRegistry;
use std::collections::HashSet;
use std::fmt;
use type_processor::{classify, Classification};
use type_resolver::{resolve_members, Bindings, ResolvedMember};

/// Default prefix of every generated reference
pub const DEFAULT_REF_PREFIX: &str = "#/components/schemas/";

/// Compiler switches
#[derive(Debug, Clone, PartialEq)]
pub struct CompilerConfig {
    /// Extract every composite into a named component on first encounter.
    /// When off, composites are inlined and only cycles force extraction.
    pub schema_references: bool,
    /// Include members that carry no schema annotation
    pub infer_unannotated: bool,
    pub ref_prefix: String,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            schema_references: true,
            infer_unannotated: true,
            ref_prefix: DEFAULT_REF_PREFIX.to_string(),
        }
    }
}

impl CompilerConfig {
    pub fn with_schema_references(mut self, enabled: bool) -> Self {
        self.schema_references = enabled;
        self
    }

    pub fn with_infer_unannotated(mut self, enabled: bool) -> Self {
        self.infer_unannotated = enabled;
        self
    }

    pub fn with_ref_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.ref_prefix = prefix.into();
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    UnindexedType,
    ConflictingOverride,
    UnresolvedTypeVariable,
    CycleDetected,
    DroppedRequiredProperty,
    ReadWriteConflict,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DiagnosticKind::UnindexedType => "unindexed type",
            DiagnosticKind::ConflictingOverride => "conflicting override",
            DiagnosticKind::UnresolvedTypeVariable => "unresolved type variable",
            DiagnosticKind::CycleDetected => "cycle detected",
            DiagnosticKind::DroppedRequiredProperty => "dropped required property",
            DiagnosticKind::ReadWriteConflict => "read/write-only conflict",
        };
        write!(f, "{}", label)
    }
}

/// A recoverable problem found while compiling
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Type, member (`Owner.member`) or variable the problem was found on
    pub type_name: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {}: {}", self.kind, self.type_name, self.message)
    }
}

/// Collects diagnostics and logs each one as it is reported
#[derive(Debug, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn report(
        &mut self,
        kind: DiagnosticKind,
        type_name: impl Into<String>,
        message: impl Into<String>,
    ) {
        let diagnostic = Diagnostic {
            kind,
            type_name: type_name.into(),
            message: message.into(),
        };
        match kind {
            DiagnosticKind::CycleDetected => debug!("{}", diagnostic),
            _ => warn!("{}", diagnostic),
        }
        self.items.push(diagnostic);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}

/// Result of compiling one root type
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledSchema {
    /// Inline schema, or a reference when the root was registered
    pub root: Schema,
    pub diagnostics: Vec<Diagnostic>,
}

/// Compiles root types against a [`TypeIndex`], sharing one registry across
/// every root compiled by the same instance
pub struct SchemaCompiler<'a> {
    index: &'a dyn TypeIndex,
    config: CompilerConfig,
    well_known: WellKnownTypes,
    arena: SchemaArena,
    registry: SchemaRegistry,
}

impl<'a> SchemaCompiler<'a> {
    pub fn new(index: &'a dyn TypeIndex, config: CompilerConfig) -> Self {
        let registry = SchemaRegistry::new(config.ref_prefix.clone());
        Self {
            index,
            config,
            well_known: WellKnownTypes::new(),
            arena: SchemaArena::new(),
            registry,
        }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn compile(&mut self, root: &TypeRef) -> CompiledSchema {
        self.compile_annotated(root, None)
    }

    /// Compile `root`, overlaying `annotation` on the root schema once every
    /// member has been traversed
    pub fn compile_annotated(
        &mut self,
        root: &TypeRef,
        annotation: Option<&SchemaAnnotation>,
    ) -> CompiledSchema {
        info!("Compiling schema for {}", root);

        let mut traversal = Traversal {
            index: self.index,
            config: &self.config,
            well_known: &self.well_known,
            arena: &mut self.arena,
            registry: &mut self.registry,
            deque: PathDeque::new(),
            ignore: IgnorePolicy::new(self.config.infer_unannotated),
            diagnostics: Diagnostics::default(),
            implementing: HashSet::new(),
        };

        let mut root_id = traversal.process_root(root);
        traversal.depth_first_search();
        if let Some(annotation) = annotation {
            root_id = traversal.overlay_member(root_id, annotation, &root.canonical());
        }
        let diagnostics = traversal.diagnostics.into_vec();

        let schema = self.materialize(root_id);
        info!(
            "Compiled {} ({} components registered, {} diagnostics)",
            root,
            self.registry.len(),
            diagnostics.len()
        );
        CompiledSchema {
            root: schema,
            diagnostics,
        }
    }

    /// Every registered component, in registration order
    pub fn components(&self) -> IndexMap<String, Schema> {
        self.registry.components(&self.arena)
    }

    fn materialize(&self, id: SchemaId) -> Schema {
        match self.registry.reference_for_schema(id) {
            Some(reference) => Schema::reference_to(reference),
            None => self
                .arena
                .materialize(id, &|child| self.registry.reference_for_schema(child)),
        }
    }
}

/// State of one compilation run
pub(crate) struct Traversal<'c> {
    index: &'c dyn TypeIndex,
    config: &'c CompilerConfig,
    well_known: &'c WellKnownTypes,
    arena: &'c mut SchemaArena,
    registry: &'c mut SchemaRegistry,
    deque: PathDeque,
    ignore: IgnorePolicy,
    diagnostics: Diagnostics,
    /// Identities whose class-level implementation is being followed
    implementing: HashSet<String>,
}

impl<'c> Traversal<'c> {
    /// Root collections and maps go through a standin member so their
    /// element type is processed in a member context. Everything else is
    /// processed like any other occurrence.
    fn process_root(&mut self, root: &TypeRef) -> SchemaId {
        let index = self.index;
        let well_known = self.well_known;
        if let Classification::Collection(_) | Classification::Map(_) = classify(index, well_known, root) {
            let standin = root.name().and_then(|n| well_known.standin_for(index, n));
            if let Some(standin) = standin {
                let mut arguments = vec![TypeRef::class("java.lang.String"); standin.type_parameters.len().saturating_sub(1)];
                arguments.push(root.clone());
                let standin_ty = TypeRef::parameterized(standin.name.clone(), arguments);
                let members = resolve_members(index, &standin_ty, standin);
                if let Some((_, member)) = members.first() {
                    debug!("Processing root {} through {}", root, standin.name);
                    return self.process(None, member.declared_type(), &member.bindings, Some(member));
                }
            }
        }
        self.process(None, root, &Bindings::new(), None)
    }

    fn depth_first_search(&mut self) {
        while let Some(path) = self.deque.pop() {
            self.expand(path);
        }
    }

    /// Fill the entry's object node with its retained members
    fn expand(&mut self, path: PathId) {
        let index = self.index;
        let entry = self.deque.entry(path).clone();
        let Some(class) = entry.ty.name().and_then(|n| index.class(n)) else {
            return;
        };
        debug!("Expanding {}", entry.identity);

        let members = resolve_members(index, &entry.ty, class);
        for member in members.values() {
            if self.ignore.should_ignore(member, &entry, class) {
                continue;
            }
            let property = member
                .annotation()
                .and_then(|a| a.name.clone())
                .unwrap_or_else(|| member.name.clone());
            let required = member.annotation().and_then(|a| a.required) == Some(true);

            let schema = self.process_member(path, member);
            let node = self.arena.get_mut(entry.schema);
            if required && !node.required.contains(&property) {
                node.required.push(property.clone());
            }
            node.properties.insert(property, schema);
        }

        if let Some(required) = class.schema.as_ref().and_then(|a| a.required_properties.as_ref()) {
            self.apply_required_properties(entry.schema, required, &entry.identity);
        }
    }

    fn process_member(&mut self, path: PathId, member: &ResolvedMember) -> SchemaId {
        let subject = format!("{}.{}", member.owner, member.name);
        let Some(annotation) = member.annotation() else {
            return self.process(Some(path), member.declared_type(), &member.bindings, Some(member));
        };

        let replacement = overlay::replacement(
            annotation,
            &self.config.ref_prefix,
            &subject,
            &mut self.diagnostics,
        );
        let id = match replacement {
            Some(Replacement::Reference(reference)) => {
                return self.arena.alloc(SchemaNode::reference_to(reference));
            }
            Some(Replacement::Implementation(implementation)) => {
                self.process(Some(path), &implementation, &member.bindings, Some(member))
            }
            None => self.process(Some(path), member.declared_type(), &member.bindings, Some(member)),
        };
        self.overlay_member(id, annotation, &subject)
    }

    /// Apply member-site attributes. A reference node stays bare; the
    /// attributes go on an `allOf` wrapper around it instead.
    fn overlay_member(&mut self, id: SchemaId, annotation: &SchemaAnnotation, subject: &str) -> SchemaId {
        if !annotation.has_schema_attributes() {
            return id;
        }
        let shared = self.arena.get(id).is_reference() || self.registry.reference_for_schema(id).is_some();
        if !shared {
            overlay::apply(self.arena.get_mut(id), annotation, subject, &mut self.diagnostics);
            return id;
        }

        let mut wrapper = SchemaNode::default();
        wrapper.all_of.push(id);
        overlay::apply(&mut wrapper, annotation, subject, &mut self.diagnostics);
        self.arena.alloc(wrapper)
    }

    /// Class-level required list, restricted to properties that survived
    fn apply_required_properties(&mut self, schema: SchemaId, required: &[String], subject: &str) {
        let node = self.arena.get_mut(schema);
        let mut dropped = Vec::new();
        for name in required {
            if node.properties.contains_key(name) {
                if !node.required.contains(name) {
                    node.required.push(name.clone());
                }
            } else {
                dropped.push(name.clone());
            }
        }
        for name in dropped {
            self.diagnostics.report(
                DiagnosticKind::DroppedRequiredProperty,
                subject,
                format!("required property '{}' is not part of the schema", name),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{ClassDescriptor, ClassKind, FieldDescriptor, InMemoryIndex};
    use crate::schema::SchemaType;
    use crate::types::TypeParameter;
    use pretty_assertions::assert_eq;

    fn field(name: &str, sig: &str) -> FieldDescriptor {
        FieldDescriptor::new(name, TypeRef::parse(sig).unwrap())
    }

    fn class(name: &str, fields: Vec<FieldDescriptor>) -> ClassDescriptor {
        let mut class = ClassDescriptor::new(name);
        class.fields = fields;
        class
    }

    fn petstore() -> InMemoryIndex {
        let mut index = InMemoryIndex::new();
        index
            .insert(class(
                "com.acme.Owner",
                vec![field("name", "java.lang.String"), field("pets", "java.util.List<com.acme.Pet>")],
            ))
            .unwrap();
        index
            .insert(class(
                "com.acme.Pet",
                vec![
                    field("id", "long"),
                    field("name", "java.lang.String"),
                    field("status", "com.acme.Status"),
                    field("tags", "java.util.Set<java.lang.String>"),
                ],
            ))
            .unwrap();
        let mut status = ClassDescriptor::new("com.acme.Status");
        status.kind = ClassKind::Enum;
        status.enum_constants = vec!["AVAILABLE".to_string(), "SOLD".to_string()];
        index.insert(status).unwrap();
        index
            .insert(class(
                "com.acme.Store",
                vec![field("owner", "com.acme.Owner"), field("featured", "com.acme.Pet"), field("stock", "com.acme.Pet[]")],
            ))
            .unwrap();
        index
    }

    #[test]
    fn test_root_is_referenced_and_registered() {
        let index = petstore();
        let mut compiler = SchemaCompiler::new(&index, CompilerConfig::default());
        let compiled = compiler.compile(&TypeRef::class("com.acme.Pet"));

        assert_eq!(compiled.root, Schema::reference_to("#/components/schemas/Pet"));
        assert!(compiled.diagnostics.is_empty());

        let components = compiler.components();
        let pet = &components["Pet"];
        assert_eq!(pet.schema_type, Some(SchemaType::Object));
        let names: Vec<_> = pet.properties.keys().cloned().collect();
        assert_eq!(names, vec!["id", "name", "status", "tags"]);
        assert_eq!(pet.properties["id"].attributes.format.as_deref(), Some("int64"));
        assert_eq!(
            pet.properties["status"].enum_values,
            Some(vec!["AVAILABLE".into(), "SOLD".into()])
        );
        let tags = &pet.properties["tags"];
        assert_eq!(tags.schema_type, Some(SchemaType::Array));
        assert_eq!(tags.items.as_ref().unwrap().schema_type, Some(SchemaType::String));
    }

    #[test]
    fn test_shared_type_defined_once() {
        let index = petstore();
        let mut compiler = SchemaCompiler::new(&index, CompilerConfig::default());
        compiler.compile(&TypeRef::class("com.acme.Store"));

        let components = compiler.components();
        let names: Vec<_> = components.keys().cloned().collect();
        assert_eq!(names, vec!["Store", "Owner", "Pet"]);

        let pet_ref = Schema::reference_to("#/components/schemas/Pet");
        let store = &components["Store"];
        assert_eq!(store.properties["featured"], pet_ref);
        assert_eq!(**store.properties["stock"].items.as_ref().unwrap(), pet_ref);
        assert_eq!(**components["Owner"].properties["pets"].items.as_ref().unwrap(), pet_ref);
    }

    #[test]
    fn test_self_reference_terminates() {
        let mut index = InMemoryIndex::new();
        index
            .insert(class("Node", vec![field("value", "int"), field("next", "Node")]))
            .unwrap();

        for references in [true, false] {
            let config = CompilerConfig::default().with_schema_references(references);
            let mut compiler = SchemaCompiler::new(&index, config);
            let compiled = compiler.compile(&TypeRef::class("Node"));

            assert_eq!(compiled.root, Schema::reference_to("#/components/schemas/Node"));
            let components = compiler.components();
            assert_eq!(components.len(), 1);
            assert_eq!(
                components["Node"].properties["next"],
                Schema::reference_to("#/components/schemas/Node")
            );
        }
    }

    #[test]
    fn test_inline_mode_extracts_only_cycles() {
        let mut index = petstore();
        index
            .insert(class("Employee", vec![field("name", "String"), field("manager", "Employee")]))
            .unwrap();
        index
            .insert(class("Team", vec![field("lead", "Employee"), field("pet", "com.acme.Pet")]))
            .unwrap();

        let config = CompilerConfig::default().with_schema_references(false);
        let mut compiler = SchemaCompiler::new(&index, config);
        let compiled = compiler.compile(&TypeRef::class("Team"));

        assert_eq!(compiled.root.schema_type, Some(SchemaType::Object));
        assert_eq!(compiled.root.properties["lead"], Schema::reference_to("#/components/schemas/Employee"));
        assert_eq!(compiled.root.properties["pet"].schema_type, Some(SchemaType::Object));
        assert!(compiled
            .diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::CycleDetected));

        let components = compiler.components();
        let names: Vec<_> = components.keys().cloned().collect();
        assert_eq!(names, vec!["Employee"]);
        assert_eq!(
            components["Employee"].properties["manager"],
            Schema::reference_to("#/components/schemas/Employee")
        );
    }

    #[test]
    fn test_generic_instantiations_stay_distinct() {
        let mut index = InMemoryIndex::new();
        let params = vec![TypeParameter::new("T")];
        let mut boxed = ClassDescriptor::new("Box");
        boxed.type_parameters = params.clone();
        boxed
            .fields
            .push(FieldDescriptor::new("value", TypeRef::variable("T")));
        index.insert(boxed).unwrap();
        index
            .insert(class(
                "Holder",
                vec![
                    field("text", "Box<java.lang.String>"),
                    field("number", "Box<java.lang.Integer>"),
                ],
            ))
            .unwrap();

        let mut compiler = SchemaCompiler::new(&index, CompilerConfig::default());
        compiler.compile(&TypeRef::class("Holder"));
        let components = compiler.components();

        assert_eq!(
            components["BoxString"].properties["value"].schema_type,
            Some(SchemaType::String)
        );
        let number = &components["BoxInteger"].properties["value"];
        assert_eq!(number.schema_type, Some(SchemaType::Integer));
        assert_eq!(number.attributes.format.as_deref(), Some("int32"));
    }

    #[test]
    fn test_format_override_keeps_inferred_type() {
        let mut index = InMemoryIndex::new();
        let mut birthday = field("birthday", "java.time.OffsetDateTime");
        birthday.schema = Some(SchemaAnnotation {
            format: Some("date".to_string()),
            ..Default::default()
        });
        index.insert(class("Person", vec![birthday])).unwrap();

        let mut compiler = SchemaCompiler::new(&index, CompilerConfig::default());
        compiler.compile(&TypeRef::class("Person"));
        let birthday = &compiler.components()["Person"].properties["birthday"];

        assert_eq!(birthday.schema_type, Some(SchemaType::String));
        assert_eq!(birthday.attributes.format.as_deref(), Some("date"));
    }

    #[test]
    fn test_raw_collection_has_unconstrained_items() {
        let mut index = InMemoryIndex::new();
        index
            .insert(class("Bag", vec![field("things", "java.util.List"), field("extras", "java.util.Map")]))
            .unwrap();

        let mut compiler = SchemaCompiler::new(&index, CompilerConfig::default());
        let compiled = compiler.compile(&TypeRef::class("Bag"));
        assert!(compiled.diagnostics.is_empty());

        let bag = &compiler.components()["Bag"];
        let things = &bag.properties["things"];
        assert_eq!(things.schema_type, Some(SchemaType::Array));
        assert!(things.items.as_ref().unwrap().is_unconstrained());
        let extras = &bag.properties["extras"];
        assert_eq!(extras.schema_type, Some(SchemaType::Object));
        assert!(extras.additional_properties.as_ref().unwrap().is_unconstrained());
    }

    #[test]
    fn test_member_ignored_through_one_type_only() {
        let mut index = InMemoryIndex::new();
        index
            .insert(class("Base", vec![field("id", "long"), field("secret", "String")]))
            .unwrap();
        let mut a = class("A", vec![]);
        a.superclass = Some(TypeRef::class("Base"));
        a.ignore_properties.push("secret".to_string());
        index.insert(a).unwrap();
        let mut b = class("B", vec![]);
        b.superclass = Some(TypeRef::class("Base"));
        index.insert(b).unwrap();

        let mut compiler = SchemaCompiler::new(&index, CompilerConfig::default());
        compiler.compile(&TypeRef::class("A"));
        compiler.compile(&TypeRef::class("B"));
        let components = compiler.components();

        assert!(!components["A"].properties.contains_key("secret"));
        assert!(components["B"].properties.contains_key("secret"));
    }

    #[test]
    fn test_member_ignore_list_does_not_leak_into_shared_component() {
        let person = class("Person", vec![field("name", "String"), field("password", "String")]);
        let mut owner = field("owner", "Person");
        owner.ignore_properties.push("password".to_string());
        let other = field("other", "Person");

        for fields in [vec![owner.clone(), other.clone()], vec![other, owner]] {
            let mut index = InMemoryIndex::new();
            index.insert(person.clone()).unwrap();
            index.insert(class("Holder", fields)).unwrap();

            let mut compiler = SchemaCompiler::new(&index, CompilerConfig::default());
            let compiled = compiler.compile(&TypeRef::class("Holder"));
            assert!(compiled.diagnostics.is_empty());
            let components = compiler.components();

            let full: Vec<_> = components["Person"].properties.keys().cloned().collect();
            assert_eq!(full, vec!["name", "password"]);
            let trimmed: Vec<_> = components["PersonWithoutPassword"].properties.keys().cloned().collect();
            assert_eq!(trimmed, vec!["name"]);

            let holder = &components["Holder"];
            assert_eq!(holder.properties["other"], Schema::reference_to("#/components/schemas/Person"));
            assert_eq!(
                holder.properties["owner"],
                Schema::reference_to("#/components/schemas/PersonWithoutPassword")
            );
        }
    }

    #[test]
    fn test_growing_generic_recursion_terminates() {
        let mut index = InMemoryIndex::new();
        let mut node = ClassDescriptor::new("Node");
        node.type_parameters = vec![TypeParameter::new("T")];
        node.fields.push(FieldDescriptor::new("value", TypeRef::variable("T")));
        node.fields.push(FieldDescriptor::new(
            "child",
            TypeRef::parameterized(
                "Node",
                vec![TypeRef::parameterized("java.util.List", vec![TypeRef::variable("T")])],
            ),
        ));
        index.insert(node).unwrap();

        for references in [true, false] {
            let config = CompilerConfig::default().with_schema_references(references);
            let mut compiler = SchemaCompiler::new(&index, config);
            let compiled = compiler.compile(&TypeRef::parse("Node<java.lang.String>").unwrap());

            let kinds: Vec<_> = compiled.diagnostics.iter().map(|d| d.kind).collect();
            assert_eq!(kinds, vec![DiagnosticKind::CycleDetected]);
            assert_eq!(compiled.diagnostics[0].type_name, "Node<java.util.List<java.lang.String>>");

            let node = match compiler.components().get("NodeString") {
                Some(registered) => registered.clone(),
                None => compiled.root.clone(),
            };
            assert!(compiler.components().len() <= 1);
            assert_eq!(node.properties["value"].schema_type, Some(SchemaType::String));
            assert!(node.properties["child"].is_unconstrained());
        }
    }

    #[test]
    fn test_annotated_reference_member_gets_wrapper() {
        let mut index = petstore();
        let mut featured = field("featured", "com.acme.Pet");
        featured.schema = Some(SchemaAnnotation {
            description: Some("Pet of the week".to_string()),
            required: Some(true),
            name: Some("petOfTheWeek".to_string()),
            ..Default::default()
        });
        index.insert(class("Shop", vec![featured])).unwrap();

        let mut compiler = SchemaCompiler::new(&index, CompilerConfig::default());
        compiler.compile(&TypeRef::class("Shop"));
        let shop = &compiler.components()["Shop"];

        let wrapper = &shop.properties["petOfTheWeek"];
        assert!(wrapper.reference.is_none());
        assert_eq!(wrapper.attributes.description.as_deref(), Some("Pet of the week"));
        assert_eq!(wrapper.all_of, vec![Schema::reference_to("#/components/schemas/Pet")]);
        assert_eq!(shop.required, vec!["petOfTheWeek"]);
    }

    #[test]
    fn test_explicit_reference_and_implementation() {
        let mut index = petstore();
        let mut contact = field("contact", "com.acme.Contact");
        contact.schema = Some(SchemaAnnotation {
            reference: Some("Contact".to_string()),
            implementation: Some(TypeRef::class("com.acme.Owner")),
            ..Default::default()
        });
        let mut keeper = field("keeper", "java.lang.Object");
        keeper.schema = Some(SchemaAnnotation {
            implementation: Some(TypeRef::class("com.acme.Owner")),
            ..Default::default()
        });
        index.insert(class("Zoo", vec![contact, keeper])).unwrap();

        let mut compiler = SchemaCompiler::new(&index, CompilerConfig::default());
        let compiled = compiler.compile(&TypeRef::class("Zoo"));
        let zoo = &compiler.components()["Zoo"];

        assert_eq!(zoo.properties["contact"], Schema::reference_to("#/components/schemas/Contact"));
        assert_eq!(zoo.properties["keeper"], Schema::reference_to("#/components/schemas/Owner"));
        assert_eq!(compiled.diagnostics.len(), 1);
        assert_eq!(compiled.diagnostics[0].kind, DiagnosticKind::ConflictingOverride);
    }

    #[test]
    fn test_class_level_annotations() {
        let mut index = InMemoryIndex::new();
        let mut account = class("Account", vec![field("id", "long"), field("password", "String")]);
        account.ignore_properties.push("password".to_string());
        account.schema = Some(SchemaAnnotation {
            name: Some("UserAccount".to_string()),
            description: Some("A login".to_string()),
            required_properties: Some(vec!["id".to_string(), "password".to_string()]),
            ..Default::default()
        });
        index.insert(account).unwrap();
        let mut legacy = class("Legacy", vec![field("x", "int")]);
        legacy.schema = Some(SchemaAnnotation {
            implementation: Some(TypeRef::class("Account")),
            ..Default::default()
        });
        index.insert(legacy).unwrap();
        index
            .insert(class("Session", vec![field("account", "Account"), field("old", "Legacy")]))
            .unwrap();

        let mut compiler = SchemaCompiler::new(&index, CompilerConfig::default());
        let compiled = compiler.compile(&TypeRef::class("Session"));
        let components = compiler.components();

        let account = &components["UserAccount"];
        assert_eq!(account.attributes.description.as_deref(), Some("A login"));
        assert_eq!(account.required, vec!["id"]);
        assert!(!components.contains_key("Legacy"));
        assert_eq!(
            components["Session"].properties["old"],
            Schema::reference_to("#/components/schemas/UserAccount")
        );
        assert_eq!(compiled.diagnostics.len(), 1);
        assert_eq!(compiled.diagnostics[0].kind, DiagnosticKind::DroppedRequiredProperty);
    }

    #[test]
    fn test_root_collection_and_terminal() {
        let index = petstore();
        let mut compiler = SchemaCompiler::new(&index, CompilerConfig::default());

        let list = compiler.compile(&TypeRef::parse("java.util.List<com.acme.Pet>").unwrap());
        assert_eq!(list.root.schema_type, Some(SchemaType::Array));
        assert_eq!(
            *list.root.items.unwrap(),
            Schema::reference_to("#/components/schemas/Pet")
        );

        let map = compiler.compile(&TypeRef::parse("java.util.Map<String, int[]>").unwrap());
        let values = map.root.additional_properties.unwrap();
        assert_eq!(values.schema_type, Some(SchemaType::Array));

        let text = compiler.compile(&TypeRef::class("java.lang.String"));
        assert_eq!(text.root.schema_type, Some(SchemaType::String));
        assert_eq!(compiler.components().len(), 1);
    }

    #[test]
    fn test_unindexed_and_unbound_degrade_to_any() {
        let mut index = InMemoryIndex::new();
        let mut raw = ClassDescriptor::new("Raw");
        raw.type_parameters = vec![TypeParameter::new("T")];
        raw.fields.push(FieldDescriptor::new("value", TypeRef::variable("T")));
        raw.fields.push(field("vendor", "com.vendor.Opaque"));
        index.insert(raw).unwrap();

        let mut compiler = SchemaCompiler::new(&index, CompilerConfig::default());
        let compiled = compiler.compile(&TypeRef::class("Raw"));
        let raw = &compiler.components()["Raw"];

        assert!(raw.properties["value"].is_unconstrained());
        assert!(raw.properties["vendor"].is_unconstrained());
        let kinds: Vec<_> = compiled.diagnostics.iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            vec![DiagnosticKind::UnresolvedTypeVariable, DiagnosticKind::UnindexedType]
        );
    }

    #[test]
    fn test_compilation_is_deterministic() {
        let index = petstore();
        let run = || {
            let mut compiler = SchemaCompiler::new(&index, CompilerConfig::default());
            let root = compiler.compile(&TypeRef::class("com.acme.Store")).root;
            (root, serde_json::to_string(&compiler.components()).unwrap())
        };
        assert_eq!(run(), run());
    }
}

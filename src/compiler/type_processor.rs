//! Type classification and per-occurrence schema construction.
//!
//! [`classify`] is the single place that decides what kind of type an
//! occurrence is. [`Traversal::process`] turns the classification into a schema
//! node, recursing for array components and collection/map arguments and
//! queueing composites for later expansion.

use super::deque::{hidden_properties, path_identity, PathId, PushOutcome};
use super::overlay::{self, Replacement};
use super::type_resolver::{
    bindings_for, find_supertype, resolve_type_variable, substitute, Bindings, ResolvedMember,
};
use super::{DiagnosticKind, Traversal};
use crate::index::TypeIndex;
use crate::schema::{SchemaId, SchemaNode, SchemaType};
use crate::types::{capitalize, TypeRef};
use crate::well_known::{TerminalAttributes, WellKnownTypes};
use log::debug;
use serde_json::Value;

/// What a type occurrence turns into
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    /// No internal structure; type and format only
    Terminal(TerminalAttributes),
    /// The universal top type, emitted unconstrained
    Any,
    /// Named type outside the index
    Unindexed,
    Array { component: TypeRef, dimensions: usize },
    /// Element argument, `None` for raw uses
    Collection(Option<TypeRef>),
    /// Value argument, `None` for raw uses
    Map(Option<TypeRef>),
    Enumeration(Vec<String>),
    Variable,
    Composite,
}

pub fn classify(index: &dyn TypeIndex, well_known: &WellKnownTypes, ty: &TypeRef) -> Classification {
    match ty {
        TypeRef::Primitive(_) => match well_known.terminal(ty) {
            Some(attrs) => Classification::Terminal(attrs),
            None => Classification::Any,
        },
        TypeRef::Array {
            component,
            dimensions,
        } => Classification::Array {
            component: (**component).clone(),
            dimensions: *dimensions,
        },
        TypeRef::Variable { .. } => Classification::Variable,
        TypeRef::Wildcard {
            extends: Some(upper),
            ..
        } => classify(index, well_known, upper),
        TypeRef::Wildcard { .. } => Classification::Any,
        TypeRef::Class(name) | TypeRef::Parameterized { name, .. } => {
            classify_named(index, well_known, ty, name)
        }
    }
}

fn classify_named(
    index: &dyn TypeIndex,
    well_known: &WellKnownTypes,
    ty: &TypeRef,
    name: &str,
) -> Classification {
    if let Some(attrs) = well_known.terminal(&TypeRef::class(name)) {
        return Classification::Terminal(attrs);
    }
    if well_known.is_top(name) {
        return Classification::Any;
    }
    if well_known.is_collection(index, name) {
        return Classification::Collection(type_argument(index, ty, well_known.collection_names(), 0, 1));
    }
    if well_known.is_map(index, name) {
        return Classification::Map(type_argument(index, ty, well_known.map_names(), 1, 2));
    }
    if well_known.is_enum(index, name) {
        let constants = index
            .class(name)
            .map(|c| c.enum_constants.clone())
            .unwrap_or_default();
        return Classification::Enumeration(constants);
    }
    if index.contains(name) {
        Classification::Composite
    } else {
        Classification::Unindexed
    }
}

/// Argument at `position` of the parameterization through which `ty` reaches
/// one of `names`, when that parameterization has exactly `arity` arguments
fn type_argument(
    index: &dyn TypeIndex,
    ty: &TypeRef,
    names: &[&str],
    position: usize,
    arity: usize,
) -> Option<TypeRef> {
    let parameterized = find_supertype(index, ty, names)?;
    match parameterized.arguments() {
        args if args.len() == arity => Some(args[position].clone()),
        _ => None,
    }
}

impl<'c> Traversal<'c> {
    /// Schema node for one occurrence of `ty`, declared where `bindings` are in scope
    pub(super) fn process(
        &mut self,
        parent: Option<PathId>,
        ty: &TypeRef,
        bindings: &Bindings,
        origin: Option<&ResolvedMember>,
    ) -> SchemaId {
        if let TypeRef::Wildcard {
            extends: Some(upper),
            ..
        } = ty
        {
            return self.process(parent, upper, bindings, origin);
        }

        match classify(self.index, self.well_known, ty) {
            Classification::Terminal(attrs) => {
                let mut node = SchemaNode::of_type(attrs.schema_type);
                node.attributes.format = attrs.format.map(String::from);
                self.arena.alloc(node)
            }
            Classification::Any => self.arena.alloc_empty(),
            Classification::Unindexed => {
                self.diagnostics.report(
                    DiagnosticKind::UnindexedType,
                    ty.canonical(),
                    "type is not in the index; emitting an unconstrained schema",
                );
                self.arena.alloc_empty()
            }
            Classification::Array {
                component,
                dimensions,
            } => {
                let mut items = self.process(parent, &component, bindings, origin);
                for _ in 0..dimensions {
                    items = self.array_of(items);
                }
                items
            }
            Classification::Collection(element) => {
                let items = match element {
                    Some(element) => self.process(parent, &element, bindings, origin),
                    None => self.arena.alloc_empty(),
                };
                self.array_of(items)
            }
            Classification::Map(value) => {
                let values = match value {
                    Some(value) => self.process(parent, &value, bindings, origin),
                    None => self.arena.alloc_empty(),
                };
                let mut node = SchemaNode::of_type(SchemaType::Object);
                node.additional_properties = Some(values);
                self.arena.alloc(node)
            }
            Classification::Enumeration(constants) => {
                let mut node = SchemaNode::of_type(SchemaType::String);
                node.enum_values = Some(constants.into_iter().map(Value::String).collect());
                self.arena.alloc(node)
            }
            Classification::Variable => {
                let resolved = self.resolve_variable(ty, bindings);
                self.process(parent, &resolved, &Bindings::new(), origin)
            }
            Classification::Composite => {
                let concrete = substitute(ty, bindings);
                self.process_composite(parent, concrete, origin)
            }
        }
    }

    fn array_of(&mut self, items: SchemaId) -> SchemaId {
        let mut node = SchemaNode::of_type(SchemaType::Array);
        node.items = Some(items);
        self.arena.alloc(node)
    }

    fn resolve_variable(&mut self, variable: &TypeRef, bindings: &Bindings) -> TypeRef {
        if let TypeRef::Variable { name, bound: None } = variable {
            if !bindings.contains_key(name) {
                self.diagnostics.report(
                    DiagnosticKind::UnresolvedTypeVariable,
                    name.as_str(),
                    "no binding and no declared bound; using the top type",
                );
            }
        }
        resolve_type_variable(variable, bindings)
    }

    /// Registered types become reference nodes. Anything else gets a fresh
    /// object node queued for member expansion.
    fn process_composite(
        &mut self,
        parent: Option<PathId>,
        ty: TypeRef,
        origin: Option<&ResolvedMember>,
    ) -> SchemaId {
        let identity = ty.canonical();
        let scoped = path_identity(&ty, origin);
        if let Some(reference) = self.registry.reference_to(&scoped) {
            debug!("{} is registered, referencing it", scoped);
            return self.arena.alloc(SchemaNode::reference_to(reference));
        }

        let index = self.index;
        let class = ty.name().and_then(|n| index.class(n));
        let annotation = class.and_then(|c| c.schema.as_ref());
        if let Some(annotation) = annotation {
            match overlay::replacement(annotation, &self.config.ref_prefix, &identity, &mut self.diagnostics) {
                Some(Replacement::Reference(reference)) => {
                    return self.arena.alloc(SchemaNode::reference_to(reference));
                }
                Some(Replacement::Implementation(implementation)) => {
                    if self.implementing.insert(identity.clone()) {
                        debug!("{} is implemented by {}", identity, implementation);
                        let bindings = class.map(|c| bindings_for(c, &ty)).unwrap_or_default();
                        let id = self.process(parent, &implementation, &bindings, origin);
                        self.implementing.remove(&identity);
                        return id;
                    }
                    self.diagnostics.report(
                        DiagnosticKind::ConflictingOverride,
                        identity.as_str(),
                        "implementation chain loops back; expanding the declared type",
                    );
                }
                None => {}
            }
        }

        let mut node = SchemaNode::of_type(SchemaType::Object);
        if let Some(annotation) = annotation {
            overlay::apply(&mut node, annotation, &identity, &mut self.diagnostics);
        }
        let target = self.arena.alloc(node);

        let outcome = match parent {
            None => PushOutcome::Queued(self.deque.root_node(ty.clone(), target, origin.cloned())),
            Some(_) => self.deque.push(parent, ty.clone(), target, origin.cloned()),
        };
        match outcome {
            PushOutcome::Cycle { ancestor } => {
                let entry = self.deque.entry(ancestor).clone();
                self.diagnostics.report(
                    DiagnosticKind::CycleDetected,
                    scoped.as_str(),
                    "type reaches itself; extracting it as a shared component",
                );
                let reference = self.register(&entry.ty, &entry.identity, entry.origin.as_ref(), entry.schema);
                self.arena.alloc(SchemaNode::reference_to(reference))
            }
            PushOutcome::Growing { .. } => {
                self.diagnostics.report(
                    DiagnosticKind::CycleDetected,
                    scoped.as_str(),
                    "generic arguments grow on every expansion; emitting an unconstrained schema",
                );
                self.arena.alloc_empty()
            }
            PushOutcome::Queued(_) if self.config.schema_references => {
                let reference = self.register(&ty, &scoped, origin, target);
                self.arena.alloc(SchemaNode::reference_to(reference))
            }
            PushOutcome::Queued(_) => target,
        }
    }

    /// Register `schema` as the component for `ty` reached through `origin`.
    ///
    /// A class-level name is preferred. When the origin hides properties, the
    /// name says which, e.g. `PersonWithoutPassword`.
    fn register(
        &mut self,
        ty: &TypeRef,
        identity: &str,
        origin: Option<&ResolvedMember>,
        schema: SchemaId,
    ) -> String {
        let index = self.index;
        let annotated = ty
            .name()
            .and_then(|n| index.class(n))
            .and_then(|c| c.schema.as_ref())
            .and_then(|a| a.name.clone());
        let hidden = hidden_properties(origin);
        let preferred_name = if hidden.is_empty() {
            annotated
        } else {
            let base = annotated.unwrap_or_else(|| ty.simple_name());
            let suffix: String = hidden.iter().map(|p| capitalize(p)).collect();
            Some(format!("{}Without{}", base, suffix))
        };
        self.registry
            .check_registration(identity, ty, schema, preferred_name.as_deref())
    }
}

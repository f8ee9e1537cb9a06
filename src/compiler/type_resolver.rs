//! Member resolution through inheritance and generic parameterization.
//!
//! Given a concrete type such as `A<String>` and its class descriptor, the
//! resolver walks the class chain from most-derived to most-base, then the
//! implemented interfaces, and collects every declared member once. Each member
//! carries the type-variable bindings in scope where it was declared, so
//! `class A<T> extends B<List<T>>` resolves a `U value` declared in `B<U>` to
//! `List<String>`.

use crate::annotation::SchemaAnnotation;
use crate::index::{ClassDescriptor, FieldDescriptor, TypeIndex};
use crate::types::TypeRef;
use crate::well_known::OBJECT;
use indexmap::IndexMap;
use log::debug;
use std::collections::{HashSet, VecDeque};

/// Type-variable name to concrete type
pub type Bindings = IndexMap<String, TypeRef>;

/// A member together with the generic context it was declared in
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedMember {
    pub name: String,
    /// Class that declares the member
    pub owner: String,
    pub field: FieldDescriptor,
    /// Substitutions for the owner's type variables
    pub bindings: Bindings,
}

impl ResolvedMember {
    pub fn declared_type(&self) -> &TypeRef {
        &self.field.ty
    }

    /// Declared type with every type variable substituted
    pub fn concrete_type(&self) -> TypeRef {
        substitute(&self.field.ty, &self.bindings)
    }

    pub fn annotation(&self) -> Option<&SchemaAnnotation> {
        self.field.schema.as_ref()
    }
}

/// Bindings of `class`'s type parameters for the concrete type `ty`.
///
/// Raw uses, or argument counts that do not match, bind nothing.
pub fn bindings_for(class: &ClassDescriptor, ty: &TypeRef) -> Bindings {
    let arguments = ty.arguments();
    if arguments.len() != class.type_parameters.len() {
        if !arguments.is_empty() {
            debug!(
                "{} takes {} type arguments but {} were given; treating as raw",
                class.name,
                class.type_parameters.len(),
                arguments.len()
            );
        }
        return Bindings::new();
    }
    class
        .type_parameters
        .iter()
        .zip(arguments)
        .map(|(param, arg)| (param.name.clone(), arg.clone()))
        .collect()
}

/// Resolve a type variable: its binding, else its declared bound, else the top type
pub fn resolve_type_variable(variable: &TypeRef, bindings: &Bindings) -> TypeRef {
    match variable {
        TypeRef::Variable { name, bound } => match bindings.get(name) {
            Some(bound_to) => bound_to.clone(),
            None => match bound {
                Some(b) => substitute(b, bindings),
                None => TypeRef::class(OBJECT),
            },
        },
        other => substitute(other, bindings),
    }
}

/// Replace every type variable in `ty` using `bindings`
pub fn substitute(ty: &TypeRef, bindings: &Bindings) -> TypeRef {
    match ty {
        TypeRef::Variable { .. } => resolve_type_variable(ty, bindings),
        TypeRef::Array {
            component,
            dimensions,
        } => match substitute(component, bindings) {
            TypeRef::Array {
                component: inner,
                dimensions: inner_dims,
            } => TypeRef::Array {
                component: inner,
                dimensions: dimensions + inner_dims,
            },
            resolved => TypeRef::array(resolved, *dimensions),
        },
        TypeRef::Parameterized { name, arguments } => TypeRef::Parameterized {
            name: name.clone(),
            arguments: arguments.iter().map(|a| substitute(a, bindings)).collect(),
        },
        TypeRef::Wildcard {
            extends,
            super_bound,
        } => TypeRef::Wildcard {
            extends: extends.as_ref().map(|b| Box::new(substitute(b, bindings))),
            super_bound: super_bound
                .as_ref()
                .map(|b| Box::new(substitute(b, bindings))),
        },
        TypeRef::Primitive(_) | TypeRef::Class(_) => ty.clone(),
    }
}

/// All members of `ty`, in declaration order, derived classes first.
///
/// A member declared again further up the hierarchy is shadowed by the first
/// occurrence. Interface members come after the whole class chain.
pub fn resolve_members<'a>(
    index: &'a dyn TypeIndex,
    ty: &TypeRef,
    class: &'a ClassDescriptor,
) -> IndexMap<String, ResolvedMember> {
    let mut members = IndexMap::new();
    let mut visited = HashSet::new();
    let mut interfaces = VecDeque::new();

    let mut current = Some((class, bindings_for(class, ty)));
    while let Some((cls, bindings)) = current.take() {
        if !visited.insert(cls.name.clone()) {
            break;
        }
        collect_fields(cls, &bindings, &mut members);
        interfaces.extend(cls.interfaces.iter().map(|i| substitute(i, &bindings)));

        current = cls.superclass.as_ref().and_then(|sup| {
            let sup = substitute(sup, &bindings);
            let sup_class = index.class(sup.name()?)?;
            Some((sup_class, bindings_for(sup_class, &sup)))
        });
    }

    while let Some(iface) = interfaces.pop_front() {
        let Some(iface_class) = iface.name().and_then(|n| index.class(n)) else {
            continue;
        };
        if !visited.insert(iface_class.name.clone()) {
            continue;
        }
        let bindings = bindings_for(iface_class, &iface);
        collect_fields(iface_class, &bindings, &mut members);
        interfaces.extend(iface_class.supertypes().map(|s| substitute(s, &bindings)));
    }

    debug!("Resolved {} members for {}", members.len(), ty);
    members
}

fn collect_fields(
    class: &ClassDescriptor,
    bindings: &Bindings,
    members: &mut IndexMap<String, ResolvedMember>,
) {
    for field in &class.fields {
        if members.contains_key(&field.name) {
            debug!("{}.{} is shadowed by a subtype", class.name, field.name);
            continue;
        }
        members.insert(
            field.name.clone(),
            ResolvedMember {
                name: field.name.clone(),
                owner: class.name.clone(),
                field: field.clone(),
                bindings: bindings.clone(),
            },
        );
    }
}

/// Find the parameterization through which `ty` reaches one of `targets`.
///
/// For `PetList extends ArrayList<Pet>` and the collection names this returns
/// `ArrayList<Pet>`, which carries the element type a raw `PetList` lacks.
pub fn find_supertype(index: &dyn TypeIndex, ty: &TypeRef, targets: &[&str]) -> Option<TypeRef> {
    let mut pending = VecDeque::from([ty.clone()]);
    let mut visited = HashSet::new();
    while let Some(current) = pending.pop_front() {
        let name = current.name()?.to_string();
        if targets.contains(&name.as_str()) {
            return Some(current);
        }
        if !visited.insert(name.clone()) {
            continue;
        }
        if let Some(class) = index.class(&name) {
            let bindings = bindings_for(class, &current);
            pending.extend(class.supertypes().map(|s| substitute(s, &bindings)));
        }
    }
    None
}

//! Traversal queue and path tracking.
//!
//! Every composite type occurrence that needs its members expanded becomes a
//! [`PathEntry`]. Entries live in an arena for the duration of one compilation
//! and link to the entry that reached them, forming the ancestor chain used to
//! detect cycles.

use super::type_resolver::ResolvedMember;
use crate::schema::SchemaId;
use crate::types::TypeRef;
use log::debug;
use std::collections::VecDeque;

/// Handle to an entry in a [`PathDeque`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PathId(usize);

/// One in-flight traversal task
#[derive(Debug, Clone)]
pub struct PathEntry {
    pub parent: Option<PathId>,
    /// Concrete type this entry expands
    pub ty: TypeRef,
    /// Identity of `ty` as reached through `origin`, see [`path_identity`]
    pub identity: String,
    /// Schema node being filled for this entry
    pub schema: SchemaId,
    /// Member that led to this entry, if any
    pub origin: Option<ResolvedMember>,
}

/// Result of asking the deque to expand a type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// The entry was queued for expansion
    Queued(PathId),
    /// The type is already being expanded by this ancestor
    Cycle { ancestor: PathId },
    /// The ancestor expands the same class with arguments that the new type
    /// strictly nests, so expansion would never reach a fixed point
    Growing { ancestor: PathId },
}

/// Properties the member `origin` hides from the type it leads to, sorted and
/// deduplicated
pub fn hidden_properties(origin: Option<&ResolvedMember>) -> Vec<String> {
    let mut hidden = origin
        .map(|o| o.field.ignore_properties.clone())
        .unwrap_or_default();
    hidden.sort_unstable();
    hidden.dedup();
    hidden
}

/// Registry and cycle identity of `ty` when reached through `origin`, e.g.
/// `com.acme.Person[-password]`
pub fn path_identity(ty: &TypeRef, origin: Option<&ResolvedMember>) -> String {
    let hidden = hidden_properties(origin);
    if hidden.is_empty() {
        ty.canonical()
    } else {
        format!("{}[-{}]", ty.canonical(), hidden.join(","))
    }
}

/// FIFO work queue over an arena of path entries
#[derive(Debug, Default)]
pub struct PathDeque {
    entries: Vec<PathEntry>,
    pending: VecDeque<PathId>,
}

impl PathDeque {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the queue with an entry that has no parent
    pub fn root_node(
        &mut self,
        ty: TypeRef,
        schema: SchemaId,
        origin: Option<ResolvedMember>,
    ) -> PathId {
        let id = self.insert(PathEntry {
            parent: None,
            identity: path_identity(&ty, origin.as_ref()),
            ty,
            schema,
            origin,
        });
        self.pending.push_back(id);
        id
    }

    /// Queue `ty` for expansion under `parent`.
    ///
    /// When the same identity is already on the ancestor chain, or an ancestor
    /// expands the same class with arguments `ty` strictly nests, nothing is
    /// queued and the ancestor is returned instead.
    pub fn push(
        &mut self,
        parent: Option<PathId>,
        ty: TypeRef,
        schema: SchemaId,
        origin: Option<ResolvedMember>,
    ) -> PushOutcome {
        let identity = path_identity(&ty, origin.as_ref());
        if let Some(parent) = parent {
            if let Some(ancestor) = self.find_in_chain(parent, &identity) {
                debug!("Cycle detected on {}, not expanding again", identity);
                return PushOutcome::Cycle { ancestor };
            }
            if let Some(ancestor) = self.find_nested_in_chain(parent, &ty) {
                debug!(
                    "{} nests the arguments of {}, not expanding",
                    identity,
                    self.entry(ancestor).identity
                );
                return PushOutcome::Growing { ancestor };
            }
        }

        debug!("Queueing {} for expansion", identity);
        let id = self.insert(PathEntry {
            parent,
            ty,
            identity,
            schema,
            origin,
        });
        self.pending.push_back(id);
        PushOutcome::Queued(id)
    }

    /// Next entry to expand, in insertion order
    pub fn pop(&mut self) -> Option<PathId> {
        self.pending.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn entry(&self, id: PathId) -> &PathEntry {
        &self.entries[id.0]
    }

    /// First entry on the chain starting at `start` with the given identity
    pub fn find_in_chain(&self, start: PathId, identity: &str) -> Option<PathId> {
        self.find_where(start, |entry| entry.identity == identity)
    }

    /// First entry on the chain starting at `start` whose type `ty` grows out of
    fn find_nested_in_chain(&self, start: PathId, ty: &TypeRef) -> Option<PathId> {
        self.find_where(start, |entry| nests_arguments(ty, &entry.ty))
    }

    fn find_where(&self, start: PathId, matches: impl Fn(&PathEntry) -> bool) -> Option<PathId> {
        let mut current = Some(start);
        while let Some(id) = current {
            let entry = self.entry(id);
            if matches(entry) {
                return Some(id);
            }
            current = entry.parent;
        }
        None
    }

    fn insert(&mut self, entry: PathEntry) -> PathId {
        self.entries.push(entry);
        PathId(self.entries.len() - 1)
    }
}

/// Same generic class, and every argument of `ty` is the ancestor's argument
/// or wraps it, with at least one strictly wrapping
fn nests_arguments(ty: &TypeRef, ancestor: &TypeRef) -> bool {
    if ty.name().is_none() || ty.name() != ancestor.name() {
        return false;
    }
    let (args, ancestor_args) = (ty.arguments(), ancestor.arguments());
    if args.is_empty() || args.len() != ancestor_args.len() {
        return false;
    }
    let mut grew = false;
    for (arg, ancestor_arg) in args.iter().zip(ancestor_args) {
        if arg == ancestor_arg {
            continue;
        }
        if !contains_type(arg, ancestor_arg) {
            return false;
        }
        grew = true;
    }
    grew
}

fn contains_type(outer: &TypeRef, inner: &TypeRef) -> bool {
    if outer == inner {
        return true;
    }
    match outer {
        TypeRef::Parameterized { arguments, .. } => arguments.iter().any(|a| contains_type(a, inner)),
        TypeRef::Array { component, .. } => contains_type(component, inner),
        TypeRef::Wildcard {
            extends,
            super_bound,
        } => extends
            .iter()
            .chain(super_bound.iter())
            .any(|b| contains_type(b, inner)),
        _ => false,
    }
}

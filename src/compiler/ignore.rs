use super::deque::PathEntry;
use super::type_resolver::ResolvedMember;
use crate::index::ClassDescriptor;
use log::debug;

/// Decides which members are left out of a composite's schema.
///
/// Checks run from most to least specific. An explicit `ignore: false` on the
/// member wins over any type-level ignore list.
#[derive(Debug, Clone)]
pub struct IgnorePolicy {
    infer_unannotated: bool,
}

impl IgnorePolicy {
    pub fn new(infer_unannotated: bool) -> Self {
        Self { infer_unannotated }
    }

    /// `class` is the class being expanded by `entry`, which is not necessarily
    /// the class that declared the member.
    pub fn should_ignore(
        &self,
        member: &ResolvedMember,
        entry: &PathEntry,
        class: &ClassDescriptor,
    ) -> bool {
        let field = &member.field;
        if field.is_static || field.is_transient {
            debug!("Ignoring {}.{}: static or transient", member.owner, member.name);
            return true;
        }
        if let Some(explicit) = field.ignore {
            return explicit;
        }
        if field.schema.as_ref().and_then(|s| s.hidden) == Some(true) {
            debug!("Ignoring {}.{}: hidden", member.owner, member.name);
            return true;
        }

        let listed = |names: &[String]| {
            names.iter().any(|n| *n == member.name || Some(n.as_str()) == property_name(member))
        };
        if listed(&class.ignore_properties) {
            debug!("Ignoring {}.{}: listed by {}", member.owner, member.name, class.name);
            return true;
        }
        if let Some(origin) = &entry.origin {
            if listed(&origin.field.ignore_properties) {
                debug!(
                    "Ignoring {}.{}: listed by member {}.{}",
                    member.owner, member.name, origin.owner, origin.name
                );
                return true;
            }
        }

        !self.infer_unannotated && field.schema.is_none()
    }
}

fn property_name(member: &ResolvedMember) -> Option<&str> {
    member.annotation().and_then(|a| a.name.as_deref())
}

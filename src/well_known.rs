//! Well-known types: terminals, collections, maps and the universal top type.
//!
//! These are handled by name rather than by traversing their declarations. The
//! synthetic collection/map standin descriptors used for root-level collections
//! are built once in [`WellKnownTypes::new`] and handed to the compiler.

use crate::index::{ClassDescriptor, FieldDescriptor, TypeIndex};
use crate::schema::SchemaType;
use crate::types::{Primitive, TypeParameter, TypeRef};

/// The universal top type
pub const OBJECT: &str = "java.lang.Object";
/// Base of every enumeration
pub const ENUM: &str = "java.lang.Enum";

const TOP_TYPES: &[&str] = &[OBJECT, "Object", "serde_json::Value", "Value"];

const COLLECTIONS: &[&str] = &[
    "java.lang.Iterable",
    "java.util.Collection",
    "java.util.List",
    "java.util.Set",
    "java.util.SortedSet",
    "java.util.Queue",
    "java.util.Deque",
    "java.util.ArrayList",
    "java.util.LinkedList",
    "java.util.HashSet",
    "java.util.LinkedHashSet",
    "java.util.TreeSet",
    "Vec",
    "VecDeque",
    "LinkedList",
    "HashSet",
    "BTreeSet",
    "IndexSet",
];

const MAPS: &[&str] = &[
    "java.util.Map",
    "java.util.SortedMap",
    "java.util.HashMap",
    "java.util.LinkedHashMap",
    "java.util.TreeMap",
    "java.util.concurrent.ConcurrentHashMap",
    "HashMap",
    "BTreeMap",
    "IndexMap",
];

/// Terminal classes: (name, type, format)
const TERMINALS: &[(&str, SchemaType, Option<&str>)] = &[
    ("java.lang.String", SchemaType::String, None),
    ("java.lang.CharSequence", SchemaType::String, None),
    ("java.lang.Character", SchemaType::String, None),
    ("java.lang.Boolean", SchemaType::Boolean, None),
    ("java.lang.Byte", SchemaType::Integer, Some("int32")),
    ("java.lang.Short", SchemaType::Integer, Some("int32")),
    ("java.lang.Integer", SchemaType::Integer, Some("int32")),
    ("java.lang.Long", SchemaType::Integer, Some("int64")),
    ("java.math.BigInteger", SchemaType::Integer, None),
    ("java.lang.Float", SchemaType::Number, Some("float")),
    ("java.lang.Double", SchemaType::Number, Some("double")),
    ("java.math.BigDecimal", SchemaType::Number, None),
    ("java.util.UUID", SchemaType::String, Some("uuid")),
    ("java.net.URI", SchemaType::String, Some("uri")),
    ("java.net.URL", SchemaType::String, Some("url")),
    ("java.util.Date", SchemaType::String, Some("date-time")),
    ("java.time.Instant", SchemaType::String, Some("date-time")),
    ("java.time.OffsetDateTime", SchemaType::String, Some("date-time")),
    ("java.time.ZonedDateTime", SchemaType::String, Some("date-time")),
    ("java.time.LocalDateTime", SchemaType::String, Some("date-time")),
    ("java.time.LocalDate", SchemaType::String, Some("date")),
    ("java.time.LocalTime", SchemaType::String, None),
    ("String", SchemaType::String, None),
    ("str", SchemaType::String, None),
    ("char", SchemaType::String, None),
    ("bool", SchemaType::Boolean, None),
    ("i8", SchemaType::Integer, Some("int32")),
    ("i16", SchemaType::Integer, Some("int32")),
    ("i32", SchemaType::Integer, Some("int32")),
    ("u8", SchemaType::Integer, Some("int32")),
    ("u16", SchemaType::Integer, Some("int32")),
    ("u32", SchemaType::Integer, Some("int32")),
    ("i64", SchemaType::Integer, Some("int64")),
    ("i128", SchemaType::Integer, Some("int64")),
    ("isize", SchemaType::Integer, Some("int64")),
    ("u64", SchemaType::Integer, Some("int64")),
    ("u128", SchemaType::Integer, Some("int64")),
    ("usize", SchemaType::Integer, Some("int64")),
    ("f32", SchemaType::Number, Some("float")),
    ("f64", SchemaType::Number, Some("double")),
    ("Decimal", SchemaType::Number, None),
    ("Uuid", SchemaType::String, Some("uuid")),
    ("Url", SchemaType::String, Some("uri")),
    ("DateTime", SchemaType::String, Some("date-time")),
    ("NaiveDateTime", SchemaType::String, Some("date-time")),
    ("NaiveDate", SchemaType::String, Some("date")),
    ("NaiveTime", SchemaType::String, None),
];

/// Schema type and format a terminal type maps onto
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalAttributes {
    pub schema_type: SchemaType,
    pub format: Option<&'static str>,
}

/// Name tables plus the synthetic standin descriptors
#[derive(Debug, Clone)]
pub struct WellKnownTypes {
    collection_standin: ClassDescriptor,
    map_standin: ClassDescriptor,
}

impl Default for WellKnownTypes {
    fn default() -> Self {
        Self::new()
    }
}

impl WellKnownTypes {
    pub fn new() -> Self {
        let mut collection_standin = ClassDescriptor::new("$CollectionStandin");
        collection_standin.type_parameters = vec![TypeParameter::new("E")];
        collection_standin
            .fields
            .push(FieldDescriptor::new("value", TypeRef::variable("E")));

        let mut map_standin = ClassDescriptor::new("$MapStandin");
        map_standin.type_parameters = vec![TypeParameter::new("K"), TypeParameter::new("V")];
        map_standin
            .fields
            .push(FieldDescriptor::new("value", TypeRef::variable("V")));

        Self {
            collection_standin,
            map_standin,
        }
    }

    /// Type and format for a terminal type, `None` when the type has structure
    pub fn terminal(&self, ty: &TypeRef) -> Option<TerminalAttributes> {
        match ty {
            TypeRef::Primitive(p) => Some(primitive_attributes(*p)),
            TypeRef::Class(name) => TERMINALS
                .iter()
                .find(|(n, _, _)| *n == name.as_str())
                .map(|&(_, schema_type, format)| TerminalAttributes {
                    schema_type,
                    format,
                }),
            _ => None,
        }
    }

    pub fn is_top(&self, name: &str) -> bool {
        TOP_TYPES.contains(&name)
    }

    pub fn is_collection(&self, index: &dyn TypeIndex, name: &str) -> bool {
        COLLECTIONS.contains(&name) || COLLECTIONS.iter().any(|c| index.is_subtype(name, c))
    }

    pub fn is_map(&self, index: &dyn TypeIndex, name: &str) -> bool {
        MAPS.contains(&name) || MAPS.iter().any(|m| index.is_subtype(name, m))
    }

    pub fn is_enum(&self, index: &dyn TypeIndex, name: &str) -> bool {
        index.class(name).map(|c| c.is_enum()).unwrap_or(false) || index.is_subtype(name, ENUM)
    }

    /// Names a collection or map type may be parameterized through
    pub fn collection_names(&self) -> &'static [&'static str] {
        COLLECTIONS
    }

    pub fn map_names(&self) -> &'static [&'static str] {
        MAPS
    }

    /// Synthetic descriptor standing in for a root-level collection or map
    pub fn standin_for(&self, index: &dyn TypeIndex, name: &str) -> Option<&ClassDescriptor> {
        if self.is_collection(index, name) {
            Some(&self.collection_standin)
        } else if self.is_map(index, name) {
            Some(&self.map_standin)
        } else {
            None
        }
    }
}

/// Whether `name` is one of the terminal class names
pub fn is_terminal_name(name: &str) -> bool {
    TERMINALS.iter().any(|(n, _, _)| *n == name)
}

fn primitive_attributes(primitive: Primitive) -> TerminalAttributes {
    let (schema_type, format) = match primitive {
        Primitive::Boolean => (SchemaType::Boolean, None),
        Primitive::Byte | Primitive::Short | Primitive::Int => (SchemaType::Integer, Some("int32")),
        Primitive::Long => (SchemaType::Integer, Some("int64")),
        Primitive::Float => (SchemaType::Number, Some("float")),
        Primitive::Double => (SchemaType::Number, Some("double")),
        Primitive::Char => (SchemaType::String, None),
    };
    TerminalAttributes {
        schema_type,
        format,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::InMemoryIndex;

    #[test]
    fn test_primitive_terminals() {
        let wk = WellKnownTypes::new();
        let attrs = wk.terminal(&TypeRef::Primitive(Primitive::Long)).unwrap();
        assert_eq!(attrs.schema_type, SchemaType::Integer);
        assert_eq!(attrs.format, Some("int64"));

        let attrs = wk.terminal(&TypeRef::Primitive(Primitive::Boolean)).unwrap();
        assert_eq!(attrs.schema_type, SchemaType::Boolean);
        assert!(attrs.format.is_none());
    }

    #[test]
    fn test_class_terminals() {
        let wk = WellKnownTypes::new();
        let attrs = wk.terminal(&TypeRef::class("java.time.LocalDate")).unwrap();
        assert_eq!(attrs.format, Some("date"));
        let attrs = wk.terminal(&TypeRef::class("u64")).unwrap();
        assert_eq!(attrs.schema_type, SchemaType::Integer);
        assert!(wk.terminal(&TypeRef::class("com.acme.Pet")).is_none());
        assert!(wk
            .terminal(&TypeRef::parse("java.util.List<String>").unwrap())
            .is_none());
        assert!(is_terminal_name("NaiveDate"));
        assert!(!is_terminal_name("Vec"));
    }

    #[test]
    fn test_collection_and_map_subtypes() {
        let wk = WellKnownTypes::new();
        let mut index = InMemoryIndex::new();
        let mut pets = ClassDescriptor::new("com.acme.PetList");
        pets.superclass = Some(TypeRef::parse("java.util.ArrayList<com.acme.Pet>").unwrap());
        index.insert(pets).unwrap();

        assert!(wk.is_collection(&index, "java.util.List"));
        assert!(wk.is_collection(&index, "com.acme.PetList"));
        assert!(!wk.is_map(&index, "com.acme.PetList"));
        assert!(wk.is_map(&index, "BTreeMap"));
    }

    #[test]
    fn test_standins() {
        let wk = WellKnownTypes::new();
        let index = InMemoryIndex::new();
        let standin = wk.standin_for(&index, "java.util.Map").unwrap();
        assert_eq!(standin.type_parameters.len(), 2);
        assert_eq!(standin.fields[0].ty, TypeRef::variable("V"));
        assert!(wk.standin_for(&index, "com.acme.Pet").is_none());
    }
}

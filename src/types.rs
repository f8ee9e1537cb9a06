//! Type references: immutable descriptions of one occurrence of a type.
//!
//! A [`TypeRef`] is what the type index hands out for a field, a supertype or a
//! generic argument. The compiler never mutates one; it only substitutes type
//! variables to build new references.
//!
//! References can be written as textual signatures, which is how descriptor
//! files declare them:
//!
//! ```
//! use schema_compiler::types::TypeRef;
//!
//! let ty = TypeRef::parse("java.util.Map<java.lang.String, com.acme.Pet[]>").unwrap();
//! assert_eq!(ty.to_string(), "java.util.Map<java.lang.String, com.acme.Pet[]>");
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Primitive (unboxed) types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Primitive {
    Boolean,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Char,
}

impl Primitive {
    /// Look up a primitive by its keyword
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "boolean" => Some(Primitive::Boolean),
            "byte" => Some(Primitive::Byte),
            "short" => Some(Primitive::Short),
            "int" => Some(Primitive::Int),
            "long" => Some(Primitive::Long),
            "float" => Some(Primitive::Float),
            "double" => Some(Primitive::Double),
            "char" => Some(Primitive::Char),
            _ => None,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Primitive::Boolean => "boolean",
            Primitive::Byte => "byte",
            Primitive::Short => "short",
            Primitive::Int => "int",
            Primitive::Long => "long",
            Primitive::Float => "float",
            Primitive::Double => "double",
            Primitive::Char => "char",
        }
    }
}

/// A declared type parameter of a generic class
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeParameter {
    /// Variable name (e.g. `T`)
    pub name: String,
    /// Declared upper bound, if any
    pub bound: Option<TypeRef>,
}

impl TypeParameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bound: None,
        }
    }

    pub fn bounded(name: impl Into<String>, bound: TypeRef) -> Self {
        Self {
            name: name.into(),
            bound: Some(bound),
        }
    }
}

/// One occurrence of a type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TypeRef {
    /// A primitive such as `int`
    Primitive(Primitive),
    /// A plain class, by fully-qualified name
    Class(String),
    /// An array of `component` with the given number of dimensions
    Array {
        component: Box<TypeRef>,
        dimensions: usize,
    },
    /// A generic class applied to arguments, e.g. `Box<String>`
    Parameterized {
        name: String,
        arguments: Vec<TypeRef>,
    },
    /// A type variable, e.g. `T`, with its declared bound
    Variable {
        name: String,
        bound: Option<Box<TypeRef>>,
    },
    /// A wildcard argument: `?`, `? extends X` or `? super X`
    Wildcard {
        extends: Option<Box<TypeRef>>,
        super_bound: Option<Box<TypeRef>>,
    },
}

impl TypeRef {
    pub fn class(name: impl Into<String>) -> Self {
        TypeRef::Class(name.into())
    }

    pub fn parameterized(name: impl Into<String>, arguments: Vec<TypeRef>) -> Self {
        TypeRef::Parameterized {
            name: name.into(),
            arguments,
        }
    }

    pub fn array(component: TypeRef, dimensions: usize) -> Self {
        TypeRef::Array {
            component: Box::new(component),
            dimensions,
        }
    }

    pub fn variable(name: impl Into<String>) -> Self {
        TypeRef::Variable {
            name: name.into(),
            bound: None,
        }
    }

    /// Name of the class this reference points at, for class and parameterized kinds
    pub fn name(&self) -> Option<&str> {
        match self {
            TypeRef::Class(name) | TypeRef::Parameterized { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Generic arguments (empty unless parameterized)
    pub fn arguments(&self) -> &[TypeRef] {
        match self {
            TypeRef::Parameterized { arguments, .. } => arguments,
            _ => &[],
        }
    }

    /// Canonical type identity: the name plus the resolved argument signature
    pub fn canonical(&self) -> String {
        self.to_string()
    }

    /// Short name used to derive registry names, e.g. `BoxString` for
    /// `com.acme.Box<java.lang.String>`
    pub fn simple_name(&self) -> String {
        match self {
            TypeRef::Primitive(p) => capitalize(p.keyword()),
            TypeRef::Class(name) => last_segment(name).to_string(),
            TypeRef::Parameterized { name, arguments } => {
                let mut out = last_segment(name).to_string();
                for arg in arguments {
                    out.push_str(&arg.simple_name());
                }
                out
            }
            TypeRef::Array {
                component,
                dimensions,
            } => format!("{}{}", component.simple_name(), "Array".repeat(*dimensions)),
            TypeRef::Variable { name, .. } => name.clone(),
            TypeRef::Wildcard { extends, .. } => extends
                .as_ref()
                .map(|b| b.simple_name())
                .unwrap_or_else(|| "Object".to_string()),
        }
    }

    /// Turn plain class names matching one of `params` into type variables
    /// carrying that parameter's bound
    pub fn bind_variables(self, params: &[TypeParameter]) -> TypeRef {
        if params.is_empty() {
            return self;
        }
        match self {
            TypeRef::Class(name) => match params.iter().find(|p| p.name == name) {
                Some(param) => TypeRef::Variable {
                    name,
                    bound: param.bound.clone().map(Box::new),
                },
                None => TypeRef::Class(name),
            },
            TypeRef::Array {
                component,
                dimensions,
            } => TypeRef::Array {
                component: Box::new(component.bind_variables(params)),
                dimensions,
            },
            TypeRef::Parameterized { name, arguments } => TypeRef::Parameterized {
                name,
                arguments: arguments
                    .into_iter()
                    .map(|a| a.bind_variables(params))
                    .collect(),
            },
            TypeRef::Wildcard {
                extends,
                super_bound,
            } => TypeRef::Wildcard {
                extends: extends.map(|b| Box::new(b.bind_variables(params))),
                super_bound: super_bound.map(|b| Box::new(b.bind_variables(params))),
            },
            other => other,
        }
    }

    /// Parse a textual signature such as `Box<T>[]` or `? extends Foo`
    pub fn parse(signature: &str) -> Result<TypeRef> {
        let mut parser = SignatureParser {
            src: signature,
            pos: 0,
        };
        let ty = parser.parse_type()?;
        parser.skip_whitespace();
        if parser.pos != signature.len() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(ty)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Primitive(p) => write!(f, "{}", p.keyword()),
            TypeRef::Class(name) => write!(f, "{}", name),
            TypeRef::Array {
                component,
                dimensions,
            } => write!(f, "{}{}", component, "[]".repeat(*dimensions)),
            TypeRef::Parameterized { name, arguments } => {
                write!(f, "{}<", name)?;
                for (i, arg) in arguments.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ">")
            }
            TypeRef::Variable { name, .. } => write!(f, "{}", name),
            TypeRef::Wildcard {
                extends: Some(bound),
                ..
            } => write!(f, "? extends {}", bound),
            TypeRef::Wildcard {
                super_bound: Some(bound),
                ..
            } => write!(f, "? super {}", bound),
            TypeRef::Wildcard { .. } => write!(f, "?"),
        }
    }
}

impl TryFrom<String> for TypeRef {
    type Error = Error;

    fn try_from(signature: String) -> Result<Self> {
        TypeRef::parse(&signature)
    }
}

impl From<TypeRef> for String {
    fn from(ty: TypeRef) -> Self {
        ty.to_string()
    }
}

fn last_segment(name: &str) -> &str {
    name.rsplit(|c| c == '.' || c == ':' || c == '$')
        .next()
        .unwrap_or(name)
}

pub(crate) fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

struct SignatureParser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> SignatureParser<'a> {
    fn error(&self, message: &str) -> Error {
        Error::InvalidTypeSignature {
            signature: self.src.to_string(),
            message: format!("{} at offset {}", message, self.pos),
        }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        self.skip_whitespace();
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn identifier(&mut self) -> &'a str {
        self.skip_whitespace();
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || matches!(c, '_' | '.' | '$' | ':') {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
        &self.src[start..self.pos]
    }

    fn parse_type(&mut self) -> Result<TypeRef> {
        if self.eat('?') {
            return self.parse_wildcard();
        }

        let name = self.identifier();
        if name.is_empty() {
            return Err(self.error("expected a type name"));
        }

        let base = if self.eat('<') {
            let mut arguments = vec![self.parse_type()?];
            while self.eat(',') {
                arguments.push(self.parse_type()?);
            }
            if !self.eat('>') {
                return Err(self.error("expected `>`"));
            }
            TypeRef::parameterized(name, arguments)
        } else if let Some(primitive) = Primitive::from_keyword(name) {
            TypeRef::Primitive(primitive)
        } else {
            TypeRef::class(name)
        };

        let mut dimensions = 0;
        while self.eat('[') {
            if !self.eat(']') {
                return Err(self.error("expected `]`"));
            }
            dimensions += 1;
        }

        Ok(if dimensions > 0 {
            TypeRef::array(base, dimensions)
        } else {
            base
        })
    }

    fn parse_wildcard(&mut self) -> Result<TypeRef> {
        let checkpoint = self.pos;
        match self.identifier() {
            "extends" => Ok(TypeRef::Wildcard {
                extends: Some(Box::new(self.parse_type()?)),
                super_bound: None,
            }),
            "super" => Ok(TypeRef::Wildcard {
                extends: None,
                super_bound: Some(Box::new(self.parse_type()?)),
            }),
            "" => {
                self.pos = checkpoint;
                Ok(TypeRef::Wildcard {
                    extends: None,
                    super_bound: None,
                })
            }
            _ => Err(self.error("expected `extends` or `super` after `?`")),
        }
    }
}

//! Schema Compiler - turns a static type graph into OpenAPI schema components.
//!
//! The input is a [`TypeIndex`](index::TypeIndex): classes with fields,
//! generic parameters, supertypes and optional schema annotations. The index
//! can be loaded from YAML/JSON descriptor files or built from Rust sources.
//! The output is one schema per root type plus a registry of named components
//! that every `$ref` points into.
//!
//! # Architecture
//!
//! 1. [`scanner`] - finds index source files
//! 2. [`index`] - the type index and its loaders
//! 3. [`compiler`] - iterative traversal, generic resolution, the registry
//!    and annotation overlays
//! 4. [`document`] - assembles roots and components into a document
//! 5. [`serializer`] - renders the document as YAML or JSON
//!
//! # Example Usage
//!
//! ```no_run
//! use schema_compiler::{
//!     compiler::{CompilerConfig, SchemaCompiler},
//!     document::DocumentBuilder,
//!     index::descriptor,
//!     serializer::serialize_yaml,
//!     types::TypeRef,
//! };
//! use std::path::Path;
//!
//! let index = descriptor::load_file(Path::new("types.yaml")).unwrap();
//! let mut compiler = SchemaCompiler::new(&index, CompilerConfig::default());
//!
//! let root = TypeRef::parse("com.acme.Pet").unwrap();
//! let compiled = compiler.compile(&root);
//!
//! let mut builder = DocumentBuilder::new("Pets", "1.0");
//! builder.add_root(root, compiled);
//! let document = builder.build(&compiler);
//! println!("{}", serialize_yaml(&document).unwrap());
//! ```
//!
//! For command-line usage, see the [`cli`] module.

pub mod annotation;
pub mod cli;
pub mod compiler;
pub mod document;
pub mod error;
pub mod index;
pub mod scanner;
pub mod schema;
pub mod serializer;
pub mod types;
pub mod well_known;

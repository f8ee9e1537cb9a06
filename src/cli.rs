use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::compiler::{CompilerConfig, SchemaCompiler, DEFAULT_REF_PREFIX};
use crate::document::DocumentBuilder;
use crate::index::{descriptor, rust_source, ClassKind, InMemoryIndex, TypeIndex};
use crate::scanner::FileScanner;
use crate::serializer::{serialize_json, serialize_yaml, write_to_file};
use crate::types::TypeRef;

/// Schema Compiler - compile a static type graph into OpenAPI schema components
#[derive(Parser, Debug)]
#[command(name = "schema-compiler")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Directory (or single file) holding the type index sources
    #[arg(value_name = "INDEX_PATH")]
    pub index_path: PathBuf,

    /// Root type to compile; may be repeated. Defaults to every indexed class
    #[arg(short = 'r', long = "root", value_name = "TYPE")]
    pub roots: Vec<String>,

    /// Which kind of source files build the index
    #[arg(short = 's', long = "source", value_enum, default_value = "auto")]
    pub source: SourceKind,

    /// Output format (yaml or json)
    #[arg(short = 'f', long = "format", value_enum, default_value = "yaml")]
    pub output_format: OutputFormat,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// Inline composite types instead of registering each one as a component
    #[arg(long = "no-schema-references")]
    pub no_schema_references: bool,

    /// Skip members that carry no schema annotation
    #[arg(long = "no-infer-unannotated")]
    pub no_infer_unannotated: bool,

    /// Prefix of every generated `$ref`
    #[arg(long = "ref-prefix", value_name = "PREFIX", default_value = DEFAULT_REF_PREFIX)]
    pub ref_prefix: String,

    /// Title written to the document's info block
    #[arg(long = "title", default_value = "Schemas")]
    pub title: String,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Yaml,
    Json,
}

/// Index source options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    /// Rust sources and descriptor files, whichever are present
    Auto,
    /// Rust source files only
    Rust,
    /// YAML/JSON descriptor files only
    Descriptor,
}

impl CliArgs {
    pub fn compiler_config(&self) -> CompilerConfig {
        CompilerConfig::default()
            .with_schema_references(!self.no_schema_references)
            .with_infer_unannotated(!self.no_infer_unannotated)
            .with_ref_prefix(self.ref_prefix.clone())
    }
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.index_path.exists() {
        anyhow::bail!("Index path does not exist: {}", args.index_path.display());
    }

    info!("Index path: {}", args.index_path.display());
    info!("Index sources: {:?}", args.source);
    info!("Output format: {:?}", args.output_format);
    match &args.output_path {
        Some(output) => info!("Output file: {}", output.display()),
        None => info!("Output: stdout"),
    }
    if args.roots.is_empty() {
        info!("Roots: every indexed class");
    } else {
        info!("Roots: {}", args.roots.join(", "));
    }

    Ok(args)
}

/// Build the type index from the files found under `args.index_path`
pub fn load_index(args: &CliArgs) -> Result<InMemoryIndex> {
    info!("Scanning index sources...");
    let scan_result = FileScanner::new(args.index_path.clone()).scan()?;
    for warning in &scan_result.warnings {
        warn!("{}", warning);
    }

    let use_rust = args.source != SourceKind::Descriptor;
    let use_descriptors = args.source != SourceKind::Rust;
    let rust_files = if use_rust { scan_result.rust_files.as_slice() } else { &[] };
    let descriptor_files = if use_descriptors {
        scan_result.descriptor_files.as_slice()
    } else {
        &[]
    };
    info!(
        "Found {} Rust files and {} descriptor files",
        rust_files.len(),
        descriptor_files.len()
    );
    if rust_files.is_empty() && descriptor_files.is_empty() {
        anyhow::bail!("No index sources found in {}", args.index_path.display());
    }

    let mut index = rust_source::load_files(rust_files);
    for path in descriptor_files {
        // Auto mode may pick up unrelated YAML/JSON files
        let loaded = match descriptor::load_file(path) {
            Ok(loaded) => loaded,
            Err(e) if args.source == SourceKind::Auto => {
                warn!("Skipping {}: {}", path.display(), e);
                continue;
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to load descriptor file {}", path.display()))
            }
        };
        index
            .extend(loaded)
            .with_context(|| format!("Failed to merge types from {}", path.display()))?;
    }

    if index.is_empty() {
        anyhow::bail!("No types could be indexed from {}", args.index_path.display());
    }
    info!("Indexed {} types", index.len());
    Ok(index)
}

/// Root types to compile: the explicit list, or every non-interface class in
/// name order
pub fn select_roots(args: &CliArgs, index: &dyn TypeIndex) -> Result<Vec<TypeRef>> {
    if !args.roots.is_empty() {
        return args
            .roots
            .iter()
            .map(|r| TypeRef::parse(r).with_context(|| format!("Invalid root type: {}", r)))
            .collect();
    }
    let mut names: Vec<&str> = index
        .classes()
        .into_iter()
        .filter(|c| c.kind != ClassKind::Interface)
        .map(|c| c.name.as_str())
        .collect();
    names.sort_unstable();
    Ok(names.into_iter().map(TypeRef::class).collect())
}

/// Run the main workflow, returning the rendered document
pub fn generate(args: &CliArgs) -> Result<String> {
    // Step 1: build the type index
    let index = load_index(args)?;

    // Step 2: compile every root against one shared registry
    let roots = select_roots(args, &index)?;
    info!("Compiling {} root types...", roots.len());
    let mut compiler = SchemaCompiler::new(&index, args.compiler_config());
    let mut builder = DocumentBuilder::new(args.title.clone(), env!("CARGO_PKG_VERSION"));
    for root in roots {
        let compiled = compiler.compile(&root);
        builder.add_root(root, compiled);
    }

    // Step 3: summarize diagnostics
    let mut summary: BTreeMap<String, usize> = BTreeMap::new();
    for diagnostic in builder.diagnostics() {
        *summary.entry(diagnostic.kind.to_string()).or_default() += 1;
    }
    for (kind, count) in &summary {
        warn!("{} diagnostic(s) of kind: {}", count, kind);
    }

    // Step 4: assemble and serialize
    let document = builder.build(&compiler);
    info!("Document holds {} schemas", document.components.schemas.len());
    info!("Serializing to {:?} format...", args.output_format);
    match args.output_format {
        OutputFormat::Yaml => serialize_yaml(&document),
        OutputFormat::Json => serialize_json(&document),
    }
}

/// Generate the document and write it to the output file or stdout
pub fn run(args: CliArgs) -> Result<()> {
    let content = generate(&args)?;

    if let Some(output_path) = &args.output_path {
        info!("Writing output to: {}", output_path.display());
        write_to_file(&content, output_path)?;
        info!("Successfully wrote schema document to {}", output_path.display());
    } else {
        println!("{}", content);
    }
    Ok(())
}

//! Schema Compiler - command-line tool that compiles a static type graph into
//! OpenAPI schema components.
//!
//! # Usage
//!
//! ```bash
//! schema-compiler [OPTIONS] <INDEX_PATH>
//! ```
//!
//! # Examples
//!
//! Compile every type described under `./types`:
//! ```bash
//! schema-compiler ./types -o schemas.yaml
//! ```
//!
//! Compile one root from a Rust project, inlining composites:
//! ```bash
//! schema-compiler ./my-project -s rust --root Order --no-schema-references -f json
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use schema_compiler::cli;

fn main() -> Result<()> {
    let args = cli::CliArgs::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("Schema Compiler starting...");

    let args = cli::parse_args_from_parsed(args)?;
    cli::run(args)?;

    info!("Schema generation completed successfully");

    Ok(())
}

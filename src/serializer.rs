//! Serialization of schema documents to YAML or JSON, and file output.

use crate::document::OpenApiDocument;
use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::path::Path;

/// Serializes a document to YAML.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_yaml(doc: &OpenApiDocument) -> Result<String> {
    debug!("Serializing schema document to YAML");
    serde_yaml::to_string(doc).context("Failed to serialize schema document to YAML")
}

/// Serializes a document to pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_json(doc: &OpenApiDocument) -> Result<String> {
    debug!("Serializing schema document to JSON");
    serde_json::to_string_pretty(doc).context("Failed to serialize schema document to JSON")
}

/// Writes `content` to `path`, creating parent directories as needed and
/// overwriting any existing file.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, content)
        .with_context(|| format!("Failed to write to file: {}", path.display()))?;

    debug!("Successfully wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

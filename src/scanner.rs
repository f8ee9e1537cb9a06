use anyhow::Result;
use log::{debug, warn};
use std::path::PathBuf;
use walkdir::WalkDir;

use crate::index::descriptor::is_descriptor_file;

/// File scanner for collecting type sources from a directory.
///
/// The `FileScanner` recursively walks a directory looking for Rust source files
/// and type descriptor files (`.yaml`, `.yml`, `.json`). It skips `target` and
/// hidden directories (those starting with `.`).
///
/// # Example
///
/// ```no_run
/// use schema_compiler::scanner::FileScanner;
/// use std::path::PathBuf;
///
/// let scanner = FileScanner::new(PathBuf::from("./my-project"));
/// let result = scanner.scan().unwrap();
/// println!("Found {} Rust files", result.rust_files.len());
/// ```
pub struct FileScanner {
    root_path: PathBuf,
}

/// Result of a directory scan.
///
/// Paths are sorted so that indexing order, and with it the generated
/// document, does not depend on directory iteration order.
pub struct ScanResult {
    /// Discovered `.rs` files
    pub rust_files: Vec<PathBuf>,
    /// Discovered descriptor files
    pub descriptor_files: Vec<PathBuf>,
    /// Warning messages for paths that could not be read
    pub warnings: Vec<String>,
}

impl FileScanner {
    pub fn new(root_path: PathBuf) -> Self {
        Self { root_path }
    }

    /// Scans the directory tree.
    ///
    /// Inaccessible entries are logged and recorded as warnings; scanning
    /// continues past them. A root that is itself a file is classified like
    /// any other entry.
    pub fn scan(&self) -> Result<ScanResult> {
        let mut rust_files = Vec::new();
        let mut descriptor_files = Vec::new();
        let mut warnings = Vec::new();

        for entry in WalkDir::new(&self.root_path)
            .into_iter()
            .filter_entry(|e| {
                if e.path() == self.root_path {
                    return true;
                }

                let file_name = e.file_name().to_string_lossy();
                !file_name.starts_with('.') && file_name != "target"
            })
        {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if !path.is_file() {
                        continue;
                    }
                    if path.extension().and_then(|s| s.to_str()) == Some("rs") {
                        rust_files.push(path.to_path_buf());
                    } else if is_descriptor_file(path) {
                        descriptor_files.push(path.to_path_buf());
                    }
                }
                Err(e) => {
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        rust_files.sort();
        descriptor_files.sort();
        debug!(
            "Scanned {}: {} Rust files, {} descriptor files",
            self.root_path.display(),
            rust_files.len(),
            descriptor_files.len()
        );

        Ok(ScanResult {
            rust_files,
            descriptor_files,
            warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn file_names(paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn test_scan_classifies_files() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::write(root.join("models.rs"), "struct User {}").unwrap();
        fs::write(root.join("types.yaml"), "types: []").unwrap();
        fs::write(root.join("more.json"), "{\"types\": []}").unwrap();
        fs::write(root.join("readme.md"), "# README").unwrap();
        fs::write(root.join("Cargo.toml"), "[package]").unwrap();

        let result = FileScanner::new(root.to_path_buf()).scan().unwrap();

        assert_eq!(file_names(&result.rust_files), vec!["models.rs"]);
        assert_eq!(file_names(&result.descriptor_files), vec!["more.json", "types.yaml"]);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_scan_empty_directory() {
        let temp_dir = TempDir::new().unwrap();

        let result = FileScanner::new(temp_dir.path().to_path_buf()).scan().unwrap();

        assert!(result.rust_files.is_empty());
        assert!(result.descriptor_files.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_scan_nested_directories_sorted() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir_all(root.join("src/models")).unwrap();
        fs::write(root.join("src/models/user.rs"), "struct User {}").unwrap();
        fs::write(root.join("src/lib.rs"), "pub mod models;").unwrap();
        fs::write(root.join("build.rs"), "fn main() {}").unwrap();

        let result = FileScanner::new(root.to_path_buf()).scan().unwrap();

        assert_eq!(file_names(&result.rust_files), vec!["build.rs", "lib.rs", "user.rs"]);
    }

    #[test]
    fn test_scan_skips_target_and_hidden_directories() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir(root.join("target")).unwrap();
        fs::write(root.join("target/generated.rs"), "struct Gen {}").unwrap();
        fs::create_dir(root.join(".github")).unwrap();
        fs::write(root.join(".github/ci.yml"), "on: push").unwrap();
        fs::write(root.join("main.rs"), "fn main() {}").unwrap();

        let result = FileScanner::new(root.to_path_buf()).scan().unwrap();

        assert_eq!(file_names(&result.rust_files), vec!["main.rs"]);
        assert!(result.descriptor_files.is_empty());
    }

    #[test]
    fn test_scan_single_file_root() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("petstore.yaml");
        fs::write(&path, "types: []").unwrap();

        let result = FileScanner::new(path.clone()).scan().unwrap();

        assert_eq!(result.descriptor_files, vec![path]);
        assert!(result.rust_files.is_empty());
    }
}

//! Loading mapping files from disk at startup.

use super::types::{MappingError, MappingsDocument, StubMapping};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Parse one mappings file.
pub fn load_mappings_file(path: &Path) -> Result<Vec<StubMapping>, MappingError> {
    let display = path.display().to_string();
    let content = fs::read_to_string(path).map_err(|source| MappingError::Io {
        path: display.clone(),
        source,
    })?;
    let document: MappingsDocument =
        serde_json::from_str(&content).map_err(|source| MappingError::Parse {
            path: display,
            source,
        })?;
    Ok(document.mappings)
}

/// Load every `*.json` file in `dir`, in file name order.
///
/// Files that cannot be read or parsed are logged and skipped. An unreadable
/// directory is an error.
pub fn load_mappings_dir(dir: &Path) -> Result<Vec<StubMapping>, MappingError> {
    let entries = fs::read_dir(dir).map_err(|source| MappingError::Io {
        path: dir.display().to_string(),
        source,
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();

    let mut mappings = Vec::new();
    for file in files {
        match load_mappings_file(&file) {
            Ok(loaded) => {
                info!("Loaded {} mappings from {}", loaded.len(), file.display());
                mappings.extend(loaded);
            }
            Err(e) => warn!("Skipping mappings file: {}", e),
        }
    }
    Ok(mappings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tracing_test::traced_test;

    #[test]
    #[traced_test]
    fn test_load_dir_sorted_and_skips_bad_files() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("b.json"),
            r#"{"mappings": [{"name": "second", "request": {"url": "/b"}}]}"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("a.json"),
            r#"{"mappings": [{"name": "first", "request": {"url": "/a"}}]}"#,
        )
        .unwrap();
        fs::write(dir.path().join("broken.json"), "{not json").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let mappings = load_mappings_dir(dir.path()).unwrap();
        let names: Vec<_> = mappings.iter().map(|m| m.display_name()).collect();
        assert_eq!(names, vec!["first", "second"]);
        assert!(logs_contain("Skipping mappings file"));
    }

    #[test]
    fn test_missing_dir_is_error() {
        let dir = TempDir::new().unwrap();
        let result = load_mappings_dir(&dir.path().join("absent"));
        assert!(matches!(result, Err(MappingError::Io { .. })));
    }

    #[test]
    fn test_parse_error_names_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "[]").unwrap();
        let err = load_mappings_file(&path).unwrap_err();
        assert!(err.to_string().contains("bad.json"));
    }
}

//! Directory access for component units.
//!
//! The index needs exactly four capabilities from the filesystem; they are
//! kept behind [`UnitSource`] so scans can run against any backing store.

use std::path::{Path, PathBuf};

use stemma_common::error::{Result, StemmaError};

/// Read-only access to a component root and its unit directories.
pub trait UnitSource: Send + Sync {
    /// Returns whether the root directory exists.
    fn root_exists(&self, root: &Path) -> bool;

    /// Lists the immediate subdirectories of `root`, sorted by path.
    ///
    /// # Errors
    ///
    /// Returns an error if the root exists but cannot be listed.
    fn list_units(&self, root: &Path) -> Result<Vec<PathBuf>>;

    /// Returns whether `file` exists inside `unit`.
    fn file_exists(&self, unit: &Path, file: &str) -> bool;

    /// Reads `file` inside `unit` as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    fn read_text(&self, unit: &Path, file: &str) -> Result<String>;
}

/// [`UnitSource`] backed by the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl UnitSource for LocalFs {
    fn root_exists(&self, root: &Path) -> bool {
        root.is_dir()
    }

    fn list_units(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let entries = std::fs::read_dir(root).map_err(|e| StemmaError::Io {
            path: root.to_path_buf(),
            source: e,
        })?;
        let mut units = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StemmaError::Io {
                path: root.to_path_buf(),
                source: e,
            })?;
            let path = entry.path();
            if path.is_dir() {
                units.push(path);
            }
        }
        units.sort();
        Ok(units)
    }

    fn file_exists(&self, unit: &Path, file: &str) -> bool {
        unit.join(file).is_file()
    }

    fn read_text(&self, unit: &Path, file: &str) -> Result<String> {
        let path = unit.join(file);
        std::fs::read_to_string(&path).map_err(|e| StemmaError::Io { path, source: e })
    }
}

/// Returns the directory basename of a unit path.
#[must_use]
pub fn unit_name(unit: &Path) -> String {
    unit.file_name()
        .map_or_else(|| unit.display().to_string(), |n| n.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_units_returns_only_directories_sorted() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir(dir.path().join("Zeta")).expect("mkdir");
        std::fs::create_dir(dir.path().join("Alpha")).expect("mkdir");
        std::fs::write(dir.path().join("README.md"), "x").expect("write");

        let units = LocalFs.list_units(dir.path()).expect("list");
        let names: Vec<String> = units.iter().map(|u| unit_name(u)).collect();
        assert_eq!(names, vec!["Alpha", "Zeta"]);
    }

    #[test]
    fn missing_root_does_not_exist() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(!LocalFs.root_exists(&dir.path().join("nope")));
        assert!(LocalFs.list_units(&dir.path().join("nope")).is_err());
    }

    #[test]
    fn read_text_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("contracts.yaml"), "contracts: {}").expect("write");
        assert!(LocalFs.file_exists(dir.path(), "contracts.yaml"));
        assert!(!LocalFs.file_exists(dir.path(), "other.yaml"));
        let text = LocalFs.read_text(dir.path(), "contracts.yaml").expect("read");
        assert_eq!(text, "contracts: {}");
    }

    #[test]
    fn unit_name_is_basename() {
        assert_eq!(unit_name(Path::new("/x/components/Avatar")), "Avatar");
    }
}

#![deny(unused)]
//! Durable persistence for scaffold packages.
//!
//! A package directory contains exactly two artifacts at fixed names,
//! the code text and a structured metadata document, so a sandbox can
//! locate them without additional configuration. Writes go through a
//! staging directory that is renamed into place: a reader never observes
//! code without metadata or vice versa, and a failed `save` leaves no
//! readable package at the target name.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use scaffold_core::{Error, Result, ScaffoldPackage};

/// File name of the code artifact inside a package directory.
pub const CODE_FILE: &str = "scaffold.py";

/// File name of the metadata artifact inside a package directory.
pub const METADATA_FILE: &str = "metadata.json";

/// Persistent storage for scaffold packages under a root directory.
///
/// Package names are flat identifiers (one directory per package, no
/// separators).
pub struct FilePackageStore {
    root: PathBuf,
}

impl FilePackageStore {
    /// Create a store rooted at `root`. The directory is created lazily
    /// on the first `save`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory a package is (or would be) staged at.
    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Persist a package, replacing any previous package of that name.
    ///
    /// Both artifacts are written into a staging directory which is then
    /// renamed into place. A caller seeing `Err` must treat the entire
    /// package as invalid and retry from scratch.
    pub fn save(&self, name: &str, package: &ScaffoldPackage) -> Result<()> {
        fs::create_dir_all(&self.root).map_err(|e| {
            Error::packaging(format!(
                "Failed to create store root {}: {}",
                self.root.display(),
                e
            ))
        })?;

        let staging = self
            .root
            .join(format!(".{}.staging-{}", name, uuid::Uuid::new_v4()));
        let target = self.path(name);

        let staged = write_artifacts(&staging, package).and_then(|()| {
            if target.exists() {
                fs::remove_dir_all(&target).map_err(|e| {
                    Error::packaging(format!(
                        "Failed to replace package at {}: {}",
                        target.display(),
                        e
                    ))
                })?;
            }
            fs::rename(&staging, &target).map_err(|e| {
                Error::packaging(format!(
                    "Failed to move staged package into {}: {}",
                    target.display(),
                    e
                ))
            })
        });

        if staged.is_err() {
            let _ = fs::remove_dir_all(&staging);
            return staged;
        }

        tracing::debug!(package = %name, path = %target.display(), "Scaffold package staged");
        Ok(())
    }

    /// Read a package back by name.
    pub fn load(&self, name: &str) -> Result<ScaffoldPackage> {
        read_package(&self.path(name))
    }
}

fn write_artifacts(dir: &Path, package: &ScaffoldPackage) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| {
        Error::packaging(format!(
            "Failed to create staging directory {}: {}",
            dir.display(),
            e
        ))
    })?;
    fs::write(dir.join(CODE_FILE), &package.code)
        .map_err(|e| Error::packaging(format!("Failed to write code artifact: {}", e)))?;
    let metadata = serde_json::to_string_pretty(&package.metadata)?;
    fs::write(dir.join(METADATA_FILE), metadata)
        .map_err(|e| Error::packaging(format!("Failed to write metadata artifact: {}", e)))?;
    Ok(())
}

/// Read a staged package from a directory.
///
/// Fails if either artifact is missing: a half-written package must never
/// be executed.
pub fn read_package(dir: &Path) -> Result<ScaffoldPackage> {
    let code = fs::read_to_string(dir.join(CODE_FILE)).map_err(|e| {
        Error::packaging(format!(
            "Failed to read code artifact in {}: {}",
            dir.display(),
            e
        ))
    })?;
    let raw = fs::read_to_string(dir.join(METADATA_FILE)).map_err(|e| {
        Error::packaging(format!(
            "Failed to read metadata artifact in {}: {}",
            dir.display(),
            e
        ))
    })?;
    let metadata: HashMap<String, serde_json::Value> = serde_json::from_str(&raw)?;
    Ok(ScaffoldPackage { code, metadata })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_package() -> ScaffoldPackage {
        ScaffoldPackage::new("def process_input(x):\n    return x.upper()\n")
            .with_metadata("executor_model_spec", json!("anthropic/claude-3-5-haiku-latest"))
            .with_metadata("generation", json!(13))
    }

    #[test]
    fn save_then_load_roundtrips_byte_identical() {
        let root = tempfile::tempdir().unwrap();
        let store = FilePackageStore::new(root.path().join("scaffolds"));
        let package = sample_package();

        store.save("13-2", &package).unwrap();
        let loaded = store.load("13-2").unwrap();

        assert_eq!(loaded, package);
        // Code artifact is stored verbatim.
        let raw = fs::read_to_string(store.path("13-2").join(CODE_FILE)).unwrap();
        assert_eq!(raw, package.code);
    }

    #[test]
    fn save_creates_missing_parents() {
        let root = tempfile::tempdir().unwrap();
        let store = FilePackageStore::new(root.path().join("a").join("b"));
        store.save("s", &sample_package()).unwrap();
        assert!(store.path("s").join(METADATA_FILE).exists());
    }

    #[test]
    fn save_replaces_previous_package() {
        let root = tempfile::tempdir().unwrap();
        let store = FilePackageStore::new(root.path());

        store.save("s", &sample_package()).unwrap();
        let updated = ScaffoldPackage::new("def process_input(x):\n    return x\n");
        store.save("s", &updated).unwrap();

        assert_eq!(store.load("s").unwrap(), updated);
    }

    #[test]
    fn save_leaves_no_staging_residue() {
        let root = tempfile::tempdir().unwrap();
        let store = FilePackageStore::new(root.path());
        store.save("s", &sample_package()).unwrap();

        let entries: Vec<_> = fs::read_dir(root.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(entries, vec!["s".to_string()]);
    }

    #[test]
    fn load_missing_package_fails() {
        let root = tempfile::tempdir().unwrap();
        let store = FilePackageStore::new(root.path());
        assert!(store.load("absent").is_err());
    }

    #[test]
    fn partial_package_is_rejected() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("partial");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(CODE_FILE), "code without metadata").unwrap();

        assert!(read_package(&dir).is_err());
    }
}

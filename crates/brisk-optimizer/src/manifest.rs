//! Dependency manifest and entry resolution from `package.json` files.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;

use crate::{OptimizeError, Result};

const PACKAGE_JSON: &str = "package.json";
const DEFAULT_ENTRY: &str = "index.js";

/// The fields of a `package.json` the pre-bundler reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageDescriptor {
    /// ES module entry point
    pub module: Option<String>,
    /// CommonJS entry point
    pub main: Option<String>,
    /// Runtime dependencies, in declaration order
    #[serde(default)]
    pub dependencies: IndexMap<String, String>,
}

impl PackageDescriptor {
    /// Read and parse a `package.json`.
    pub async fn from_path(path: &Path) -> Result<Self> {
        let content =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|source| OptimizeError::ManifestRead {
                    path: path.to_path_buf(),
                    source,
                })?;

        serde_json::from_str(&content).map_err(|source| OptimizeError::ManifestFormat {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Entry file relative to the package directory: `module`, then `main`,
    /// then `index.js`.
    pub fn entry(&self) -> &str {
        self.module
            .as_deref()
            .or(self.main.as_deref())
            .filter(|entry| !entry.is_empty())
            .unwrap_or(DEFAULT_ENTRY)
    }
}

/// Dependency names mapped to the absolute path of their entry module.
#[derive(Debug, Clone, Default)]
pub struct DependencyManifest {
    entries: IndexMap<String, PathBuf>,
}

impl DependencyManifest {
    /// Read `<root>/package.json` and resolve the entry of every dependency.
    pub async fn load(root: &Path) -> Result<Self> {
        let descriptor = PackageDescriptor::from_path(&root.join(PACKAGE_JSON)).await?;

        let mut entries = IndexMap::with_capacity(descriptor.dependencies.len());
        for name in descriptor.dependencies.keys() {
            let entry = resolve_entry(root, name).await?;
            tracing::debug!(dependency = %name, entry = %entry.display(), "resolved dependency entry");
            entries.insert(name.clone(), entry);
        }

        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(name, entry)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_path()))
    }
}

impl FromIterator<(String, PathBuf)> for DependencyManifest {
    fn from_iter<I: IntoIterator<Item = (String, PathBuf)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Resolve the entry module of dependency `name` installed under `root`.
///
/// A dependency without a `package.json` resolves to its `index.js`.
pub async fn resolve_entry(root: &Path, name: &str) -> Result<PathBuf> {
    let package_dir = root.join("node_modules").join(name);
    let descriptor_path = package_dir.join(PACKAGE_JSON);

    if tokio::fs::metadata(&descriptor_path).await.is_err() {
        return Ok(package_dir.join(DEFAULT_ENTRY));
    }

    let descriptor = PackageDescriptor::from_path(&descriptor_path).await?;
    Ok(package_dir.join(descriptor.entry()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn test_entry_field_precedence() {
        let both = PackageDescriptor {
            module: Some("dist/index.mjs".into()),
            main: Some("dist/index.cjs".into()),
            ..Default::default()
        };
        assert_eq!(both.entry(), "dist/index.mjs");

        let main_only = PackageDescriptor {
            main: Some("lib/main.js".into()),
            ..Default::default()
        };
        assert_eq!(main_only.entry(), "lib/main.js");

        assert_eq!(PackageDescriptor::default().entry(), "index.js");
    }

    #[tokio::test]
    async fn test_resolve_entry_without_descriptor() {
        let temp = TempDir::new().unwrap();
        let entry = resolve_entry(temp.path(), "bare").await.unwrap();
        assert_eq!(entry, temp.path().join("node_modules/bare/index.js"));
    }

    #[tokio::test]
    async fn test_resolve_scoped_package() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            "node_modules/@scope/pkg/package.json",
            r#"{ "name": "@scope/pkg", "module": "esm/index.js" }"#,
        );

        let entry = resolve_entry(temp.path(), "@scope/pkg").await.unwrap();
        assert_eq!(entry, temp.path().join("node_modules/@scope/pkg/esm/index.js"));
    }

    #[tokio::test]
    async fn test_manifest_keeps_declaration_order() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            "package.json",
            r#"{ "dependencies": { "zeta": "1.0.0", "alpha": "1.0.0", "mid": "1.0.0" } }"#,
        );
        write(
            temp.path(),
            "node_modules/alpha/package.json",
            r#"{ "main": "alpha.js" }"#,
        );

        let manifest = DependencyManifest::load(temp.path()).await.unwrap();
        let names: Vec<_> = manifest.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
        let alpha = manifest.iter().find(|(name, _)| *name == "alpha").map(|(_, entry)| entry);
        assert_eq!(alpha, Some(temp.path().join("node_modules/alpha/alpha.js").as_path()));
    }

    #[tokio::test]
    async fn test_manifest_without_dependencies() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "package.json", r#"{ "name": "app" }"#);

        let manifest = DependencyManifest::load(temp.path()).await.unwrap();
        assert!(manifest.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_descriptor() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "package.json", "{ dependencies: ");

        let err = DependencyManifest::load(temp.path()).await.unwrap_err();
        assert!(matches!(err, OptimizeError::ManifestFormat { .. }));
    }
}

//! The persisted dependency name → module URL mapping.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Result, RewriteError};

/// File name of the serialized table inside the pre-bundle cache directory.
pub const METADATA_FILE: &str = "_metadata.json";

/// Mapping from dependency name to the URL path of its pre-bundled module.
///
/// Serialized as a flat JSON object:
///
/// ```json
/// { "vue": "/node_modules/.brisk/vue.js" }
/// ```
///
/// The table is written once by the pre-bundler and only read afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpecifierTable {
    entries: BTreeMap<String, String>,
}

impl SpecifierTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `specifier` to `url`, replacing any previous mapping.
    pub fn insert(&mut self, specifier: impl Into<String>, url: impl Into<String>) {
        self.entries.insert(specifier.into(), url.into());
    }

    /// Look up the URL for a specifier.
    pub fn get(&self, specifier: &str) -> Option<&str> {
        self.entries.get(specifier).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize as human-readable JSON.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Read a table previously written with [`SpecifierTable::to_json_pretty`].
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| RewriteError::TableRead {
                path: path.to_path_buf(),
                source,
            })?;

        serde_json::from_str(&content).map_err(|source| RewriteError::TableFormat {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl<K, V> FromIterator<(K, V)> for SpecifierTable
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_shape_is_flat_object() {
        let table: SpecifierTable = [("vue", "/node_modules/.brisk/vue.js")]
            .into_iter()
            .collect();

        let json = table.to_json_pretty().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["vue"], "/node_modules/.brisk/vue.js");
        assert!(json.contains('\n'), "expected pretty-printed output");
    }

    #[tokio::test]
    async fn test_load_round_trip() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(METADATA_FILE);

        let mut table = SpecifierTable::new();
        table.insert("lodash-es", "/node_modules/.brisk/lodash-es.js");
        std::fs::write(&path, table.to_json_pretty().unwrap()).unwrap();

        let loaded = SpecifierTable::load(&path).await.unwrap();
        assert_eq!(loaded, table);
        assert_eq!(
            loaded.get("lodash-es"),
            Some("/node_modules/.brisk/lodash-es.js")
        );
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = SpecifierTable::load(&dir.path().join(METADATA_FILE))
            .await
            .unwrap_err();
        assert!(matches!(err, RewriteError::TableRead { .. }));
    }

    #[tokio::test]
    async fn test_load_invalid_json() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(METADATA_FILE);
        std::fs::write(&path, "{ not json").unwrap();

        let err = SpecifierTable::load(&path).await.unwrap_err();
        assert!(matches!(err, RewriteError::TableFormat { .. }));
    }
}

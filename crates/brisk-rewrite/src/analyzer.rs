use std::path::PathBuf;

use tokio::sync::OnceCell;

use crate::scan::{ImportRecord, scan_imports};
use crate::splice::{Edit, splice};
use crate::table::SpecifierTable;
use crate::Result;

/// Rewrites module specifiers using a lazily loaded [`SpecifierTable`].
///
/// One analyzer is shared by every request of a server instance. The table is
/// read from disk the first time a module with imports is rewritten; callers
/// that race on that first use all wait for the same load.
#[derive(Debug)]
pub struct ImportAnalyzer {
    metadata_path: PathBuf,
    table: OnceCell<SpecifierTable>,
}

impl ImportAnalyzer {
    /// Create an analyzer that loads its table from `metadata_path` on first use.
    pub fn new(metadata_path: impl Into<PathBuf>) -> Self {
        Self {
            metadata_path: metadata_path.into(),
            table: OnceCell::new(),
        }
    }

    /// Create an analyzer around an already-built table.
    pub fn with_table(table: SpecifierTable) -> Self {
        Self {
            metadata_path: PathBuf::new(),
            table: OnceCell::from(table),
        }
    }

    /// Get the specifier table, loading it if this is the first call.
    ///
    /// A failed load leaves the analyzer uninitialized so a later call can
    /// retry once the file exists.
    pub async fn table(&self) -> Result<&SpecifierTable> {
        self.table
            .get_or_try_init(|| async {
                let table = SpecifierTable::load(&self.metadata_path).await?;
                tracing::debug!(
                    path = %self.metadata_path.display(),
                    entries = table.len(),
                    "loaded specifier table"
                );
                Ok(table)
            })
            .await
    }

    /// Replace every mapped specifier in `source` with its URL.
    ///
    /// Specifiers without a mapping are left as they are. Text outside the
    /// specifiers is preserved byte for byte.
    pub async fn rewrite(&self, source: &str) -> Result<String> {
        let records = scan_imports(source)?;
        if records.is_empty() {
            return Ok(source.to_string());
        }

        let table = self.table().await?;
        let edits = records
            .iter()
            .filter_map(|record| map_record(table, record))
            .collect::<Vec<_>>();

        tracing::debug!(
            imports = records.len(),
            rewritten = edits.len(),
            "rewrote module specifiers"
        );
        splice(source, edits)
    }
}

fn map_record<'t>(table: &'t SpecifierTable, record: &ImportRecord) -> Option<Edit<'t>> {
    match table.get(&record.specifier) {
        Some(url) => Some(Edit::new(record.start..record.end, url)),
        None => {
            if record.is_bare() {
                tracing::warn!(
                    specifier = %record.specifier,
                    kind = ?record.kind,
                    "no pre-bundled module for bare import, leaving it unchanged"
                );
            }
            None
        }
    }
}

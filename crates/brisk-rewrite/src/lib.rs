//! # brisk-rewrite
//!
//! Rewrites bare import specifiers into browser-resolvable URLs.
//!
//! Browsers can only load ES modules through URLs, so an import such as
//! `import { ref } from "vue"` has to be turned into
//! `import { ref } from "/node_modules/.brisk/vue.js"` before the module is
//! served. This crate does that without a full AST round-trip:
//!
//! ```text
//! source → scan_imports() → [ImportRecord] → SpecifierTable lookup → splice() → source'
//! ```
//!
//! Every [`ImportRecord`] carries byte offsets into the exact string it was
//! scanned from, and all replacements are applied in one [`splice`] pass
//! against those original offsets. Nothing outside the specifier text changes.
//!
//! ## Example
//!
//! ```
//! use brisk_rewrite::{ImportAnalyzer, SpecifierTable};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> brisk_rewrite::Result<()> {
//! let mut table = SpecifierTable::new();
//! table.insert("vue", "/node_modules/.brisk/vue.js");
//!
//! let analyzer = ImportAnalyzer::with_table(table);
//! let code = analyzer.rewrite(r#"import { ref } from "vue";"#).await?;
//! assert_eq!(code, r#"import { ref } from "/node_modules/.brisk/vue.js";"#);
//! # Ok(())
//! # }
//! ```

mod analyzer;
mod scan;
mod splice;
mod table;

pub use analyzer::ImportAnalyzer;
pub use scan::{ImportKind, ImportRecord, scan_imports};
pub use splice::{Edit, splice};
pub use table::{METADATA_FILE, SpecifierTable};

use std::path::PathBuf;

/// Error types for import rewriting.
#[derive(Debug, thiserror::Error)]
pub enum RewriteError {
    /// The source could not be parsed as an ES module.
    #[error("Failed to parse module: {0}")]
    Parse(String),

    /// An edit does not fit the source it is applied to.
    #[error("Invalid edit at {start}..{end}: {reason}")]
    InvalidEdit {
        start: usize,
        end: usize,
        reason: &'static str,
    },

    /// The specifier table file could not be read.
    #[error("Failed to read specifier table {}: {source}", .path.display())]
    TableRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The specifier table file is not valid JSON.
    #[error("Invalid specifier table {}: {source}", .path.display())]
    TableFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type alias for rewrite operations.
pub type Result<T> = std::result::Result<T, RewriteError>;

//! # brisk-optimizer
//!
//! Pre-bundles a project's third-party dependencies into browser-loadable ES
//! modules before the dev server starts answering requests.
//!
//! Every name in the `dependencies` table of the project's `package.json` is
//! compiled by one Rolldown build into the cache directory
//! (`node_modules/.brisk` by default), together with a
//! [`SpecifierTable`](brisk_rewrite::SpecifierTable) serialized as
//! `_metadata.json`:
//!
//! ```json
//! {
//!   "vue": "/node_modules/.brisk/vue.js"
//! }
//! ```
//!
//! The cache directory is the only freshness signal. When it exists,
//! [`ensure_bundled`] returns immediately without reading anything.
//!
//! ```no_run
//! use brisk_optimizer::{OptimizerOptions, ensure_bundled};
//!
//! # async fn run() -> brisk_optimizer::Result<()> {
//! let outcome = ensure_bundled(&OptimizerOptions::new(".")).await?;
//! if outcome.skipped {
//!     println!("dependencies already bundled");
//! }
//! # Ok(())
//! # }
//! ```

mod bundle;
mod manifest;
mod optimize;
mod writer;

pub use manifest::{DependencyManifest, PackageDescriptor, resolve_entry};
pub use optimize::{DEFAULT_CACHE_DIR, OptimizeOutcome, OptimizerOptions, ensure_bundled};

use std::path::PathBuf;

/// Error types for dependency pre-bundling.
#[derive(Debug, thiserror::Error)]
pub enum OptimizeError {
    /// A package descriptor could not be read.
    #[error("Failed to read {}: {source}", .path.display())]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A package descriptor is not valid JSON.
    #[error("Invalid package descriptor {}: {source}", .path.display())]
    ManifestFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Bundling or writing the pre-bundle cache failed.
    #[error("Dependency pre-bundling failed: {message}")]
    Build { message: String },
}

impl OptimizeError {
    pub(crate) fn build(message: impl Into<String>) -> Self {
        Self::Build {
            message: message.into(),
        }
    }
}

/// Result type alias for pre-bundling operations.
pub type Result<T> = std::result::Result<T, OptimizeError>;

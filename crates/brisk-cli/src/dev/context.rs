//! Per-server state shared by every request.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use brisk_rewrite::ImportAnalyzer;

use crate::config::BriskConfig;

/// Shared handle to the dev context.
pub type SharedContext = Arc<DevContext>;

/// Project root, HTML entry and the import analyzer of one server.
///
/// Built once at startup, after pre-bundling, and read concurrently by all
/// requests.
#[derive(Debug)]
pub struct DevContext {
    root: PathBuf,
    index_html: PathBuf,
    analyzer: ImportAnalyzer,
}

impl DevContext {
    /// Create a context whose analyzer loads the specifier table from the
    /// configured cache directory on first use.
    pub fn from_config(config: &BriskConfig) -> Self {
        let analyzer = ImportAnalyzer::new(config.optimizer_options().metadata_path());
        Self::new(&config.root, config.index_html_path(), analyzer)
    }

    pub fn new(root: impl Into<PathBuf>, index_html: impl Into<PathBuf>, analyzer: ImportAnalyzer) -> Self {
        Self {
            root: root.into(),
            index_html: index_html.into(),
            analyzer,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn index_html(&self) -> &Path {
        &self.index_html
    }

    pub fn analyzer(&self) -> &ImportAnalyzer {
        &self.analyzer
    }

    /// Map a URL path onto a file under the project root.
    ///
    /// The path is percent-decoded first. Returns `None` for undecodable
    /// paths and for any `..` segment, so the result never leaves the root.
    pub fn resolve(&self, url_path: &str) -> Option<PathBuf> {
        let decoded = urlencoding::decode(url_path).ok()?;
        let mut resolved = self.root.clone();

        for component in Path::new(decoded.trim_start_matches('/')).components() {
            match component {
                Component::Normal(segment) => resolved.push(segment),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
            }
        }
        Some(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brisk_rewrite::SpecifierTable;

    fn context() -> DevContext {
        DevContext::new(
            "/project",
            "/project/index.html",
            ImportAnalyzer::with_table(SpecifierTable::new()),
        )
    }

    #[test]
    fn test_resolve_under_root() {
        let ctx = context();
        assert_eq!(ctx.resolve("/src/main.js"), Some(PathBuf::from("/project/src/main.js")));
        assert_eq!(ctx.resolve("/./src/App.vue"), Some(PathBuf::from("/project/src/App.vue")));
    }

    #[test]
    fn test_resolve_percent_decodes() {
        let ctx = context();
        assert_eq!(
            ctx.resolve("/src/My%20Component.vue"),
            Some(PathBuf::from("/project/src/My Component.vue"))
        );
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let ctx = context();
        assert_eq!(ctx.resolve("/../etc/passwd.js"), None);
        assert_eq!(ctx.resolve("/src/../../secret.js"), None);
        assert_eq!(ctx.resolve("/%2e%2e/secret.js"), None);
        assert_eq!(ctx.resolve("//etc/passwd.js"), Some(PathBuf::from("/project/etc/passwd.js")));
    }

    #[test]
    fn test_resolve_rejects_invalid_utf8() {
        assert_eq!(context().resolve("/%ff.js"), None);
    }
}

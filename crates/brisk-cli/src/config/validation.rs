use std::path::{Component, Path};

use crate::config::BriskConfig;
use crate::error::{ConfigError, Result};

impl BriskConfig {
    /// Check the configuration for values the server cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(ConfigError::invalid("port", "0", "Use a port between 1 and 65535").into());
        }

        self.socket_addr()?;

        if !self.root.is_dir() {
            return Err(ConfigError::invalid(
                "root",
                self.root.display().to_string(),
                "The project root must be an existing directory",
            )
            .into());
        }

        if escapes_root(&self.root, &self.cache_dir) {
            return Err(ConfigError::invalid(
                "cacheDir",
                self.cache_dir.display().to_string(),
                "The cache directory must be inside the project root so it can be served",
            )
            .into());
        }

        if self.mode.trim().is_empty() {
            return Err(ConfigError::invalid("mode", "\"\"", "Use a mode such as development").into());
        }

        Ok(())
    }
}

/// Whether `path` (absolute, or relative to `root`) points outside `root`.
fn escapes_root(root: &Path, path: &Path) -> bool {
    if path.is_absolute() {
        return !path.starts_with(root);
    }
    path.components()
        .any(|component| matches!(component, Component::ParentDir | Component::Prefix(_)))
}

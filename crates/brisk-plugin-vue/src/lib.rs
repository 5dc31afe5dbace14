//! # brisk-plugin-vue
//!
//! Compiles Vue single-file components (`.vue`) into ES modules the browser
//! can execute directly.
//!
//! A component is split into its `<script>` and `<template>` blocks. The
//! template is compiled into a `render(_ctx, _cache)` function built from
//! Vue's runtime helpers, attached to the script's default export, and the
//! whole module is passed through the specifier rewriter so that both the
//! script's imports and the `vue` helper import point at pre-bundled modules.
//!
//! ```no_run
//! use brisk_plugin_vue::compile_component;
//! use brisk_rewrite::ImportAnalyzer;
//!
//! # async fn run() -> brisk_plugin_vue::Result<()> {
//! let analyzer = ImportAnalyzer::new("node_modules/.brisk/_metadata.json");
//! let module = compile_component("src/App.vue".as_ref(), &analyzer).await?;
//! println!("{module}");
//! # Ok(())
//! # }
//! ```
//!
//! Only plain `<script>` blocks written in JavaScript are supported.
//! `<script setup>`, TypeScript and `<style>` blocks are not compiled.

mod compiler;
mod descriptor;
mod template;

pub use compiler::{compile_component, compile_component_source};
pub use descriptor::{MAX_FILE_SIZE, SfcBlock, SfcDescriptor};
pub use template::compile_template;

use std::path::PathBuf;

use brisk_rewrite::RewriteError;

/// Error types for component compilation.
#[derive(Debug, thiserror::Error)]
pub enum VueError {
    /// The component file does not exist.
    #[error("Component not found: {}", .path.display())]
    NotFound { path: PathBuf },

    /// The component file exists but could not be read.
    #[error("Failed to read component {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Component exceeds maximum size.
    #[error("Component too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: usize, max: usize },

    /// A required block is missing or unusable.
    #[error("Malformed component: {reason}")]
    MalformedComponent { reason: String },

    /// The template markup or one of its expressions is invalid.
    #[error("Template error at offset {position}: {message}")]
    Template { message: String, position: usize },

    /// Rewriting import specifiers of the compiled module failed.
    #[error(transparent)]
    Rewrite(#[from] RewriteError),
}

impl VueError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedComponent {
            reason: reason.into(),
        }
    }

    pub(crate) fn template(message: impl Into<String>, position: usize) -> Self {
        Self::Template {
            message: message.into(),
            position,
        }
    }
}

/// Result type alias for component compilation.
pub type Result<T> = std::result::Result<T, VueError>;

use std::path::{Component, Path, PathBuf};

use brisk_rewrite::{METADATA_FILE, SpecifierTable};
use regex::Regex;
use rolldown::BundleOutput;
use rolldown_common::Output;

use crate::bundle::bundle_dependencies;
use crate::manifest::DependencyManifest;
use crate::writer;
use crate::{OptimizeError, Result};

/// Default cache directory, relative to the project root.
pub const DEFAULT_CACHE_DIR: &str = "node_modules/.brisk";

/// Options for [`ensure_bundled`].
#[derive(Debug, Clone)]
pub struct OptimizerOptions {
    /// Project root containing `package.json` and `node_modules`.
    pub root: PathBuf,
    /// Cache directory; relative paths are resolved against `root`.
    pub cache_dir: PathBuf,
    /// Value substituted for `process.env.NODE_ENV`.
    pub mode: String,
}

impl OptimizerOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            mode: "development".to_string(),
        }
    }

    pub fn with_cache_dir(mut self, cache_dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = cache_dir.into();
        self
    }

    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = mode.into();
        self
    }

    /// Absolute location of the cache directory.
    pub fn cache_path(&self) -> PathBuf {
        if self.cache_dir.is_absolute() {
            self.cache_dir.clone()
        } else {
            self.root.join(&self.cache_dir)
        }
    }

    /// Location of the serialized specifier table.
    pub fn metadata_path(&self) -> PathBuf {
        self.cache_path().join(METADATA_FILE)
    }

    /// URL path under which files of the cache directory are served.
    fn url_base(&self) -> Result<String> {
        let relative = if self.cache_dir.is_absolute() {
            self.cache_dir.strip_prefix(&self.root).map_err(|_| {
                OptimizeError::build(format!(
                    "cache directory '{}' is outside the project root",
                    self.cache_dir.display()
                ))
            })?
        } else {
            self.cache_dir.as_path()
        };

        let segments = relative
            .components()
            .filter_map(|component| match component {
                Component::Normal(segment) => Some(segment.to_string_lossy().to_string()),
                _ => None,
            })
            .collect::<Vec<_>>();
        Ok(format!("/{}", segments.join("/")))
    }
}

/// Result of [`ensure_bundled`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptimizeOutcome {
    /// `true` when the cache directory already existed and nothing was built.
    pub skipped: bool,
}

/// Populate the pre-bundle cache unless it already exists.
///
/// # Errors
///
/// Fails when the project manifest cannot be read or the build or any write
/// fails. On failure the cache directory is left absent.
pub async fn ensure_bundled(options: &OptimizerOptions) -> Result<OptimizeOutcome> {
    let cache_dir = options.cache_path();
    if tokio::fs::metadata(&cache_dir).await.is_ok() {
        tracing::info!(cache = %cache_dir.display(), "pre-bundle cache found, skipping");
        return Ok(OptimizeOutcome { skipped: true });
    }

    let url_base = options.url_base()?;
    let manifest = DependencyManifest::load(&options.root).await?;
    tracing::info!(dependencies = manifest.len(), "pre-bundling dependencies");

    let staging = writer::staging_dir(&cache_dir);
    writer::discard(&staging).await;

    match populate(options, &manifest, &url_base, &staging).await {
        Ok(table) => {
            writer::commit(&staging, &cache_dir).await.inspect_err(|_| {
                tracing::error!(cache = %cache_dir.display(), "failed to move pre-bundle cache into place");
            })?;
            tracing::info!(
                dependencies = table.len(),
                cache = %cache_dir.display(),
                "pre-bundling finished"
            );
            Ok(OptimizeOutcome { skipped: false })
        }
        Err(e) => {
            writer::discard(&staging).await;
            Err(e)
        }
    }
}

async fn populate(
    options: &OptimizerOptions,
    manifest: &DependencyManifest,
    url_base: &str,
    staging: &Path,
) -> Result<SpecifierTable> {
    tokio::fs::create_dir_all(staging)
        .await
        .map_err(|e| OptimizeError::build(format!("failed to create '{}': {e}", staging.display())))?;

    let table = if manifest.is_empty() {
        SpecifierTable::new()
    } else {
        let output = bundle_dependencies(&options.root, manifest, &options.mode).await?;
        writer::write_outputs(&output, staging).await?;
        build_table(manifest, &output, url_base)?
    };

    let json = table
        .to_json_pretty()
        .map_err(|e| OptimizeError::build(format!("failed to serialize specifier table: {e}")))?;
    writer::write_file(staging, METADATA_FILE, &json).await?;

    Ok(table)
}

/// Map every dependency to the URL of its compiled module.
fn build_table(
    manifest: &DependencyManifest,
    output: &BundleOutput,
    url_base: &str,
) -> Result<SpecifierTable> {
    let names = manifest.iter().map(|(name, _)| name).collect::<Vec<_>>();
    let mut table = SpecifierTable::new();
    for &name in &names {
        let filename = find_output(name, &names, &output.assets).ok_or_else(|| {
            OptimizeError::build(format!("no compiled module was produced for '{name}'"))
        })?;
        table.insert(name, format!("{url_base}/{filename}"));
    }
    Ok(table)
}

/// The entry chunk named after `dependency`, else the first JavaScript output
/// whose file name starts with it.
///
/// A file that also matches a longer dependency name, such as `vue-router.js`
/// for `vue`, belongs to that dependency and is skipped.
fn find_output<'a>(dependency: &str, dependencies: &[&str], assets: &'a [Output]) -> Option<&'a str> {
    let entry = assets.iter().find_map(|item| match item {
        Output::Chunk(chunk) if chunk.is_entry && chunk.name.as_str() == dependency => {
            Some(chunk.filename.as_str())
        }
        _ => None,
    });
    if entry.is_some() {
        return entry;
    }

    match_filename(dependency, dependencies, assets.iter().map(Output::filename))
}

fn match_filename<'a>(
    dependency: &str,
    dependencies: &[&str],
    mut filenames: impl Iterator<Item = &'a str>,
) -> Option<&'a str> {
    let pattern = output_pattern(dependency)?;
    let longer = dependencies
        .iter()
        .filter(|other| other.len() > dependency.len() && other.starts_with(dependency))
        .filter_map(|other| output_pattern(other))
        .collect::<Vec<_>>();

    filenames.find(|filename| {
        pattern.is_match(filename) && !longer.iter().any(|other| other.is_match(filename))
    })
}

fn output_pattern(dependency: &str) -> Option<Regex> {
    Regex::new(&format!(r"(^|/){}[^/]*\.m?js$", regex::escape(dependency))).ok()
}

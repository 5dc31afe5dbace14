//! Writing bundle output into the cache directory.
//!
//! Everything is written into a staging directory first and renamed onto the
//! cache path once complete, so the cache directory never exists half-written.
//! Output filenames are cleaned and must stay inside the staging directory.

use std::path::{Path, PathBuf};

use path_clean::PathClean;
use rolldown::BundleOutput;

use crate::{OptimizeError, Result};

/// Sibling of `cache_dir` used while the cache is being written.
pub(crate) fn staging_dir(cache_dir: &Path) -> PathBuf {
    let name = cache_dir
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "cache".to_string());
    cache_dir.with_file_name(format!("{name}.staging"))
}

/// Write every chunk and asset of `output` under `dir`.
pub(crate) async fn write_outputs(output: &BundleOutput, dir: &Path) -> Result<()> {
    for item in &output.assets {
        let target = validate_output_path(dir, item.filename())?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| write_failure(parent, &e))?;
        }
        tokio::fs::write(&target, item.content_as_bytes())
            .await
            .map_err(|e| write_failure(&target, &e))?;
    }
    Ok(())
}

/// Write one extra file (the specifier table) under `dir`.
pub(crate) async fn write_file(dir: &Path, filename: &str, content: &str) -> Result<()> {
    let target = validate_output_path(dir, filename)?;
    tokio::fs::write(&target, content)
        .await
        .map_err(|e| write_failure(&target, &e))
}

/// Move the finished staging directory onto the cache path.
pub(crate) async fn commit(staging: &Path, cache_dir: &Path) -> Result<()> {
    if let Some(parent) = cache_dir.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| write_failure(parent, &e))?;
    }
    tokio::fs::rename(staging, cache_dir)
        .await
        .map_err(|e| write_failure(cache_dir, &e))
}

/// Remove a staging directory, ignoring a missing one.
pub(crate) async fn discard(staging: &Path) {
    match tokio::fs::remove_dir_all(staging).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            tracing::warn!(path = %staging.display(), error = %e, "failed to remove staging directory");
        }
    }
}

fn validate_output_path(base_dir: &Path, filename: &str) -> Result<PathBuf> {
    if filename.contains('\0') {
        return Err(OptimizeError::build("output filename contains a null byte"));
    }

    let full_path = base_dir.join(Path::new(filename).clean()).clean();
    if !full_path.starts_with(base_dir.clean()) {
        return Err(OptimizeError::build(format!(
            "output '{}' escapes the cache directory '{}'",
            filename,
            base_dir.display()
        )));
    }
    Ok(full_path)
}

fn write_failure(path: &Path, error: &std::io::Error) -> OptimizeError {
    OptimizeError::build(format!("failed to write '{}': {}", path.display(), error))
}

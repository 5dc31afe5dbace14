//! Request transform dispatcher.

use std::path::{Path, PathBuf};

use axum::http::StatusCode;
use brisk_plugin_vue::{VueError, compile_component};
use brisk_rewrite::RewriteError;

use crate::dev::DevContext;

pub const JAVASCRIPT: &str = "application/javascript";
pub const JSON: &str = "application/json";
pub const HTML: &str = "text/html; charset=utf-8";

/// A response body produced by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transformed {
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl Transformed {
    fn new(content_type: &'static str, body: impl Into<Vec<u8>>) -> Self {
        Self {
            content_type,
            body: body.into(),
        }
    }
}

/// Failure to transform one request.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    /// The file does not exist or the path is not allowed.
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Rewrite(#[from] RewriteError),

    #[error(transparent)]
    Vue(VueError),
}

impl From<VueError> for TransformError {
    fn from(err: VueError) -> Self {
        match err {
            VueError::NotFound { path } => Self::NotFound(path),
            other => Self::Vue(other),
        }
    }
}

impl TransformError {
    /// Not-found errors fall through to the next handler.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RequestKind {
    Index,
    SourceMap,
    Module,
    Component,
}

fn classify(path: &str) -> Option<RequestKind> {
    if path == "/" {
        Some(RequestKind::Index)
    } else if path.ends_with(".map") {
        Some(RequestKind::SourceMap)
    } else if path.ends_with(".js") {
        Some(RequestKind::Module)
    } else if path.contains(".vue") {
        Some(RequestKind::Component)
    } else {
        None
    }
}

/// Transform the file behind `uri_path`.
///
/// Returns `Ok(None)` for paths this dispatcher does not handle. A query
/// string, if present, is ignored.
///
/// # Errors
///
/// [`TransformError::NotFound`] when the file is missing or the path tries to
/// leave the project root; any other variant when reading, rewriting or
/// compiling fails.
pub async fn transform_request(
    ctx: &DevContext,
    uri_path: &str,
) -> Result<Option<Transformed>, TransformError> {
    let path = uri_path.split_once('?').map_or(uri_path, |(path, _)| path);
    let Some(kind) = classify(path) else {
        return Ok(None);
    };

    let transformed = match kind {
        RequestKind::Index => {
            let html = read(ctx.index_html()).await?;
            Transformed::new(HTML, html)
        }
        RequestKind::SourceMap => {
            let file = resolve(ctx, path)?;
            Transformed::new(JSON, read(&file).await?)
        }
        RequestKind::Module => {
            let file = resolve(ctx, path)?;
            let source = read_to_string(&file).await?;
            let code = ctx.analyzer().rewrite(&source).await?;
            Transformed::new(JAVASCRIPT, code)
        }
        RequestKind::Component => {
            let file = resolve(ctx, path)?;
            let code = compile_component(&file, ctx.analyzer()).await?;
            Transformed::new(JAVASCRIPT, code)
        }
    };

    Ok(Some(transformed))
}

fn resolve(ctx: &DevContext, path: &str) -> Result<PathBuf, TransformError> {
    ctx.resolve(path)
        .ok_or_else(|| TransformError::NotFound(PathBuf::from(path)))
}

async fn read(path: &Path) -> Result<Vec<u8>, TransformError> {
    tokio::fs::read(path).await.map_err(|e| io_error(path, e))
}

async fn read_to_string(path: &Path) -> Result<String, TransformError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| io_error(path, e))
}

fn io_error(path: &Path, source: std::io::Error) -> TransformError {
    // A directory named like a module is treated as missing
    if matches!(
        source.kind(),
        std::io::ErrorKind::NotFound | std::io::ErrorKind::IsADirectory
    ) {
        TransformError::NotFound(path.to_path_buf())
    } else {
        TransformError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

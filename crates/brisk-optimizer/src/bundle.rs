//! Rolldown invocation for the dependency build.

use std::path::Path;

use rolldown::{
    BundleOutput, BundlerBuilder, BundlerOptions, InputItem, OutputFormat, Platform,
    ResolveOptions, SourceMapType,
};
use rolldown_common::TreeshakeOptions;

use crate::manifest::DependencyManifest;
use crate::{OptimizeError, Result};

/// Compile every manifest entry in one multi-entry ESM build.
///
/// Each input is named after its dependency so entry chunks come out as
/// `<dependency>.js`; code shared between dependencies lands in common chunks.
pub(crate) async fn bundle_dependencies(
    root: &Path,
    manifest: &DependencyManifest,
    mode: &str,
) -> Result<BundleOutput> {
    let options = configure_options(root, manifest, mode);

    let mut bundler = BundlerBuilder::default()
        .with_options(options)
        .build()
        .map_err(|e| OptimizeError::build(format!("failed to create bundler: {e:?}")))?;

    let output = bundler
        .generate()
        .await
        .map_err(|e| OptimizeError::build(format!("{e:?}")))?;

    bundler
        .close()
        .await
        .map_err(|e| OptimizeError::build(format!("failed to close bundler: {e:?}")))?;

    Ok(output)
}

fn configure_options(root: &Path, manifest: &DependencyManifest, mode: &str) -> BundlerOptions {
    let input = manifest
        .iter()
        .map(|(name, entry)| InputItem {
            name: Some(name.to_string()),
            import: entry.to_string_lossy().to_string(),
        })
        .collect();

    BundlerOptions {
        input: Some(input),
        cwd: Some(root.to_path_buf()),
        format: Some(OutputFormat::Esm),
        platform: Some(Platform::Browser),
        sourcemap: Some(SourceMapType::File),
        // Keep side effects of every dependency module, annotated or not
        treeshake: TreeshakeOptions::Boolean(false),
        define: Some(
            [(
                "process.env.NODE_ENV".to_string(),
                format!("\"{mode}\""),
            )]
            .into_iter()
            .collect(),
        ),
        resolve: Some(configure_resolution(root)),
        ..Default::default()
    }
}

/// Browser-first resolution through every `node_modules` above `root`.
fn configure_resolution(root: &Path) -> ResolveOptions {
    let modules = root
        .ancestors()
        .map(|dir| dir.join("node_modules").to_string_lossy().to_string())
        .collect();

    ResolveOptions {
        main_fields: Some(vec![
            "browser".to_string(),
            "module".to_string(),
            "main".to_string(),
        ]),
        condition_names: Some(vec![
            "browser".to_string(),
            "import".to_string(),
            "module".to_string(),
            "default".to_string(),
        ]),
        extensions: Some(vec![
            ".mjs".to_string(),
            ".js".to_string(),
            ".json".to_string(),
        ]),
        modules: Some(modules),
        symlinks: Some(true),
        ..Default::default()
    }
}

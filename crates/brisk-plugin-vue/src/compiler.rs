use std::path::Path;

use brisk_rewrite::{Edit, ImportAnalyzer, splice};
use oxc_allocator::Allocator;
use oxc_ast::ast::Statement;
use oxc_parser::Parser;
use oxc_span::{GetSpan, SourceType};
use tracing::instrument;

use crate::descriptor::{MAX_FILE_SIZE, SfcDescriptor};
use crate::template::compile_template;
use crate::{Result, VueError};

const SCRIPT_BINDING: &str = "const __script = ";
const RENDER_DECLARATION: &str = "export function render(_ctx, _cache)";
const RENDER_ASSIGNMENT: &str = "__script.render=(_ctx, _cache)=>";
const DEFAULT_EXPORT_STATEMENT: &str = "export default __script;";

/// Read and compile the component at `path`.
///
/// # Errors
///
/// [`VueError::NotFound`] when the file does not exist, otherwise any error
/// of [`compile_component_source`].
#[instrument(skip(analyzer), fields(path = %path.display()))]
pub async fn compile_component(path: &Path, analyzer: &ImportAnalyzer) -> Result<String> {
    let metadata = tokio::fs::metadata(path).await.map_err(|source| io_error(path, source))?;
    if metadata.len() > MAX_FILE_SIZE as u64 {
        return Err(VueError::FileTooLarge {
            size: metadata.len() as usize,
            max: MAX_FILE_SIZE,
        });
    }

    let source = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| io_error(path, source))?;
    compile_component_source(&source, analyzer).await
}

/// Compile component source into an ES module whose default export carries
/// both the script's options and a `render` function.
///
/// The script's `export default` becomes a local `__script` binding, the
/// compiled template's render function is assigned onto it, and the module
/// ends by exporting `__script`. Specifiers are rewritten in the script on its
/// own and once more over the assembled module, which also covers the `vue`
/// helper import added by the template.
///
/// # Errors
///
/// [`VueError::MalformedComponent`] when a block is missing or the script has
/// no default export, [`VueError::Template`] for template errors and
/// [`VueError::Rewrite`] when specifier rewriting fails.
pub async fn compile_component_source(source: &str, analyzer: &ImportAnalyzer) -> Result<String> {
    let descriptor = SfcDescriptor::parse(source)?;

    let script = bind_default_export(descriptor.script.content)?;
    let script = analyzer.rewrite(&script).await?;

    let render = compile_template(descriptor.template.content)
        .map_err(|e| relative_to_component(e, descriptor.template.offset))?;
    let render = render.replacen(RENDER_DECLARATION, RENDER_ASSIGNMENT, 1);

    let module = format!("{script}\n{render}\n{DEFAULT_EXPORT_STATEMENT}");
    let module = analyzer.rewrite(&module).await?;

    tracing::debug!(bytes = module.len(), "compiled component");
    Ok(module)
}

/// Turn the script's default export into a `__script` binding.
///
/// Only the `export default` of the actual declaration is replaced, so the
/// same words in comments or strings are left alone.
fn bind_default_export(script: &str) -> Result<String> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, script, SourceType::mjs()).parse();
    if let Some(error) = ret.errors.first() {
        return Err(VueError::malformed(format!("invalid <script>: {error}")));
    }
    if ret.panicked {
        return Err(VueError::malformed("invalid <script>"));
    }

    let keyword = ret.program.body.iter().find_map(|statement| match statement {
        Statement::ExportDefaultDeclaration(export) => {
            Some(export.span.start as usize..export.declaration.span().start as usize)
        }
        _ => None,
    });
    let Some(keyword) = keyword else {
        return Err(VueError::malformed("<script> has no `export default`"));
    };

    Ok(splice(script, [Edit::new(keyword, SCRIPT_BINDING)])?)
}

/// Shift template error positions from the template block to the whole file.
fn relative_to_component(err: VueError, block_offset: usize) -> VueError {
    match err {
        VueError::Template { message, position } => VueError::Template {
            message,
            position: position + block_offset,
        },
        other => other,
    }
}

fn io_error(path: &Path, source: std::io::Error) -> VueError {
    if source.kind() == std::io::ErrorKind::NotFound {
        VueError::NotFound {
            path: path.to_path_buf(),
        }
    } else {
        VueError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

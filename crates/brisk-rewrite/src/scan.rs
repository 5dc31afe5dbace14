//! Import statement scanning.

use oxc_allocator::Allocator;
use oxc_ast::ast::{
    ExportAllDeclaration, ExportNamedDeclaration, Expression, ImportDeclaration, ImportExpression,
    StringLiteral,
};
use oxc_ast_visit::{Visit, walk};
use oxc_parser::{Parser, ParserReturn};
use oxc_span::SourceType;

use crate::{Result, RewriteError};

/// How a module specifier was referenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    /// `import x from "a"` or `import "a"`
    Static,
    /// `export { x } from "a"` or `export * from "a"`
    ReExport,
    /// `import("a")` with a string literal argument
    Dynamic,
}

/// One occurrence of a module specifier in a source string.
///
/// `start..end` is the byte range of the specifier text itself, excluding the
/// surrounding quotes, in the exact string passed to [`scan_imports`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRecord {
    pub specifier: String,
    pub start: usize,
    pub end: usize,
    pub kind: ImportKind,
}

impl ImportRecord {
    /// Whether the specifier is a bare package name rather than a path or URL.
    pub fn is_bare(&self) -> bool {
        is_bare_specifier(&self.specifier)
    }
}

/// Returns `true` for specifiers a browser cannot resolve on its own.
pub(crate) fn is_bare_specifier(specifier: &str) -> bool {
    !(specifier.starts_with('.')
        || specifier.starts_with('/')
        || specifier.contains("://")
        || specifier.starts_with("data:"))
}

/// Parse `source` as an ES module and collect every module specifier.
///
/// Records are returned in source order and never overlap.
///
/// # Errors
///
/// Returns [`RewriteError::Parse`] when the source has a syntax error. Offsets
/// into a partially parsed module are not trusted for splicing.
pub fn scan_imports(source: &str) -> Result<Vec<ImportRecord>> {
    let allocator = Allocator::default();
    let ParserReturn {
        program,
        errors,
        panicked,
        ..
    } = Parser::new(&allocator, source, SourceType::mjs()).parse();

    if panicked || !errors.is_empty() {
        tracing::debug!(count = errors.len(), panicked, "module failed to parse");
        let message = errors
            .first()
            .map(|e| e.to_string())
            .unwrap_or_else(|| "unrecoverable syntax error".to_string());
        return Err(RewriteError::Parse(message));
    }

    let mut collector = ImportCollector::default();
    collector.visit_program(&program);

    let mut records = collector.records;
    records.sort_by_key(|record| record.start);
    Ok(records)
}

#[derive(Default)]
struct ImportCollector {
    records: Vec<ImportRecord>,
}

impl ImportCollector {
    fn push(&mut self, literal: &StringLiteral<'_>, kind: ImportKind) {
        let span = literal.span;
        // Quotes are part of the literal span; keep them out of the edit range.
        if span.end < span.start + 2 {
            return;
        }

        self.records.push(ImportRecord {
            specifier: literal.value.to_string(),
            start: span.start as usize + 1,
            end: span.end as usize - 1,
            kind,
        });
    }
}

impl<'a> Visit<'a> for ImportCollector {
    fn visit_import_declaration(&mut self, it: &ImportDeclaration<'a>) {
        self.push(&it.source, ImportKind::Static);
    }

    fn visit_export_named_declaration(&mut self, it: &ExportNamedDeclaration<'a>) {
        if let Some(source) = &it.source {
            self.push(source, ImportKind::ReExport);
        }
        walk::walk_export_named_declaration(self, it);
    }

    fn visit_export_all_declaration(&mut self, it: &ExportAllDeclaration<'a>) {
        self.push(&it.source, ImportKind::ReExport);
    }

    fn visit_import_expression(&mut self, it: &ImportExpression<'a>) {
        if let Expression::StringLiteral(literal) = &it.source {
            self.push(literal, ImportKind::Dynamic);
        }
        walk::walk_import_expression(self, it);
    }
}

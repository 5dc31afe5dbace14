//! Template expressions: free identifiers are read from the render context.

use std::collections::HashSet;

use brisk_rewrite::{Edit, splice};
use oxc_allocator::Allocator;
use oxc_ast::ast::{BindingIdentifier, Expression, IdentifierReference, ObjectProperty};
use oxc_ast_visit::{Visit, walk};
use oxc_parser::Parser;
use oxc_span::{GetSpan, SourceType, Span};

use crate::{Result, VueError};

/// Identifiers that always resolve to the browser global.
const GLOBALS: &[&str] = &[
    "Infinity",
    "undefined",
    "NaN",
    "isFinite",
    "isNaN",
    "parseFloat",
    "parseInt",
    "decodeURI",
    "decodeURIComponent",
    "encodeURI",
    "encodeURIComponent",
    "Math",
    "Number",
    "Date",
    "Array",
    "Object",
    "Boolean",
    "String",
    "RegExp",
    "Map",
    "Set",
    "JSON",
    "Intl",
    "BigInt",
    "console",
    "Error",
    "Symbol",
    "$event",
];

const CONTEXT: &str = "_ctx.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExpressionKind {
    /// An identifier or member access such as `save` or `form.submit`.
    Member,
    /// An arrow function or function expression.
    Function,
    Other,
    /// One or more statements, such as `a++; b++`. Only valid as a handler.
    Statements,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Prefixed {
    pub code: String,
    pub kind: ExpressionKind,
}

/// Rewrite `source` so every identifier not in `locals` reads from `_ctx`.
///
/// `position` is where the expression starts in the template and is only used
/// for error reporting.
pub(crate) fn prefix_expression(source: &str, locals: &[String], position: usize) -> Result<Prefixed> {
    let source = source.trim();
    let allocator = Allocator::default();
    let expression = Parser::new(&allocator, source, SourceType::mjs())
        .parse_expression()
        .map_err(|errors| {
            let detail = errors
                .first()
                .map(|e| e.to_string())
                .unwrap_or_else(|| "syntax error".to_string());
            VueError::template(format!("invalid expression `{source}`: {detail}"), position)
        })?;

    let end = expression.span().end as usize;
    if end != source.len() {
        return Err(VueError::template(
            format!("invalid expression `{source}`: unexpected `{}`", source[end..].trim()),
            position,
        ));
    }

    let kind = match &expression {
        Expression::Identifier(_)
        | Expression::StaticMemberExpression(_)
        | Expression::ComputedMemberExpression(_) => ExpressionKind::Member,
        Expression::ArrowFunctionExpression(_) | Expression::FunctionExpression(_) => {
            ExpressionKind::Function
        }
        _ => ExpressionKind::Other,
    };

    let mut collector = ReferenceCollector::default();
    collector.visit_expression(&expression);
    collector.prefix(source, locals, kind)
}

/// Like [`prefix_expression`], but also accepts a statement list such as
/// `a++; b++`, as event handlers do.
///
/// When `source` is neither, the expression error is returned.
pub(crate) fn prefix_handler(source: &str, locals: &[String], position: usize) -> Result<Prefixed> {
    let expression_error = match prefix_expression(source, locals, position) {
        Ok(prefixed) => return Ok(prefixed),
        Err(e) => e,
    };

    let source = source.trim();
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, SourceType::mjs()).parse();
    if ret.panicked || !ret.errors.is_empty() || ret.program.body.is_empty() {
        return Err(expression_error);
    }

    let mut collector = ReferenceCollector::default();
    collector.visit_program(&ret.program);
    collector.prefix(source, locals, ExpressionKind::Statements)
}

/// Names bound by a parameter list such as `item, index` or `{ id, name }`.
pub(crate) fn binding_names(params: &str, position: usize) -> Result<Vec<String>> {
    let wrapped = format!("({params}) => 0");
    let allocator = Allocator::default();
    let expression = Parser::new(&allocator, &wrapped, SourceType::mjs())
        .parse_expression()
        .map_err(|_| VueError::template(format!("invalid parameter list `{params}`"), position))?;

    let mut collector = ReferenceCollector::default();
    collector.visit_expression(&expression);

    let mut names = collector.bindings.into_iter().collect::<Vec<_>>();
    names.sort();
    Ok(names)
}

struct Reference {
    name: String,
    span: Span,
    shorthand: bool,
}

#[derive(Default)]
struct ReferenceCollector {
    references: Vec<Reference>,
    bindings: HashSet<String>,
}

impl ReferenceCollector {
    /// Splice `_ctx.` in front of every free reference collected from `source`.
    fn prefix(&self, source: &str, locals: &[String], kind: ExpressionKind) -> Result<Prefixed> {
        let replacements = self
            .references
            .iter()
            .filter(|r| {
                !self.bindings.contains(&r.name)
                    && !locals.iter().any(|local| *local == r.name)
                    && !GLOBALS.contains(&r.name.as_str())
            })
            .map(|r| {
                let text = if r.shorthand {
                    format!("{}: {CONTEXT}{}", r.name, r.name)
                } else {
                    format!("{CONTEXT}{}", r.name)
                };
                (r.span, text)
            })
            .collect::<Vec<_>>();

        let code = splice(
            source,
            replacements
                .iter()
                .map(|(span, text)| Edit::new(span.start as usize..span.end as usize, text)),
        )?;

        Ok(Prefixed { code, kind })
    }
}

impl<'a> Visit<'a> for ReferenceCollector {
    fn visit_identifier_reference(&mut self, ident: &IdentifierReference<'a>) {
        self.references.push(Reference {
            name: ident.name.to_string(),
            span: ident.span,
            shorthand: false,
        });
    }

    fn visit_binding_identifier(&mut self, ident: &BindingIdentifier<'a>) {
        self.bindings.insert(ident.name.to_string());
    }

    fn visit_object_property(&mut self, prop: &ObjectProperty<'a>) {
        // `{ count }` has to become `{ count: _ctx.count }`
        if prop.shorthand {
            if let Expression::Identifier(ident) = &prop.value {
                self.references.push(Reference {
                    name: ident.name.to_string(),
                    span: prop.span,
                    shorthand: true,
                });
                return;
            }
        }
        walk::walk_object_property(self, prop);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefix(source: &str) -> String {
        prefix_expression(source, &[], 0).unwrap().code
    }

    #[test]
    fn test_free_identifiers_are_prefixed() {
        assert_eq!(prefix("msg"), "_ctx.msg");
        assert_eq!(prefix("a + b.c"), "_ctx.a + _ctx.b.c");
        assert_eq!(prefix("list[index].name"), "_ctx.list[_ctx.index].name");
        assert_eq!(prefix("ok ? 'yes' : no"), "_ctx.ok ? 'yes' : _ctx.no");
    }

    #[test]
    fn test_globals_and_event_are_untouched() {
        assert_eq!(prefix("Math.max(a, 1)"), "Math.max(_ctx.a, 1)");
        assert_eq!(prefix("handle($event)"), "_ctx.handle($event)");
        assert_eq!(prefix("JSON.stringify(x, undefined, 2)"), "JSON.stringify(_ctx.x, undefined, 2)");
    }

    #[test]
    fn test_locals_are_untouched() {
        let locals = vec!["item".to_string(), "i".to_string()];
        let out = prefix_expression("item.name + i + total", &locals, 0).unwrap();
        assert_eq!(out.code, "item.name + i + _ctx.total");
    }

    #[test]
    fn test_arrow_parameters_are_bound() {
        assert_eq!(
            prefix("items.map(x => x * factor)"),
            "_ctx.items.map(x => x * _ctx.factor)"
        );
    }

    #[test]
    fn test_object_literals() {
        assert_eq!(
            prefix("{ active: isActive, count }"),
            "{ active: _ctx.isActive, count: _ctx.count }"
        );
    }

    #[test]
    fn test_assignment_targets() {
        assert_eq!(prefix("count++"), "_ctx.count++");
        assert_eq!(prefix("open = !open"), "_ctx.open = !_ctx.open");
    }

    #[test]
    fn test_expression_kinds() {
        assert_eq!(prefix_expression("save", &[], 0).unwrap().kind, ExpressionKind::Member);
        assert_eq!(prefix_expression("form.save", &[], 0).unwrap().kind, ExpressionKind::Member);
        assert_eq!(
            prefix_expression("() => save(1)", &[], 0).unwrap().kind,
            ExpressionKind::Function
        );
        assert_eq!(prefix_expression("save(1)", &[], 0).unwrap().kind, ExpressionKind::Other);
    }

    #[test]
    fn test_invalid_expression() {
        let err = prefix_expression("a +", &[], 7).unwrap_err();
        assert!(matches!(err, VueError::Template { position: 7, .. }));
    }

    #[test]
    fn test_trailing_text_is_rejected() {
        let err = prefix_expression("a) + (b", &[], 3).unwrap_err();
        assert!(matches!(err, VueError::Template { position: 3, ref message } if message.contains("unexpected")));
        assert!(prefix_expression("a b", &[], 0).is_err());
        assert!(prefix_expression("a; b", &[], 0).is_err());
    }

    #[test]
    fn test_handler_statements() {
        let out = prefix_handler("a++; b++", &[], 0).unwrap();
        assert_eq!(out.kind, ExpressionKind::Statements);
        assert_eq!(out.code, "_ctx.a++; _ctx.b++");

        let out = prefix_handler("const n = count + 1; save(n)", &[], 0).unwrap();
        assert_eq!(out.code, "const n = _ctx.count + 1; _ctx.save(n)");
    }

    #[test]
    fn test_handler_prefers_expressions() {
        let out = prefix_handler("say('a;b')", &[], 0).unwrap();
        assert_eq!(out.kind, ExpressionKind::Other);
        assert_eq!(out.code, "_ctx.say('a;b')");
    }

    #[test]
    fn test_invalid_handler_reports_expression_error() {
        let err = prefix_handler("a +;", &[], 4).unwrap_err();
        assert!(matches!(err, VueError::Template { position: 4, .. }));
    }

    #[test]
    fn test_binding_names() {
        assert_eq!(binding_names("item", 0).unwrap(), vec!["item"]);
        assert_eq!(binding_names("item, index", 0).unwrap(), vec!["index", "item"]);
        assert_eq!(binding_names("{ id, title }, i", 0).unwrap(), vec!["i", "id", "title"]);
    }
}

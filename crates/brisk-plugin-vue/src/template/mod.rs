//! Template compilation: markup in, render-function module out.

mod codegen;
mod expression;
mod parser;

use crate::Result;

/// Compile template markup into an ES module exporting `render(_ctx, _cache)`.
///
/// Runtime helpers are imported from `vue` under `_`-prefixed local names.
/// Free identifiers in expressions are read from `_ctx`.
///
/// # Errors
///
/// [`VueError::Template`](crate::VueError::Template) for malformed markup,
/// invalid expressions or unsupported directives.
pub fn compile_template(source: &str) -> Result<String> {
    let nodes = parser::parse(source)?;
    codegen::Codegen::default().generate(&nodes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_text() {
        let code = compile_template("hello").unwrap();
        assert_eq!(
            code,
            "import { createTextVNode as _createTextVNode } from \"vue\"\n\n\
             export function render(_ctx, _cache) {\n  return _createTextVNode(\"hello\")\n}\n"
        );
    }

    #[test]
    fn test_empty_template_renders_null() {
        let code = compile_template("  \n ").unwrap();
        assert_eq!(code, "export function render(_ctx, _cache) {\n  return null\n}\n");
    }

    #[test]
    fn test_element_with_interpolation() {
        let code = compile_template(r#"<div class="box">Hi {{ name }}!</div>"#).unwrap();
        assert!(code.contains(
            r#"_createVNode("div", { class: "box" }, "Hi " + _toDisplayString(_ctx.name) + "!")"#
        ));
        assert!(code.starts_with(
            "import { createVNode as _createVNode, toDisplayString as _toDisplayString } from \"vue\""
        ));
    }

    #[test]
    fn test_bindings_and_events() {
        let code =
            compile_template(r#"<button :disabled="busy" @click="save" @keyup.enter="count++">go</button>"#)
                .unwrap();
        assert!(code.contains("disabled: _ctx.busy"));
        assert!(code.contains("onClick: _ctx.save"));
        assert!(code.contains(r#"onKeyup: _withKeys($event => (_ctx.count++), ["enter"])"#));
    }

    #[test]
    fn test_class_binding_merges_with_static_class() {
        let code = compile_template(r#"<p class="a" :class="{ on: active }"></p>"#).unwrap();
        assert!(code.contains(r#"class: ["a", { on: _ctx.active }]"#));
    }

    #[test]
    fn test_if_chain() {
        let code = compile_template(
            r#"<div><p v-if="a">A</p>
  <p v-else-if="b">B</p>
  <p v-else>C</p></div>"#,
        )
        .unwrap();
        assert!(code.contains(
            r#"((_ctx.a) ? _createVNode("p", null, "A") : (_ctx.b) ? _createVNode("p", null, "B") : _createVNode("p", null, "C"))"#
        ));
    }

    #[test]
    fn test_if_without_else_renders_comment() {
        let code = compile_template(r#"<span v-if="ok">yes</span>"#).unwrap();
        assert!(code.contains(r#"_createCommentVNode("v-if", true)"#));
    }

    #[test]
    fn test_orphan_else_is_an_error() {
        let err = compile_template(r#"<p v-else>x</p>"#).unwrap_err();
        assert!(matches!(err, crate::VueError::Template { .. }));
    }

    #[test]
    fn test_for_binds_locals() {
        let code =
            compile_template(r#"<ul><li v-for="(item, i) in items" :key="item.id">{{ i }}: {{ item.name }}</li></ul>"#)
                .unwrap();
        assert!(code.contains("_renderList(_ctx.items, (item, i) => _createVNode(\"li\", { key: item.id }"));
        assert!(code.contains("_toDisplayString(i)"));
        assert!(code.contains("_toDisplayString(item.name)"));
    }

    #[test]
    fn test_components_are_resolved_once() {
        let code = compile_template(r#"<div><my-button /><my-button /><Card title="x" /></div>"#).unwrap();
        assert_eq!(code.matches("_resolveComponent(\"my-button\")").count(), 1);
        assert!(code.contains("const _component_Card = _resolveComponent(\"Card\")"));
        assert!(code.contains(r#"_createVNode(_component_Card, { title: "x" })"#));
    }

    #[test]
    fn test_component_default_slot() {
        let code = compile_template(r#"<Card>hello</Card>"#).unwrap();
        assert!(code.contains(r#"{ default: _withCtx(() => [_createTextVNode("hello")]) }"#));
    }

    #[test]
    fn test_named_scoped_slot() {
        let code =
            compile_template(r#"<List><template #item="{ entry }">{{ entry.label }}</template></List>"#)
                .unwrap();
        assert!(code.contains("item: _withCtx(({ entry }) => [_createTextVNode(_toDisplayString(entry.label))])"));
    }

    #[test]
    fn test_v_show() {
        let code = compile_template(r#"<div v-show="visible"></div>"#).unwrap();
        assert!(code.contains(r#"_withDirectives(_createVNode("div"), [[_vShow, _ctx.visible]])"#));
    }

    #[test]
    fn test_multiple_roots_use_fragment() {
        let code = compile_template("<h1>a</h1><h2>b</h2>").unwrap();
        assert!(code.contains("return _createVNode(_Fragment, null, ["));
    }

    #[test]
    fn test_unsupported_directive() {
        let err = compile_template(r#"<input v-model="name">"#).unwrap_err();
        assert!(matches!(err, crate::VueError::Template { message, .. } if message.contains("v-model")));
    }

    #[test]
    fn test_malformed_interpolation_is_an_error() {
        let err = compile_template("<p>{{ a) + (b }}</p>").unwrap_err();
        assert!(matches!(err, crate::VueError::Template { .. }));
    }

    #[test]
    fn test_statement_handler() {
        let code = compile_template(r#"<button @click="a++; b++">go</button>"#).unwrap();
        assert!(code.contains("onClick: $event => { _ctx.a++; _ctx.b++ }"));
    }
}

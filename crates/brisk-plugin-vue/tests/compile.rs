//! Integration tests for component compilation.

use brisk_plugin_vue::{VueError, compile_component, compile_component_source};
use brisk_rewrite::{ImportAnalyzer, SpecifierTable};
use oxc_allocator::Allocator;
use oxc_parser::Parser;
use oxc_span::SourceType;
use tempfile::TempDir;

const COUNTER: &str = r#"<template>
  <div class="counter">
    <h1>{{ title }}</h1>
    <button @click="count++">Clicked {{ count }} times</button>
    <ul>
      <li v-for="item in items" :key="item">{{ item }}</li>
    </ul>
  </div>
</template>

<script>
import { ref } from 'vue'
import { format } from 'date-fns'

export default {
  name: 'Counter',
  data() {
    return { title: 'Counter', count: 0, items: ['a', 'b'] }
  },
}
</script>

<style scoped>
.counter { color: red; }
</style>
"#;

fn analyzer() -> ImportAnalyzer {
    let mut table = SpecifierTable::new();
    table.insert("vue", "/node_modules/.brisk/vue.js");
    table.insert("date-fns", "/node_modules/.brisk/date-fns.js");
    ImportAnalyzer::with_table(table)
}

fn assert_valid_module(code: &str) {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, code, SourceType::mjs()).parse();
    assert!(!ret.panicked, "parser panicked on:\n{code}");
    assert!(ret.errors.is_empty(), "{:?} in:\n{code}", ret.errors);
}

#[tokio::test]
async fn test_minimal_component() {
    let source = "<template>hello</template>\n<script>export default { msg: 'hi' }</script>";
    let module = compile_component_source(source, &analyzer()).await.unwrap();

    assert!(module.starts_with("const __script = { msg: 'hi' }\n"));
    assert!(module.contains("__script.render=(_ctx, _cache)=> {"));
    assert!(module.contains("return _createTextVNode(\"hello\")"));
    assert!(module.trim_end().ends_with("export default __script;"));
    assert_eq!(module.matches("export default").count(), 1);
    assert!(!module.contains("export function render"));
    assert_valid_module(&module);
}

#[tokio::test]
async fn test_imports_are_rewritten() {
    let module = compile_component_source(COUNTER, &analyzer()).await.unwrap();

    assert!(module.contains("import { ref } from '/node_modules/.brisk/vue.js'"));
    assert!(module.contains("import { format } from '/node_modules/.brisk/date-fns.js'"));
    // the runtime helper import added by the template
    assert!(module.contains("} from \"/node_modules/.brisk/vue.js\""));
    assert!(!module.contains("from \"vue\""));
    assert!(!module.contains(".counter"));
    assert_valid_module(&module);
}

#[tokio::test]
async fn test_render_reads_script_data_from_context() {
    let source = r#"<template><p :title="msg">{{ msg.toUpperCase() }}</p></template>
<script>export default { data() { return { msg: 'hi' } } }</script>"#;
    let module = compile_component_source(source, &analyzer()).await.unwrap();

    let render = module
        .split_once("__script.render=(_ctx, _cache)=> {")
        .map(|(_, render)| render)
        .unwrap();
    assert!(render.contains("title: _ctx.msg"));
    assert!(render.contains("_toDisplayString(_ctx.msg.toUpperCase())"));
    assert!(!render.contains("(msg"));
    assert!(render.ends_with("}\n\nexport default __script;"));
    assert_valid_module(&module);
}

#[tokio::test]
async fn test_default_export_text_outside_the_declaration() {
    let source = r#"<template><p>{{ msg }}</p></template>
<script>
// options object: export default { ... }
const note = "export default is replaced once";
export default { msg: 'hi', note }
</script>"#;
    let module = compile_component_source(source, &analyzer()).await.unwrap();

    assert!(module.contains("// options object: export default { ... }"));
    assert!(module.contains(r#"const note = "export default is replaced once";"#));
    assert!(module.contains("const __script = { msg: 'hi', note }"));
    assert!(module.trim_end().ends_with("export default __script;"));
    assert_valid_module(&module);
}

#[tokio::test]
async fn test_statement_handlers_compile() {
    let source = r#"<template><button @click="a++; b++">go</button></template>
<script>export default {}</script>"#;
    let module = compile_component_source(source, &analyzer()).await.unwrap();

    assert!(module.contains("$event => { _ctx.a++; _ctx.b++ }"));
    assert_valid_module(&module);
}

#[tokio::test]
async fn test_malformed_interpolation_fails_the_component() {
    let source = "<template><p>{{ a) + (b }}</p></template><script>export default {}</script>";
    let err = compile_component_source(source, &analyzer()).await.unwrap_err();

    // Positions point into the component file, inside the template block
    let template_end = source.find("</template>").unwrap();
    assert!(
        matches!(err, VueError::Template { position, .. } if position >= "<template>".len() && position < template_end),
        "{err:?}"
    );
}

#[tokio::test]
async fn test_template_expressions_read_from_context() {
    let module = compile_component_source(COUNTER, &analyzer()).await.unwrap();

    assert!(module.contains("_toDisplayString(_ctx.title)"));
    assert!(module.contains("onClick: $event => (_ctx.count++)"));
    assert!(module.contains("_renderList(_ctx.items, (item) =>"));
    assert!(module.contains("{ key: item }"));
}

#[tokio::test]
async fn test_unmapped_imports_pass_through() {
    let source = r#"<template><Child /></template>
<script>
import Child from './Child.vue'
export default { components: { Child } }
</script>"#;
    let module = compile_component_source(source, &analyzer()).await.unwrap();

    assert!(module.contains("import Child from './Child.vue'"));
    assert!(module.contains("_resolveComponent(\"Child\")"));
    assert_valid_module(&module);
}

#[tokio::test]
async fn test_missing_blocks_are_malformed() {
    let analyzer = analyzer();

    let err = compile_component_source("<template><p/></template>", &analyzer)
        .await
        .unwrap_err();
    assert!(matches!(err, VueError::MalformedComponent { .. }));

    let err = compile_component_source("<script>export default {}</script>", &analyzer)
        .await
        .unwrap_err();
    assert!(matches!(err, VueError::MalformedComponent { .. }));
}

#[tokio::test]
async fn test_script_without_default_export() {
    let source = "<template><p/></template><script>export const a = 1</script>";
    let err = compile_component_source(source, &analyzer()).await.unwrap_err();
    assert!(matches!(err, VueError::MalformedComponent { reason } if reason.contains("export default")));
}

#[tokio::test]
async fn test_template_errors_fail_the_component() {
    let source = "<template><div><span></div></template><script>export default {}</script>";
    let err = compile_component_source(source, &analyzer()).await.unwrap_err();
    assert!(matches!(err, VueError::Template { .. }));
}

#[tokio::test]
async fn test_compile_from_disk() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("Counter.vue");
    tokio::fs::write(&path, COUNTER).await.unwrap();

    let module = compile_component(&path, &analyzer()).await.unwrap();
    assert!(module.ends_with("export default __script;"));
}

#[tokio::test]
async fn test_missing_file_is_not_found() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("Missing.vue");

    let err = compile_component(&path, &analyzer()).await.unwrap_err();
    assert!(matches!(err, VueError::NotFound { .. }));
}

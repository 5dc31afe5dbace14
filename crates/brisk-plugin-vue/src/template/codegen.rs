//! Render function generation.
//!
//! Every node becomes a `createVNode` call. No static hoisting, block tree or
//! patch flags are emitted, so the runtime always performs a full diff.

use std::collections::BTreeSet;

use super::expression::{ExpressionKind, binding_names, prefix_expression, prefix_handler};
use super::parser::{Attribute, Directive, Element, Node};
use crate::{Result, VueError};

const KEY_MODIFIERS: &[&str] = &["enter", "tab", "delete", "esc", "space", "up", "down"];
const GUARD_MODIFIERS: &[&str] = &[
    "stop", "prevent", "self", "ctrl", "shift", "alt", "meta", "exact", "middle",
];
const OPTION_MODIFIERS: &[&str] = &["once", "capture", "passive"];

/// Generated code of one child position.
enum Child {
    /// A string expression (static text and interpolations joined with `+`).
    Text(String),
    VNode(String),
}

#[derive(Default)]
pub(crate) struct Codegen {
    helpers: BTreeSet<&'static str>,
    components: Vec<String>,
}

impl Codegen {
    /// Generate the render module for the given top-level nodes.
    pub fn generate(mut self, nodes: &[Node]) -> Result<String> {
        let mut children = self.children(nodes, &[])?;
        let body = if children.len() > 1 {
            let array = self.vnode_array(children);
            format!(
                "{}({}, null, {array})",
                self.helper("createVNode"),
                self.helper("Fragment")
            )
        } else {
            match children.pop() {
                None => "null".to_string(),
                Some(Child::VNode(vnode)) => vnode,
                Some(Child::Text(text)) => format!("{}({text})", self.helper("createTextVNode")),
            }
        };

        let mut module = String::new();
        if !self.components.is_empty() {
            self.helpers.insert("resolveComponent");
        }
        if !self.helpers.is_empty() {
            let imports = self
                .helpers
                .iter()
                .map(|h| format!("{h} as _{h}"))
                .collect::<Vec<_>>()
                .join(", ");
            module.push_str(&format!("import {{ {imports} }} from \"vue\"\n\n"));
        }

        module.push_str("export function render(_ctx, _cache) {\n");
        for tag in &self.components {
            module.push_str(&format!(
                "  const {} = _resolveComponent({})\n",
                component_var(tag),
                js_string(tag)
            ));
        }
        if !self.components.is_empty() {
            module.push('\n');
        }
        module.push_str(&format!("  return {body}\n}}\n"));
        Ok(module)
    }

    fn helper(&mut self, name: &'static str) -> String {
        self.helpers.insert(name);
        format!("_{name}")
    }

    fn children(&mut self, nodes: &[Node], locals: &[String]) -> Result<Vec<Child>> {
        let mut out = Vec::new();
        let mut text = Vec::new();
        let mut i = 0;

        while i < nodes.len() {
            match &nodes[i] {
                Node::Text(content) => text.push(js_string(content)),
                Node::Interpolation {
                    expression,
                    position,
                } => {
                    let prefixed = prefix_expression(expression, locals, *position)?;
                    let display = self.helper("toDisplayString");
                    text.push(format!("{display}({})", prefixed.code));
                }
                Node::Element(element) => {
                    flush_text(&mut text, &mut out);

                    if element.has_directive("if") {
                        let (branches, last) = collect_if_chain(nodes, i);
                        out.push(Child::VNode(self.if_chain(&branches, locals)?));
                        i = last + 1;
                        continue;
                    }
                    if element.has_directive("else-if") || element.has_directive("else") {
                        return Err(VueError::template(
                            "v-else/v-else-if has no adjacent v-if",
                            element.position,
                        ));
                    }
                    out.push(Child::VNode(self.element(element, locals)?));
                }
            }
            i += 1;
        }

        flush_text(&mut text, &mut out);
        Ok(out)
    }

    fn vnode_array(&mut self, children: Vec<Child>) -> String {
        let items = children
            .into_iter()
            .map(|child| match child {
                Child::Text(text) => format!("{}({text})", self.helper("createTextVNode")),
                Child::VNode(vnode) => vnode,
            })
            .collect::<Vec<_>>();
        format!("[{}]", items.join(", "))
    }

    /// Children argument of an element: a string for pure text, else an array.
    fn element_children(&mut self, nodes: &[Node], locals: &[String]) -> Result<Option<String>> {
        let mut children = self.children(nodes, locals)?;
        Ok(match children.len() {
            0 => None,
            1 if matches!(children[0], Child::Text(_)) => match children.pop() {
                Some(Child::Text(text)) => Some(text),
                _ => None,
            },
            _ => Some(self.vnode_array(children)),
        })
    }

    fn if_chain(&mut self, branches: &[&Element], locals: &[String]) -> Result<String> {
        let mut code = String::new();
        let mut has_else = false;

        for branch in branches {
            let vnode = self.element(branch, locals)?;
            match branch.directive("if").or_else(|| branch.directive("else-if")) {
                Some(condition) => {
                    let test = self.directive_expression(condition, locals)?;
                    code.push_str(&format!("({test}) ? {vnode} : "));
                }
                None => {
                    code.push_str(&vnode);
                    has_else = true;
                }
            }
        }

        if !has_else {
            code.push_str(&format!("{}(\"v-if\", true)", self.helper("createCommentVNode")));
        }
        Ok(format!("({code})"))
    }

    /// An element including its `v-for`.
    fn element(&mut self, element: &Element, locals: &[String]) -> Result<String> {
        let Some(for_directive) = element.directive("for") else {
            return self.element_body(element, locals);
        };

        let value = required_value(for_directive, "v-for")?;
        let (params, source) = split_for(value, for_directive.position)?;
        let source = prefix_expression(source, locals, for_directive.position)?.code;

        let mut inner_locals = locals.to_vec();
        inner_locals.extend(binding_names(params, for_directive.position)?);
        let body = self.element_body(element, &inner_locals)?;

        Ok(format!(
            "{}({}, null, {}({source}, ({params}) => {body}))",
            self.helper("createVNode"),
            self.helper("Fragment"),
            self.helper("renderList"),
        ))
    }

    fn element_body(&mut self, element: &Element, locals: &[String]) -> Result<String> {
        let tag = element.tag.as_str();
        let vnode = match tag {
            "template" => {
                let children = self.children(&element.children, locals)?;
                let array = self.vnode_array(children);
                format!(
                    "{}({}, null, {array})",
                    self.helper("createVNode"),
                    self.helper("Fragment")
                )
            }
            "slot" => self.render_slot(element, locals)?,
            "component" => {
                let target = match element.attrs.iter().find_map(|attr| match attr {
                    Attribute::Directive(d) if d.name == "bind" && d.arg.as_deref() == Some("is") => {
                        Some(d)
                    }
                    _ => None,
                }) {
                    Some(is) => self.directive_expression(is, locals)?,
                    None => js_string(element.static_attr("is").ok_or_else(|| {
                        VueError::template("<component> requires an `is` binding", element.position)
                    })?),
                };
                let resolved = format!("{}({target})", self.helper("resolveDynamicComponent"));
                self.component_vnode(element, resolved, locals, &["is"])?
            }
            _ => match builtin_component(tag) {
                Some(builtin) => {
                    let reference = self.helper(builtin);
                    if builtin == "Teleport" {
                        self.element_vnode(element, reference, locals)?
                    } else {
                        self.component_vnode(element, reference, locals, &[])?
                    }
                }
                None if is_component(tag) => {
                    if !self.components.iter().any(|c| c == tag) {
                        self.components.push(tag.to_string());
                    }
                    self.component_vnode(element, component_var(tag), locals, &[])?
                }
                None => self.element_vnode(element, js_string(tag), locals)?,
            },
        };

        match element.directive("show") {
            Some(show) => {
                let condition = self.directive_expression(show, locals)?;
                Ok(format!(
                    "{}({vnode}, [[{}, {condition}]])",
                    self.helper("withDirectives"),
                    self.helper("vShow")
                ))
            }
            None => Ok(vnode),
        }
    }

    fn element_vnode(&mut self, element: &Element, tag: String, locals: &[String]) -> Result<String> {
        let props = self.props(element, locals, &[])?;
        let children = self.element_children(&element.children, locals)?;
        Ok(self.create_vnode(tag, props, children))
    }

    fn component_vnode(
        &mut self,
        element: &Element,
        reference: String,
        locals: &[String],
        skip: &[&str],
    ) -> Result<String> {
        let props = self.props(element, locals, skip)?;
        let slots = self.slots(element, locals)?;
        Ok(self.create_vnode(reference, props, slots))
    }

    fn create_vnode(&mut self, tag: String, props: Option<String>, children: Option<String>) -> String {
        let create = self.helper("createVNode");
        match (props, children) {
            (None, None) => format!("{create}({tag})"),
            (Some(props), None) => format!("{create}({tag}, {props})"),
            (props, Some(children)) => format!(
                "{create}({tag}, {}, {children})",
                props.as_deref().unwrap_or("null")
            ),
        }
    }

    /// `<slot name="x" v-bind:foo="bar">fallback</slot>`
    fn render_slot(&mut self, element: &Element, locals: &[String]) -> Result<String> {
        let name = match element.attrs.iter().find_map(|attr| match attr {
            Attribute::Directive(d) if d.name == "bind" && d.arg.as_deref() == Some("name") => Some(d),
            _ => None,
        }) {
            Some(bound) => self.directive_expression(bound, locals)?,
            None => js_string(element.static_attr("name").unwrap_or("default")),
        };

        let props = self.props(element, locals, &["name"])?;
        let children = self.children(&element.children, locals)?;
        let render = self.helper("renderSlot");

        Ok(if children.is_empty() {
            match props {
                Some(props) => format!("{render}(_ctx.$slots, {name}, {props})"),
                None => format!("{render}(_ctx.$slots, {name})"),
            }
        } else {
            let fallback = self.vnode_array(children);
            format!(
                "{render}(_ctx.$slots, {name}, {}, () => {fallback})",
                props.as_deref().unwrap_or("{}")
            )
        })
    }

    /// Slot object for a component's children.
    fn slots(&mut self, element: &Element, locals: &[String]) -> Result<Option<String>> {
        let mut default_nodes = Vec::new();
        let mut slots = Vec::new();

        for child in &element.children {
            match child {
                Node::Element(template) if template.tag == "template" => {
                    match template.directive("slot") {
                        Some(slot) => {
                            let name = slot_name(slot)?;
                            let body = self.slot_function(slot, &template.children, locals)?;
                            slots.push((name, body));
                        }
                        None => default_nodes.push(child.clone()),
                    }
                }
                _ => default_nodes.push(child.clone()),
            }
        }

        let has_default = default_nodes
            .iter()
            .any(|node| !matches!(node, Node::Text(text) if text.trim().is_empty()));
        if has_default {
            let body = match element.directive("slot") {
                Some(slot) => self.slot_function(slot, &default_nodes, locals)?,
                None => {
                    let children = self.children(&default_nodes, locals)?;
                    let array = self.vnode_array(children);
                    format!("{}(() => {array})", self.helper("withCtx"))
                }
            };
            slots.insert(0, ("default".to_string(), body));
        }

        if slots.is_empty() {
            return Ok(None);
        }
        let entries = slots
            .into_iter()
            .map(|(name, body)| format!("{}: {body}", object_key(&name)))
            .collect::<Vec<_>>();
        Ok(Some(format!("{{ {} }}", entries.join(", "))))
    }

    fn slot_function(&mut self, slot: &Directive, nodes: &[Node], locals: &[String]) -> Result<String> {
        let params = slot.value.as_deref().map(str::trim).unwrap_or("");
        let mut inner_locals = locals.to_vec();
        if !params.is_empty() {
            inner_locals.extend(binding_names(params, slot.position)?);
        }

        let children = self.children(nodes, &inner_locals)?;
        let array = self.vnode_array(children);
        Ok(format!("{}(({params}) => {array})", self.helper("withCtx")))
    }

    fn props(&mut self, element: &Element, locals: &[String], skip: &[&str]) -> Result<Option<String>> {
        let mut segments = Vec::new();
        let mut current = PropObject::default();

        for attr in &element.attrs {
            match attr {
                Attribute::Static { name, value } => {
                    if skip.contains(&name.as_str()) {
                        continue;
                    }
                    current.set(name, js_string(value.as_deref().unwrap_or("")));
                }
                Attribute::Directive(directive) => match directive.name.as_str() {
                    "if" | "else-if" | "else" | "for" | "slot" | "show" | "cloak" => {}
                    "bind" => match directive.arg.as_deref() {
                        None => {
                            let object = self.directive_expression(directive, locals)?;
                            current.flush_into(&mut segments);
                            segments.push(object);
                        }
                        Some(arg) if skip.contains(&arg) => {}
                        Some(arg) if arg.starts_with('[') => {
                            return Err(unsupported(directive, "dynamic v-bind arguments"));
                        }
                        Some(arg) => {
                            let key = if directive.modifiers.iter().any(|m| m == "camel") {
                                camelize(arg)
                            } else {
                                arg.to_string()
                            };
                            let value = match directive.value.as_deref() {
                                Some(value) => prefix_expression(value, locals, directive.position)?.code,
                                // `:id` is short for `:id="id"`
                                None => prefix_expression(&camelize(arg), locals, directive.position)?.code,
                            };
                            current.set(&key, value);
                        }
                    },
                    "on" => match directive.arg.as_deref() {
                        None => {
                            let object = self.directive_expression(directive, locals)?;
                            current.flush_into(&mut segments);
                            segments.push(format!("{}({object})", self.helper("toHandlers")));
                        }
                        Some(arg) if arg.starts_with('[') => {
                            return Err(unsupported(directive, "dynamic v-on arguments"));
                        }
                        Some(arg) => {
                            let key = handler_key(arg, &directive.modifiers);
                            let handler = self.handler(arg, directive, locals)?;
                            current.set(&key, handler);
                        }
                    },
                    "html" => {
                        let value = self.directive_expression(directive, locals)?;
                        current.set("innerHTML", value);
                    }
                    "text" => {
                        let value = self.directive_expression(directive, locals)?;
                        let display = self.helper("toDisplayString");
                        current.set("textContent", format!("{display}({value})"));
                    }
                    other => {
                        return Err(unsupported(directive, &format!("v-{other}")));
                    }
                },
            }
        }

        current.flush_into(&mut segments);
        Ok(match segments.len() {
            0 => None,
            1 => segments.pop(),
            _ => Some(format!("{}({})", self.helper("mergeProps"), segments.join(", "))),
        })
    }

    fn handler(&mut self, event: &str, directive: &Directive, locals: &[String]) -> Result<String> {
        let value = directive.value.as_deref().map(str::trim).unwrap_or("");
        let mut code = if value.is_empty() {
            "() => {}".to_string()
        } else {
            let prefixed = prefix_handler(value, locals, directive.position)?;
            match prefixed.kind {
                ExpressionKind::Member | ExpressionKind::Function => prefixed.code,
                ExpressionKind::Other => format!("$event => ({})", prefixed.code),
                ExpressionKind::Statements => format!("$event => {{ {} }}", prefixed.code),
            }
        };

        let is_key_event = event.starts_with("key");
        let (keys, guards): (Vec<&str>, Vec<&str>) = directive
            .modifiers
            .iter()
            .map(String::as_str)
            .filter(|m| !OPTION_MODIFIERS.contains(m))
            .partition(|m| {
                KEY_MODIFIERS.contains(m)
                    || (is_key_event && matches!(*m, "left" | "right"))
                    || (is_key_event && !GUARD_MODIFIERS.contains(m))
            });

        if !guards.is_empty() {
            code = format!(
                "{}({code}, {})",
                self.helper("withModifiers"),
                string_array(&guards)
            );
        }
        if !keys.is_empty() {
            code = format!("{}({code}, {})", self.helper("withKeys"), string_array(&keys));
        }
        Ok(code)
    }

    fn directive_expression(&mut self, directive: &Directive, locals: &[String]) -> Result<String> {
        let value = required_value(directive, &format!("v-{}", directive.name))?;
        Ok(prefix_expression(value, locals, directive.position)?.code)
    }
}

/// Props of one object literal, in attribute order.
#[derive(Default)]
struct PropObject {
    entries: Vec<(String, Vec<String>)>,
}

impl PropObject {
    fn set(&mut self, key: &str, value: String) {
        let merges = matches!(key, "class" | "style") || is_handler_key(key);
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, values)) if merges => values.push(value),
            Some((_, values)) => *values = vec![value],
            None => self.entries.push((key.to_string(), vec![value])),
        }
    }

    fn flush_into(&mut self, segments: &mut Vec<String>) {
        if self.entries.is_empty() {
            return;
        }
        let fields = self
            .entries
            .drain(..)
            .map(|(key, mut values)| {
                let value = if values.len() == 1 {
                    values.remove(0)
                } else {
                    format!("[{}]", values.join(", "))
                };
                format!("{}: {value}", object_key(&key))
            })
            .collect::<Vec<_>>();
        segments.push(format!("{{ {} }}", fields.join(", ")));
    }
}

fn flush_text(text: &mut Vec<String>, out: &mut Vec<Child>) {
    if !text.is_empty() {
        out.push(Child::Text(text.join(" + ")));
        text.clear();
    }
}

/// The `v-if` element at `start` and the `v-else-if`/`v-else` siblings that
/// follow it, skipping whitespace between branches.
fn collect_if_chain(nodes: &[Node], start: usize) -> (Vec<&Element>, usize) {
    let mut branches = Vec::new();
    if let Node::Element(first) = &nodes[start] {
        branches.push(first);
    }
    let mut last = start;

    loop {
        let mut next = last + 1;
        while matches!(nodes.get(next), Some(Node::Text(text)) if text.trim().is_empty()) {
            next += 1;
        }
        match nodes.get(next) {
            Some(Node::Element(el)) if el.has_directive("else-if") => {
                branches.push(el);
                last = next;
            }
            Some(Node::Element(el)) if el.has_directive("else") => {
                branches.push(el);
                last = next;
                break;
            }
            _ => break,
        }
    }

    (branches, last)
}

/// Split `(item, index) in list` into its parameter list and source.
fn split_for(value: &str, position: usize) -> Result<(&str, &str)> {
    let bytes = value.as_bytes();
    let split = (1..bytes.len().saturating_sub(3)).find(|&i| {
        bytes[i].is_ascii_whitespace()
            && (value[i + 1..].starts_with("in") || value[i + 1..].starts_with("of"))
            && bytes[i + 3].is_ascii_whitespace()
    });

    let Some(split) = split else {
        return Err(VueError::template(
            format!("invalid v-for expression `{value}`"),
            position,
        ));
    };

    let alias = value[..split].trim();
    let source = value[split + 3..].trim();
    let params = alias
        .strip_prefix('(')
        .and_then(|inner| inner.strip_suffix(')'))
        .unwrap_or(alias)
        .trim();

    if params.is_empty() || source.is_empty() {
        return Err(VueError::template(
            format!("invalid v-for expression `{value}`"),
            position,
        ));
    }
    Ok((params, source))
}

fn required_value<'d>(directive: &'d Directive, display: &str) -> Result<&'d str> {
    directive
        .value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| VueError::template(format!("{display} requires a value"), directive.position))
}

fn slot_name(slot: &Directive) -> Result<String> {
    match slot.arg.as_deref() {
        None => Ok("default".to_string()),
        Some(arg) if arg.starts_with('[') => Err(unsupported(slot, "dynamic slot names")),
        Some(arg) => Ok(arg.to_string()),
    }
}

fn unsupported(directive: &Directive, what: &str) -> VueError {
    VueError::template(format!("{what} is not supported"), directive.position)
}

fn is_component(tag: &str) -> bool {
    tag.starts_with(|c: char| c.is_ascii_uppercase()) || tag.contains('-')
}

fn builtin_component(tag: &str) -> Option<&'static str> {
    match tag {
        "Transition" | "transition" => Some("Transition"),
        "TransitionGroup" | "transition-group" => Some("TransitionGroup"),
        "KeepAlive" | "keep-alive" => Some("KeepAlive"),
        "Teleport" | "teleport" => Some("Teleport"),
        "Suspense" | "suspense" => Some("Suspense"),
        _ => None,
    }
}

fn component_var(tag: &str) -> String {
    let sanitized = tag
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '$' { c } else { '_' })
        .collect::<String>();
    format!("_component_{sanitized}")
}

fn handler_key(event: &str, modifiers: &[String]) -> String {
    let mut key = format!("on{}", capitalize(&camelize(event)));
    for modifier in modifiers {
        if OPTION_MODIFIERS.contains(&modifier.as_str()) {
            key.push_str(&capitalize(modifier));
        }
    }
    key
}

fn is_handler_key(key: &str) -> bool {
    key.len() > 2 && key.starts_with("on") && key[2..].starts_with(|c: char| c.is_ascii_uppercase())
}

fn camelize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = false;
    for c in name.chars() {
        if c == '-' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn object_key(key: &str) -> String {
    let is_identifier = key
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    if is_identifier {
        key.to_string()
    } else {
        js_string(key)
    }
}

fn string_array(items: &[&str]) -> String {
    let quoted = items.iter().map(|item| js_string(item)).collect::<Vec<_>>();
    format!("[{}]", quoted.join(", "))
}

/// A double-quoted JavaScript string literal.
pub(crate) fn js_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

//! Template markup into a node tree.
//!
//! Only what the code generator consumes is kept: elements with their
//! attributes, text and `{{ }}` interpolations. Comments are dropped and
//! whitespace is condensed the way Vue does by default.

use memchr::memmem;

use crate::{Result, VueError};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Node {
    Element(Element),
    Text(String),
    Interpolation { expression: String, position: usize },
}

impl Node {
    fn is_element(&self) -> bool {
        matches!(self, Node::Element(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Element {
    pub tag: String,
    pub attrs: Vec<Attribute>,
    pub children: Vec<Node>,
    pub position: usize,
}

impl Element {
    pub fn directive(&self, name: &str) -> Option<&Directive> {
        self.attrs.iter().find_map(|attr| match attr {
            Attribute::Directive(d) if d.name == name => Some(d),
            _ => None,
        })
    }

    pub fn has_directive(&self, name: &str) -> bool {
        self.directive(name).is_some()
    }

    pub fn static_attr(&self, name: &str) -> Option<&str> {
        self.attrs.iter().find_map(|attr| match attr {
            Attribute::Static { name: n, value } if n == name => Some(value.as_deref().unwrap_or("")),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Attribute {
    Static { name: String, value: Option<String> },
    Directive(Directive),
}

/// `v-name:arg.modifier="value"`, including the `:`, `@` and `#` shorthands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Directive {
    pub name: String,
    pub arg: Option<String>,
    pub modifiers: Vec<String>,
    pub value: Option<String>,
    pub position: usize,
}

impl Directive {
    fn from_attr(raw: &str, value: Option<String>, position: usize) -> Option<Self> {
        let (name, rest) = if let Some(rest) = raw.strip_prefix(':') {
            ("bind", Some(rest))
        } else if let Some(rest) = raw.strip_prefix('@') {
            ("on", Some(rest))
        } else if let Some(rest) = raw.strip_prefix('#') {
            ("slot", Some(rest))
        } else if let Some(body) = raw.strip_prefix("v-") {
            let split = body.find([':', '.']).unwrap_or(body.len());
            let rest = body[split..].strip_prefix(':').or_else(|| {
                // `v-on.once` style: modifiers without an argument
                (split < body.len()).then(|| &body[split..])
            });
            (&body[..split], rest)
        } else {
            return None;
        };

        let (arg, modifiers) = match rest {
            Some(rest) => {
                // A dynamic argument may itself contain dots
                let arg_end = if rest.starts_with('[') {
                    rest.find(']').map_or(rest.len(), |i| i + 1)
                } else {
                    rest.find('.').unwrap_or(rest.len())
                };
                let arg = &rest[..arg_end];
                let modifiers = rest[arg_end..]
                    .split('.')
                    .filter(|m| !m.is_empty())
                    .map(str::to_string)
                    .collect();
                ((!arg.is_empty()).then(|| arg.to_string()), modifiers)
            }
            None => (None, Vec::new()),
        };

        Some(Self {
            name: name.to_string(),
            arg,
            modifiers,
            value,
            position,
        })
    }
}

/// Parse template markup into top-level nodes.
pub(crate) fn parse(source: &str) -> Result<Vec<Node>> {
    let mut parser = Parser {
        source,
        bytes: source.as_bytes(),
        pos: 0,
    };
    let nodes = parser.parse_children(None)?;
    Ok(condense(nodes, false))
}

struct Parser<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn rest(&self) -> &'a [u8] {
        &self.bytes[self.pos..]
    }

    fn parse_children(&mut self, parent: Option<(&str, usize)>) -> Result<Vec<Node>> {
        let mut nodes = Vec::new();

        loop {
            if self.pos >= self.bytes.len() {
                return match parent {
                    Some((tag, position)) => Err(VueError::template(
                        format!("element <{tag}> is missing its end tag"),
                        position,
                    )),
                    None => Ok(nodes),
                };
            }

            let rest = self.rest();
            if rest.starts_with(b"<!--") {
                let end = memmem::find(&rest[4..], b"-->")
                    .ok_or_else(|| VueError::template("unclosed comment", self.pos))?;
                self.pos += 4 + end + 3;
            } else if rest.starts_with(b"</") {
                let start = self.pos;
                self.pos += 2;
                let name = self.read_tag_name();
                self.skip_whitespace();
                if self.rest().first() != Some(&b'>') {
                    return Err(VueError::template(format!("malformed end tag </{name}"), start));
                }
                self.pos += 1;

                return match parent {
                    Some((tag, _)) if tag == name => Ok(nodes),
                    _ => Err(VueError::template(
                        format!("unexpected end tag </{name}>"),
                        start,
                    )),
                };
            } else if rest.starts_with(b"{{") {
                nodes.push(self.parse_interpolation()?);
            } else if self.at_tag_start() {
                nodes.push(Node::Element(self.parse_element()?));
            } else {
                nodes.push(Node::Text(self.parse_text()));
            }
        }
    }

    fn at_tag_start(&self) -> bool {
        let rest = self.rest();
        rest.len() > 1 && rest[0] == b'<' && rest[1].is_ascii_alphabetic()
    }

    fn parse_interpolation(&mut self) -> Result<Node> {
        let start = self.pos;
        let end = memmem::find(&self.rest()[2..], b"}}")
            .ok_or_else(|| VueError::template("unclosed interpolation", start))?;
        let inner_start = start + 2;
        let raw = &self.source[inner_start..inner_start + end];
        self.pos = inner_start + end + 2;

        let expression = raw.trim();
        if expression.is_empty() {
            return Err(VueError::template("empty interpolation", start));
        }
        let leading = raw.len() - raw.trim_start().len();
        Ok(Node::Interpolation {
            expression: expression.to_string(),
            position: inner_start + leading,
        })
    }

    fn parse_text(&mut self) -> String {
        let start = self.pos;
        // Always consume at least one byte so a stray '<' becomes text
        self.pos += 1;
        while self.pos < self.bytes.len() {
            let rest = self.rest();
            if rest.starts_with(b"{{") || rest.starts_with(b"</") || rest.starts_with(b"<!--") {
                break;
            }
            if self.at_tag_start() {
                break;
            }
            self.pos += 1;
        }
        decode_entities(&self.source[start..self.pos])
    }

    fn parse_element(&mut self) -> Result<Element> {
        let start = self.pos;
        self.pos += 1;
        let tag = self.read_tag_name().to_string();
        let mut attrs = Vec::new();

        let self_closing = loop {
            self.skip_whitespace();
            match self.rest() {
                [] => {
                    return Err(VueError::template(
                        format!("unclosed start tag <{tag}>"),
                        start,
                    ));
                }
                [b'>', ..] => {
                    self.pos += 1;
                    break false;
                }
                [b'/', b'>', ..] => {
                    self.pos += 2;
                    break true;
                }
                [b'/', ..] => self.pos += 1,
                _ => attrs.push(self.parse_attribute()?),
            }
        };

        let children = if self_closing || VOID_ELEMENTS.contains(&tag.as_str()) {
            Vec::new()
        } else {
            let children = self.parse_children(Some((tag.as_str(), start)))?;
            condense(children, tag == "pre")
        };

        Ok(Element {
            tag,
            attrs,
            children,
            position: start,
        })
    }

    fn parse_attribute(&mut self) -> Result<Attribute> {
        let name_start = self.pos;
        while let Some(&b) = self.bytes.get(self.pos) {
            if b.is_ascii_whitespace() || matches!(b, b'=' | b'>') || self.rest().starts_with(b"/>")
            {
                break;
            }
            self.pos += 1;
        }
        let name = &self.source[name_start..self.pos];

        self.skip_whitespace();
        let mut value = None;
        let mut value_position = self.pos;
        if self.rest().first() == Some(&b'=') {
            self.pos += 1;
            self.skip_whitespace();
            let (text, position) = self.read_attribute_value(name_start)?;
            value = Some(text);
            value_position = position;
        }

        let value = value.map(|v| decode_entities(&v));
        Ok(match Directive::from_attr(name, value.clone(), value_position) {
            Some(directive) => Attribute::Directive(directive),
            None => Attribute::Static {
                name: name.to_string(),
                value,
            },
        })
    }

    fn read_attribute_value(&mut self, attr_start: usize) -> Result<(String, usize)> {
        match self.rest().first() {
            Some(&quote @ (b'"' | b'\'')) => {
                let start = self.pos + 1;
                let end = memchr::memchr(quote, &self.bytes[start..])
                    .ok_or_else(|| VueError::template("unterminated attribute value", attr_start))?;
                self.pos = start + end + 1;
                Ok((self.source[start..start + end].to_string(), start))
            }
            _ => {
                let start = self.pos;
                while let Some(&b) = self.bytes.get(self.pos) {
                    if b.is_ascii_whitespace() || b == b'>' {
                        break;
                    }
                    self.pos += 1;
                }
                Ok((self.source[start..self.pos].to_string(), start))
            }
        }
    }

    fn read_tag_name(&mut self) -> &'a str {
        let start = self.pos;
        while let Some(&b) = self.bytes.get(self.pos) {
            if !(b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b':')) {
                break;
            }
            self.pos += 1;
        }
        &self.source[start..self.pos]
    }

    fn skip_whitespace(&mut self) {
        while self.bytes.get(self.pos).is_some_and(u8::is_ascii_whitespace) {
            self.pos += 1;
        }
    }
}

/// Drop or shrink whitespace-only text and collapse whitespace runs.
fn condense(nodes: Vec<Node>, preserve: bool) -> Vec<Node> {
    if preserve {
        return nodes;
    }

    // Adjacent text nodes are merged first so the neighbours below are real
    let mut merged: Vec<Node> = Vec::with_capacity(nodes.len());
    for node in nodes {
        match (merged.last_mut(), node) {
            (Some(Node::Text(prev)), Node::Text(text)) => prev.push_str(&text),
            (_, node) => merged.push(node),
        }
    }

    let mut out = Vec::with_capacity(merged.len());
    for i in 0..merged.len() {
        let Node::Text(text) = &merged[i] else {
            out.push(merged[i].clone());
            continue;
        };

        if text.chars().all(char::is_whitespace) {
            let prev = i.checked_sub(1).and_then(|p| merged.get(p));
            let next = merged.get(i + 1);
            let between_elements = prev.is_some_and(Node::is_element)
                && next.is_some_and(Node::is_element)
                && text.contains(['\n', '\r']);
            if prev.is_none() || next.is_none() || between_elements {
                continue;
            }
            out.push(Node::Text(" ".to_string()));
        } else {
            out.push(Node::Text(collapse_whitespace(text)));
        }
    }
    out
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() && c != '\u{a0}' {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", "\u{a0}")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(node: &Node) -> &Element {
        match node {
            Node::Element(el) => el,
            other => panic!("expected element, got {other:?}"),
        }
    }

    #[test]
    fn test_nested_elements_and_text() {
        let nodes = parse("<div id=\"app\"><p>Hello</p><br><img src=x /></div>").unwrap();
        assert_eq!(nodes.len(), 1);

        let div = element(&nodes[0]);
        assert_eq!(div.tag, "div");
        assert_eq!(div.static_attr("id"), Some("app"));
        assert_eq!(div.children.len(), 3);
        assert_eq!(element(&div.children[0]).children, vec![Node::Text("Hello".into())]);
        assert_eq!(element(&div.children[2]).static_attr("src"), Some("x"));
    }

    #[test]
    fn test_directive_shorthands() {
        let nodes = parse(r#"<input :value="v" @keyup.enter="go" v-bind:title.camel="t" #item="{ x }" v-else>"#)
            .unwrap();
        let input = element(&nodes[0]);

        let bind = input.directive("bind").unwrap();
        assert_eq!(bind.arg.as_deref(), Some("value"));
        assert_eq!(bind.value.as_deref(), Some("v"));

        let on = input.directive("on").unwrap();
        assert_eq!(on.arg.as_deref(), Some("keyup"));
        assert_eq!(on.modifiers, vec!["enter"]);

        let slot = input.directive("slot").unwrap();
        assert_eq!(slot.arg.as_deref(), Some("item"));

        let else_ = input.directive("else").unwrap();
        assert_eq!(else_.value, None);
    }

    #[test]
    fn test_interpolation_position() {
        let source = "<p>a {{  msg }}</p>";
        let nodes = parse(source).unwrap();
        let p = element(&nodes[0]);
        let Node::Interpolation { expression, position } = &p.children[1] else {
            panic!("expected interpolation");
        };
        assert_eq!(expression, "msg");
        assert_eq!(&source[*position..*position + 3], "msg");
    }

    #[test]
    fn test_whitespace_condensing() {
        let nodes = parse("\n  <div>\n    <span>a</span>\n    <span>b</span> {{ c }}\n  </div>\n").unwrap();
        assert_eq!(nodes.len(), 1);

        let div = element(&nodes[0]);
        // leading/trailing whitespace dropped, newline between elements dropped,
        // the space before the interpolation kept
        assert_eq!(div.children.len(), 4);
        assert_eq!(div.children[2], Node::Text(" ".into()));
    }

    #[test]
    fn test_comments_are_dropped() {
        let nodes = parse("<div><!-- hidden --><p>x</p></div>").unwrap();
        assert_eq!(element(&nodes[0]).children.len(), 1);
    }

    #[test]
    fn test_entities_are_decoded() {
        let nodes = parse("<p>a &lt; b &amp;&amp; c</p>").unwrap();
        assert_eq!(element(&nodes[0]).children, vec![Node::Text("a < b && c".into())]);
    }

    #[test]
    fn test_stray_less_than_is_text() {
        let nodes = parse("<p>1 < 2</p>").unwrap();
        assert_eq!(element(&nodes[0]).children, vec![Node::Text("1 < 2".into())]);
    }

    #[test]
    fn test_mismatched_end_tag() {
        let err = parse("<div><span></div>").unwrap_err();
        assert!(matches!(err, VueError::Template { .. }));
    }

    #[test]
    fn test_missing_end_tag() {
        let err = parse("<div><p>text</p>").unwrap_err();
        assert!(matches!(err, VueError::Template { message, .. } if message.contains("<div>")));
    }

    #[test]
    fn test_unclosed_interpolation() {
        assert!(parse("<p>{{ msg </p>").is_err());
    }
}

//! Offset-addressable view of document content.
//!
//! Content is parsed once into an owned tree of [`MarkupNode`]s. Every offset the
//! engine handles is a character offset into the concatenation of the tree's text
//! leaves (the "inner text"); tag markup, comments, doctypes and processing
//! instructions contribute nothing to it.
//!
//! HTML is parsed with `scraper` (html5ever), which never rejects input: malformed
//! markup yields a best-effort tree.

use ego_tree::NodeRef;
use scraper::{Html, Node};

use super::escape::{escape_attr, escape_text};
use crate::models::ContentType;

/// Elements that never have children or a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// HTML elements whose text content the parser keeps verbatim (scripting enabled).
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "style", "script", "xmp", "iframe", "noembed", "noframes", "noscript", "plaintext",
];

/// Namespace of ordinary HTML elements; SVG and MathML content is parsed normally.
pub const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// Elements where the parser drops a newline directly after the start tag.
const LEADING_NEWLINE_ELEMENTS: &[&str] = &["pre", "textarea", "listing"];

/// A node of parsed content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupNode {
    Text(String),
    Element {
        name: String,
        namespace: String,
        attrs: Vec<(String, String)>,
        children: Vec<MarkupNode>,
    },
}

impl MarkupNode {
    /// Number of inner-text characters below (and including) this node.
    pub fn text_len(&self) -> usize {
        match self {
            MarkupNode::Text(t) => t.chars().count(),
            MarkupNode::Element { children, .. } => children.iter().map(MarkupNode::text_len).sum(),
        }
    }

    fn push_text(&self, out: &mut String) {
        match self {
            MarkupNode::Text(t) => out.push_str(t),
            MarkupNode::Element { children, .. } => {
                for child in children {
                    child.push_text(out);
                }
            }
        }
    }
}

/// A text leaf and the inner-text offset of its first character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextLeaf<'a> {
    pub start: usize,
    pub text: &'a str,
}

/// Parsed document content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedContent {
    kind: ContentType,
    nodes: Vec<MarkupNode>,
}

impl ParsedContent {
    pub fn parse(content: &str, kind: ContentType) -> Self {
        let nodes = match kind {
            ContentType::Plain => vec![MarkupNode::Text(content.to_string())],
            ContentType::Html => {
                let html = Html::parse_fragment(content);
                html.root_element()
                    .children()
                    .filter_map(convert_node)
                    .collect()
            }
        };
        Self { kind, nodes }
    }

    /// Build from an already-shaped node list.
    pub fn from_nodes(kind: ContentType, nodes: Vec<MarkupNode>) -> Self {
        Self { kind, nodes }
    }

    pub fn kind(&self) -> ContentType {
        self.kind
    }

    pub fn nodes(&self) -> &[MarkupNode] {
        &self.nodes
    }

    /// Total inner-text length in characters; valid offsets are `0..=len()`.
    pub fn len(&self) -> usize {
        self.nodes.iter().map(MarkupNode::text_len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn inner_text(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            node.push_text(&mut out);
        }
        out
    }

    /// Text leaves in document order, with their starting offsets.
    pub fn text_leaves(&self) -> Vec<TextLeaf<'_>> {
        fn walk<'a>(node: &'a MarkupNode, offset: &mut usize, out: &mut Vec<TextLeaf<'a>>) {
            match node {
                MarkupNode::Text(t) => {
                    out.push(TextLeaf {
                        start: *offset,
                        text: t,
                    });
                    *offset += t.chars().count();
                }
                MarkupNode::Element { children, .. } => {
                    for child in children {
                        walk(child, offset, out);
                    }
                }
            }
        }

        let mut out = Vec::new();
        let mut offset = 0;
        for node in &self.nodes {
            walk(node, &mut offset, &mut out);
        }
        out
    }

    /// Characters `[start, end)` of the inner text, clamped to the content.
    pub fn substring(&self, start: usize, end: usize) -> String {
        let end = end.max(start);
        self.inner_text().chars().skip(start).take(end - start).collect()
    }

    /// Serialise back to the content's own format.
    pub fn render(&self) -> String {
        render_nodes(self.kind, &self.nodes)
    }
}

/// Total inner-text length of raw content.
pub fn document_length(content: &str, kind: ContentType) -> usize {
    ParsedContent::parse(content, kind).len()
}

/// Inner text of raw content: the addressing space of every offset.
pub fn inner_text(content: &str, kind: ContentType) -> String {
    ParsedContent::parse(content, kind).inner_text()
}

/// Serialise nodes as plain text or HTML.
pub fn render_nodes(kind: ContentType, nodes: &[MarkupNode]) -> String {
    let mut out = String::new();
    match kind {
        ContentType::Plain => {
            for node in nodes {
                node.push_text(&mut out);
            }
        }
        ContentType::Html => {
            for node in nodes {
                if render_html(node, false, &mut out) {
                    break;
                }
            }
        }
    }
    out
}

/// Append `node` as HTML. Returns `true` once a `<plaintext>` element has been
/// written: the parser treats everything after its start tag as text, so nothing
/// more (closing tags included) may follow.
fn render_html(node: &MarkupNode, raw_text: bool, out: &mut String) -> bool {
    match node {
        MarkupNode::Text(t) => {
            if raw_text {
                out.push_str(t);
            } else {
                out.push_str(&escape_text(t));
            }
            false
        }
        MarkupNode::Element {
            name,
            namespace,
            attrs,
            children,
        } => {
            let html = namespace == HTML_NAMESPACE;

            out.push('<');
            out.push_str(name);
            for (key, value) in attrs {
                out.push(' ');
                out.push_str(key);
                out.push_str("=\"");
                out.push_str(&escape_attr(value));
                out.push('"');
            }
            out.push('>');

            if html && VOID_ELEMENTS.contains(&name.as_str()) {
                return false;
            }

            if html && LEADING_NEWLINE_ELEMENTS.contains(&name.as_str()) {
                if let Some(MarkupNode::Text(t)) = children.first() {
                    if t.starts_with('\n') {
                        out.push('\n');
                    }
                }
            }

            let raw = html && RAW_TEXT_ELEMENTS.contains(&name.as_str());
            for child in children {
                if render_html(child, raw, out) {
                    return true;
                }
            }

            if html && name == "plaintext" {
                return true;
            }

            out.push_str("</");
            out.push_str(name);
            out.push('>');
            false
        }
    }
}

/// Convert a parsed DOM node. Nodes without text semantics yield `None`.
fn convert_node(node: NodeRef<'_, Node>) -> Option<MarkupNode> {
    match node.value() {
        Node::Text(text) => {
            let s: &str = text;
            Some(MarkupNode::Text(s.to_string()))
        }
        Node::Element(element) => Some(MarkupNode::Element {
            name: element.name().to_string(),
            namespace: element.name.ns.to_string(),
            attrs: element
                .attrs()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            children: node.children().filter_map(convert_node).collect(),
        }),
        _ => None,
    }
}

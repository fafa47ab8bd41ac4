// ABOUTME: HTML serialization for the document model.
// ABOUTME: Escapes text and attribute values; void elements self-close, HTML raw-text elements stay verbatim.

use ego_tree::NodeRef;

use super::{Document, Node, NodeId};

// HTML elements whose text children are emitted without escaping.
// `noscript` is raw text because markup is parsed with scripting enabled.
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "script", "style", "xmp", "iframe", "noembed", "noframes", "plaintext", "noscript",
];

pub(super) fn outer_html(doc: &Document, id: NodeId) -> String {
    let mut out = String::new();
    if let Some(node) = doc.tree().get(id) {
        serialize(vec![Step::Open(node)], &mut out);
    }
    out
}

pub(super) fn inner_html(doc: &Document, id: NodeId) -> String {
    let mut out = String::new();
    if let Some(node) = doc.tree().get(id) {
        serialize(node.children().rev().map(Step::Open).collect(), &mut out);
    }
    out
}

enum Step<'a> {
    Open(NodeRef<'a, Node>),
    Close(&'a str),
}

// Steps are popped from the end, so children are pushed in reverse.
fn serialize(mut stack: Vec<Step<'_>>, out: &mut String) {
    while let Some(step) = stack.pop() {
        let node = match step {
            Step::Close(name) => {
                out.push_str("</");
                out.push_str(name);
                out.push('>');
                continue;
            }
            Step::Open(node) => node,
        };

        match node.value() {
            Node::Document | Node::Fragment => {
                stack.extend(node.children().rev().map(Step::Open));
            }
            Node::Text(text) => {
                let raw = node
                    .parent()
                    .and_then(|p| p.value().as_element())
                    .is_some_and(|el| {
                        el.is_html() && RAW_TEXT_ELEMENTS.iter().any(|tag| el.is(tag))
                    });
                if raw {
                    out.push_str(text);
                } else {
                    out.push_str(&escape_text(text));
                }
            }
            Node::Comment(comment) => {
                out.push_str("<!--");
                out.push_str(comment);
                out.push_str("-->");
            }
            Node::Doctype { name, .. } => {
                out.push_str("<!DOCTYPE ");
                out.push_str(name);
                out.push('>');
            }
            Node::ProcessingInstruction { target, data } => {
                out.push_str("<?");
                out.push_str(target);
                out.push(' ');
                out.push_str(data);
                out.push('>');
            }
            Node::Element(el) => {
                out.push('<');
                out.push_str(&el.name);
                for (name, value) in el.attrs() {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&escape_attr(value));
                    out.push('"');
                }

                if el.is_html() && is_void_element(&el.name) {
                    out.push_str(" />");
                    continue;
                }

                out.push('>');
                stack.push(Step::Close(&el.name));
                stack.extend(node.children().rev().map(Step::Open));
            }
        }
    }
}

/// Escape attribute value
pub fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escape text content
pub fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Check if tag is void element
pub fn is_void_element(tag: &str) -> bool {
    matches!(
        tag.to_ascii_lowercase().as_str(),
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

// ABOUTME: Structural sanitizer: removes scripts, markup-bearing comments, doctypes, PIs and clobbered forms.
// ABOUTME: Walks with an explicit (node, depth) worklist and cleans attributes of every surviving element.

//! Markup sanitizer.
//!
//! [`sanitize`] mutates the document in place and never fails. Each node
//! is visited once: a node is classified first and, if it survives, its
//! current children are queued. Removed nodes are detached and their
//! subtrees are never walked.

mod attributes;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::dom::{Document, Node, NodeId, WRAPPER_TAG};
use crate::markup::create_nodes;
use crate::options::SanitizeOptions;

pub use self::attributes::{is_boolean_attribute, BOOLEAN_ATTRIBUTES};

// Comments that carry markup, e.g. conditional comments or `<!--<img ...>-->`
static MARKUP_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[/\w]").unwrap());

// Form-associated elements whose name/id becomes a property of the form
const FORM_CONTROLS: &[&str] = &[
    "input", "button", "select", "textarea", "fieldset", "object", "output", "img", "iframe",
    "embed", "form",
];

// DOM members the walk relies on; a form control named after one shadows it
const DOM_MEMBERS: &[&str] = &[
    "removeChild",
    "setAttribute",
    "removeAttribute",
    "getAttribute",
    "attributes",
    "namespaceURI",
    "nodeName",
    "nodeType",
    "childNodes",
    "parentNode",
    "hasChildNodes",
    "textContent",
    "insertBefore",
    "cloneNode",
    "nextSibling",
];

/// Sanitize `nodes` and their descendants in place.
///
/// Ids that do not resolve to a node of `doc` are ignored. Returns the
/// input nodes that survived, in input order.
pub fn sanitize(doc: &mut Document, nodes: &[NodeId], options: &SanitizeOptions) -> Vec<NodeId> {
    let mut survivors = Vec::with_capacity(nodes.len());
    for &id in nodes {
        if doc.get(id).is_none() {
            continue;
        }
        if walk(doc, id, options) {
            survivors.push(id);
        }
    }
    survivors
}

/// Sanitize every top-level node of the document.
pub fn sanitize_document(doc: &mut Document, options: &SanitizeOptions) -> Vec<NodeId> {
    let top_level = doc.children(doc.root());
    sanitize(doc, &top_level, options)
}

/// Parse `html` as a fragment, sanitize it and serialize the result.
pub fn sanitize_html(html: &str, options: &SanitizeOptions) -> String {
    create_nodes(html, options).document.html()
}

/// Sanitize the subtree at `start`. Returns false if `start` itself was removed.
fn walk(doc: &mut Document, start: NodeId, options: &SanitizeOptions) -> bool {
    let mut survived = true;
    let mut stack = vec![(start, 0usize)];

    while let Some((id, depth)) = stack.pop() {
        if let Some(reason) = visit(doc, id, depth, options) {
            debug!(?id, depth, reason, "removed node");
            doc.detach(id);
            if id == start {
                survived = false;
            }
            continue;
        }

        for child in doc.children(id).into_iter().rev() {
            stack.push((child, depth + 1));
        }
    }
    survived
}

/// Classify one node, cleaning what can be kept. Returns why it must go.
fn visit(
    doc: &mut Document,
    id: NodeId,
    depth: usize,
    options: &SanitizeOptions,
) -> Option<&'static str> {
    match doc.get(id)? {
        Node::Element(_) => {
            if is_clobbered(doc, id) {
                return Some("clobbered form");
            }
            if depth == 0 && strip_scripts(doc, id) {
                return Some("script");
            }
            doc.with_element_mut(id, |el| attributes::sanitize_attributes(el, options));
            None
        }
        Node::Document | Node::Fragment => {
            if depth == 0 {
                strip_scripts(doc, id);
            }
            None
        }
        Node::Comment(text) => MARKUP_COMMENT.is_match(text).then_some("markup comment"),
        Node::Doctype { .. } => Some("doctype"),
        Node::ProcessingInstruction { .. } => Some("processing instruction"),
        Node::Text(_) => None,
    }
}

fn is_script_like(doc: &Document, id: NodeId) -> bool {
    doc.element(id)
        .is_some_and(|el| el.value().is("script") || el.value().is(WRAPPER_TAG))
}

/// Detach every script or wrapper element below `id`. Returns true if
/// `id` is one itself, leaving its removal to the caller.
fn strip_scripts(doc: &mut Document, id: NodeId) -> bool {
    if is_script_like(doc, id) {
        return true;
    }

    let doomed: Vec<NodeId> = doc
        .descendants(id)
        .filter(|d| is_script_like(doc, *d))
        .collect();
    for script in doomed {
        debug!(id = ?script, "removed script element");
        doc.detach(script);
    }
    false
}

/// A form whose controls are named after DOM members.
fn is_clobbered(doc: &Document, id: NodeId) -> bool {
    let Some(form) = doc.element(id) else {
        return false;
    };
    if !form.value().is("form") {
        return false;
    }

    doc.descendants(id).any(|d| {
        doc.element(d).is_some_and(|control| {
            FORM_CONTROLS.iter().any(|tag| control.value().is(tag))
                && ["name", "id"].iter().any(|attr| {
                    control
                        .attr(attr)
                        .is_some_and(|value| DOM_MEMBERS.contains(&value))
                })
        })
    })
}

// ABOUTME: Upward-only element search by selector (closest semantics) or predicate.
// ABOUTME: Predicate searches never cross <body> and ignore origins outside it.

use std::fmt;

use crate::dom::{Document, ElementRef, NodeId};
use crate::selector::compile;

/// What [`find_ancestor`] looks for.
#[derive(Clone, Copy)]
pub enum AncestorQuery<'q> {
    /// A CSS selector, tested on the origin and every ancestor element.
    Selector(&'q str),
    /// A test run on the origin and its ancestors below `<body>`.
    Predicate(&'q dyn Fn(ElementRef<'_>) -> bool),
}

impl<'q> From<&'q str> for AncestorQuery<'q> {
    fn from(selector: &'q str) -> Self {
        AncestorQuery::Selector(selector)
    }
}

impl fmt::Debug for AncestorQuery<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AncestorQuery::Selector(s) => f.debug_tuple("Selector").field(s).finish(),
            AncestorQuery::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// The nearest inclusive ancestor of `origin` satisfying `query`.
///
/// A selector query walks to the top of the tree. A predicate query is
/// bounded by the document's `<body>`: the body itself is never tested,
/// and an origin outside the body (say, in `<head>`) finds nothing.
/// Trees without a body, such as fragments, are walked to the top.
pub fn find_ancestor<'q>(
    doc: &Document,
    origin: NodeId,
    query: impl Into<AncestorQuery<'q>>,
) -> Option<NodeId> {
    doc.element(origin)?;

    match query.into() {
        AncestorQuery::Selector(css) => {
            let selector = compile(css)?;
            std::iter::once(origin)
                .chain(doc.ancestors(origin))
                .take_while(|id| doc.is_element(*id))
                .find(|id| selector.matches(doc, *id))
        }
        AncestorQuery::Predicate(test) => {
            let body = doc.body();
            if let Some(body) = body {
                if !doc.contains(body, origin) {
                    return None;
                }
            }

            let mut cursor = Some(origin);
            while let Some(id) = cursor {
                if Some(id) == body {
                    return None;
                }
                let element = doc.element(id)?;
                if test(element) {
                    return Some(id);
                }
                cursor = doc.parent(id);
            }
            None
        }
    }
}

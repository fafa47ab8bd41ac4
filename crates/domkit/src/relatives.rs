// ABOUTME: Relative finder: the selector matches nearest to an origin element, in any direction.
// ABOUTME: Ranks candidates with the distance calculator and keeps every match at the minimum.

use crate::distance::distance;
use crate::dom::{Document, NodeId};
use crate::selector::{compile, Selector};

/// Elements matching `selector` that are nearest to `origin`.
///
/// If `origin` matches, the result is exactly `[origin]`. Otherwise every
/// match inside `context` (the whole document by default) at the minimum
/// distance from `origin` is returned, in document order. Disconnected
/// matches are skipped. Invalid selectors, an unknown context, or a
/// non-element origin give an empty result.
pub fn find_relatives(
    doc: &Document,
    origin: NodeId,
    selector: &str,
    context: Option<NodeId>,
) -> Vec<NodeId> {
    match compile(selector) {
        Some(selector) => find_relatives_with(doc, origin, &selector, context),
        None => Vec::new(),
    }
}

/// [`find_relatives`] with an already parsed selector.
pub fn find_relatives_with(
    doc: &Document,
    origin: NodeId,
    selector: &Selector,
    context: Option<NodeId>,
) -> Vec<NodeId> {
    if !doc.is_element(origin) {
        return Vec::new();
    }
    if selector.matches(doc, origin) {
        return vec![origin];
    }

    let scope = context.unwrap_or_else(|| doc.root());
    if doc.get(scope).is_none() {
        return Vec::new();
    }

    let mut nearest: Option<usize> = None;
    let mut found = Vec::new();
    for candidate in selector.select(doc, scope) {
        let Some(d) = distance(doc, origin, candidate) else {
            continue;
        };
        match nearest {
            Some(best) if d > best => {}
            Some(best) if d == best => found.push(candidate),
            _ => {
                nearest = Some(d);
                found.clear();
                found.push(candidate);
            }
        }
    }
    found
}

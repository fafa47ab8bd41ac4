// ABOUTME: Focusability and tabbability predicates over the document model.
// ABOUTME: tabbable_elements orders positive tabindex first, then document order.

use crate::dom::{Document, Element, NodeId};
use crate::style::style_property;

// Elements the `disabled` attribute applies to
const DISABLEABLE: &[&str] = &[
    "button", "fieldset", "input", "optgroup", "option", "select", "textarea",
];

/// Parsed `tabindex`, if present and numeric.
pub fn tab_index(element: &Element) -> Option<i32> {
    element.attr("tabindex")?.trim().parse().ok()
}

/// True if the element can receive focus.
pub fn is_focusable(doc: &Document, id: NodeId) -> bool {
    let Some(element) = doc.element(id) else {
        return false;
    };
    let el = element.value();

    if DISABLEABLE.iter().any(|tag| el.is(tag)) && el.has_attr("disabled") {
        return false;
    }
    if is_hidden_or_inert(doc, id) {
        return false;
    }
    if tab_index(el).is_some() {
        return true;
    }

    match el.name.to_ascii_lowercase().as_str() {
        "a" | "area" => el.has_attr("href"),
        "input" => !el.attr("type").is_some_and(|t| t.eq_ignore_ascii_case("hidden")),
        "select" | "textarea" | "button" | "iframe" => true,
        "audio" | "video" => el.has_attr("controls"),
        "summary" => is_details_summary(doc, id),
        _ => el
            .attr("contenteditable")
            .is_some_and(|v| !v.trim().eq_ignore_ascii_case("false")),
    }
}

/// True if the element is focusable and reachable with the Tab key.
pub fn is_tabbable(doc: &Document, id: NodeId) -> bool {
    if !is_focusable(doc, id) {
        return false;
    }
    doc.element(id)
        .and_then(|el| tab_index(el.value()))
        .map_or(true, |index| index >= 0)
}

/// Tabbable descendants of `scope` in tab order.
pub fn tabbable_elements(doc: &Document, scope: NodeId) -> Vec<NodeId> {
    let tabbable: Vec<(NodeId, i32)> = doc
        .descendants(scope)
        .filter(|id| is_tabbable(doc, *id))
        .map(|id| {
            let index = doc.element(id).and_then(|el| tab_index(el.value())).unwrap_or(0);
            (id, index)
        })
        .collect();

    let (mut positive, rest): (Vec<_>, Vec<_>) =
        tabbable.into_iter().partition(|(_, index)| *index > 0);
    positive.sort_by_key(|(_, index)| *index);
    positive
        .into_iter()
        .chain(rest)
        .map(|(id, _)| id)
        .collect()
}

fn is_hidden_or_inert(doc: &Document, id: NodeId) -> bool {
    std::iter::once(id)
        .chain(doc.ancestors(id))
        .filter_map(|a| doc.element(a))
        .any(|el| {
            el.has_attr("hidden")
                || el.has_attr("inert")
                || style_property(doc, el.id(), "display").is_some_and(|d| is_display_none(&d))
        })
}

fn is_display_none(value: &str) -> bool {
    let value = value.trim();
    let value = match value.len().checked_sub("!important".len()) {
        Some(end) if value.is_char_boundary(end) && value[end..].eq_ignore_ascii_case("!important") => {
            &value[..end]
        }
        _ => value,
    };
    value.trim().eq_ignore_ascii_case("none")
}

// Only the first summary child of a details element is interactive.
fn is_details_summary(doc: &Document, id: NodeId) -> bool {
    let Some(parent) = doc.parent_element(id) else {
        return false;
    };
    if !doc.element(parent).is_some_and(|p| p.value().is("details")) {
        return false;
    }
    doc.element_children(parent)
        .into_iter()
        .find(|c| doc.element(*c).is_some_and(|el| el.value().is("summary")))
        == Some(id)
}

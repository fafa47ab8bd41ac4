// ABOUTME: Typed element properties and the dispatch table mapping property names onto them.
// ABOUTME: Replaces assignment by arbitrary name with a closed set of setters.

use crate::dom::{Document, NodeId};
use crate::error::{DomError, Result};

/// A property that can be applied to an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Property {
    Id(String),
    ClassName(String),
    Title(String),
    Lang(String),
    Hidden(bool),
    Disabled(bool),
    TabIndex(i32),
    /// Replaces every child with one text node.
    TextContent(String),
    /// Any other attribute; `None` removes it.
    Attribute { name: String, value: Option<String> },
}

impl Property {
    /// Map a property name and its string value onto a typed property.
    ///
    /// Both DOM (`className`, `tabIndex`, `textContent`) and attribute
    /// (`class`, `tabindex`) spellings are recognized. Unrecognized names
    /// become plain attributes; a non-numeric tab index is kept as the
    /// raw `tabindex` attribute.
    pub fn from_name(name: &str, value: &str) -> Property {
        match name {
            "id" => Property::Id(value.to_string()),
            "className" | "class" => Property::ClassName(value.to_string()),
            "title" => Property::Title(value.to_string()),
            "lang" => Property::Lang(value.to_string()),
            "hidden" => Property::Hidden(parse_flag(name, value)),
            "disabled" => Property::Disabled(parse_flag(name, value)),
            "tabIndex" | "tabindex" => match value.trim().parse() {
                Ok(index) => Property::TabIndex(index),
                Err(_) => Property::Attribute {
                    name: "tabindex".to_string(),
                    value: Some(value.to_string()),
                },
            },
            "textContent" | "innerText" => Property::TextContent(value.to_string()),
            _ => Property::Attribute {
                name: name.to_string(),
                value: Some(value.to_string()),
            },
        }
    }
}

fn parse_flag(name: &str, value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case(name)
}

/// Apply one property to an element.
pub fn apply_property(doc: &mut Document, id: NodeId, property: Property) -> Result<()> {
    match doc.get(id) {
        None => return Err(DomError::UnknownNode),
        Some(node) if !node.is_element() => return Err(DomError::NotAnElement),
        Some(_) => {}
    }

    match property {
        Property::Id(value) => doc.set_attr(id, "id", &value),
        Property::ClassName(value) => doc.set_attr(id, "class", &value),
        Property::Title(value) => doc.set_attr(id, "title", &value),
        Property::Lang(value) => doc.set_attr(id, "lang", &value),
        Property::Hidden(on) => set_flag(doc, id, "hidden", on),
        Property::Disabled(on) => set_flag(doc, id, "disabled", on),
        Property::TabIndex(index) => doc.set_attr(id, "tabindex", &index.to_string()),
        Property::TextContent(text) => doc.set_text_content(id, &text),
        Property::Attribute { name, value: Some(value) } => doc.set_attr(id, &name, &value),
        Property::Attribute { name, value: None } => doc.remove_attr(id, &name).map(|_| ()),
    }
}

/// Apply properties in order, stopping at the first failure.
pub fn apply_properties(
    doc: &mut Document,
    id: NodeId,
    properties: impl IntoIterator<Item = Property>,
) -> Result<()> {
    for property in properties {
        apply_property(doc, id, property)?;
    }
    Ok(())
}

fn set_flag(doc: &mut Document, id: NodeId, name: &str, on: bool) -> Result<()> {
    if on {
        doc.set_attr(id, name, "")
    } else {
        doc.remove_attr(id, name).map(|_| ())
    }
}

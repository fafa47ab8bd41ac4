// ABOUTME: Inline style access: read, write and remove declarations of an element's style attribute.
// ABOUTME: Property names are used as given (kebab-case); no casing conversion happens here.

use crate::dom::{Document, NodeId};
use crate::error::{DomError, Result};

/// Value of one declaration in the element's `style` attribute.
///
/// Names compare ASCII case-insensitively. The last declaration wins,
/// as in CSS.
pub fn style_property(doc: &Document, id: NodeId, name: &str) -> Option<String> {
    let style = doc.element(id)?.attr("style")?;
    parse_declarations(style)
        .into_iter()
        .rev()
        .find(|(prop, _)| prop.eq_ignore_ascii_case(name))
        .map(|(_, value)| value)
}

/// Set one declaration, replacing any existing ones of the same name.
///
/// An empty value removes the declaration. A value with a top-level `;`
/// or an unclosed quote or parenthesis is rejected.
pub fn set_style_property(doc: &mut Document, id: NodeId, name: &str, value: &str) -> Result<()> {
    let name = name.trim();
    if name.is_empty() || name.contains([':', ';']) {
        return Err(DomError::InvalidAttributeName(name.to_string()));
    }
    let value = value.trim();
    if !is_single_value(value) {
        return Err(DomError::InvalidStyleValue(value.to_string()));
    }
    let element = doc
        .element(id)
        .ok_or_else(|| missing_element(doc, id))?;

    let mut declarations = parse_declarations(element.attr("style").unwrap_or(""));
    let position = declarations
        .iter()
        .position(|(prop, _)| prop.eq_ignore_ascii_case(name));
    declarations.retain(|(prop, _)| !prop.eq_ignore_ascii_case(name));
    if !value.is_empty() {
        let index = position.unwrap_or(declarations.len()).min(declarations.len());
        declarations.insert(index, (name.to_string(), value.to_string()));
    }
    write_declarations(doc, id, &declarations)
}

/// Remove one declaration. Returns its previous value.
pub fn remove_style_property(doc: &mut Document, id: NodeId, name: &str) -> Result<Option<String>> {
    let element = doc
        .element(id)
        .ok_or_else(|| missing_element(doc, id))?;
    let Some(style) = element.attr("style") else {
        return Ok(None);
    };

    let mut declarations = parse_declarations(style);
    let previous = declarations
        .iter()
        .rev()
        .find(|(prop, _)| prop.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.clone());
    if previous.is_some() {
        declarations.retain(|(prop, _)| !prop.eq_ignore_ascii_case(name));
        write_declarations(doc, id, &declarations)?;
    }
    Ok(previous)
}

fn missing_element(doc: &Document, id: NodeId) -> DomError {
    if doc.get(id).is_some() {
        DomError::NotAnElement
    } else {
        DomError::UnknownNode
    }
}

fn write_declarations(doc: &mut Document, id: NodeId, declarations: &[(String, String)]) -> Result<()> {
    if declarations.is_empty() {
        doc.remove_attr(id, "style")?;
        return Ok(());
    }
    let style = declarations
        .iter()
        .map(|(name, value)| format!("{}: {}", name, value))
        .collect::<Vec<_>>()
        .join("; ");
    doc.set_attr(id, "style", &style)
}

// One declaration value: no `;` outside quotes and parentheses, and
// every quote and parenthesis closed.
fn is_single_value(value: &str) -> bool {
    let mut parens = 0usize;
    let mut quote: Option<char> = None;
    for ch in value.chars() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(ch),
            (None, '(') => parens += 1,
            (None, ')') => match parens.checked_sub(1) {
                Some(depth) => parens = depth,
                None => return false,
            },
            (None, ';') if parens == 0 => return false,
            _ => {}
        }
    }
    quote.is_none() && parens == 0
}

/// Split a style attribute into `(name, value)` pairs.
///
/// Semicolons inside quotes or parentheses (`url(a;b)`) do not end a
/// declaration. Declarations without a colon are dropped.
pub(crate) fn parse_declarations(style: &str) -> Vec<(String, String)> {
    let mut declarations = Vec::new();
    let mut current = String::new();
    let mut parens = 0usize;
    let mut quote: Option<char> = None;

    let mut flush = |current: &mut String| {
        if let Some((name, value)) = current.split_once(':') {
            let (name, value) = (name.trim(), value.trim());
            if !name.is_empty() {
                declarations.push((name.to_string(), value.to_string()));
            }
        }
        current.clear();
    };

    for ch in style.chars() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(ch),
            (None, '(') => parens += 1,
            (None, ')') => parens = parens.saturating_sub(1),
            (None, ';') if parens == 0 => {
                flush(&mut current);
                continue;
            }
            _ => {}
        }
        current.push(ch);
    }
    flush(&mut current);
    declarations
}

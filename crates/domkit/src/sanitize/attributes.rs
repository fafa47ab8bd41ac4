// ABOUTME: Attribute classification for the sanitizer: bad, empty, invalid-boolean or kept.
// ABOUTME: Values are entity-decoded and stripped of whitespace/control/format chars before inspection.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::dom::{is_valid_attribute_name, Element};
use crate::options::SanitizeOptions;

/// Attributes whose presence alone carries meaning.
pub const BOOLEAN_ATTRIBUTES: &[&str] = &[
    "async",
    "autofocus",
    "autoplay",
    "checked",
    "controls",
    "default",
    "defer",
    "disabled",
    "formnovalidate",
    "hidden",
    "inert",
    "ismap",
    "itemscope",
    "loop",
    "multiple",
    "muted",
    "nomodule",
    "novalidate",
    "open",
    "playsinline",
    "readonly",
    "required",
    "reversed",
    "selected",
];

// URI schemes allowed in attribute values that otherwise look executable
const SAFE_SCHEMES: &[&str] = &[
    "http", "https", "mailto", "tel", "callto", "sms", "cid", "xmpp", "matrix",
];

// Attributes that load media and may carry data: URIs
const SOURCE_ATTRIBUTES: &[&str] = &["src", "srcset", "poster", "background", "lowsrc", "dynsrc"];

// Document and form members an `id`/`name` value must not shadow.
// Case-sensitive, like the properties they mirror.
const CLOBBERABLE_PROPERTIES: &[&str] = &[
    // document
    "activeElement",
    "all",
    "anchors",
    "body",
    "characterSet",
    "close",
    "cookie",
    "createElement",
    "currentScript",
    "defaultView",
    "documentElement",
    "domain",
    "embeds",
    "forms",
    "getElementById",
    "getElementsByClassName",
    "getElementsByName",
    "getElementsByTagName",
    "head",
    "images",
    "implementation",
    "links",
    "location",
    "open",
    "plugins",
    "querySelector",
    "querySelectorAll",
    "readyState",
    "referrer",
    "scripts",
    "title",
    "URL",
    "write",
    "writeln",
    // form
    "acceptCharset",
    "action",
    "autocomplete",
    "elements",
    "encoding",
    "enctype",
    "length",
    "method",
    "name",
    "noValidate",
    "requestSubmit",
    "reset",
    "submit",
    "target",
    // node
    "attributes",
    "childNodes",
    "cloneNode",
    "getAttribute",
    "hasChildNodes",
    "insertBefore",
    "namespaceURI",
    "nextSibling",
    "nodeName",
    "nodeType",
    "parentNode",
    "removeAttribute",
    "removeChild",
    "setAttribute",
    "textContent",
];

static SCRIPT_PAYLOAD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:data:|[a-z0-9+.\-]+script:)").unwrap());

static SCRIPT_SCHEME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)[a-z0-9+.\-]*script:").unwrap());

/// What to do with one attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Verdict {
    Keep,
    Remove(&'static str),
    /// Rewrite a junk boolean value to `""`.
    Normalize,
}

/// Sanitize every attribute of `element` in place. Returns the number of
/// attributes removed or rewritten.
pub(crate) fn sanitize_attributes(element: &mut Element, options: &SanitizeOptions) -> usize {
    let tag = element.name.clone();
    let mut changed = 0;
    element.attrs.retain_mut(|attr| match classify(&attr.name, &attr.value, options) {
        Verdict::Keep => true,
        Verdict::Remove(reason) => {
            debug!(element = %tag, attribute = %attr.name, reason, "removed attribute");
            changed += 1;
            false
        }
        Verdict::Normalize => {
            debug!(element = %tag, attribute = %attr.name, value = %attr.value, "normalized boolean attribute");
            attr.value.clear();
            changed += 1;
            true
        }
    });
    changed
}

pub(crate) fn classify(name: &str, value: &str, options: &SanitizeOptions) -> Verdict {
    if let Some(reason) = bad_attribute(name, value) {
        return Verdict::Remove(reason);
    }

    let lower = name.to_ascii_lowercase();
    let trimmed = value.trim();
    if !is_boolean_attribute(&lower) {
        if trimmed.is_empty() {
            return Verdict::Remove("empty value");
        }
        return Verdict::Keep;
    }

    let folded = trimmed.to_lowercase();
    if options.sanitize_boolean_attributes && !folded.is_empty() && folded != lower {
        return Verdict::Normalize;
    }
    Verdict::Keep
}

pub fn is_boolean_attribute(name: &str) -> bool {
    BOOLEAN_ATTRIBUTES
        .iter()
        .any(|b| b.eq_ignore_ascii_case(name))
}

/// Why an attribute must go, or `None` if it may stay.
fn bad_attribute(name: &str, value: &str) -> Option<&'static str> {
    if !is_valid_attribute_name(name) || value.contains('\0') {
        return Some("malformed");
    }

    let lower = name.to_ascii_lowercase();
    if lower.starts_with("on") {
        return Some("event handler");
    }
    if (lower == "id" || lower == "name") && CLOBBERABLE_PROPERTIES.contains(&value) {
        return Some("clobbering name");
    }

    let stripped = strip_invisible(&decode_entities(value));
    if !SCRIPT_PAYLOAD.is_match(&stripped) {
        return None;
    }
    if lower.starts_with("aria-") || lower.starts_with("data-") {
        return None;
    }
    if is_safe_uri(&stripped) {
        return None;
    }
    if SOURCE_ATTRIBUTES.contains(&lower.as_str())
        && stripped.to_ascii_lowercase().starts_with("data:")
        && !SCRIPT_SCHEME.is_match(&stripped)
    {
        return None;
    }
    Some("script payload")
}

/// No scheme, or one of the allowed schemes.
fn is_safe_uri(value: &str) -> bool {
    match url::Url::parse(value) {
        Ok(url) => SAFE_SCHEMES.contains(&url.scheme()),
        Err(url::ParseError::RelativeUrlWithoutBase) => true,
        Err(_) => false,
    }
}

/// Remove whitespace, control and Unicode format characters.
fn strip_invisible(s: &str) -> String {
    s.chars()
        .filter(|&c| !(c.is_whitespace() || c.is_control() || is_format_char(c)))
        .collect()
}

// General category Cf
fn is_format_char(c: char) -> bool {
    matches!(
        c,
        '\u{00AD}'
            | '\u{0600}'..='\u{0605}'
            | '\u{061C}'
            | '\u{06DD}'
            | '\u{070F}'
            | '\u{0890}'..='\u{0891}'
            | '\u{08E2}'
            | '\u{180E}'
            | '\u{200B}'..='\u{200F}'
            | '\u{202A}'..='\u{202E}'
            | '\u{2060}'..='\u{2064}'
            | '\u{2066}'..='\u{206F}'
            | '\u{FEFF}'
            | '\u{FFF9}'..='\u{FFFB}'
            | '\u{E0001}'
            | '\u{E0020}'..='\u{E007F}'
    )
}

/// Decode the character references commonly used to disguise a scheme.
///
/// Named references need their `;`; numeric ones may omit it.
pub(crate) fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        match decode_reference(rest) {
            Some((ch, consumed)) => {
                out.push(ch);
                rest = &rest[consumed..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Decode one reference at the start of `s` (which starts with `&`).
fn decode_reference(s: &str) -> Option<(char, usize)> {
    let body = &s[1..];
    if let Some(numeric) = body.strip_prefix('#') {
        let (radix, digits_start) = match numeric.chars().next() {
            Some('x' | 'X') => (16, 1),
            _ => (10, 0),
        };
        let digits: String = numeric[digits_start..]
            .chars()
            .take_while(|c| c.is_digit(radix))
            .collect();
        if digits.is_empty() {
            return None;
        }
        let mut consumed = 2 + digits_start + digits.len();
        if s[consumed..].starts_with(';') {
            consumed += 1;
        }
        let ch = u32::from_str_radix(&digits, radix)
            .ok()
            .and_then(char::from_u32)
            .unwrap_or('\u{FFFD}');
        return Some((ch, consumed));
    }

    const NAMED: &[(&str, char)] = &[
        ("amp;", '&'),
        ("lt;", '<'),
        ("gt;", '>'),
        ("quot;", '"'),
        ("apos;", '\''),
        ("colon;", ':'),
        ("Tab;", '\t'),
        ("NewLine;", '\n'),
        ("nbsp;", '\u{00A0}'),
        ("sol;", '/'),
        ("lpar;", '('),
        ("rpar;", ')'),
        ("period;", '.'),
        ("comma;", ','),
    ];
    NAMED
        .iter()
        .find(|(name, _)| body.starts_with(name))
        .map(|(name, ch)| (*ch, 1 + name.len()))
}

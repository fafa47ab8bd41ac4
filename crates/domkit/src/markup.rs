// ABOUTME: Markup construction: HTML strings or raw bytes into Documents, with a sanitization pass.
// ABOUTME: Parsing goes through scraper/html5ever; TemplateCache is an explicit, caller-owned parse cache.

use std::collections::{HashMap, VecDeque};
use std::path::Path;

use ego_tree::NodeRef;
use scraper::Html;

use crate::dom::{Attribute, Document, Element, Node, NodeId, WRAPPER_TAG};
use crate::error::Result;
use crate::options::{SanitizeOptions, DEFAULT_TEMPLATE_CAPACITY};
use crate::sanitize::sanitize;

/// Nodes built from a markup string, owned together with their document.
#[derive(Debug, Clone)]
pub struct ParsedFragment {
    pub document: Document,
    /// Top-level nodes that survived sanitization, in document order.
    pub nodes: Vec<NodeId>,
}

/// Parse a full HTML document.
pub fn parse_document(html: &str) -> Document {
    let parsed = Html::parse_document(html);
    let mut doc = Document::new();
    let root = doc.root();
    for child in parsed.tree.root().children() {
        import(&mut doc, child, root);
    }
    doc
}

/// Parse an HTML fragment, as if it were the body of some element.
///
/// The content is collected under a temporary wrapper element that is
/// unwrapped before returning, so the fragment root's children are the
/// top-level nodes of the markup.
pub fn parse_fragment(html: &str) -> Document {
    let parsed = Html::parse_fragment(html);
    let mut doc = Document::fragment();
    let root = doc.root();
    let Some(wrapper) = doc.append(root, Node::Element(Element::new(WRAPPER_TAG))) else {
        return doc;
    };

    // parse_fragment yields fragment > html > content
    for child in parsed.root_element().children() {
        import(&mut doc, child, wrapper);
    }
    doc.unwrap(wrapper);
    doc
}

/// Parse markup as a fragment and sanitize it.
pub fn create_nodes(html: &str, options: &SanitizeOptions) -> ParsedFragment {
    let mut document = parse_fragment(html);
    let top_level = document.children(document.root());
    let nodes = sanitize(&mut document, &top_level, options);
    ParsedFragment { document, nodes }
}

/// Decode raw bytes into a string.
///
/// `charset_hint` may be a bare label (`"iso-8859-1"`) or a Content-Type
/// value (`"text/html; charset=iso-8859-1"`). A byte order mark wins over
/// the hint; without either the encoding is detected from the content.
pub fn decode_bytes(bytes: &[u8], charset_hint: Option<&str>) -> String {
    if let Some((encoding, _)) = encoding_rs::Encoding::for_bom(bytes) {
        let (decoded, _, _) = encoding.decode(bytes);
        return decoded.into_owned();
    }

    if let Some(label) = charset_hint.and_then(extract_charset) {
        if let Some(encoding) = encoding_rs::Encoding::for_label(label.as_bytes()) {
            let (decoded, _, _) = encoding.decode(bytes);
            return decoded.into_owned();
        }
        tracing::debug!(label = %label, "unknown charset label, detecting");
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(bytes, true);
    let encoding = detector.guess(None, true);
    let (decoded, _, _) = encoding.decode(bytes);
    decoded.into_owned()
}

/// Read and decode an HTML file.
pub fn read_html_file(path: impl AsRef<Path>) -> Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(decode_bytes(&bytes, None))
}

/// Charset label from a Content-Type value or a bare label.
fn extract_charset(hint: &str) -> Option<String> {
    let lower = hint.trim().to_lowercase();
    if !lower.contains([';', '=', '/']) {
        return (!lower.is_empty()).then_some(lower);
    }
    for part in lower.split(';') {
        if let Some(charset) = part.trim().strip_prefix("charset=") {
            let charset = charset.trim_matches('"').trim_matches('\'');
            return Some(charset.to_string());
        }
    }
    None
}

/// Copy a scraper subtree under `parent`, without recursion.
fn import(doc: &mut Document, source: NodeRef<'_, scraper::Node>, parent: NodeId) {
    let mut stack = vec![(source, parent)];
    while let Some((node, parent)) = stack.pop() {
        let converted = match node.value() {
            // Nested roots only show up at the top; splice their children.
            scraper::Node::Document | scraper::Node::Fragment => {
                for child in node.children().rev() {
                    stack.push((child, parent));
                }
                continue;
            }
            scraper::Node::Doctype(doctype) => Node::Doctype {
                name: doctype.name().to_string(),
                public_id: doctype.public_id().to_string(),
                system_id: doctype.system_id().to_string(),
            },
            scraper::Node::Comment(comment) => Node::Comment(comment.to_string()),
            scraper::Node::Text(text) => Node::Text(text.to_string()),
            scraper::Node::ProcessingInstruction(pi) => Node::ProcessingInstruction {
                target: pi.target.to_string(),
                data: pi.data.to_string(),
            },
            scraper::Node::Element(el) => Node::Element(convert_element(el)),
        };

        let Some(id) = doc.append(parent, converted) else {
            continue;
        };
        for child in node.children().rev() {
            stack.push((child, id));
        }
    }
}

/// Keep the element namespace and attribute prefixes (`xlink:href`).
fn convert_element(el: &scraper::node::Element) -> Element {
    let mut element = Element::new_ns(el.name.ns.clone(), el.name());
    element.attrs = el
        .attrs
        .iter()
        .map(|(name, value)| {
            let name = match &name.prefix {
                Some(prefix) => format!("{}:{}", prefix, name.local),
                None => name.local.to_string(),
            };
            Attribute::new(name, value.to_string())
        })
        .collect();
    element
}

/// Cache of sanitized fragments keyed by their source markup.
///
/// Owned by the caller; nothing is cached implicitly. When full, the
/// oldest entry is evicted. Lookups hand out clones, so cached documents
/// are never mutated by callers.
#[derive(Debug, Clone)]
pub struct TemplateCache {
    capacity: usize,
    options: SanitizeOptions,
    entries: HashMap<String, ParsedFragment>,
    order: VecDeque<String>,
}

impl Default for TemplateCache {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPLATE_CAPACITY)
    }
}

impl TemplateCache {
    /// A cache holding at most `capacity` templates. Zero disables caching.
    pub fn new(capacity: usize) -> Self {
        Self::with_options(capacity, SanitizeOptions::default())
    }

    pub fn with_options(capacity: usize, options: SanitizeOptions) -> Self {
        Self {
            capacity,
            options,
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    /// The cached fragment for `html`, parsing and sanitizing it on a miss.
    pub fn get_or_parse(&mut self, html: &str) -> ParsedFragment {
        if let Some(hit) = self.entries.get(html) {
            return hit.clone();
        }

        let parsed = create_nodes(html, &self.options);
        if self.capacity == 0 {
            return parsed;
        }
        while self.entries.len() >= self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
        }
        self.order.push_back(html.to_string());
        self.entries.insert(html.to_string(), parsed.clone());
        parsed
    }

    pub fn contains(&self, html: &str) -> bool {
        self.entries.contains_key(html)
    }

    /// Drop one template. Returns true if it was cached.
    pub fn evict(&mut self, html: &str) -> bool {
        if self.entries.remove(html).is_none() {
            return false;
        }
        self.order.retain(|key| key != html);
        true
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_fragment_unwraps_wrapper() {
        let doc = parse_fragment("<p>one</p>text<span>two</span>");
        assert_eq!(doc.html(), "<p>one</p>text<span>two</span>");
        assert_eq!(doc.children(doc.root()).len(), 3);
        assert!(!doc.html().contains(WRAPPER_TAG));
    }

    #[test]
    fn test_parse_document_builds_full_tree() {
        let doc = parse_document("<!DOCTYPE html><title>T</title><p id=x>Hi</p>");
        let body = doc.body().unwrap();
        let p = doc.element_children(body)[0];
        assert_eq!(doc.element(p).unwrap().attr("id"), Some("x"));
        assert!(doc.html().starts_with("<!DOCTYPE html><html><head><title>T</title>"));
    }

    #[test]
    fn test_foreign_content_keeps_namespaces() {
        let doc = parse_fragment(r##"<svg><use xlink:href="#icon"></use><style>a{}</style></svg>"##);
        let svg = doc.children(doc.root())[0];
        let svg_el = doc.element(svg).unwrap();
        assert!(!svg_el.value().is_html());

        let uses = doc.children(svg)[0];
        assert_eq!(doc.element(uses).unwrap().attr("xlink:href"), Some("#icon"));
        assert_eq!(
            doc.html(),
            r##"<svg><use xlink:href="#icon"></use><style>a{}</style></svg>"##
        );
    }

    #[test]
    fn test_create_nodes_sanitizes() {
        let parsed = create_nodes(
            "<script>alert(1)</script><b onclick=\"x()\">bold</b><!-- <b> -->",
            &SanitizeOptions::default(),
        );
        assert_eq!(parsed.nodes.len(), 1);
        assert_eq!(parsed.document.html(), "<b>bold</b>");
    }

    #[test]
    fn test_decode_bytes_with_hint() {
        let latin1 = b"caf\xe9";
        assert_eq!(decode_bytes(latin1, Some("text/html; charset=ISO-8859-1")), "café");
        assert_eq!(decode_bytes(latin1, Some("windows-1252")), "café");
    }

    #[test]
    fn test_decode_bytes_bom_and_detection() {
        assert_eq!(decode_bytes(b"\xef\xbb\xbfhi", Some("latin1")), "hi");
        assert_eq!(decode_bytes("plain ascii".as_bytes(), None), "plain ascii");
    }

    #[test]
    fn test_extract_charset() {
        assert_eq!(extract_charset("text/html; charset=\"UTF-8\""), Some("utf-8".to_string()));
        assert_eq!(extract_charset("Shift_JIS"), Some("shift_jis".to_string()));
        assert_eq!(extract_charset("text/html"), None);
    }

    #[test]
    fn test_template_cache_evicts_oldest() {
        let mut cache = TemplateCache::new(2);
        cache.get_or_parse("<a>1</a>");
        cache.get_or_parse("<a>2</a>");
        cache.get_or_parse("<a>3</a>");

        assert_eq!(cache.len(), 2);
        assert!(!cache.contains("<a>1</a>"));
        assert!(cache.contains("<a>3</a>"));

        assert!(cache.evict("<a>2</a>"));
        assert!(!cache.evict("<a>2</a>"));
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_template_cache_returns_independent_copies() {
        let mut cache = TemplateCache::default();
        let mut first = cache.get_or_parse("<p>x</p>");
        let p = first.nodes[0];
        first.document.set_attr(p, "title", "mutated").unwrap();

        let second = cache.get_or_parse("<p>x</p>");
        assert_eq!(second.document.html(), "<p>x</p>");
    }

    #[test]
    fn test_zero_capacity_disables_caching() {
        let mut cache = TemplateCache::new(0);
        let parsed = cache.get_or_parse("<i>x</i>");
        assert_eq!(parsed.nodes.len(), 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_read_html_file_missing() {
        let err = read_html_file("/definitely/not/here.html").unwrap_err();
        assert!(matches!(err, crate::DomError::Io(_)));
    }
}

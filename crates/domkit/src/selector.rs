// ABOUTME: CSS selectors over the document model, backed by the `selectors` crate scraper uses.
// ABOUTME: Implements selectors::Element for ElementRef and keeps a process-wide compiled-selector cache.

//! CSS selectors.
//!
//! Parsing reuses scraper's selector grammar (`scraper::selector::Parser`
//! and its `Simple` implementation), so anything `scraper::Selector`
//! accepts is accepted here: selector lists, compounds, attribute
//! operators, structural pseudo-classes, `:not`, `:is`, `:where`, `:has`
//! and all combinators. Matching runs over [`Document`] through the
//! [`selectors::Element`] implementation for [`ElementRef`].
//!
//! Type and attribute names of HTML elements match ASCII
//! case-insensitively; foreign (SVG, MathML) names are case-sensitive.
//!
//! Parsing a selector is far more expensive than matching one, so
//! [`compile`] keeps a process-wide cache of parsed selectors keyed by
//! source string.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use html5ever::Namespace;
use once_cell::sync::Lazy;
use scraper::error::SelectorErrorKind;
use scraper::selector::{CssLocalName, CssString, NonTSPseudoClass, Parser, PseudoElement, Simple};
use selectors::attr::{AttrSelectorOperation, CaseSensitivity, NamespaceConstraint};
use selectors::bloom::BloomFilter;
use selectors::matching::{self, MatchingContext};
use selectors::parser::{ParseRelative, SelectorList};
use selectors::OpaqueElement;

use crate::dom::{Document, ElementRef, Node, NodeId};
use crate::error::{DomError, Result};

/// A parsed selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    selectors: SelectorList<Simple>,
}

impl Selector {
    /// Parse a selector list.
    pub fn parse(source: &str) -> Result<Selector> {
        let mut input = cssparser::ParserInput::new(source);
        let mut parser = cssparser::Parser::new(&mut input);
        let selectors = SelectorList::parse(&Parser, &mut parser, ParseRelative::No)
            .map_err(|err| DomError::invalid_selector(source, SelectorErrorKind::from(err)))?;

        Ok(Selector {
            source: source.to_string(),
            selectors,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// True if the node is an element matching any selector of the list.
    pub fn matches(&self, doc: &Document, id: NodeId) -> bool {
        let mut caches = matching::SelectorCaches::default();
        self.matches_with_caches(doc, id, &mut caches)
    }

    /// Matching descendants of `scope` (scope excluded), in document order.
    pub fn select(&self, doc: &Document, scope: NodeId) -> Vec<NodeId> {
        let mut caches = matching::SelectorCaches::default();
        doc.descendants(scope)
            .filter(|id| self.matches_with_caches(doc, *id, &mut caches))
            .collect()
    }

    /// First matching descendant of `scope`.
    pub fn select_first(&self, doc: &Document, scope: NodeId) -> Option<NodeId> {
        let mut caches = matching::SelectorCaches::default();
        doc.descendants(scope)
            .find(|id| self.matches_with_caches(doc, *id, &mut caches))
    }

    // Caches are keyed by selector address, so they never outlive `self`.
    fn matches_with_caches(
        &self,
        doc: &Document,
        id: NodeId,
        caches: &mut matching::SelectorCaches,
    ) -> bool {
        let Some(element) = doc.element(id) else {
            return false;
        };
        let mut context = MatchingContext::new(
            matching::MatchingMode::Normal,
            None,
            caches,
            matching::QuirksMode::NoQuirks,
            matching::NeedsSelectorFlags::No,
            matching::MatchingForInvalidation::No,
        );
        self.selectors
            .slice()
            .iter()
            .any(|s| matching::matches_selector(s, 0, None, &element, &mut context))
    }
}

static SELECTOR_CACHE: Lazy<RwLock<HashMap<String, Option<Arc<Selector>>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Gets or compiles a selector, caching the result.
///
/// Returns `None` for invalid selectors; invalid sources are cached too.
pub fn compile(css: &str) -> Option<Arc<Selector>> {
    {
        let cache = SELECTOR_CACHE.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(cached) = cache.get(css) {
            return cached.clone();
        }
    }

    let compiled = match Selector::parse(css) {
        Ok(selector) => Some(Arc::new(selector)),
        Err(err) => {
            tracing::warn!(error = %err, "rejected selector");
            None
        }
    };
    let mut cache = SELECTOR_CACHE
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    cache
        .entry(css.to_string())
        .or_insert(compiled)
        .clone()
}

impl<'a> ElementRef<'a> {
    fn wrap(doc: &'a Document, id: Option<NodeId>) -> Option<Self> {
        doc.element(id?)
    }

    fn sibling_element(&self, forward: bool) -> Option<Self> {
        let node = self.document().tree().get(self.id())?;
        let mut cursor = if forward {
            node.next_sibling()
        } else {
            node.prev_sibling()
        };
        while let Some(sibling) = cursor {
            if sibling.value().is_element() {
                return self.document().element(sibling.id());
            }
            cursor = if forward {
                sibling.next_sibling()
            } else {
                sibling.prev_sibling()
            };
        }
        None
    }

    fn is_html_element(&self) -> bool {
        self.value().is_html()
    }
}

/// Never matches non-tree-structural pseudo-classes.
impl selectors::Element for ElementRef<'_> {
    type Impl = Simple;

    fn opaque(&self) -> OpaqueElement {
        OpaqueElement::new(self.value())
    }

    fn parent_element(&self) -> Option<Self> {
        ElementRef::wrap(self.document(), self.document().parent(self.id()))
    }

    fn parent_node_is_shadow_root(&self) -> bool {
        false
    }

    fn containing_shadow_host(&self) -> Option<Self> {
        None
    }

    fn is_pseudo_element(&self) -> bool {
        false
    }

    fn prev_sibling_element(&self) -> Option<Self> {
        self.sibling_element(false)
    }

    fn next_sibling_element(&self) -> Option<Self> {
        self.sibling_element(true)
    }

    fn first_element_child(&self) -> Option<Self> {
        let node = self.document().tree().get(self.id())?;
        let child = node.children().find(|c| c.value().is_element())?;
        self.document().element(child.id())
    }

    fn is_html_element_in_html_document(&self) -> bool {
        self.is_html_element()
    }

    fn has_local_name(&self, name: &CssLocalName) -> bool {
        if self.is_html_element() {
            self.name().eq_ignore_ascii_case(&name.0)
        } else {
            self.name() == &*name.0
        }
    }

    fn has_namespace(&self, namespace: &Namespace) -> bool {
        &self.value().ns == namespace
    }

    fn is_same_type(&self, other: &Self) -> bool {
        self.value().ns == other.value().ns && self.name() == other.name()
    }

    fn attr_matches(
        &self,
        ns: &NamespaceConstraint<&Namespace>,
        local_name: &CssLocalName,
        operation: &AttrSelectorOperation<&CssString>,
    ) -> bool {
        let is_html = self.is_html_element();
        self.value().attrs.iter().any(|attr| {
            let name_matches = if is_html {
                attr.local_name().eq_ignore_ascii_case(&local_name.0)
            } else {
                attr.local_name() == &*local_name.0
            };
            name_matches
                && !matches!(*ns, NamespaceConstraint::Specific(url) if *url != attr.namespace())
                && operation.eval_str(&attr.value)
        })
    }

    fn match_non_ts_pseudo_class(
        &self,
        _pc: &NonTSPseudoClass,
        _context: &mut MatchingContext<'_, Self::Impl>,
    ) -> bool {
        false
    }

    fn match_pseudo_element(
        &self,
        _pe: &PseudoElement,
        _context: &mut MatchingContext<'_, Self::Impl>,
    ) -> bool {
        false
    }

    fn apply_selector_flags(&self, _flags: matching::ElementSelectorFlags) {}

    fn is_link(&self) -> bool {
        self.is_html_element()
            && matches!(self.name(), "a" | "area" | "link")
            && self.has_attr("href")
    }

    fn is_html_slot_element(&self) -> bool {
        self.is_html_element() && self.name() == "slot"
    }

    fn has_id(&self, id: &CssLocalName, case_sensitivity: CaseSensitivity) -> bool {
        self.value()
            .id()
            .is_some_and(|value| case_sensitivity.eq(id.0.as_bytes(), value.as_bytes()))
    }

    fn has_class(&self, name: &CssLocalName, case_sensitivity: CaseSensitivity) -> bool {
        self.value()
            .classes()
            .any(|class| case_sensitivity.eq(name.0.as_bytes(), class.as_bytes()))
    }

    fn has_custom_state(&self, _name: &CssLocalName) -> bool {
        false
    }

    fn imported_part(&self, _name: &CssLocalName) -> Option<CssLocalName> {
        None
    }

    fn is_part(&self, _name: &CssLocalName) -> bool {
        false
    }

    fn is_empty(&self) -> bool {
        self.document()
            .children(self.id())
            .iter()
            .all(|child| match self.document().get(*child) {
                Some(Node::Element(_)) => false,
                Some(Node::Text(text)) => text.is_empty(),
                _ => true,
            })
    }

    // Top-level elements of a document or fragment.
    fn is_root(&self) -> bool {
        self.document()
            .parent(self.id())
            .and_then(|p| self.document().get(p))
            .is_some_and(|p| matches!(p, Node::Document | Node::Fragment))
    }

    fn add_element_unique_hashes(&self, _filter: &mut BloomFilter) -> bool {
        false
    }
}

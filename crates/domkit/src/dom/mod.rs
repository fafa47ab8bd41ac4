// ABOUTME: In-memory DOM model backed by an ego-tree arena of tagged node variants.
// ABOUTME: Navigation, document-position comparison, attribute mutation and detaching.

//! Document model.
//!
//! A [`Document`] owns an `ego_tree::Tree<Node>`. Nodes are addressed by
//! [`NodeId`] handles which stay valid for the life of the document, even
//! after a node is detached: detached nodes become orphan roots that are
//! no longer reachable from [`Document::root`].

mod serialize;

use std::fmt;

pub use ego_tree::NodeId;
use ego_tree::Tree;
pub use html5ever::Namespace;
use html5ever::ns;

use crate::error::{DomError, Result};

pub use self::serialize::{escape_attr, escape_text, is_void_element};

/// Tag of the temporary element markup construction parses into.
///
/// It never survives parsing; the sanitizer strips any stray copy.
pub const WRAPPER_TAG: &str = "domkit-fragment";

/// A name/value attribute pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// The name without its `xlink:`/`xml:`/`xmlns:` prefix.
    pub fn local_name(&self) -> &str {
        match self.name.split_once(':') {
            Some((prefix, local)) if !attribute_namespace(prefix).is_empty() => local,
            _ => &self.name,
        }
    }

    /// Namespace implied by the prefix; empty for plain attributes.
    pub fn namespace(&self) -> Namespace {
        match self.name.split_once(':') {
            Some((prefix, _)) => attribute_namespace(prefix),
            None if self.name == "xmlns" => ns!(xmlns),
            None => ns!(),
        }
    }
}

fn attribute_namespace(prefix: &str) -> Namespace {
    match prefix {
        "xlink" => ns!(xlink),
        "xml" => ns!(xml),
        "xmlns" => ns!(xmlns),
        _ => ns!(),
    }
}

/// An element: namespace, tag name and attributes in source order.
///
/// Foreign (SVG, MathML) elements keep their namespace so that selector
/// matching and serialization treat them as the parser did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub ns: Namespace,
    pub name: String,
    pub attrs: Vec<Attribute>,
}

impl Element {
    /// An HTML element.
    pub fn new(name: impl Into<String>) -> Self {
        Self::new_ns(ns!(html), name)
    }

    pub fn new_ns(ns: Namespace, name: impl Into<String>) -> Self {
        Self {
            ns,
            name: name.into(),
            attrs: Vec::new(),
        }
    }

    /// Create an element from `(name, value)` pairs.
    pub fn with_attrs<I, K, V>(name: impl Into<String>, attrs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            ns: ns!(html),
            name: name.into(),
            attrs: attrs
                .into_iter()
                .map(|(k, v)| Attribute::new(k, v))
                .collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_html(&self) -> bool {
        self.ns == ns!(html)
    }

    /// True if the tag name equals `name`, ignoring ASCII case.
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// Attribute value by name, ignoring ASCII case.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .map(|a| a.value.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    pub fn attrs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attrs
            .iter()
            .map(|a| (a.name.as_str(), a.value.as_str()))
    }

    /// Set an attribute, replacing the value of an existing one in place.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self
            .attrs
            .iter_mut()
            .find(|a| a.name.eq_ignore_ascii_case(name))
        {
            Some(existing) => existing.value = value,
            None => self.attrs.push(Attribute::new(name, value)),
        }
    }

    /// Remove an attribute, returning its old value.
    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let index = self
            .attrs
            .iter()
            .position(|a| a.name.eq_ignore_ascii_case(name))?;
        Some(self.attrs.remove(index).value)
    }

    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_ascii_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }
}

/// A tree node, tagged by kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Document,
    Fragment,
    Doctype {
        name: String,
        public_id: String,
        system_id: String,
    },
    Comment(String),
    Text(String),
    ProcessingInstruction {
        target: String,
        data: String,
    },
    Element(Element),
}

impl Node {
    pub fn is_element(&self) -> bool {
        matches!(self, Node::Element(_))
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Only documents, fragments and elements hold children.
    pub fn can_have_children(&self) -> bool {
        matches!(self, Node::Document | Node::Fragment | Node::Element(_))
    }
}

/// Where `other` sits relative to `reference`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentPosition {
    Same,
    /// `other` is an ancestor of `reference`.
    Ancestor,
    /// `other` is a descendant of `reference`.
    Descendant,
    /// `other` comes before `reference` in document order.
    Preceding,
    /// `other` comes after `reference` in document order.
    Following,
    /// The nodes do not share a root.
    Disconnected,
}

/// Borrowed view of an element node.
#[derive(Clone, Copy)]
pub struct ElementRef<'a> {
    doc: &'a Document,
    id: NodeId,
    element: &'a Element,
}

impl<'a> ElementRef<'a> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn value(&self) -> &'a Element {
        self.element
    }

    pub fn name(&self) -> &'a str {
        &self.element.name
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element.attr(name)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.element.has_attr(name)
    }

    pub fn document(&self) -> &'a Document {
        self.doc
    }

    pub fn parent_element(&self) -> Option<ElementRef<'a>> {
        let parent = self.doc.parent(self.id)?;
        self.doc.element(parent)
    }
}

impl fmt::Debug for ElementRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementRef")
            .field("id", &self.id)
            .field("name", &self.element.name)
            .finish()
    }
}

/// An HTML document or fragment.
#[derive(Debug, Clone)]
pub struct Document {
    tree: Tree<Node>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// An empty document (root node is [`Node::Document`]).
    pub fn new() -> Self {
        Self {
            tree: Tree::new(Node::Document),
        }
    }

    /// An empty fragment (root node is [`Node::Fragment`]).
    pub fn fragment() -> Self {
        Self {
            tree: Tree::new(Node::Fragment),
        }
    }

    pub fn root(&self) -> NodeId {
        self.tree.root().id()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.tree.get(id).map(|node| node.value())
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(Node::is_element)
    }

    pub fn element(&self, id: NodeId) -> Option<ElementRef<'_>> {
        let element = self.get(id)?.as_element()?;
        Some(ElementRef {
            doc: self,
            id,
            element,
        })
    }

    /// Run `f` against a mutable element, if `id` names one.
    pub(crate) fn with_element_mut<R>(
        &mut self,
        id: NodeId,
        f: impl FnOnce(&mut Element) -> R,
    ) -> Option<R> {
        let mut node = self.tree.get_mut(id)?;
        match node.value() {
            Node::Element(el) => Some(f(el)),
            _ => None,
        }
    }

    /// Append a new node as the last child of `parent`.
    ///
    /// Returns `None` when `parent` is unknown or cannot hold children.
    pub fn append(&mut self, parent: NodeId, node: Node) -> Option<NodeId> {
        let mut parent = self.tree.get_mut(parent)?;
        if !parent.value().can_have_children() {
            return None;
        }
        Some(parent.append(node).id())
    }

    pub fn append_element(
        &mut self,
        parent: NodeId,
        name: &str,
        attrs: &[(&str, &str)],
    ) -> Option<NodeId> {
        let element = Element::with_attrs(name, attrs.iter().copied());
        self.append(parent, Node::Element(element))
    }

    pub fn append_text(&mut self, parent: NodeId, text: &str) -> Option<NodeId> {
        self.append(parent, Node::Text(text.to_string()))
    }

    /// Create a node that is not attached anywhere.
    pub fn create(&mut self, node: Node) -> NodeId {
        self.tree.orphan(node).id()
    }

    /// Move an existing node to the end of `parent`'s children.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        if self.get(child).is_none() {
            return Err(DomError::UnknownNode);
        }
        match self.get(parent) {
            None => return Err(DomError::UnknownNode),
            Some(node) if !node.can_have_children() => return Err(DomError::HierarchyRequest),
            Some(_) => {}
        }
        // Appending an ancestor (or the root) under its own subtree would cycle.
        if child == self.root() || self.contains(child, parent) {
            return Err(DomError::HierarchyRequest);
        }
        if let Some(mut node) = self.tree.get_mut(parent) {
            node.append_id(child);
        }
        Ok(())
    }

    /// Replace `id` with its children, in place.
    pub(crate) fn unwrap(&mut self, id: NodeId) {
        let children = self.children(id);
        if let Some(mut node) = self.tree.get_mut(id) {
            for child in children {
                node.insert_id_before(child);
            }
            node.detach();
        }
    }

    /// Detach a node from its parent. Returns false if it had no parent.
    pub fn detach(&mut self, id: NodeId) -> bool {
        if id == self.root() {
            return false;
        }
        let attached = self.parent(id).is_some();
        if let Some(mut node) = self.tree.get_mut(id) {
            node.detach();
        }
        attached
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.tree.get(id)?.parent().map(|p| p.id())
    }

    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        self.parent(id).filter(|p| self.is_element(*p))
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.tree
            .get(id)
            .map(|node| node.children().map(|c| c.id()).collect())
            .unwrap_or_default()
    }

    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.tree
            .get(id)
            .map(|node| {
                node.children()
                    .filter(|c| c.value().is_element())
                    .map(|c| c.id())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn has_children(&self, id: NodeId) -> bool {
        self.tree.get(id).is_some_and(|node| node.has_children())
    }

    /// Position among all of the parent's children (every node kind counts).
    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let node = self.tree.get(id)?;
        let parent = node.parent()?;
        parent.children().position(|c| c.id() == id)
    }

    pub fn prev_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let mut cursor = self.tree.get(id)?.prev_sibling();
        while let Some(node) = cursor {
            if node.value().is_element() {
                return Some(node.id());
            }
            cursor = node.prev_sibling();
        }
        None
    }

    pub fn next_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let mut cursor = self.tree.get(id)?.next_sibling();
        while let Some(node) = cursor {
            if node.value().is_element() {
                return Some(node.id());
            }
            cursor = node.next_sibling();
        }
        None
    }

    /// Ancestors of `id`, nearest first, excluding `id` itself.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.tree
            .get(id)
            .into_iter()
            .flat_map(|node| node.ancestors())
            .map(|node| node.id())
    }

    /// Descendants of `id` in document order, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.tree
            .get(id)
            .into_iter()
            .flat_map(|node| node.descendants().skip(1))
            .map(|node| node.id())
    }

    /// Inclusive containment: a node contains itself.
    pub fn contains(&self, ancestor: NodeId, id: NodeId) -> bool {
        if self.get(ancestor).is_none() || self.get(id).is_none() {
            return false;
        }
        ancestor == id || self.ancestors(id).any(|a| a == ancestor)
    }

    /// True if `id` is reachable from the document root.
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.contains(self.root(), id)
    }

    /// The first `<body>` element in document order.
    pub fn body(&self) -> Option<NodeId> {
        self.descendants(self.root())
            .find(|id| self.element(*id).is_some_and(|el| el.value().is("body")))
    }

    /// Where `other` sits relative to `reference`.
    pub fn compare_position(&self, reference: NodeId, other: NodeId) -> DocumentPosition {
        if self.get(reference).is_none() || self.get(other).is_none() {
            return DocumentPosition::Disconnected;
        }
        if reference == other {
            return DocumentPosition::Same;
        }

        let mut reference_chain: Vec<NodeId> = std::iter::once(reference)
            .chain(self.ancestors(reference))
            .collect();
        let mut other_chain: Vec<NodeId> =
            std::iter::once(other).chain(self.ancestors(other)).collect();

        if reference_chain.last() != other_chain.last() {
            return DocumentPosition::Disconnected;
        }
        if reference_chain.contains(&other) {
            return DocumentPosition::Ancestor;
        }
        if other_chain.contains(&reference) {
            return DocumentPosition::Descendant;
        }

        reference_chain.reverse();
        other_chain.reverse();
        let shared = reference_chain
            .iter()
            .zip(&other_chain)
            .take_while(|(a, b)| a == b)
            .count();

        let (Some(&reference_branch), Some(&other_branch)) =
            (reference_chain.get(shared), other_chain.get(shared))
        else {
            return DocumentPosition::Disconnected;
        };

        let common = reference_chain[shared - 1];
        for child in self.children(common) {
            if child == reference_branch {
                return DocumentPosition::Following;
            }
            if child == other_branch {
                return DocumentPosition::Preceding;
            }
        }
        DocumentPosition::Disconnected
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) -> Result<()> {
        if !is_valid_attribute_name(name) {
            return Err(DomError::InvalidAttributeName(name.to_string()));
        }
        self.require_element(id)?;
        self.with_element_mut(id, |el| el.set_attr(name, value))
            .ok_or(DomError::NotAnElement)
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) -> Result<Option<String>> {
        self.require_element(id)?;
        self.with_element_mut(id, |el| el.remove_attr(name))
            .ok_or(DomError::NotAnElement)
    }

    fn require_element(&self, id: NodeId) -> Result<()> {
        match self.get(id) {
            None => Err(DomError::UnknownNode),
            Some(Node::Element(_)) => Ok(()),
            Some(_) => Err(DomError::NotAnElement),
        }
    }

    /// Concatenated text of `id` and its descendants.
    pub fn text_content(&self, id: NodeId) -> String {
        match self.get(id) {
            Some(Node::Text(text)) | Some(Node::Comment(text)) => text.clone(),
            Some(_) => self
                .descendants(id)
                .filter_map(|d| match self.get(d) {
                    Some(Node::Text(text)) => Some(text.as_str()),
                    _ => None,
                })
                .collect(),
            None => String::new(),
        }
    }

    /// Replace the children of a container with a single text node, or the
    /// contents of a text/comment node.
    pub fn set_text_content(&mut self, id: NodeId, text: &str) -> Result<()> {
        let mut node = self.tree.get_mut(id).ok_or(DomError::UnknownNode)?;
        match node.value() {
            Node::Text(contents) | Node::Comment(contents) => {
                *contents = text.to_string();
                return Ok(());
            }
            value if !value.can_have_children() => return Err(DomError::NotAnElement),
            _ => {}
        }
        for child in self.children(id) {
            self.detach(child);
        }
        if !text.is_empty() {
            self.append_text(id, text);
        }
        Ok(())
    }

    pub fn outer_html(&self, id: NodeId) -> String {
        serialize::outer_html(self, id)
    }

    pub fn inner_html(&self, id: NodeId) -> String {
        serialize::inner_html(self, id)
    }

    /// Serialize the whole document.
    pub fn html(&self) -> String {
        self.inner_html(self.root())
    }

    pub(crate) fn tree(&self) -> &Tree<Node> {
        &self.tree
    }
}

/// True if `name` can appear as an attribute name in serialized markup.
pub fn is_valid_attribute_name(name: &str) -> bool {
    !name.is_empty()
        && !name.chars().any(|c| {
            c.is_whitespace()
                || c.is_control()
                || matches!(c, '"' | '\'' | '>' | '/' | '=' | '<' | '\u{fffd}')
        })
}

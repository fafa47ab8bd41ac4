// ABOUTME: Error types for domkit: the DomError enum and the crate Result alias.
// ABOUTME: Core tree walks never surface these; setters, selector parsing and file loading do.

use std::fmt;

use thiserror::Error;

/// Errors raised by fallible document operations.
///
/// The sanitizer, distance calculator and finders never return these:
/// they degrade to empty results instead. Errors only surface from
/// explicit setters, [`Selector::parse`](crate::Selector::parse) and
/// file loading.
#[derive(Debug, Error)]
pub enum DomError {
    /// The selector string could not be parsed.
    #[error("invalid selector {selector:?}: {reason}")]
    InvalidSelector { selector: String, reason: String },

    /// The node id does not resolve to a node of this document.
    #[error("unknown node")]
    UnknownNode,

    /// The node exists but is not an element.
    #[error("node is not an element")]
    NotAnElement,

    /// The node cannot be inserted at the requested place.
    #[error("node cannot be inserted there")]
    HierarchyRequest,

    /// The attribute name cannot be represented in markup.
    #[error("invalid attribute name {0:?}")]
    InvalidAttributeName(String),

    /// The value would end its declaration or leak into the next one.
    #[error("invalid style value {0:?}")]
    InvalidStyleValue(String),

    /// Reading markup from disk failed.
    #[error("failed to read markup: {0}")]
    Io(#[from] std::io::Error),
}

impl DomError {
    /// Creates an InvalidSelector error.
    pub fn invalid_selector(selector: impl Into<String>, reason: impl fmt::Display) -> Self {
        DomError::InvalidSelector {
            selector: selector.into(),
            reason: reason.to_string(),
        }
    }

    /// Returns true if this is an InvalidSelector error.
    pub fn is_invalid_selector(&self) -> bool {
        matches!(self, DomError::InvalidSelector { .. })
    }

    /// Returns true if this is an UnknownNode error.
    pub fn is_unknown_node(&self) -> bool {
        matches!(self, DomError::UnknownNode)
    }

    /// Returns true if this is a NotAnElement error.
    pub fn is_not_an_element(&self) -> bool {
        matches!(self, DomError::NotAnElement)
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, DomError>;

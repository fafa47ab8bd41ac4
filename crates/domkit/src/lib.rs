// ABOUTME: Main library entry point for domkit, a DOM utility toolkit over an in-memory HTML tree.
// ABOUTME: Re-exports the public API: Document, Selector, sanitize, distance, find_relatives, find_ancestor.

//! domkit - sanitize HTML and find elements by tree distance.
//!
//! The crate carries its own document model ([`Document`]), CSS
//! selector matching over it ([`Selector`], built on the `selectors`
//! crate) and markup parsing on top of `scraper`/html5ever. On that base
//! it provides:
//!
//! - a structural sanitizer ([`sanitize`], [`sanitize_html`]) that drops
//!   scripts, markup-bearing comments, doctypes, event handlers and
//!   script URIs while keeping safe structure;
//! - [`distance`] between two elements and [`find_relatives`], which
//!   picks the selector matches nearest to an origin in any direction;
//! - [`find_ancestor`], an upward-only search;
//! - focus, inline style and typed property helpers.
//!
//! # Example
//!
//! ```
//! use domkit::{find_relatives, parse_fragment, sanitize_html, SanitizeOptions, Selector};
//!
//! let clean = sanitize_html(
//!     r#"<div hidden="weird" onclick="x()"><a href="javascript:y()">t</a></div>"#,
//!     &SanitizeOptions::default(),
//! );
//! assert_eq!(clean, r#"<div hidden=""><a>t</a></div>"#);
//!
//! let doc = parse_fragment(r#"<form><label>Name</label><input id="name"></form>"#);
//! let input = Selector::parse("#name")?.select_first(&doc, doc.root()).unwrap();
//! let labels = find_relatives(&doc, input, "label", None);
//! assert_eq!(doc.text_content(labels[0]), "Name");
//! # Ok::<(), domkit::DomError>(())
//! ```

pub mod ancestor;
pub mod distance;
pub mod dom;
pub mod error;
pub mod focus;
pub mod markup;
pub mod options;
pub mod props;
pub mod relatives;
pub mod sanitize;
pub mod selector;
pub mod style;

pub use crate::ancestor::{find_ancestor, AncestorQuery};
pub use crate::distance::distance;
pub use crate::dom::{
    Attribute, Document, DocumentPosition, Element, ElementRef, Node, NodeId, WRAPPER_TAG,
};
pub use crate::error::{DomError, Result};
pub use crate::focus::{is_focusable, is_tabbable, tabbable_elements};
pub use crate::markup::{
    create_nodes, decode_bytes, parse_document, parse_fragment, read_html_file, ParsedFragment,
    TemplateCache,
};
pub use crate::options::{SanitizeOptions, SanitizeOptionsBuilder, DEFAULT_TEMPLATE_CAPACITY};
pub use crate::props::{apply_properties, apply_property, Property};
pub use crate::relatives::{find_relatives, find_relatives_with};
pub use crate::sanitize::{sanitize, sanitize_document, sanitize_html};
pub use crate::selector::Selector;
pub use crate::style::{remove_style_property, set_style_property, style_property};

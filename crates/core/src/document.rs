//! Parsed documents and the tree adapter over parser backends.
//!
//! This module provides the [`Document`] and [`Node`] types: a uniform
//! read-only view over a parsed HTML tree regardless of which backend
//! produced it. The rest of the crate is written only against this view.
//!
//! Two HTML5-compliant engines are supported, selected at parse time via
//! [`BackendKind`]. Documents are immutable after construction; nodes are
//! non-owning handles valid for the document's lifetime.
//!
//! # Example
//!
//! ```rust
//! use selectio_core::{BackendKind, Document};
//!
//! let doc = Document::parse("<ul><li>a</li><li>b</li></ul>", BackendKind::Html5Ever);
//! let items = doc.css("li").unwrap();
//! assert_eq!(items.len(), 2);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::selector::{Selector, SelectorList};

/// The parsing engine backing a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    /// The `scraper` crate (html5ever tree construction).
    Html5Ever,
    /// The `dom_query` crate.
    DomQuery,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Html5Ever => write!(f, "html5ever"),
            BackendKind::DomQuery => write!(f, "dom-query"),
        }
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "html5ever" | "scraper" => Ok(BackendKind::Html5Ever),
            "dom-query" | "dom_query" | "domquery" => Ok(BackendKind::DomQuery),
            _ => Err(format!("Unknown backend: {}. Valid options: html5ever, dom-query", s)),
        }
    }
}

/// A parsed HTML document.
///
/// Owns the backend tree. All querying goes through [`Selector`]s borrowed
/// from it; the document is never mutated after parsing, so shared read-only
/// access needs no synchronization.
pub enum Document {
    Html5Ever(scraper::Html),
    DomQuery(dom_query::Document),
}

impl Document {
    /// Parses HTML with the chosen backend.
    ///
    /// Never fails: both engines are error-recovering HTML5 parsers and
    /// produce a valid tree for arbitrary input.
    pub fn parse(html: &str, backend: BackendKind) -> Self {
        match backend {
            BackendKind::Html5Ever => Document::Html5Ever(scraper::Html::parse_document(html)),
            BackendKind::DomQuery => Document::DomQuery(dom_query::Document::from(html)),
        }
    }

    /// The engine that produced this document's tree.
    pub fn backend(&self) -> BackendKind {
        match self {
            Document::Html5Ever(_) => BackendKind::Html5Ever,
            Document::DomQuery(_) => BackendKind::DomQuery,
        }
    }

    /// Handle to the document's root element (`<html>`).
    pub fn root(&self) -> Node<'_> {
        match self {
            Document::Html5Ever(html) => Node::Html5Ever(html.root_element()),
            Document::DomQuery(doc) => {
                let selection = doc.select("html");
                let node = selection
                    .nodes()
                    .first()
                    .cloned()
                    .expect("an html5 tree always has a root element");
                Node::DomQuery(node)
            }
        }
    }

    /// Root [`Selector`] scoped to the whole document.
    pub fn selector(&self) -> Selector<'_> {
        Selector::root(self)
    }

    /// Selects elements from the whole document using a CSS selector.
    ///
    /// Shorthand for `self.selector().css(query)`.
    pub fn css(&self, query: &str) -> Result<SelectorList<'_>> {
        self.selector().css(query)
    }

    /// Selects elements from the whole document using a supported XPath
    /// expression, translated to CSS.
    ///
    /// Shorthand for `self.selector().xpath(query)`.
    pub fn xpath(&self, query: &str) -> Result<SelectorList<'_>> {
        self.selector().xpath(query)
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document").field("backend", &self.backend()).finish_non_exhaustive()
    }
}

/// Opaque handle to an element node in a [`Document`]'s tree.
///
/// Non-owning; valid for the document's lifetime. Handles always refer to
/// element nodes — text is reached through [`Node::text`], never as a
/// separate handle.
#[derive(Clone)]
pub enum Node<'doc> {
    Html5Ever(scraper::ElementRef<'doc>),
    DomQuery(dom_query::NodeRef<'doc>),
}

impl<'doc> Node<'doc> {
    /// Lowercase tag name, or `None` when the backend reports a non-element.
    pub fn tag(&self) -> Option<String> {
        match self {
            Node::Html5Ever(el) => Some(el.value().name().to_lowercase()),
            Node::DomQuery(node) => node.node_name().map(|name| name.to_lowercase()),
        }
    }

    /// Value of the named attribute. Attribute names compare
    /// case-insensitively per HTML semantics.
    pub fn attr(&self, name: &str) -> Option<String> {
        match self {
            Node::Html5Ever(el) => el
                .value()
                .attrs()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.to_string()),
            Node::DomQuery(node) => node
                .attrs()
                .iter()
                .find(|attr| attr.name.local.as_ref().eq_ignore_ascii_case(name))
                .map(|attr| attr.value.to_string()),
        }
    }

    /// All attributes as a name → value map, names lowercased.
    pub fn attrs(&self) -> HashMap<String, String> {
        match self {
            Node::Html5Ever(el) => el
                .value()
                .attrs()
                .map(|(key, value)| (key.to_lowercase(), value.to_string()))
                .collect(),
            Node::DomQuery(node) => node
                .attrs()
                .iter()
                .map(|attr| (attr.name.local.to_lowercase(), attr.value.to_string()))
                .collect(),
        }
    }

    /// Direct element children, in document order.
    pub fn children(&self) -> Vec<Node<'doc>> {
        match self {
            Node::Html5Ever(el) => el
                .children()
                .filter_map(scraper::ElementRef::wrap)
                .map(Node::Html5Ever)
                .collect(),
            Node::DomQuery(node) => dom_query::Selection::from(node.clone())
                .children()
                .nodes()
                .to_vec()
                .into_iter()
                .map(Node::DomQuery)
                .collect(),
        }
    }

    /// Concatenated text content of the subtree, whitespace as produced by
    /// the parser (no normalization).
    pub fn text(&self) -> String {
        match self {
            Node::Html5Ever(el) => el.text().collect(),
            Node::DomQuery(node) => dom_query::Selection::from(node.clone()).text().to_string(),
        }
    }

    /// Outer-HTML serialization of the node.
    pub fn html(&self) -> String {
        match self {
            Node::Html5Ever(el) => el.html(),
            Node::DomQuery(node) => dom_query::Selection::from(node.clone()).html().to_string(),
        }
    }
}

/// Handles compare equal when they refer to the same node of the same tree.
/// Equality is only meaningful between handles from the same document.
impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Node::Html5Ever(a), Node::Html5Ever(b)) => **a == **b,
            (Node::DomQuery(a), Node::DomQuery(b)) => a.id == b.id,
            _ => false,
        }
    }
}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let backend = match self {
            Node::Html5Ever(_) => BackendKind::Html5Ever,
            Node::DomQuery(_) => BackendKind::DomQuery,
        };
        f.debug_struct("Node")
            .field("backend", &backend)
            .field("tag", &self.tag())
            .finish()
    }
}

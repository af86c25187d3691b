//! The public query objects: [`Selector`] and [`SelectorList`].
//!
//! A `Selector` wraps one element node of a [`Document`] and scopes every
//! query to that node's subtree, so query results chain naturally:
//!
//! ```rust
//! use selectio_core::{BackendKind, Document};
//!
//! let doc = Document::parse(
//!     r#"<div id="main"><a href="/x">first</a></div><a href="/y">outside</a>"#,
//!     BackendKind::Html5Ever,
//! );
//! let links = doc.css("#main").unwrap().css("a::attr(href)").unwrap();
//! assert_eq!(links.getall(), vec!["/x"]);
//! ```
//!
//! The `::text` and `::attr(name)` pseudo-elements are stripped before the
//! CSS engine sees the query; they only change what [`Selector::get`] and
//! [`SelectorList::getall`] extract from each match.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::document::{Document, Node};
use crate::error::{Result, SelectioError};
use crate::query::{self, CompiledCss};
use crate::xpath::{Extraction, xpath_to_css};

static ATTR_PSEUDO_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"::attr\(\s*([^)]+?)\s*\)\s*$").unwrap());

/// One matched (or root) element plus the extraction mode its values are
/// read with. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct Selector<'doc> {
    doc: &'doc Document,
    node: Node<'doc>,
    extract: Extraction,
}

impl<'doc> Selector<'doc> {
    /// Selector over the whole document (scope = document root).
    pub fn root(doc: &'doc Document) -> Self {
        Selector { doc, node: doc.root(), extract: Extraction::Node }
    }

    /// Selector scoped to an explicit node handle.
    pub fn from_node(doc: &'doc Document, node: Node<'doc>) -> Self {
        Selector { doc, node, extract: Extraction::Node }
    }

    fn wrap(&self, node: Node<'doc>, extract: Extraction) -> Self {
        Selector { doc: self.doc, node, extract }
    }

    /// The node this selector is scoped to.
    pub fn node(&self) -> &Node<'doc> {
        &self.node
    }

    /// The extraction mode `get`/`getall` will apply.
    pub fn extraction(&self) -> &Extraction {
        &self.extract
    }

    /// Selects elements within this selector's subtree using a CSS
    /// selector.
    ///
    /// Supports trailing `::text` and `::attr(name)` pseudo-elements per
    /// comma-separated part; they set the extraction mode of the resulting
    /// selectors without affecting which elements match. A query consisting
    /// only of a pseudo-element re-wraps the current node (for chained
    /// `sel.css("a").css("::text")` call sites).
    ///
    /// # Errors
    ///
    /// Returns [`SelectioError::SelectorSyntax`] when the stripped query is
    /// not valid CSS.
    pub fn css(&self, query: &str) -> Result<SelectorList<'doc>> {
        let parts: Vec<(String, Extraction)> = query.split(',').map(|part| strip_pseudo(part.trim())).collect();

        // When every part carries the same extraction mode the cleaned parts
        // are rejoined and executed as one selector, which keeps document
        // order and never wraps a node twice across overlapping parts.
        let uniform = parts.iter().all(|(clean, extract)| !clean.is_empty() && *extract == parts[0].1);
        if uniform {
            let joined = parts.iter().map(|(clean, _)| clean.as_str()).collect::<Vec<_>>().join(", ");
            let matcher = self.compile(&joined)?;
            let mut results = Vec::new();
            self.run(&matcher, parts[0].1.clone(), &mut results)?;
            return Ok(SelectorList(results));
        }

        // Mixed extraction modes (or a bare pseudo part): run per part and
        // drop repeats of the same node-and-mode pair.
        let mut results = Vec::new();
        for (clean, extract) in parts {
            if clean.is_empty() {
                push_unique(&mut results, self.wrap(self.node.clone(), extract));
                continue;
            }
            let matcher = self.compile(&clean)?;
            for node in query::execute(&matcher, &self.node)? {
                push_unique(&mut results, self.wrap(node, extract.clone()));
            }
        }
        Ok(SelectorList(results))
    }

    /// Selects elements within this selector's subtree using a supported
    /// XPath expression.
    ///
    /// The expression is translated to CSS first; a trailing `/@attr` or
    /// `/text()` step becomes the extraction mode of the resulting
    /// selectors.
    ///
    /// # Errors
    ///
    /// Returns [`SelectioError::XPathConversion`] unchanged when the
    /// expression is outside the supported grammar. A translated selector
    /// the CSS engine rejects is a translator bug and surfaces as
    /// [`SelectioError::SelectorSyntax`] with internal context.
    pub fn xpath(&self, query: &str) -> Result<SelectorList<'doc>> {
        let translated = xpath_to_css(query)?;
        let matcher = self.compile(&translated.css).map_err(|e| match e {
            SelectioError::SelectorSyntax { selector, message } => SelectioError::SelectorSyntax {
                selector,
                message: format!("internal: translated from XPath '{}': {}", query, message),
            },
            other => other,
        })?;

        let mut results = Vec::new();
        self.run(&matcher, translated.extract, &mut results)?;
        Ok(SelectorList(results))
    }

    fn compile(&self, css: &str) -> Result<CompiledCss> {
        query::compile(css, self.doc.backend())
    }

    fn run(&self, matcher: &CompiledCss, extract: Extraction, out: &mut Vec<Selector<'doc>>) -> Result<()> {
        for node in query::execute(matcher, &self.node)? {
            out.push(self.wrap(node, extract.clone()));
        }
        Ok(())
    }

    /// Extracts this selector's value according to its extraction mode:
    /// outer HTML for plain node matches, the attribute value (empty when
    /// absent) for `::attr`, the subtree text for `::text`.
    pub fn get(&self) -> String {
        match &self.extract {
            Extraction::Node => self.node.html(),
            Extraction::Attribute(name) => self.node.attr(name).unwrap_or_default(),
            Extraction::Text => self.node.text(),
        }
    }

    /// The extracted value as a one-element list.
    pub fn getall(&self) -> Vec<String> {
        vec![self.get()]
    }

    /// Attributes of the wrapped element.
    pub fn attrib(&self) -> HashMap<String, String> {
        self.node.attrs()
    }

    /// Applies a regex to the extracted value and returns all matches.
    ///
    /// When the pattern contains a capture group the first group is taken,
    /// otherwise the whole match.
    pub fn re(&self, pattern: &Regex) -> Vec<String> {
        let value = self.get();
        pattern
            .captures_iter(&value)
            .filter_map(|caps| caps.get(1).or_else(|| caps.get(0)).map(|m| m.as_str().to_string()))
            .collect()
    }

    /// First regex match, or `None`.
    pub fn re_first(&self, pattern: &Regex) -> Option<String> {
        self.re(pattern).into_iter().next()
    }
}

/// Selectors compare equal when they wrap the same node of the same
/// document with the same extraction mode.
impl PartialEq for Selector<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.doc, other.doc) && self.node == other.node && self.extract == other.extract
    }
}

fn push_unique<'doc>(out: &mut Vec<Selector<'doc>>, candidate: Selector<'doc>) {
    if !out.contains(&candidate) {
        out.push(candidate);
    }
}

/// An ordered sequence of [`Selector`], in document order of the match.
///
/// The empty list is valid: every bulk operation degrades gracefully to an
/// empty result or the caller's default, never an error.
#[derive(Debug, Clone, Default)]
pub struct SelectorList<'doc>(Vec<Selector<'doc>>);

impl<'doc> SelectorList<'doc> {
    /// Applies a CSS query to every member and flattens the results.
    pub fn css(&self, query: &str) -> Result<SelectorList<'doc>> {
        let mut results = Vec::new();
        for sel in &self.0 {
            results.extend(sel.css(query)?.0);
        }
        Ok(SelectorList(results))
    }

    /// Applies an XPath query to every member and flattens the results.
    pub fn xpath(&self, query: &str) -> Result<SelectorList<'doc>> {
        let mut results = Vec::new();
        for sel in &self.0 {
            results.extend(sel.xpath(query)?.0);
        }
        Ok(SelectorList(results))
    }

    /// Extracted value of the first selector, or `None` when empty.
    pub fn get(&self) -> Option<String> {
        self.0.first().map(Selector::get)
    }

    /// Extracted value of the first selector, or `default` when empty.
    pub fn get_or(&self, default: &str) -> String {
        self.get().unwrap_or_else(|| default.to_string())
    }

    /// Extracted values of all selectors, in order.
    pub fn getall(&self) -> Vec<String> {
        self.0.iter().map(Selector::get).collect()
    }

    /// Attributes of the first element, or an empty map when the list is
    /// empty.
    pub fn attrib(&self) -> HashMap<String, String> {
        self.0.first().map(Selector::attrib).unwrap_or_default()
    }

    /// Applies a regex to every member's extracted value and flattens the
    /// matches.
    pub fn re(&self, pattern: &Regex) -> Vec<String> {
        self.0.iter().flat_map(|sel| sel.re(pattern)).collect()
    }

    /// First regex match across all members, or `None`.
    pub fn re_first(&self, pattern: &Regex) -> Option<String> {
        self.0.iter().find_map(|sel| sel.re_first(pattern))
    }
}

impl<'doc> std::ops::Deref for SelectorList<'doc> {
    type Target = [Selector<'doc>];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'doc> IntoIterator for SelectorList<'doc> {
    type Item = Selector<'doc>;
    type IntoIter = std::vec::IntoIter<Selector<'doc>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a, 'doc> IntoIterator for &'a SelectorList<'doc> {
    type Item = &'a Selector<'doc>;
    type IntoIter = std::slice::Iter<'a, Selector<'doc>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<'doc> FromIterator<Selector<'doc>> for SelectorList<'doc> {
    fn from_iter<I: IntoIterator<Item = Selector<'doc>>>(iter: I) -> Self {
        SelectorList(iter.into_iter().collect())
    }
}

/// Strip a trailing `::text` / `::attr(name)` pseudo-element from one
/// comma-free selector part.
fn strip_pseudo(part: &str) -> (String, Extraction) {
    if let Some(clean) = part.strip_suffix("::text") {
        return (clean.trim().to_string(), Extraction::Text);
    }
    if let Some(caps) = ATTR_PSEUDO_RE.captures(part) {
        let clean = part[..caps.get(0).map_or(part.len(), |m| m.start())].trim();
        return (clean.to_string(), Extraction::Attribute(caps[1].to_string()));
    }
    (part.to_string(), Extraction::Node)
}

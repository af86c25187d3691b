//! CSS selector compilation and execution.
//!
//! The engine is a thin layer over each backend's matcher: compile turns a
//! selector string into a reusable [`CompiledCss`] (failing with
//! [`SelectioError::SelectorSyntax`] on bad grammar), execute runs it against
//! a scope node and returns matches in document pre-order with no
//! duplicates, the scope itself first when it matches.
//!
//! Pseudo-elements used for extraction hints (`::text`, `::attr(name)`) are
//! stripped by the selector layer before compilation; this engine only ever
//! sees structural CSS.

use std::fmt;

use crate::document::{BackendKind, Node};
use crate::error::{Result, SelectioError};

/// A CSS selector compiled for one backend, reusable across executions.
pub struct CompiledCss {
    source: String,
    inner: CompiledInner,
}

enum CompiledInner {
    Html5Ever(scraper::Selector),
    DomQuery(dom_query::Matcher),
}

impl CompiledCss {
    /// The selector string this matcher was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub(crate) fn backend(&self) -> BackendKind {
        match self.inner {
            CompiledInner::Html5Ever(_) => BackendKind::Html5Ever,
            CompiledInner::DomQuery(_) => BackendKind::DomQuery,
        }
    }
}

impl fmt::Debug for CompiledCss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledCss")
            .field("backend", &self.backend())
            .field("source", &self.source)
            .finish()
    }
}

/// Compile `css` for the given backend.
pub(crate) fn compile(css: &str, backend: BackendKind) -> Result<CompiledCss> {
    let inner = match backend {
        BackendKind::Html5Ever => {
            let selector = scraper::Selector::parse(css)
                .map_err(|e| SelectioError::SelectorSyntax { selector: css.to_string(), message: e.to_string() })?;
            CompiledInner::Html5Ever(selector)
        }
        BackendKind::DomQuery => {
            let matcher = dom_query::Matcher::new(css).map_err(|_| SelectioError::SelectorSyntax {
                selector: css.to_string(),
                message: "not a valid CSS selector".to_string(),
            })?;
            CompiledInner::DomQuery(matcher)
        }
    };

    Ok(CompiledCss { source: css.to_string(), inner })
}

/// Execute a compiled selector against `scope`.
///
/// Returns the scope itself (when it matches) followed by all matching
/// descendants, in document order.
pub(crate) fn execute<'doc>(matcher: &CompiledCss, scope: &Node<'doc>) -> Result<Vec<Node<'doc>>> {
    match (&matcher.inner, scope) {
        (CompiledInner::Html5Ever(selector), Node::Html5Ever(el)) => {
            let mut matches = Vec::new();
            if selector.matches(el) {
                matches.push(Node::Html5Ever(*el));
            }
            matches.extend(el.select(selector).map(Node::Html5Ever));
            Ok(matches)
        }
        (CompiledInner::DomQuery(compiled), Node::DomQuery(node)) => {
            let selection = dom_query::Selection::from(node.clone());
            let mut matches = Vec::new();
            if selection.is_matcher(compiled) {
                matches.push(Node::DomQuery(node.clone()));
            }
            matches.extend(
                selection
                    .select_matcher(compiled)
                    .nodes()
                    .to_vec()
                    .into_iter()
                    .map(Node::DomQuery),
            );
            Ok(matches)
        }
        _ => Err(SelectioError::Select(format!(
            "selector '{}' was compiled for the {} backend",
            matcher.source,
            matcher.backend()
        ))),
    }
}

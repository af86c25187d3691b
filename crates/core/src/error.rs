//! Error types for selectio operations.
//!
//! This module defines the main error type [`SelectioError`] which represents
//! all possible errors that can occur during XPath translation and CSS
//! selector compilation/execution.
//!
//! Extraction methods (`get`/`getall`) never produce errors: absence of a
//! match, attribute, or text value is modeled as `None`/empty, reserving
//! errors strictly for malformed input.
//!
//! # Example
//!
//! ```rust
//! use selectio_core::{SelectioError, xpath_to_css};
//!
//! match xpath_to_css("//div/following-sibling::p") {
//!     Err(SelectioError::XPathConversion { reason, .. }) => {
//!         assert!(reason.contains("following-sibling"));
//!     }
//!     other => panic!("unexpected result: {:?}", other),
//! }
//! ```

use thiserror::Error;

/// Main error type for selector operations.
///
/// All errors are surfaced synchronously to the caller of the operation that
/// triggered them; none are retried internally.
#[derive(Error, Debug)]
pub enum SelectioError {
    /// An XPath expression falls outside the supported grammar subset.
    ///
    /// Raised when the expression uses an axis, predicate, or function the
    /// translator cannot rewrite as CSS, or when a supported predicate's
    /// value would require CSS escaping. Always raised before any document
    /// access; deterministic given the expression alone.
    #[error("Cannot convert XPath '{xpath}': {reason}")]
    XPathConversion {
        /// The full expression that was rejected.
        xpath: String,
        /// The unsupported construct, named.
        reason: String,
        /// What to do instead, when there is a sensible alternative.
        suggestion: Option<String>,
    },

    /// The CSS selector string is not valid selector grammar.
    ///
    /// When the selector was emitted by the XPath translator rather than
    /// supplied by the caller, the message carries an `internal:` prefix
    /// since it indicates a translator bug, not a user error.
    #[error("Invalid CSS selector '{selector}': {message}")]
    SelectorSyntax { selector: String, message: String },

    /// The backend could not execute a syntactically valid selector.
    ///
    /// Non-recoverable for that call; propagated to the caller.
    #[error("Selector execution failed: {0}")]
    Select(String),
}

impl SelectioError {
    pub(crate) fn xpath(xpath: &str, reason: impl Into<String>) -> Self {
        SelectioError::XPathConversion { xpath: xpath.to_string(), reason: reason.into(), suggestion: None }
    }

    pub(crate) fn xpath_with_suggestion(
        xpath: &str,
        reason: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        SelectioError::XPathConversion {
            xpath: xpath.to_string(),
            reason: reason.into(),
            suggestion: Some(suggestion.into()),
        }
    }
}

/// Result type alias for SelectioError.
///
/// This is a convenience alias for `std::result::Result<T, SelectioError>`.
pub type Result<T> = std::result::Result<T, SelectioError>;

//! Response-level integration: parse policy and [`HtmlResponse`].
//!
//! An embedding application (a crawler, a CLI, a pipeline stage) decides per
//! fetched page whether to parse it and with which backend. That decision is
//! an explicit [`ParsePolicy`] value: a process-wide default held in a
//! [`PolicyConfig`], optionally overridden per call. There is no ambient or
//! global state; the core never consults configuration on its own.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::document::{BackendKind, Document};
use crate::error::Result;
use crate::selector::SelectorList;

/// Whether and how a response body should be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParsePolicy {
    /// Do not build a document; queries on the response return empty.
    Disabled,
    /// Parse with the given backend.
    Backend(BackendKind),
}

impl Default for ParsePolicy {
    fn default() -> Self {
        ParsePolicy::Backend(BackendKind::Html5Ever)
    }
}

/// Process-wide parsing configuration.
///
/// Holds the default [`ParsePolicy`]; [`PolicyConfig::resolve`] applies an
/// optional per-call override, which always wins over the default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    default: ParsePolicy,
}

impl PolicyConfig {
    pub fn new(default: ParsePolicy) -> Self {
        PolicyConfig { default }
    }

    /// The configured default policy.
    pub fn default_policy(&self) -> ParsePolicy {
        self.default
    }

    /// The effective policy for one call: the override when given, the
    /// default otherwise.
    pub fn resolve(&self, per_call: Option<ParsePolicy>) -> ParsePolicy {
        per_call.unwrap_or(self.default)
    }
}

/// A fetched HTML page, optionally parsed according to policy.
///
/// Owns the raw body and, when the resolved policy allows, the parsed
/// [`Document`]. An unparsed response is still a valid value — its query
/// methods return empty lists rather than failing, so a pipeline can mix
/// parsed and unparsed responses without branching.
#[derive(Debug)]
pub struct HtmlResponse {
    url: Option<Url>,
    body: String,
    document: Option<Document>,
}

impl HtmlResponse {
    /// Builds a response, parsing `body` per `config.resolve(per_call)`.
    pub fn new(body: String, url: Option<Url>, config: &PolicyConfig, per_call: Option<ParsePolicy>) -> Self {
        let document = match config.resolve(per_call) {
            ParsePolicy::Disabled => None,
            ParsePolicy::Backend(backend) => Some(Document::parse(&body, backend)),
        };
        HtmlResponse { url, body, document }
    }

    /// Builds a response parsed with an explicit backend.
    pub fn parsed(body: String, url: Option<Url>, backend: BackendKind) -> Self {
        let document = Some(Document::parse(&body, backend));
        HtmlResponse { url, body, document }
    }

    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// The parsed document, or `None` when parsing was disabled.
    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    /// Selects from the parsed document with a CSS selector.
    ///
    /// Returns an empty list when parsing was disabled.
    ///
    /// # Errors
    ///
    /// Propagates selector syntax errors from the engine.
    pub fn css(&self, query: &str) -> Result<SelectorList<'_>> {
        match &self.document {
            Some(doc) => doc.css(query),
            None => Ok(SelectorList::default()),
        }
    }

    /// Selects from the parsed document with a supported XPath expression.
    ///
    /// Returns an empty list when parsing was disabled; translation errors
    /// are still reported (the expression is checked before the document).
    ///
    /// # Errors
    ///
    /// Propagates XPath translation and selector syntax errors.
    pub fn xpath(&self, query: &str) -> Result<SelectorList<'_>> {
        match &self.document {
            Some(doc) => doc.xpath(query),
            None => {
                crate::xpath::xpath_to_css(query)?;
                Ok(SelectorList::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::error::SelectioError;

    const BODY: &str = r#"<html><body><a href="/x">link</a></body></html>"#;

    #[test]
    fn test_override_wins_over_default() {
        let config = PolicyConfig::new(ParsePolicy::Disabled);
        assert_eq!(config.resolve(None), ParsePolicy::Disabled);
        assert_eq!(
            config.resolve(Some(ParsePolicy::Backend(BackendKind::DomQuery))),
            ParsePolicy::Backend(BackendKind::DomQuery)
        );

        let config = PolicyConfig::default();
        assert_eq!(config.resolve(None), ParsePolicy::Backend(BackendKind::Html5Ever));
        assert_eq!(config.resolve(Some(ParsePolicy::Disabled)), ParsePolicy::Disabled);
    }

    #[rstest]
    #[case(BackendKind::Html5Ever)]
    #[case(BackendKind::DomQuery)]
    fn test_parsed_response_queries(#[case] backend: BackendKind) {
        let response = HtmlResponse::parsed(BODY.to_string(), None, backend);
        assert!(response.document().is_some());
        assert_eq!(response.css("a::attr(href)").unwrap().getall(), vec!["/x"]);
        assert_eq!(response.xpath("//a/@href").unwrap().getall(), vec!["/x"]);
    }

    #[test]
    fn test_disabled_policy_yields_empty_results() {
        let config = PolicyConfig::new(ParsePolicy::Disabled);
        let response = HtmlResponse::new(BODY.to_string(), None, &config, None);
        assert!(response.document().is_none());
        assert_eq!(response.body(), BODY);
        assert!(response.css("a").unwrap().is_empty());
        assert!(response.xpath("//a").unwrap().is_empty());
    }

    #[test]
    fn test_disabled_still_validates_xpath() {
        let config = PolicyConfig::new(ParsePolicy::Disabled);
        let response = HtmlResponse::new(BODY.to_string(), None, &config, None);
        let err = response.xpath("//a/ancestor::div").unwrap_err();
        assert!(matches!(err, SelectioError::XPathConversion { .. }));
    }

    #[test]
    fn test_url_is_carried() {
        let url = Url::parse("https://example.com/page").unwrap();
        let response = HtmlResponse::parsed(BODY.to_string(), Some(url.clone()), BackendKind::Html5Ever);
        assert_eq!(response.url(), Some(&url));
    }

    #[test]
    fn test_policy_serde_round_trip() {
        let policy = ParsePolicy::Backend(BackendKind::DomQuery);
        let json = serde_json::to_string(&policy).unwrap();
        assert_eq!(serde_json::from_str::<ParsePolicy>(&json).unwrap(), policy);
    }
}

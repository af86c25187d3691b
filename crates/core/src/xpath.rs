//! XPath to CSS translation for common patterns.
//!
//! XPath has no general translation to CSS: CSS cannot express sibling axes,
//! string functions, or positional predicates. Rather than approximate with
//! wrong results, [`xpath_to_css`] enumerates exactly the patterns it can
//! translate exactly and rejects everything else with
//! [`SelectioError::XPathConversion`], so a caller never receives a silently
//! incorrect translation.
//!
//! Supported grammar:
//!
//! - `//TAG` (descendant) and `/TAG` (child) steps, where `TAG` is an element
//!   name or `*`, optionally prefixed with `.` for relative expressions
//! - one predicate per step, of exactly `[@id="V"]` or `[@class="V"]`
//! - a trailing `/@ATTR` step (attribute extraction)
//! - a trailing `/text()` step (text extraction)
//!
//! # Example
//!
//! ```rust
//! use selectio_core::{Extraction, xpath_to_css};
//!
//! let q = xpath_to_css("//ul/li//a/@href").unwrap();
//! assert_eq!(q.css, "ul > li a");
//! assert_eq!(q.extract, Extraction::Attribute("href".to_string()));
//! ```

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Result, SelectioError};

/// What `get`/`getall` should pull out of each matched node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// Return the matched node itself (serialized on extraction).
    Node,
    /// Return the value of the named attribute.
    Attribute(String),
    /// Return the concatenated text content of the subtree.
    Text,
}

/// Output of the XPath translator: a CSS selector string plus the extraction
/// directive implied by a trailing `/@attr` or `/text()` step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedQuery {
    /// Equivalent CSS selector, targeting the element that owns any
    /// extracted attribute or text.
    pub css: String,
    /// How matched nodes should be turned into values.
    pub extract: Extraction,
}

// Step body: tag or wildcard, followed by zero or more bracketed predicates.
static STEP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\*|[a-zA-Z][a-zA-Z0-9_-]*)((?:\[[^\]]*\])*)$").unwrap());

// Exactly [@id=...] or [@class=...] with a single- or double-quoted value.
static PRED_EQ_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^@(id|class)\s*=\s*(?:"([^"]*)"|'([^']*)')$"#).unwrap());

// A value safe to splice into CSS as #value / .value without escaping.
static CSS_IDENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_-]*$").unwrap());

// Attribute-axis step, e.g. @href.
static ATTR_STEP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^@([a-zA-Z_][a-zA-Z0-9_-]*)$").unwrap());

static AXIS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([a-zA-Z][a-zA-Z-]*)::").unwrap());

static FUNC_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([a-zA-Z][a-zA-Z-]*)\s*\(").unwrap());

/// How a step relates to the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    /// Single slash: CSS child combinator (`>`).
    Child,
    /// Double slash: CSS descendant combinator (space).
    Descendant,
}

#[derive(Debug)]
struct Step {
    axis: Axis,
    body: String,
}

/// Convert an XPath expression to a CSS selector plus extraction directive.
///
/// Translation is purely syntactic: it performs no document lookups and
/// cannot fail due to document content. Calling it twice with the same input
/// yields the same output.
///
/// # Errors
///
/// Returns [`SelectioError::XPathConversion`] naming the first unsupported
/// construct when the expression falls outside the supported grammar.
pub fn xpath_to_css(xpath: &str) -> Result<TranslatedQuery> {
    let original = xpath;
    let mut expr = xpath.trim();

    // Relative form used in chained call sites: .//a, ./a
    if let Some(rest) = expr.strip_prefix('.')
        && rest.starts_with('/')
    {
        expr = rest;
    }

    if expr.is_empty() {
        return Err(SelectioError::xpath(original, "empty expression"));
    }
    if !expr.starts_with('/') {
        return Err(SelectioError::xpath(original, "expression must begin with '/' or '//'"));
    }

    let mut steps = tokenize(original, expr)?;
    let extract = take_extraction(original, &mut steps)?;

    // Extraction steps are only valid at the end; anything left over that
    // still looks like one is a structural error.
    for step in &steps {
        if step.body == "text()" {
            return Err(SelectioError::xpath(original, "text() is only allowed as the final step"));
        }
        if step.body.starts_with('@') {
            return Err(SelectioError::xpath(original, "attribute steps are only allowed as the final step"));
        }
    }

    if steps.is_empty() {
        // //text() or //@attr alone: match any element, extract from each.
        return Ok(TranslatedQuery { css: "*".to_string(), extract });
    }

    let mut css = String::new();
    for (i, step) in steps.iter().enumerate() {
        if i > 0 {
            css.push_str(match step.axis {
                Axis::Descendant => " ",
                Axis::Child => " > ",
            });
        }
        css.push_str(&translate_step(original, &step.body)?);
    }

    Ok(TranslatedQuery { css, extract })
}

/// Split the expression into steps, treating `//` as one descendant token
/// and never splitting inside a bracketed predicate.
fn tokenize(original: &str, expr: &str) -> Result<Vec<Step>> {
    let mut steps = Vec::new();
    let chars: Vec<char> = expr.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        debug_assert_eq!(chars[i], '/');
        let axis = if i + 1 < chars.len() && chars[i + 1] == '/' {
            i += 2;
            Axis::Descendant
        } else {
            i += 1;
            Axis::Child
        };

        let start = i;
        let mut depth = 0usize;
        while i < chars.len() {
            match chars[i] {
                '[' => depth += 1,
                ']' => depth = depth.saturating_sub(1),
                '/' if depth == 0 => break,
                _ => {}
            }
            i += 1;
        }

        let body: String = chars[start..i].iter().collect();
        if body.is_empty() {
            return Err(SelectioError::xpath(original, "empty step"));
        }
        steps.push(Step { axis, body });
    }

    Ok(steps)
}

/// Pop a trailing `/text()` or `/@attr` step and return the directive it
/// implies.
fn take_extraction(original: &str, steps: &mut Vec<Step>) -> Result<Extraction> {
    let Some(last) = steps.last() else {
        return Ok(Extraction::Node);
    };

    if last.body == "text()" {
        steps.pop();
        return Ok(Extraction::Text);
    }
    if last.body.starts_with('@') {
        let body = steps.pop().map(|s| s.body).unwrap_or_default();
        let Some(caps) = ATTR_STEP_RE.captures(&body) else {
            return Err(SelectioError::xpath(original, format!("cannot parse attribute step '{}'", body)));
        };
        return Ok(Extraction::Attribute(caps[1].to_string()));
    }

    Ok(Extraction::Node)
}

/// Translate one step body into a CSS simple selector.
fn translate_step(original: &str, body: &str) -> Result<String> {
    if let Some(caps) = AXIS_RE.captures(body) {
        return Err(SelectioError::xpath_with_suggestion(
            original,
            format!("{} axis is not supported", &caps[1]),
            "CSS cannot express this axis; select a broader set and filter the results",
        ));
    }
    if let Some(caps) = FUNC_RE.captures(body) {
        return Err(SelectioError::xpath_with_suggestion(
            original,
            format!("{}() function is not supported", &caps[1]),
            "use a CSS selector directly",
        ));
    }

    let Some(caps) = STEP_RE.captures(body) else {
        return Err(SelectioError::xpath_with_suggestion(
            original,
            format!("cannot parse step '{}'", body),
            "use a CSS selector directly",
        ));
    };

    let tag = &caps[1];
    let predicates = &caps[2];

    if predicates.is_empty() {
        return Ok(tag.to_string());
    }
    if predicates.matches('[').count() > 1 {
        return Err(SelectioError::xpath(original, "more than one predicate on a single step"));
    }

    let predicate = predicates.trim_start_matches('[').trim_end_matches(']').trim();
    let marker = translate_predicate(original, predicate)?;

    if tag == "*" { Ok(marker) } else { Ok(format!("{}{}", tag, marker)) }
}

/// Translate a `@id`/`@class` equality predicate into `#value` / `.value`.
fn translate_predicate(original: &str, predicate: &str) -> Result<String> {
    if predicate.chars().all(|c| c.is_ascii_digit()) && !predicate.is_empty() {
        return Err(SelectioError::xpath_with_suggestion(
            original,
            "positional predicates are not supported",
            "use CSS :nth-of-type() directly",
        ));
    }
    if predicate.contains(" and ") || predicate.contains(" or ") {
        let op = if predicate.contains(" and ") { "and" } else { "or" };
        return Err(SelectioError::xpath(original, format!("{} operator in predicates is not supported", op)));
    }

    let Some(caps) = PRED_EQ_RE.captures(predicate) else {
        return Err(SelectioError::xpath_with_suggestion(
            original,
            format!("unsupported predicate: [{}]", predicate),
            "only [@id=...] and [@class=...] are supported; use a CSS selector for anything else",
        ));
    };

    let value = caps.get(2).or_else(|| caps.get(3)).map(|m| m.as_str()).unwrap_or_default();
    if !CSS_IDENT_RE.is_match(value) {
        return Err(SelectioError::xpath(
            original,
            format!("value '{}' requires CSS escaping, which is not supported", value),
        ));
    }

    match &caps[1] {
        "id" => Ok(format!("#{}", value)),
        _ => Ok(format!(".{}", value)),
    }
}

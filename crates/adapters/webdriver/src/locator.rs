//! Element locators and fallback chains.
//!
//! Console markup differs between plugin versions, so most controls are
//! found through a [`LocatorChain`]: alternatives tried in order, first
//! match wins.

use std::fmt;

use serde::Serialize;

/// A W3C element location strategy.
///
/// Serializes to the `{"using": ..., "value": ...}` body of the find
/// element commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "using", content = "value")]
pub enum Locator {
    #[serde(rename = "css selector")]
    Css(String),
    #[serde(rename = "xpath")]
    XPath(String),
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    pub fn xpath(expression: impl Into<String>) -> Self {
        Self::XPath(expression.into())
    }

    /// Element with the given `id` attribute.
    pub fn id(id: &str) -> Self {
        Self::Css(format!("#{id}"))
    }

    /// Link whose visible text is exactly `text`.
    pub fn link_text(text: &str) -> Self {
        Self::XPath(format!("//a[normalize-space(.)={}]", xpath_literal(text)))
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(selector) => write!(f, "css `{selector}`"),
            Self::XPath(expression) => write!(f, "xpath `{expression}`"),
        }
    }
}

/// Alternatives for one control, tried in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorChain {
    /// What the chain locates, for errors and logs.
    pub name: String,
    pub alternatives: Vec<Locator>,
}

impl LocatorChain {
    pub fn new(name: impl Into<String>, alternatives: Vec<Locator>) -> Self {
        Self {
            name: name.into(),
            alternatives,
        }
    }

    /// A chain with a single alternative.
    pub fn single(name: impl Into<String>, locator: Locator) -> Self {
        Self::new(name, vec![locator])
    }
}

impl fmt::Display for LocatorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Quote `text` as an XPath 1.0 string literal.
///
/// XPath has no escape sequences, so text containing both quote kinds is
/// assembled with `concat()`.
#[must_use]
pub fn xpath_literal(text: &str) -> String {
    if !text.contains('\'') {
        return format!("'{text}'");
    }
    if !text.contains('"') {
        return format!("\"{text}\"");
    }
    let parts: Vec<String> = text
        .split('\'')
        .map(|part| format!("'{part}'"))
        .collect();
    format!("concat({})", parts.join(", \"'\", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_serialize_as_w3c_find_body() {
        let body = serde_json::to_value(Locator::css("#routing_email_0")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "using": "css selector", "value": "#routing_email_0" })
        );
        let body = serde_json::to_value(Locator::xpath("//a")).unwrap();
        assert_eq!(body, serde_json::json!({ "using": "xpath", "value": "//a" }));
    }

    #[test]
    fn should_quote_plain_text() {
        assert_eq!(xpath_literal("Form Settings"), "'Form Settings'");
    }

    #[test]
    fn should_quote_text_with_apostrophe() {
        assert_eq!(xpath_literal("Dealer's Choice"), "\"Dealer's Choice\"");
    }

    #[test]
    fn should_concat_text_with_both_quotes() {
        assert_eq!(
            xpath_literal(r#"a'b"c"#),
            r#"concat('a', "'", 'b"c')"#
        );
    }

    #[test]
    fn should_build_link_text_xpath() {
        assert_eq!(
            Locator::link_text("Notifications"),
            Locator::XPath("//a[normalize-space(.)='Notifications']".to_string())
        );
    }
}

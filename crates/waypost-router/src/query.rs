//! Query-string parse/stringify
//!
//! Keys are kept sorted so that `stringify` is deterministic. A key repeated
//! in the input keeps its last value. A bare key (`?debug`) maps to an empty
//! string.

use std::collections::BTreeMap;

/// Parsed query string
pub type Query = BTreeMap<String, String>;

/// Parses `a=1&b=two%20words` (with or without a leading `?`)
///
/// `+` is read as a space, as browsers encode form values that way.
///
/// # Examples
///
/// ```
/// use waypost_router::query::parse;
///
/// let query = parse("?tab=info&q=hello+world");
/// assert_eq!(query.get("tab").map(String::as_str), Some("info"));
/// assert_eq!(query.get("q").map(String::as_str), Some("hello world"));
/// ```
pub fn parse(input: &str) -> Query {
    input
        .trim_start_matches('?')
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) => (decode(key), decode(value)),
            None => (decode(pair), String::new()),
        })
        .filter(|(key, _)| !key.is_empty())
        .collect()
}

/// Encodes a query map as `a=1&b=two%20words` (no leading `?`)
///
/// # Examples
///
/// ```
/// use waypost_router::query::{stringify, Query};
///
/// let mut query = Query::new();
/// query.insert("tab".into(), "info".into());
/// query.insert("q".into(), "a b".into());
/// assert_eq!(stringify(&query), "q=a%20b&tab=info");
/// ```
pub fn stringify(query: &Query) -> String {
    query
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(value)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Percent-decodes a component, keeping the raw text if it is not valid UTF-8
pub(crate) fn decode(component: &str) -> String {
    let spaced = component.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty() {
        assert!(parse("").is_empty());
        assert!(parse("?").is_empty());
    }

    #[test]
    fn test_parse_bare_key_and_repeats() {
        let query = parse("debug&page=1&page=2");
        assert_eq!(query.get("debug"), Some(&String::new()));
        assert_eq!(query.get("page"), Some(&"2".to_string()));
    }

    #[test]
    fn test_parse_percent_encoded() {
        let query = parse("name=J%C3%BCrgen&path=%2Fdocs%2Fintro");
        assert_eq!(query.get("name"), Some(&"Jürgen".to_string()));
        assert_eq!(query.get("path"), Some(&"/docs/intro".to_string()));
    }

    #[test]
    fn test_stringify_encodes_reserved_characters() {
        let mut query = Query::new();
        query.insert("redirect".into(), "/a?b=c&d".into());
        assert_eq!(stringify(&query), "redirect=%2Fa%3Fb%3Dc%26d");
    }

    #[test]
    fn test_stringify_empty() {
        assert_eq!(stringify(&Query::new()), "");
    }
}

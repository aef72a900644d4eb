/// URL utilities for sanitizing, splitting and base-path handling
///
/// All functions are **pure**: given same input, always produce same output with no side effects.
///
/// Trailing slashes are left alone: `/user/42/` and `/user/42`
/// are different URLs to the matcher.

use std::borrow::Cow;
use url::Url;

/// Replacement for URLs that must never reach the history stack
pub const BLANK_URL: &str = "about:blank";

const BLOCKED_SCHEMES: [&str; 3] = ["javascript", "data", "vbscript"];

/// Neutralizes script-bearing URLs
///
/// Relative URLs and URLs with a harmless scheme come back unchanged
/// (`Cow::Borrowed` when there was nothing to strip). `javascript:`, `data:`
/// and `vbscript:` URLs, as well as empty input, become [`BLANK_URL`].
/// Control and zero-width characters are removed before the scheme check so
/// `java\tscript:` cannot slip through.
///
/// # Examples
///
/// ```
/// use waypost_router::path::{sanitize_url, BLANK_URL};
///
/// assert_eq!(sanitize_url("/users/42?tab=info"), "/users/42?tab=info");
/// assert_eq!(sanitize_url("https://example.com/a"), "https://example.com/a");
/// assert_eq!(sanitize_url("javascript:alert(1)"), BLANK_URL);
/// assert_eq!(sanitize_url("  "), BLANK_URL);
/// ```
pub fn sanitize_url(url: &str) -> Cow<'_, str> {
    let trimmed = url.trim();

    let cleaned: Cow<'_, str> = if trimmed.chars().any(is_invisible) {
        Cow::Owned(trimmed.chars().filter(|c| !is_invisible(*c)).collect())
    } else {
        Cow::Borrowed(trimmed)
    };

    if cleaned.is_empty() {
        return Cow::Borrowed(BLANK_URL);
    }

    if cleaned.starts_with('/') || cleaned.starts_with('.') {
        return cleaned;
    }

    match scheme_of(&cleaned) {
        Some(scheme)
            if BLOCKED_SCHEMES
                .iter()
                .any(|blocked| scheme.eq_ignore_ascii_case(blocked)) =>
        {
            Cow::Borrowed(BLANK_URL)
        }
        _ => cleaned,
    }
}

fn is_invisible(c: char) -> bool {
    c.is_control() || ('\u{2000}'..='\u{200D}').contains(&c) || c == '\u{FEFF}'
}

/// Scheme of a URL: the text before the first `:` provided no `/`, `?` or `#` comes first
fn scheme_of(url: &str) -> Option<&str> {
    let colon = url.find(':')?;
    let scheme = &url[..colon];
    let valid = !scheme.is_empty()
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then_some(scheme)
}

/// Reduces absolute and protocol-relative URLs to their path-and-query form
///
/// Relative URLs are returned unchanged. URLs that fail to parse are also
/// returned unchanged; the matcher will simply not find them.
///
/// # Examples
///
/// ```
/// use waypost_router::path::strip_origin;
///
/// assert_eq!(strip_origin("https://example.com/user/42?tab=info"), "/user/42?tab=info");
/// assert_eq!(strip_origin("//cdn.example.com/docs"), "/docs");
/// assert_eq!(strip_origin("/about"), "/about");
/// ```
pub fn strip_origin(url: &str) -> Cow<'_, str> {
    let parsed = if url.starts_with("//") {
        Url::parse(&format!("http:{url}"))
    } else if url.starts_with("http://") || url.starts_with("https://") {
        Url::parse(url)
    } else {
        return Cow::Borrowed(url);
    };

    match parsed {
        Ok(parsed) => match parsed.query() {
            Some(query) => Cow::Owned(format!("{}?{}", parsed.path(), query)),
            None => Cow::Owned(parsed.path().to_string()),
        },
        Err(_) => Cow::Borrowed(url),
    }
}

/// Resolves a relative target (`login`, `../team`, `?tab=2`) against the
/// current location, the way a browser resolves `pushState` URLs
///
/// Returns `None` for targets that are not relative: absolute paths,
/// protocol-relative and schemed URLs.
///
/// # Examples
///
/// ```
/// use waypost_router::path::resolve_relative;
///
/// assert_eq!(resolve_relative("/account", "login").as_deref(), Some("/login"));
/// assert_eq!(resolve_relative("/org/1/team/2", "../3").as_deref(), Some("/org/1/3"));
/// assert_eq!(resolve_relative("/account", "/login"), None);
/// ```
pub fn resolve_relative(current: &str, target: &str) -> Option<String> {
    if target.starts_with('/') || scheme_of(target).is_some() {
        return None;
    }

    let origin = Url::parse("http://localhost").ok()?;
    let resolved = origin.join(current).ok()?.join(target).ok()?;

    let mut url = resolved.path().to_string();
    if let Some(query) = resolved.query() {
        url.push('?');
        url.push_str(query);
    }
    if let Some(fragment) = resolved.fragment() {
        url.push('#');
        url.push_str(fragment);
    }
    Some(url)
}

/// Splits a URL into its path and raw query string, dropping any fragment
///
/// # Examples
///
/// ```
/// use waypost_router::path::split_url;
///
/// assert_eq!(split_url("/user/42?tab=info#top"), ("/user/42", Some("tab=info")));
/// assert_eq!(split_url("/about#team"), ("/about", None));
/// ```
pub fn split_url(url: &str) -> (&str, Option<&str>) {
    let without_fragment = url.split_once('#').map(|(head, _)| head).unwrap_or(url);

    match without_fragment.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (without_fragment, None),
    }
}

/// Canonical form of a configured base path: `"app"`, `"/app/"` → `"/app"`
///
/// Returns `None` for an empty or root-only base.
pub fn normalize_base(base: &str) -> Option<String> {
    let trimmed = base.trim().trim_matches('/');
    if trimmed.is_empty() {
        None
    } else {
        Some(format!("/{trimmed}"))
    }
}

/// Removes the base prefix from a path
///
/// Returns `None` when the path lives outside the base. The base itself maps
/// to `/`.
///
/// # Examples
///
/// ```
/// use waypost_router::path::strip_base;
///
/// assert_eq!(strip_base("/app/user/42", "/app"), Some("/user/42"));
/// assert_eq!(strip_base("/app", "/app"), Some("/"));
/// assert_eq!(strip_base("/application", "/app"), None);
/// ```
pub fn strip_base<'a>(path: &'a str, base: &str) -> Option<&'a str> {
    if path == base {
        return Some("/");
    }
    path.strip_prefix(base).filter(|rest| rest.starts_with('/'))
}

/// Prepends the base path, leaving paths that already carry it untouched
pub fn join_base(base: Option<&str>, path: &str) -> String {
    match base {
        Some(base) if strip_base(path, base).is_none() => {
            if path == "/" {
                base.to_string()
            } else {
                format!("{base}{path}")
            }
        }
        _ => path.to_string(),
    }
}

/// Segments of a path as the matcher sees them: split on `/`, empty segments kept
///
/// `/user/42` yields `["", "user", "42"]`, so the first real segment sits at
/// index 1 and `/user/42/` has one more segment than `/user/42`.
pub fn raw_segments(path: &str) -> Vec<&str> {
    path.split('/').collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_keeps_relative_urls_borrowed() {
        assert!(matches!(sanitize_url("/docs/intro"), Cow::Borrowed(_)));
        assert!(matches!(sanitize_url("./docs"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_sanitize_blocks_script_schemes() {
        assert_eq!(sanitize_url("JavaScript:alert(1)"), BLANK_URL);
        assert_eq!(sanitize_url("java\tscript:alert(1)"), BLANK_URL);
        assert_eq!(sanitize_url("data:text/html;base64,PHNjcmlwdD4="), BLANK_URL);
        assert_eq!(sanitize_url(" vbscript:msgbox"), BLANK_URL);
    }

    #[test]
    fn test_sanitize_strips_invisible_characters() {
        assert_eq!(sanitize_url("/docs\u{200B}/intro"), "/docs/intro");
        assert_eq!(sanitize_url("mailto:someone@example.com"), "mailto:someone@example.com");
    }

    #[test]
    fn test_strip_origin_without_query() {
        assert_eq!(strip_origin("http://localhost:5173/"), "/");
        assert_eq!(strip_origin("https://example.com/a/b"), "/a/b");
    }

    #[test]
    fn test_resolve_relative() {
        assert_eq!(resolve_relative("/account", "login").as_deref(), Some("/login"));
        assert_eq!(resolve_relative("/about/x", "child").as_deref(), Some("/about/child"));
        assert_eq!(
            resolve_relative("/account?tab=1", "?tab=2").as_deref(),
            Some("/account?tab=2")
        );
        assert_eq!(resolve_relative("/a/b", "./c?x=1#top").as_deref(), Some("/a/c?x=1#top"));
    }

    #[test]
    fn test_resolve_relative_skips_absolute_targets() {
        assert_eq!(resolve_relative("/account", "/login"), None);
        assert_eq!(resolve_relative("/account", "//evil.example/x"), None);
        assert_eq!(resolve_relative("/account", "https://example.com/"), None);
        assert_eq!(resolve_relative("/account", "javascript:alert(1)"), None);
    }

    #[test]
    fn test_split_url_plain_path() {
        assert_eq!(split_url("/"), ("/", None));
        assert_eq!(split_url("/a?"), ("/a", Some("")));
    }

    #[test]
    fn test_normalize_base() {
        assert_eq!(normalize_base("app"), Some("/app".to_string()));
        assert_eq!(normalize_base("/app/"), Some("/app".to_string()));
        assert_eq!(normalize_base("/"), None);
        assert_eq!(normalize_base(""), None);
    }

    #[test]
    fn test_join_base() {
        assert_eq!(join_base(Some("/app"), "/user/1"), "/app/user/1");
        assert_eq!(join_base(Some("/app"), "/app/user/1"), "/app/user/1");
        assert_eq!(join_base(Some("/app"), "/"), "/app");
        assert_eq!(join_base(None, "/user/1"), "/user/1");
    }

    #[test]
    fn test_raw_segments_keep_trailing_slash() {
        assert_eq!(raw_segments("/user/42"), vec!["", "user", "42"]);
        assert_eq!(raw_segments("/user/42/"), vec!["", "user", "42", ""]);
    }
}

/// Segment classification for declared route paths
///
/// Only two kinds of segment exist: literals and single `:name` parameters.
/// There are no optional, catch-all or constrained parameters.
/// All functions are **pure**: same input → same output, no side effects.

/// A single `/`-delimited piece of a declared route path
///
/// # Examples
///
/// ```
/// use waypost_router::route::pattern::{classify_segment, PatternSegment};
///
/// assert_eq!(classify_segment("user"), PatternSegment::Static("user"));
/// assert_eq!(classify_segment(":id"), PatternSegment::Param("id"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternSegment<'a> {
    /// Parameter segment `:name`, carrying the name without the colon
    Param(&'a str),
    /// Literal text, compared verbatim
    Static(&'a str),
}

impl<'a> PatternSegment<'a> {
    pub fn is_param(&self) -> bool {
        matches!(self, PatternSegment::Param(_))
    }
}

/// Classifies one segment (pure function)
///
/// A segment is a parameter when it starts with `:`; everything after the
/// colon is the name. A lone `:` is a parameter with an empty name, which
/// the link builder will then require as `""`.
pub fn classify_segment(segment: &str) -> PatternSegment<'_> {
    match segment.strip_prefix(':') {
        Some(name) => PatternSegment::Param(name),
        None => PatternSegment::Static(segment),
    }
}

/// Names of all parameters declared in a path, in positional order
///
/// # Examples
///
/// ```
/// use waypost_router::route::pattern::param_names;
///
/// assert_eq!(param_names("/org/:orgId/team/:teamId"), vec!["orgId", "teamId"]);
/// assert!(param_names("/about").is_empty());
/// ```
pub fn param_names(path: &str) -> Vec<&str> {
    path.split('/')
        .filter_map(|segment| match classify_segment(segment) {
            PatternSegment::Param(name) => Some(name),
            PatternSegment::Static(_) => None,
        })
        .collect()
}

/// Whether a declared path carries at least one parameter segment
pub fn has_params(path: &str) -> bool {
    path.split('/').any(|segment| classify_segment(segment).is_param())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_static() {
        assert_eq!(classify_segment("docs"), PatternSegment::Static("docs"));
        assert_eq!(classify_segment(""), PatternSegment::Static(""));
    }

    #[test]
    fn test_classify_param() {
        let seg = classify_segment(":teamId");
        assert_eq!(seg, PatternSegment::Param("teamId"));
        assert!(seg.is_param());
    }

    #[test]
    fn test_colon_inside_segment_is_static() {
        assert_eq!(classify_segment("a:b"), PatternSegment::Static("a:b"));
        assert!(!has_params("/time/10:30"));
    }

    #[test]
    fn test_param_names_order() {
        assert_eq!(param_names("/:a/x/:b/:c"), vec!["a", "b", "c"]);
    }
}

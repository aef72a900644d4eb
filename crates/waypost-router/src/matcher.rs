//! URL matching against the flat route table
//!
//! Resolution order, first success wins:
//! 1. strip origin, split off the query string, strip the base path;
//! 2. exact match against routes without parameter segments;
//! 3. prefilter parameterised routes on their first path segment;
//! 4. pick the first candidate with the same number of `/`-delimited
//!    segments as the URL;
//! 5. read parameters positionally from the URL.
//!
//! Matching is coarse. Literal segments after the first one are not
//! compared, so among routes of equal arity sharing a first segment the one
//! registered first wins (`/org/:o/team/:t` shadows `/org/:o/repo/:r`).
//! There is no specificity ranking. Trailing slashes count as an extra empty
//! segment and are not normalized: `/about/` misses the literal `/about`,
//! while `/user/42/` has the arity of `/user/:id/edit` and resolves to it,
//! the empty last segment standing in for `edit`.

use crate::path::{raw_segments, split_url, strip_base, strip_origin};
use crate::query::{self, Query};
use crate::route::pattern::{classify_segment, has_params, PatternSegment};
use crate::route::{FlatRoute, Params, RouteTable};
use tracing::debug;

/// A resolved route with the values extracted for this URL
#[derive(Debug)]
pub struct RouteMatch<'a, C> {
    pub route: &'a FlatRoute<C>,
    pub params: Params,
    pub query: Query,
}

/// Finds the route for `url`, or `None` when nothing matches
///
/// `base` is the normalized base path (see [`crate::path::normalize_base`]);
/// URLs outside it never match.
///
/// # Examples
///
/// ```
/// use waypost_router::matcher::match_url;
/// use waypost_router::route::{PageSpec, RouteSpec, RouteTable, UidGenerator};
///
/// let routes: Vec<RouteSpec<&str>> =
///     vec![PageSpec::new("/user/:id", "User").with_name("User").into()];
/// let table = RouteTable::build(&routes, &mut UidGenerator::new());
///
/// let m = match_url(&table, None, "/user/42?tab=info").unwrap();
/// assert_eq!(m.route.name, "User");
/// assert_eq!(m.params["id"], "42");
/// assert_eq!(m.query["tab"], "info");
///
/// assert!(match_url(&table, None, "/user").is_none());
/// ```
pub fn match_url<'a, C>(
    table: &'a RouteTable<C>,
    base: Option<&str>,
    url: &str,
) -> Option<RouteMatch<'a, C>> {
    let url = strip_origin(url);
    let (full_path, raw_query) = split_url(&url);
    let query = raw_query.map(query::parse).unwrap_or_default();

    let path = match base {
        Some(base) => strip_base(full_path, base)?,
        None => full_path,
    };

    if let Some(route) = table
        .routes()
        .iter()
        .find(|route| route.path == path && !has_params(&route.path))
    {
        debug!(path, route = %route.name, "exact route match");
        return Some(RouteMatch {
            route,
            params: Params::new(),
            query,
        });
    }

    let url_parts = raw_segments(path);
    let lead = url_parts.get(1).copied();

    let route = table
        .routes()
        .iter()
        .filter(|route| has_params(&route.path))
        .filter(|route| shares_lead_segment(&route.path, lead))
        .find(|route| raw_segments(&route.path).len() == url_parts.len())?;

    let params = raw_segments(&route.path)
        .into_iter()
        .zip(url_parts.iter())
        .filter_map(|(segment, value)| match classify_segment(segment) {
            PatternSegment::Param(name) => Some((name.to_string(), decode_segment(value))),
            PatternSegment::Static(_) => None,
        })
        .collect();

    debug!(path, route = %route.name, "parameterised route match");
    Some(RouteMatch {
        route,
        params,
        query,
    })
}

/// Coarse prefilter: the route's first segment equals the URL's, or is itself
/// a parameter
fn shares_lead_segment(route_path: &str, lead: Option<&str>) -> bool {
    match (raw_segments(route_path).get(1).copied(), lead) {
        (Some(segment), Some(lead)) => match classify_segment(segment) {
            PatternSegment::Param(_) => true,
            PatternSegment::Static(literal) => literal == lead,
        },
        _ => false,
    }
}

fn decode_segment(value: &str) -> String {
    urlencoding::decode(value)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::{LayoutSpec, PageSpec, RouteSpec, UidGenerator};

    fn table() -> RouteTable<&'static str> {
        let routes: Vec<RouteSpec<&str>> = vec![
            PageSpec::new("/", "Home").with_name("Home").into(),
            LayoutSpec::new("AboutLayout")
                .with_children([PageSpec::new("about", "About")
                    .with_name("About")
                    .with_children([PageSpec::new("child", "AboutChild").with_name("AboutChild")])])
                .into(),
            PageSpec::new("/user/:id", "User")
                .with_name("User")
                .with_children([PageSpec::new("/edit", "UserEdit").with_name("UserEdit")])
                .into(),
            PageSpec::new("/org/:orgId/team/:teamId", "Team")
                .with_name("Team")
                .into(),
            PageSpec::new("/org/:orgId/repo/:repoId", "Repo")
                .with_name("Repo")
                .into(),
        ];
        RouteTable::build(&routes, &mut UidGenerator::with_seed(1))
    }

    #[test]
    fn test_literal_routes_match_exactly() {
        let table = table();
        for (url, name) in [("/", "Home"), ("/about", "About"), ("/about/child", "AboutChild")] {
            let m = match_url(&table, None, url).unwrap();
            assert_eq!(m.route.name, name);
            assert!(m.params.is_empty());
        }
    }

    #[test]
    fn test_single_param() {
        let table = table();
        let m = match_url(&table, None, "/user/42").unwrap();
        assert_eq!(m.route.name, "User");
        assert_eq!(m.params.get("id"), Some(&"42".to_string()));
        assert!(m.query.is_empty());
    }

    #[test]
    fn test_wrong_arity_does_not_match() {
        let table = table();
        assert!(match_url(&table, None, "/user").is_none());
        assert!(match_url(&table, None, "/org/a").is_none());
    }

    #[test]
    fn test_nested_param_route() {
        let table = table();
        let m = match_url(&table, None, "/user/42/edit").unwrap();
        assert_eq!(m.route.name, "UserEdit");
        assert_eq!(m.params.get("id"), Some(&"42".to_string()));
    }

    #[test]
    fn test_two_params() {
        let table = table();
        let m = match_url(&table, None, "/org/a/team/b").unwrap();
        assert_eq!(m.params.get("orgId"), Some(&"a".to_string()));
        assert_eq!(m.params.get("teamId"), Some(&"b".to_string()));
    }

    #[test]
    fn test_first_registered_wins_on_equal_arity() {
        let table = table();
        let m = match_url(&table, None, "/org/a/repo/b").unwrap();
        assert_eq!(m.route.name, "Team");
        assert_eq!(m.params.get("teamId"), Some(&"b".to_string()));
    }

    #[test]
    fn test_query_is_independent_of_path() {
        let table = table();
        let m = match_url(&table, None, "/user/42?tab=info").unwrap();
        assert_eq!(m.params.get("id"), Some(&"42".to_string()));
        assert_eq!(m.query.get("tab"), Some(&"info".to_string()));

        let m = match_url(&table, None, "/about?ref=nav").unwrap();
        assert_eq!(m.route.name, "About");
        assert_eq!(m.query.get("ref"), Some(&"nav".to_string()));
    }

    #[test]
    fn test_trailing_slash_is_not_normalized() {
        let table = table();
        assert!(match_url(&table, None, "/about/").is_none());

        let m = match_url(&table, None, "/user/42/").unwrap();
        assert_eq!(m.route.name, "UserEdit");
        assert_eq!(m.params.get("id"), Some(&"42".to_string()));
    }

    #[test]
    fn test_absolute_urls_are_reduced_to_path() {
        let table = table();
        let m = match_url(&table, None, "https://example.com/user/9?tab=x").unwrap();
        assert_eq!(m.route.name, "User");
        assert_eq!(m.params.get("id"), Some(&"9".to_string()));
        assert_eq!(m.query.get("tab"), Some(&"x".to_string()));
    }

    #[test]
    fn test_base_path_is_stripped() {
        let table = table();
        let m = match_url(&table, Some("/app"), "/app/user/5").unwrap();
        assert_eq!(m.route.name, "User");
        assert_eq!(match_url(&table, Some("/app"), "/app").unwrap().route.name, "Home");
        assert!(match_url(&table, Some("/app"), "/user/5").is_none());
    }

    #[test]
    fn test_param_values_are_decoded() {
        let table = table();
        let m = match_url(&table, None, "/user/a%20b").unwrap();
        assert_eq!(m.params.get("id"), Some(&"a b".to_string()));
    }

    #[test]
    fn test_leading_param_route() {
        let routes: Vec<RouteSpec<&str>> = vec![
            PageSpec::new("/about", "About").with_name("About").into(),
            PageSpec::new("/:slug", "Slug").with_name("Slug").into(),
        ];
        let table = RouteTable::build(&routes, &mut UidGenerator::with_seed(1));

        assert_eq!(match_url(&table, None, "/about").unwrap().route.name, "About");
        let m = match_url(&table, None, "/pricing").unwrap();
        assert_eq!(m.route.name, "Slug");
        assert_eq!(m.params.get("slug"), Some(&"pricing".to_string()));
    }

    #[test]
    fn test_unknown_path() {
        let table = table();
        assert!(match_url(&table, None, "/nowhere").is_none());
        assert!(match_url(&table, None, "/nowhere/1").is_none());
    }
}

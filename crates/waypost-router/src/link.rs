//! Link/path building for named routes
//!
//! Turns `{name, params, query}` back into a concrete URL. Validation runs in
//! a fixed order so the reported error is predictable:
//! 1. the route exists,
//! 2. params are supplied when the route declares any,
//! 3. no supplied key is undeclared,
//! 4. the supplied and declared counts agree.

use crate::error::LinkError;
use crate::path::join_base;
use crate::query::{self, Query};
use crate::route::pattern::{classify_segment, param_names, PatternSegment};
use crate::route::{Params, RouteTable};

/// Reference to a named route
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteRef {
    pub name: String,
    pub params: Option<Params>,
    pub query: Option<Query>,
}

impl RouteRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: None,
            query: None,
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params
            .get_or_insert_with(Params::new)
            .insert(key.into(), value.to_string());
        self
    }

    pub fn with_params(mut self, params: Params) -> Self {
        self.params.get_or_insert_with(Params::new).extend(params);
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query
            .get_or_insert_with(Query::new)
            .insert(key.into(), value.to_string());
        self
    }
}

/// Navigation target: a literal path or a named route
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigate {
    Path(String),
    Named(RouteRef),
}

impl From<&str> for Navigate {
    fn from(path: &str) -> Self {
        Navigate::Path(path.to_string())
    }
}

impl From<String> for Navigate {
    fn from(path: String) -> Self {
        Navigate::Path(path)
    }
}

impl From<RouteRef> for Navigate {
    fn from(route: RouteRef) -> Self {
        Navigate::Named(route)
    }
}

/// Builds the concrete URL for a named route
///
/// Parameter values are percent-encoded; the base path, when configured, is
/// prepended.
///
/// # Examples
///
/// ```
/// use waypost_router::link::{build_link, RouteRef};
/// use waypost_router::route::{PageSpec, RouteSpec, RouteTable, UidGenerator};
///
/// let routes: Vec<RouteSpec<&str>> =
///     vec![PageSpec::new("/user/:id", "User").with_name("User").into()];
/// let table = RouteTable::build(&routes, &mut UidGenerator::new());
///
/// let url = build_link(&table, None, &RouteRef::new("User").with_param("id", 42)).unwrap();
/// assert_eq!(url, "/user/42");
///
/// let url = build_link(
///     &table,
///     Some("/app"),
///     &RouteRef::new("User").with_param("id", 7).with_query("tab", "info"),
/// )
/// .unwrap();
/// assert_eq!(url, "/app/user/7?tab=info");
/// ```
pub fn build_link<C>(
    table: &RouteTable<C>,
    base: Option<&str>,
    route: &RouteRef,
) -> Result<String, LinkError> {
    let flat = table
        .get(&route.name)
        .ok_or_else(|| LinkError::UnknownRoute(route.name.clone()))?;

    let declared = param_names(&flat.path);
    let empty = Params::new();
    let supplied = route.params.as_ref().unwrap_or(&empty);

    if !declared.is_empty() && supplied.is_empty() {
        return Err(LinkError::MissingParams {
            name: route.name.clone(),
            expected: owned(&declared),
        });
    }

    let mut unexpected: Vec<String> = supplied
        .keys()
        .filter(|key| !declared.contains(&key.as_str()))
        .cloned()
        .collect();
    if !unexpected.is_empty() {
        unexpected.sort();
        return Err(LinkError::UnexpectedParams {
            name: route.name.clone(),
            unexpected,
        });
    }

    if supplied.len() != declared.len() {
        let mut passed: Vec<String> = supplied.keys().cloned().collect();
        passed.sort();
        return Err(LinkError::ParamCountMismatch {
            name: route.name.clone(),
            expected: owned(&declared),
            supplied: passed,
        });
    }

    let path = flat
        .path
        .split('/')
        .map(|segment| match classify_segment(segment) {
            PatternSegment::Param(key) => supplied
                .get(key)
                .map(|value| urlencoding::encode(value).into_owned())
                .unwrap_or_default(),
            PatternSegment::Static(literal) => literal.to_string(),
        })
        .collect::<Vec<_>>()
        .join("/");

    let path = if path.starts_with('/') {
        path
    } else {
        format!("/{path}")
    };

    let mut url = join_base(base, &path);
    if let Some(query) = route.query.as_ref().filter(|q| !q.is_empty()) {
        url.push('?');
        url.push_str(&query::stringify(query));
    }

    Ok(url)
}

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::{PageSpec, RouteSpec, UidGenerator};

    fn table() -> RouteTable<&'static str> {
        let routes: Vec<RouteSpec<&str>> = vec![
            PageSpec::new("/", "Home").with_name("Home").into(),
            PageSpec::new("/user/:id", "User").with_name("User").into(),
            PageSpec::new("/org/:orgId/team/:teamId", "Team")
                .with_name("Team")
                .into(),
        ];
        RouteTable::build(&routes, &mut UidGenerator::with_seed(1))
    }

    #[test]
    fn test_unknown_route() {
        let err = build_link(&table(), None, &RouteRef::new("Nope")).unwrap_err();
        assert_eq!(err, LinkError::UnknownRoute("Nope".into()));
    }

    #[test]
    fn test_missing_params() {
        let err = build_link(&table(), None, &RouteRef::new("User")).unwrap_err();
        assert_eq!(
            err,
            LinkError::MissingParams {
                name: "User".into(),
                expected: vec!["id".into()],
            }
        );
    }

    #[test]
    fn test_unexpected_params() {
        let route = RouteRef::new("User").with_param("id", 1).with_param("extra", 2);
        let err = build_link(&table(), None, &route).unwrap_err();
        assert_eq!(
            err,
            LinkError::UnexpectedParams {
                name: "User".into(),
                unexpected: vec!["extra".into()],
            }
        );
    }

    #[test]
    fn test_params_on_literal_route_are_unexpected() {
        let route = RouteRef::new("Home").with_param("id", 1);
        let err = build_link(&table(), None, &route).unwrap_err();
        assert!(matches!(err, LinkError::UnexpectedParams { .. }));
    }

    #[test]
    fn test_count_mismatch() {
        let route = RouteRef::new("Team").with_param("orgId", "a");
        let err = build_link(&table(), None, &route).unwrap_err();
        assert_eq!(
            err,
            LinkError::ParamCountMismatch {
                name: "Team".into(),
                expected: vec!["orgId".into(), "teamId".into()],
                supplied: vec!["orgId".into()],
            }
        );
    }

    #[test]
    fn test_reconstructs_declared_path() {
        let route = RouteRef::new("Team")
            .with_param("orgId", "a")
            .with_param("teamId", "b");
        assert_eq!(build_link(&table(), None, &route).unwrap(), "/org/a/team/b");
        assert_eq!(build_link(&table(), None, &RouteRef::new("Home")).unwrap(), "/");
    }

    #[test]
    fn test_encodes_param_values() {
        let route = RouteRef::new("User").with_param("id", "a b/c");
        assert_eq!(build_link(&table(), None, &route).unwrap(), "/user/a%20b%2Fc");
    }

    #[test]
    fn test_empty_query_is_not_appended() {
        let mut route = RouteRef::new("Home");
        route.query = Some(Query::new());
        assert_eq!(build_link(&table(), None, &route).unwrap(), "/");
    }

    #[test]
    fn test_base_prefix() {
        assert_eq!(
            build_link(&table(), Some("/app"), &RouteRef::new("Home")).unwrap(),
            "/app"
        );
    }
}

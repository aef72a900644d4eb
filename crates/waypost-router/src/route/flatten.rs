/// Route tree flattening
///
/// Walks the declared tree once, depth-first, and produces:
/// - an ordered list of [`FlatRoute`]s (pages only, fully-qualified paths),
/// - a name → index lookup,
/// - an arena of [`FlatLayout`]s that pages point back to by [`LayoutId`].
///
/// Pages are registered in pre-order (a page before its children). When two
/// pages share a name, the first one visited stays registered and the later
/// one is dropped from the table.

use crate::hook::BeforeLoad;
use crate::route::spec::{Component, PageSpec, RouteSpec};
use crate::route::Props;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Characters used for generated route names
const UID_ALPHABET: &[u8] = b"qwertyuiopasdfghjklzxcvbnm1234567890_-";

/// Length of generated route names
const UID_LEN: usize = 9;

/// Index of a layout in the table's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayoutId(pub usize);

/// A layout as seen by the pages below it
pub struct FlatLayout<C> {
    pub component: Component<C>,
    pub before_load: Option<Arc<dyn BeforeLoad>>,
    pub props: Props,
}

/// A resolvable page
pub struct FlatRoute<C> {
    /// Never absent after flattening
    pub name: String,
    /// Absolute path, ancestors' page segments included, base path excluded
    pub path: String,
    pub component: Component<C>,
    pub before_load: Option<Arc<dyn BeforeLoad>>,
    pub props: Props,
    /// Nested declarations, handed to the mount collaborator untouched
    pub children: Vec<RouteSpec<C>>,
    /// Nearest enclosing layout
    pub layout: Option<LayoutId>,
}

/// Generator for route names that were not declared
///
/// Not cryptographic; names only need to be unique within one table.
pub struct UidGenerator {
    rng: fastrand::Rng,
}

impl UidGenerator {
    pub fn new() -> Self {
        Self {
            rng: fastrand::Rng::new(),
        }
    }

    /// Deterministic generator, for reproducible tables
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    /// Draws names until one is not `taken`
    pub fn next_unique(&mut self, taken: impl Fn(&str) -> bool) -> String {
        loop {
            let candidate: String = (0..UID_LEN)
                .map(|_| UID_ALPHABET[self.rng.usize(..UID_ALPHABET.len())] as char)
                .collect();
            if !taken(&candidate) {
                return candidate;
            }
        }
    }
}

impl Default for UidGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Flat lookup table built from a declared tree
pub struct RouteTable<C> {
    routes: Vec<FlatRoute<C>>,
    index: HashMap<String, usize>,
    layouts: Vec<FlatLayout<C>>,
}

impl<C: Clone> RouteTable<C> {
    /// Flattens a declared tree
    ///
    /// The declared tree is only read; every table entry is an owned copy.
    ///
    /// # Examples
    ///
    /// ```
    /// use waypost_router::route::{LayoutSpec, PageSpec, RouteSpec, RouteTable, UidGenerator};
    ///
    /// let routes: Vec<RouteSpec<&str>> = vec![
    ///     PageSpec::new("/", "Home").with_name("Home").into(),
    ///     LayoutSpec::new("AboutLayout")
    ///         .with_children([PageSpec::new("about", "About")
    ///             .with_name("About")
    ///             .with_children([PageSpec::new("child", "AboutChild").with_name("AboutChild")])])
    ///         .into(),
    /// ];
    ///
    /// let table = RouteTable::build(&routes, &mut UidGenerator::with_seed(1));
    /// assert_eq!(table.get("AboutChild").unwrap().path, "/about/child");
    /// assert!(table.get("About").unwrap().layout.is_some());
    /// assert!(table.get("Home").unwrap().layout.is_none());
    /// ```
    pub fn build(routes: &[RouteSpec<C>], uid: &mut UidGenerator) -> Self {
        let mut table = Self {
            routes: Vec::new(),
            index: HashMap::new(),
            layouts: Vec::new(),
        };
        table.walk(routes, None, "", uid);
        debug!(
            routes = table.routes.len(),
            layouts = table.layouts.len(),
            "flattened route tree"
        );
        table
    }

    fn walk(
        &mut self,
        nodes: &[RouteSpec<C>],
        layout: Option<LayoutId>,
        prefix: &str,
        uid: &mut UidGenerator,
    ) {
        for node in nodes {
            match node {
                RouteSpec::Page(page) => {
                    let path = join_paths(prefix, &page.path);
                    self.register(page, &path, layout, uid);
                    if !page.children.is_empty() {
                        self.walk(&page.children, layout, &path, uid);
                    }
                }
                RouteSpec::Layout(spec) => {
                    let id = LayoutId(self.layouts.len());
                    self.layouts.push(FlatLayout {
                        component: spec.component.clone(),
                        before_load: spec.before_load.clone(),
                        props: spec.props.clone(),
                    });
                    // Layouts contribute no path segment
                    self.walk(&spec.children, Some(id), prefix, uid);
                }
            }
        }
    }

    fn register(
        &mut self,
        page: &PageSpec<C>,
        path: &str,
        layout: Option<LayoutId>,
        uid: &mut UidGenerator,
    ) {
        let name = match &page.name {
            Some(name) => name.clone(),
            None => uid.next_unique(|candidate| self.index.contains_key(candidate)),
        };

        if self.index.contains_key(&name) {
            warn!(name = %name, path = %path, "duplicate route name; keeping the first declaration");
            return;
        }

        self.index.insert(name.clone(), self.routes.len());
        self.routes.push(FlatRoute {
            name,
            path: path.to_string(),
            component: page.component.clone(),
            before_load: page.before_load.clone(),
            props: page.props.clone(),
            children: page.children.clone(),
            layout,
        });
    }
}

impl<C> RouteTable<C> {
    /// Registered pages in registration order
    pub fn routes(&self) -> &[FlatRoute<C>] {
        &self.routes
    }

    pub fn get(&self, name: &str) -> Option<&FlatRoute<C>> {
        self.index.get(name).map(|&i| &self.routes[i])
    }

    pub fn layout(&self, id: LayoutId) -> Option<&FlatLayout<C>> {
        self.layouts.get(id.0)
    }

    /// Layout enclosing the given page, if any
    pub fn layout_of(&self, route: &FlatRoute<C>) -> Option<&FlatLayout<C>> {
        route.layout.and_then(|id| self.layout(id))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl<C> Default for RouteTable<C> {
    fn default() -> Self {
        Self {
            routes: Vec::new(),
            index: HashMap::new(),
            layouts: Vec::new(),
        }
    }
}

/// Resolves a declared page path against the inherited prefix
///
/// A missing leading `/` is added; a root prefix (`/`) does not double the
/// slash.
fn join_paths(prefix: &str, path: &str) -> String {
    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    };

    match prefix {
        "" | "/" => path,
        _ => format!("{prefix}{path}"),
    }
}

impl<C: Clone> Clone for FlatLayout<C> {
    fn clone(&self) -> Self {
        Self {
            component: self.component.clone(),
            before_load: self.before_load.clone(),
            props: self.props.clone(),
        }
    }
}

impl<C: Clone> Clone for FlatRoute<C> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            path: self.path.clone(),
            component: self.component.clone(),
            before_load: self.before_load.clone(),
            props: self.props.clone(),
            children: self.children.clone(),
            layout: self.layout,
        }
    }
}

impl<C> fmt::Debug for FlatRoute<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlatRoute")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("component", &self.component)
            .field("has_before_load", &self.before_load.is_some())
            .field("layout", &self.layout)
            .finish()
    }
}

impl<C> fmt::Debug for RouteTable<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteTable")
            .field("routes", &self.routes)
            .field("layouts", &self.layouts.len())
            .finish()
    }
}

/// Author-facing route declarations
///
/// A route tree is a list of [`RouteSpec`] nodes. Each node is exactly one
/// of a page (has a path) or a layout (has no path; wraps its descendants
/// with a component and an inherited hook). The tree is never mutated by the
/// router: flattening reads it and builds its own table.

use crate::hook::{BeforeLoad, HookContext, HookOutcome};
use crate::route::Props;
use async_trait::async_trait;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

// ============================================================================
// Components
// ============================================================================

/// Produces a component on demand (code-split pages)
#[async_trait]
pub trait ComponentLoader<C>: Send + Sync {
    async fn load(&self) -> anyhow::Result<C>;
}

#[async_trait]
impl<C, F, Fut> ComponentLoader<C> for F
where
    C: Send + 'static,
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<C>> + Send + 'static,
{
    async fn load(&self) -> anyhow::Result<C> {
        (self)().await
    }
}

/// Reference to the thing the host framework mounts
///
/// `C` is opaque to the router; it is only cloned and handed back.
pub enum Component<C> {
    /// Eager reference, available immediately
    Sync(C),
    /// Loaded when the route is rendered
    Async(Arc<dyn ComponentLoader<C>>),
}

impl<C: Clone + Send + 'static> Component<C> {
    /// Wraps an async loader closure
    pub fn lazy<F, Fut>(loader: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<C>> + Send + 'static,
    {
        Component::Async(Arc::new(loader))
    }

    /// Yields the component, awaiting the loader only in the async case
    pub async fn resolve(&self) -> anyhow::Result<C> {
        match self {
            Component::Sync(component) => Ok(component.clone()),
            Component::Async(loader) => loader.load().await,
        }
    }

    pub fn is_async(&self) -> bool {
        matches!(self, Component::Async(_))
    }
}

impl<C: Clone> Clone for Component<C> {
    fn clone(&self) -> Self {
        match self {
            Component::Sync(component) => Component::Sync(component.clone()),
            Component::Async(loader) => Component::Async(Arc::clone(loader)),
        }
    }
}

impl<C> fmt::Debug for Component<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Sync(_) => f.write_str("Component::Sync"),
            Component::Async(_) => f.write_str("Component::Async"),
        }
    }
}

// ============================================================================
// Tree nodes
// ============================================================================

/// A routable page
pub struct PageSpec<C> {
    /// Segment (`"about"`) or absolute path (`"/user/:id"`); nested pages
    /// are resolved against their parent page's path
    pub path: String,
    /// Unique identifier used by named navigation; generated when absent
    pub name: Option<String>,
    pub component: Component<C>,
    pub before_load: Option<Arc<dyn BeforeLoad>>,
    /// Static props; hook props with the same key override them
    pub props: Props,
    pub children: Vec<RouteSpec<C>>,
}

/// A wrapper contributing a component and a hook, but no path segment
pub struct LayoutSpec<C> {
    pub component: Component<C>,
    pub before_load: Option<Arc<dyn BeforeLoad>>,
    pub props: Props,
    pub children: Vec<RouteSpec<C>>,
}

/// One node of the declared tree
pub enum RouteSpec<C> {
    Page(PageSpec<C>),
    Layout(LayoutSpec<C>),
}

impl<C> RouteSpec<C> {
    pub fn is_layout(&self) -> bool {
        matches!(self, RouteSpec::Layout(_))
    }

    pub fn children(&self) -> &[RouteSpec<C>] {
        match self {
            RouteSpec::Page(page) => &page.children,
            RouteSpec::Layout(layout) => &layout.children,
        }
    }
}

impl<C> From<PageSpec<C>> for RouteSpec<C> {
    fn from(page: PageSpec<C>) -> Self {
        RouteSpec::Page(page)
    }
}

impl<C> From<LayoutSpec<C>> for RouteSpec<C> {
    fn from(layout: LayoutSpec<C>) -> Self {
        RouteSpec::Layout(layout)
    }
}

// ========================================================================
// Builder methods
// ========================================================================
//
// Consume self and return the updated node so trees read top-down:
//
//     LayoutSpec::new("DocsLayout").with_children([
//         PageSpec::new("/docs", "Docs").with_name("Docs"),
//     ])

impl<C: Clone + Send + 'static> PageSpec<C> {
    /// Page with an eager component
    ///
    /// # Examples
    ///
    /// ```
    /// use waypost_router::route::PageSpec;
    ///
    /// let page = PageSpec::new("/user/:id", "UserPage").with_name("User");
    /// assert_eq!(page.path, "/user/:id");
    /// assert_eq!(page.name.as_deref(), Some("User"));
    /// ```
    pub fn new(path: impl Into<String>, component: C) -> Self {
        Self::with_component(path, Component::Sync(component))
    }

    /// Page whose component is produced by an async loader
    pub fn lazy<F, Fut>(path: impl Into<String>, loader: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<C>> + Send + 'static,
    {
        Self::with_component(path, Component::lazy(loader))
    }

    pub fn with_component(path: impl Into<String>, component: Component<C>) -> Self {
        Self {
            path: path.into(),
            name: None,
            component,
            before_load: None,
            props: Props::new(),
            children: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Attaches an async closure as the page's `before_load` hook
    pub fn with_before_load<F, Fut>(self, hook: F) -> Self
    where
        F: Fn(HookContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<HookOutcome>> + Send + 'static,
    {
        self.with_hook(Arc::new(hook))
    }

    /// Attaches an already-built hook (shared between routes, or a struct
    /// implementing [`BeforeLoad`])
    pub fn with_hook(mut self, hook: Arc<dyn BeforeLoad>) -> Self {
        self.before_load = Some(hook);
        self
    }

    pub fn with_props(mut self, props: Props) -> Self {
        self.props.extend(props);
        self
    }

    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }

    pub fn with_children<I, R>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<RouteSpec<C>>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }
}

impl<C: Clone + Send + 'static> LayoutSpec<C> {
    pub fn new(component: C) -> Self {
        Self::with_component(Component::Sync(component))
    }

    pub fn lazy<F, Fut>(loader: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<C>> + Send + 'static,
    {
        Self::with_component(Component::lazy(loader))
    }

    pub fn with_component(component: Component<C>) -> Self {
        Self {
            component,
            before_load: None,
            props: Props::new(),
            children: Vec::new(),
        }
    }

    /// Hook inherited by every page below this layout
    pub fn with_before_load<F, Fut>(self, hook: F) -> Self
    where
        F: Fn(HookContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<HookOutcome>> + Send + 'static,
    {
        self.with_hook(Arc::new(hook))
    }

    pub fn with_hook(mut self, hook: Arc<dyn BeforeLoad>) -> Self {
        self.before_load = Some(hook);
        self
    }

    pub fn with_props(mut self, props: Props) -> Self {
        self.props.extend(props);
        self
    }

    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }

    pub fn with_children<I, R>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<RouteSpec<C>>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }
}

// Manual impls: `C` only needs `Clone`, never `Debug`.

impl<C: Clone> Clone for PageSpec<C> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            name: self.name.clone(),
            component: self.component.clone(),
            before_load: self.before_load.clone(),
            props: self.props.clone(),
            children: self.children.clone(),
        }
    }
}

impl<C: Clone> Clone for LayoutSpec<C> {
    fn clone(&self) -> Self {
        Self {
            component: self.component.clone(),
            before_load: self.before_load.clone(),
            props: self.props.clone(),
            children: self.children.clone(),
        }
    }
}

impl<C: Clone> Clone for RouteSpec<C> {
    fn clone(&self) -> Self {
        match self {
            RouteSpec::Page(page) => RouteSpec::Page(page.clone()),
            RouteSpec::Layout(layout) => RouteSpec::Layout(layout.clone()),
        }
    }
}

impl<C> fmt::Debug for PageSpec<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageSpec")
            .field("path", &self.path)
            .field("name", &self.name)
            .field("component", &self.component)
            .field("has_before_load", &self.before_load.is_some())
            .field("props", &self.props)
            .field("children", &self.children)
            .finish()
    }
}

impl<C> fmt::Debug for LayoutSpec<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutSpec")
            .field("component", &self.component)
            .field("has_before_load", &self.before_load.is_some())
            .field("props", &self.props)
            .field("children", &self.children)
            .finish()
    }
}

impl<C> fmt::Debug for RouteSpec<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteSpec::Page(page) => page.fmt(f),
            RouteSpec::Layout(layout) => layout.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sync_component_resolves_immediately() {
        let component: Component<&str> = Component::Sync("Home");
        assert!(!component.is_async());
        assert_eq!(component.resolve().await.unwrap(), "Home");
    }

    #[tokio::test]
    async fn test_lazy_component_awaits_loader() {
        let component = Component::lazy(|| async {
            tokio::task::yield_now().await;
            anyhow::Ok("Lazy")
        });
        assert!(component.is_async());
        assert_eq!(component.resolve().await.unwrap(), "Lazy");
    }

    #[test]
    fn test_builder_nests_children() {
        let tree: RouteSpec<&str> = LayoutSpec::new("AboutLayout")
            .with_prop("section", "about")
            .with_children([PageSpec::new("about", "About")
                .with_name("About")
                .with_children([PageSpec::new("child", "AboutChild")])])
            .into();

        assert!(tree.is_layout());
        let about = &tree.children()[0];
        assert!(!about.is_layout());
        assert_eq!(about.children().len(), 1);
    }

    #[test]
    fn test_debug_does_not_require_component_debug() {
        struct Opaque;
        impl Clone for Opaque {
            fn clone(&self) -> Self {
                Opaque
            }
        }
        let page = PageSpec::new("/", Opaque).with_name("Home");
        let rendered = format!("{page:?}");
        assert!(rendered.contains("\"Home\""));
        assert!(rendered.contains("Component::Sync"));
    }
}

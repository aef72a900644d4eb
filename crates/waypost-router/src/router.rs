//! Navigation controller
//!
//! [`Router`] owns the authoritative current URL and keeps it in step with a
//! [`History`] backend. Every URL change, whether it comes from
//! [`Router::navigate`], an intercepted anchor click, a back/forward event or
//! a hook redirect, goes through one commit step that sanitizes the URL,
//! pushes it, bumps the navigation generation and publishes the new URL in a
//! single state update.
//!
//! [`Router::render`] then resolves the current URL: match, load the
//! components, run the `before_load` pipeline and commit page data. A render
//! whose navigation was overtaken while it was awaiting comes back as
//! [`Resolution::Superseded`] and commits nothing.

use crate::config::{RouterConfig, RouterSettings, INTERNAL_ERROR_STATUS};
use crate::error::{LinkError, RouterError};
use crate::history::{AnchorClick, EventOutcome, History, NavigationEvent};
use crate::hook::{run_pipeline, HookContext, HookStage, PipelineOutcome};
use crate::link::{build_link, Navigate, RouteRef};
use crate::matcher::match_url;
use crate::path::{join_base, resolve_relative, sanitize_url, BLANK_URL};
use crate::query::Query;
use crate::route::{Component, Params, Props, RouteSpec, RouteTable, UidGenerator};
use crate::state::{PageData, RouteInfo, RouterSnapshot, StateStore};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tracing::{debug, error, info, warn};

/// What the mounting collaborator needs to draw the current page
#[derive(Debug, Clone)]
pub struct RenderedPage<C> {
    /// Root layout from [`RouterConfig::layout`]
    pub root_layout: Option<C>,
    /// Nearest layout enclosing the page
    pub layout: Option<C>,
    pub component: C,
    /// Nested declarations of the matched page, untouched
    pub children: Vec<RouteSpec<C>>,
    pub route: RouteInfo,
    pub props: Props,
    pub params: Params,
    pub query: Query,
}

/// Outcome of a successful [`Router::render`]
#[derive(Debug, Clone)]
pub enum Resolution<C> {
    Rendered(RenderedPage<C>),
    /// A hook redirected; the new URL is already committed, render again
    Redirected { to: String },
    /// Another navigation was committed while this render was pending
    Superseded,
}

impl<C> Resolution<C> {
    pub fn into_page(self) -> Option<RenderedPage<C>> {
        match self {
            Resolution::Rendered(page) => Some(page),
            _ => None,
        }
    }

    pub fn is_superseded(&self) -> bool {
        matches!(self, Resolution::Superseded)
    }
}

/// Everything fixed by `initialize`
struct Routing<C> {
    table: RouteTable<C>,
    settings: RouterSettings,
    root_layout: Option<Component<C>>,
}

impl<C> Default for Routing<C> {
    fn default() -> Self {
        Self {
            table: RouteTable::default(),
            settings: RouterSettings::default(),
            root_layout: None,
        }
    }
}

/// Client-side router
///
/// Cheap to share behind an `Arc`; all methods take `&self`.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use waypost_router::{MemoryHistory, PageSpec, Router, RouterConfig};
///
/// # #[tokio::main]
/// # async fn main() {
/// let router = Router::new(Arc::new(MemoryHistory::new("/")));
/// router
///     .initialize(RouterConfig::new(vec![
///         PageSpec::new("/", "Home").with_name("Home").into(),
///         PageSpec::new("/user/:id", "User").with_name("User").into(),
///     ]))
///     .await;
///
/// router.navigate("/user/42").await.unwrap();
/// let page = router.render().await.unwrap().into_page().unwrap();
/// assert_eq!(page.component, "User");
/// assert_eq!(page.params["id"], "42");
/// # }
/// ```
pub struct Router<C> {
    history: Arc<dyn History>,
    routing: RwLock<Arc<Routing<C>>>,
    state: StateStore,
    generation: AtomicU64,
    attached: AtomicBool,
}

impl<C> Router<C>
where
    C: Clone + Send + Sync + 'static,
{
    /// Creates an empty router bound to a history backend
    ///
    /// Nothing resolves until [`Router::initialize`] has run.
    pub fn new(history: Arc<dyn History>) -> Self {
        let url = history.location();
        Self {
            history,
            routing: RwLock::new(Arc::new(Routing::default())),
            state: StateStore::new(url),
            generation: AtomicU64::new(0),
            attached: AtomicBool::new(false),
        }
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Flattens the route tree, stores settings, captures the current URL and
    /// starts listening to the history backend
    ///
    /// Calling it again replaces the routes and settings but never attaches
    /// a second time.
    pub async fn initialize(&self, config: RouterConfig<C>) {
        let RouterConfig {
            routes,
            settings,
            layout,
        } = config;

        let mut uid = match settings.uid_seed {
            Some(seed) => UidGenerator::with_seed(seed),
            None => UidGenerator::new(),
        };
        let table = RouteTable::build(&routes, &mut uid);

        info!(
            routes = table.len(),
            base = ?settings.base,
            "router initialized"
        );

        *self.routing.write().await = Arc::new(Routing {
            table,
            settings,
            root_layout: layout,
        });
        // renders still holding the previous table must not commit
        self.generation.fetch_add(1, Ordering::SeqCst);

        let url = self.history.location();
        self.state.set_url(&url);

        if !self.attached.swap(true, Ordering::SeqCst) {
            self.history.attach();
            debug!("attached to history backend");
        }
    }

    /// Stops listening; events dispatched afterwards are ignored
    pub fn teardown(&self) {
        if self.attached.swap(false, Ordering::SeqCst) {
            self.history.detach();
            debug!("detached from history backend");
        }
    }

    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::SeqCst)
    }

    // ========================================================================
    // Observable state
    // ========================================================================

    /// Receiver for page data and router status
    pub fn subscribe(&self) -> watch::Receiver<RouterSnapshot> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> RouterSnapshot {
        self.state.snapshot()
    }

    /// URL the router is currently resolved against
    pub fn current_url(&self) -> String {
        self.state.snapshot().status.url
    }

    async fn routing(&self) -> Arc<Routing<C>> {
        self.routing.read().await.clone()
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Navigates to a literal path or a named route
    ///
    /// Literal paths starting with `/` are taken relative to the base path;
    /// relative paths (`login`, `../edit`) are resolved against the current
    /// URL. A named route with bad parameters fails here, before anything is
    /// pushed.
    pub async fn navigate(&self, target: impl Into<Navigate>) -> Result<(), RouterError> {
        let routing = self.routing().await;
        let url = resolve_target(&routing, &self.current_url(), target.into())?;
        self.commit_navigation(&url, true);
        Ok(())
    }

    /// Forwards a host event to the router
    pub async fn dispatch(&self, event: NavigationEvent) -> EventOutcome {
        if !self.is_attached() {
            return EventOutcome::Ignored;
        }

        match event {
            NavigationEvent::PopState => self.handle_popstate(),
            NavigationEvent::Click(click) => self.handle_click(&click).await,
        }
    }

    /// Back/forward: the backend already moved, adopt its location
    fn handle_popstate(&self) -> EventOutcome {
        let url = self.history.location();
        let navigated = self.commit_navigation(&url, false);
        EventOutcome::Handled { navigated }
    }

    async fn handle_click(&self, click: &AnchorClick) -> EventOutcome {
        if !click.is_anchor() {
            return EventOutcome::Ignored;
        }

        let routing = self.routing().await;
        if click.has_attribute(&routing.settings.opt_out_attribute) {
            debug!(href = ?click.href, "anchor opted out of routing");
            return EventOutcome::Ignored;
        }

        let Some(href) = click.href.as_deref() else {
            return EventOutcome::Ignored;
        };
        if !href.starts_with('/') || href.starts_with("//") {
            return EventOutcome::Ignored;
        }

        let target = join_base(routing.settings.base.as_deref(), href);
        if target == self.current_url() {
            return EventOutcome::Handled { navigated: false };
        }

        let navigated = self.commit_navigation(&target, true);
        EventOutcome::Handled { navigated }
    }

    /// The single place a URL change is committed
    ///
    /// Returns false when the URL was refused as unsafe.
    fn commit_navigation(&self, url: &str, push: bool) -> bool {
        let url = sanitize_url(url);
        if url == BLANK_URL {
            warn!("refusing to navigate to an unsafe URL");
            return false;
        }

        if push {
            self.history.push_state(&url);
        }
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.begin_navigation(&url);

        debug!(url = %url, generation, push, "navigation committed");
        true
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    /// Resolves the current URL into something to mount
    ///
    /// Not-found and hook errors are recorded in the router status before
    /// being returned. Loader and hook failures surface as
    /// [`RouterError::Unexpected`]. Once a newer navigation has been
    /// committed the render records nothing, failures included, and returns
    /// [`Resolution::Superseded`].
    pub async fn render(&self) -> Result<Resolution<C>, RouterError> {
        let routing = self.routing().await;
        let generation = self.generation.load(Ordering::SeqCst);
        let url = self.current_url();
        let settings = &routing.settings;

        let Some(matched) = match_url(&routing.table, settings.base.as_deref(), &url) else {
            warn!(url = %url, "no route matches");
            let message = settings.error_message(404);
            return self.fail(generation, RouterError::NotFound { message });
        };

        let route = matched.route;
        let layout_def = routing.table.layout_of(route);

        let loaded = async {
            let root_layout = match &routing.root_layout {
                Some(layout) => Some(load(settings, layout, "root layout").await?),
                None => None,
            };
            let layout = match layout_def {
                Some(def) => Some(load(settings, &def.component, "layout").await?),
                None => None,
            };
            let component = load(settings, &route.component, &route.name).await?;
            Ok::<_, RouterError>((root_layout, layout, component))
        };
        let (root_layout, layout, component) = match loaded.await {
            Ok(loaded) => loaded,
            Err(err) => return self.fail(generation, err),
        };

        let ctx = HookContext {
            params: matched.params,
            props: route.props.clone(),
            query: matched.query,
        };

        let mut stages = Vec::with_capacity(2);
        if let Some(def) = layout_def {
            stages.push(HookStage {
                label: "layout",
                props: &def.props,
                hook: def.before_load.as_ref(),
            });
        }
        stages.push(HookStage {
            label: &route.name,
            props: &route.props,
            hook: route.before_load.as_ref(),
        });

        let outcome = match run_pipeline(&stages, &ctx).await {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(route = %route.name, error = %err, "before_load hook failed");
                return self.fail(generation, unexpected(settings, err));
            }
        };

        if !self.is_current(generation) {
            debug!(route = %route.name, "render superseded by a newer navigation");
            return Ok(Resolution::Superseded);
        }

        match outcome {
            PipelineOutcome::Proceed(props) => {
                let info = RouteInfo {
                    name: route.name.clone(),
                    path: route.path.clone(),
                };
                self.state.commit_page(
                    PageData {
                        props: props.clone(),
                        params: ctx.params.clone(),
                        query: ctx.query.clone(),
                    },
                    info.clone(),
                );
                info!(route = %info.name, url = %url, "route rendered");

                Ok(Resolution::Rendered(RenderedPage {
                    root_layout,
                    layout,
                    component,
                    children: route.children.clone(),
                    route: info,
                    props,
                    params: ctx.params,
                    query: ctx.query,
                }))
            }
            PipelineOutcome::Redirect(target) => {
                let to = match resolve_target(&routing, &url, target) {
                    Ok(to) => to,
                    Err(err) => return self.fail(generation, err),
                };
                info!(from = %url, to = %to, "before_load redirect");
                self.commit_navigation(&to, true);
                Ok(Resolution::Redirected { to })
            }
            PipelineOutcome::Fail(payload) => {
                let payload = settings.complete(payload);
                debug!(route = %route.name, status = payload.status, "before_load flagged an error");
                self.fail(generation, RouterError::Hook {
                    status: payload.status,
                    message: payload.message,
                })
            }
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Records `err` unless a newer navigation owns the status by now
    fn fail(&self, generation: u64, err: RouterError) -> Result<Resolution<C>, RouterError> {
        if !self.is_current(generation) {
            debug!(error = %err, "stale render failed after being superseded");
            return Ok(Resolution::Superseded);
        }
        self.state.record_error(err.payload());
        Err(err)
    }

    // ========================================================================
    // Links
    // ========================================================================

    /// Concrete URL for a named route, base path included
    pub async fn link(&self, route: &RouteRef) -> Result<String, LinkError> {
        let routing = self.routing().await;
        build_link(&routing.table, routing.settings.base.as_deref(), route).map_err(|err| {
            error!(route = %route.name, error = %err, "invalid route reference");
            err
        })
    }

    /// Like [`Router::link`], returning the configured fallback on failure
    pub async fn link_or_fallback(&self, route: &RouteRef) -> String {
        let routing = self.routing().await;
        match build_link(&routing.table, routing.settings.base.as_deref(), route) {
            Ok(url) => url,
            Err(err) => {
                warn!(route = %route.name, error = %err, "link fallback used");
                routing.settings.link_fallback.clone()
            }
        }
    }
}

async fn load<C: Clone + Send + Sync + 'static>(
    settings: &RouterSettings,
    component: &Component<C>,
    label: &str,
) -> Result<C, RouterError> {
    component.resolve().await.map_err(|err| {
        error!(component = label, error = %err, "component loader failed");
        unexpected(settings, err)
    })
}

fn unexpected(settings: &RouterSettings, err: anyhow::Error) -> RouterError {
    RouterError::Unexpected {
        message: settings.error_message(INTERNAL_ERROR_STATUS),
        source: err.into(),
    }
}

/// Turns a navigation target into a URL
///
/// Absolute paths get the base path, relative ones are resolved against
/// `current` (which already carries it).
fn resolve_target<C>(
    routing: &Routing<C>,
    current: &str,
    target: Navigate,
) -> Result<String, RouterError> {
    let base = routing.settings.base.as_deref();
    match target {
        Navigate::Path(path) if path.starts_with('/') && !path.starts_with("//") => {
            Ok(join_base(base, &path))
        }
        Navigate::Path(path) => Ok(resolve_relative(current, &path).unwrap_or(path)),
        Navigate::Named(route) => build_link(&routing.table, base, &route).map_err(|err| {
            error!(route = %route.name, error = %err, "invalid route reference");
            RouterError::from(err)
        }),
    }
}

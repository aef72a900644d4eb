//! Scripted navigation session
//!
//! Wires the router to an in-memory history and plays back a few clicks,
//! programmatic navigations and a back button press, logging what would be
//! mounted after each step. Run with `RUST_LOG=debug` to see the router's own
//! tracing.

use anyhow::{anyhow, Result};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};
use waypost_router::{
    AnchorClick, HookContext, HookDirectives, HookOutcome, LayoutSpec, MemoryHistory,
    NavigationEvent, PageSpec, Resolution, RouteRef, RouteSpec, Router, RouterConfig,
    RouterSettings,
};

/// Redirect hops followed before giving up on a render
const MAX_REDIRECTS: usize = 5;

type Docs = Arc<HashMap<&'static str, &'static str>>;

fn docs() -> Docs {
    Arc::new(HashMap::from([
        ("routing", "Routing"),
        ("hooks", "Before-load hooks"),
        ("links", "Building links"),
    ]))
}

fn routes(docs: Docs) -> Vec<RouteSpec<&'static str>> {
    vec![
        PageSpec::new("/", "HomePage").with_name("Home").into(),
        PageSpec::new("/login", "LoginPage").with_name("Login").into(),
        LayoutSpec::new("DocsLayout")
            .with_prop("section", "docs")
            .with_before_load(|_ctx| async { anyhow::Ok(HookOutcome::Props(sidebar())) })
            .with_children([PageSpec::new("/docs", "DocsIndex")
                .with_name("Docs")
                .with_children([PageSpec::new("/:id", "DocsPage")
                    .with_name("DocsPage")
                    .with_before_load(move |ctx: HookContext| {
                        let docs = docs.clone();
                        async move { load_doc(&docs, &ctx) }
                    })])])
            .into(),
        LayoutSpec::new("AccountLayout")
            .with_before_load(|ctx: HookContext| async move {
                // Nobody is signed in during the demo
                let next = ctx.query.get("from").cloned().unwrap_or_else(|| "/account".into());
                anyhow::Ok(HookOutcome::Combined(HookDirectives {
                    redirect: Some(RouteRef::new("Login").with_query("next", next).into()),
                    props: Some(sidebar()),
                    error: None,
                }))
            })
            .with_children([PageSpec::lazy("/account", || async { anyhow::Ok("AccountPage") })
                .with_name("Account")])
            .into(),
    ]
}

fn sidebar() -> waypost_router::Props {
    let mut props = waypost_router::Props::new();
    props.insert("sidebar".into(), json!(true));
    props
}

fn load_doc(docs: &Docs, ctx: &HookContext) -> Result<HookOutcome> {
    let id = ctx
        .params
        .get("id")
        .ok_or_else(|| anyhow!("DocsPage rendered without an id"))?;

    Ok(match docs.get(id.as_str()) {
        Some(title) => {
            let mut props = waypost_router::Props::new();
            props.insert("title".into(), json!(title));
            HookOutcome::Props(props)
        }
        // Empty message: the configured 404 message is used
        None => HookOutcome::Error(404.into()),
    })
}

/// Renders until the router settles on a page or fails
/// Anchor carrying whichever opt-out attribute the router was configured with
fn opted_out_link(href: &str, settings: &RouterSettings) -> AnchorClick {
    AnchorClick::anchor(href).with_attribute(settings.opt_out_attribute.clone(), "")
}

async fn settle(router: &Router<&'static str>) {
    for _ in 0..=MAX_REDIRECTS {
        match router.render().await {
            Ok(Resolution::Rendered(page)) => {
                info!(
                    url = %router.current_url(),
                    root = ?page.root_layout,
                    layout = ?page.layout,
                    component = page.component,
                    props = %serde_json::Value::Object(page.props.clone()),
                    params = ?page.params,
                    query = ?page.query,
                    "mounted"
                );
                return;
            }
            Ok(Resolution::Redirected { to }) => info!(to = %to, "redirected"),
            Ok(Resolution::Superseded) => return,
            Err(err) => {
                warn!(status = err.status(), message = %err.message(), "showing error view");
                return;
            }
        }
    }
    warn!("too many redirects");
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,waypost_router=info")),
        )
        .init();

    let settings = RouterSettings::load_default().unwrap_or_else(|e| {
        warn!("Failed to load waypost.toml: {:#}, using defaults", e);
        RouterSettings::default()
    });

    let opt_out_click = opted_out_link("/docs/routing", &settings);

    let history = Arc::new(MemoryHistory::new("/"));
    let router = Router::new(history.clone());
    router
        .initialize(
            RouterConfig::new(routes(docs()))
                .with_settings(settings)
                .with_layout("AppShell"),
        )
        .await;

    info!("initial render");
    settle(&router).await;

    info!("navigate to a named route");
    router
        .navigate(RouteRef::new("DocsPage").with_param("id", "hooks"))
        .await?;
    settle(&router).await;

    info!("click a plain link");
    let link = router.link(&RouteRef::new("Docs")).await?;
    let outcome = router
        .dispatch(NavigationEvent::Click(AnchorClick::anchor(link)))
        .await;
    info!(prevent_default = outcome.prevents_default(), "click handled");
    settle(&router).await;

    info!("click an opted-out link");
    let opt_out = router.snapshot();
    let outcome = router
        .dispatch(NavigationEvent::Click(opt_out_click))
        .await;
    info!(
        prevent_default = outcome.prevents_default(),
        url_unchanged = opt_out.status.url == router.current_url(),
        "click handled"
    );

    info!("unknown document");
    router.navigate("/docs/nope").await?;
    settle(&router).await;

    info!("protected page");
    router.navigate("/account").await?;
    settle(&router).await;

    info!("broken named link");
    let fallback = router
        .link_or_fallback(&RouteRef::new("DocsPage").with_param("slug", "x"))
        .await;
    info!(href = %fallback, "rendered link");

    info!("back button");
    history.back();
    router.dispatch(NavigationEvent::PopState).await;
    settle(&router).await;

    router.teardown();
    info!(entries = ?history.entries(), "session finished");
    Ok(())
}

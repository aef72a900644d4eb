//! # Waypost Router
//!
//! A framework-agnostic client-side router with support for:
//! - Nested page/layout trees flattened into a name-indexed table
//! - Dynamic parameters (`/users/:id`) and query strings
//! - Async `before_load` hooks that inject props, redirect or fail the render
//! - Named-route link building with parameter validation
//! - History synchronisation through a pluggable [`History`] backend
//!
//! ## Matching Rules
//!
//! Matching is intentionally coarse:
//! - Literal routes match by exact string comparison
//! - Parameterised routes are prefiltered on their first segment, then picked
//!   by segment count; the first registered candidate wins
//! - Trailing slashes are **not** normalized. The empty segment they add
//!   counts toward arity: `/about/` does not match `/about`, but `/user/42/`
//!   resolves to `/user/:id/edit` when that route exists
//! - Relative navigation targets (`login`, `../edit`) are resolved against
//!   the current URL
//!
//! ## Component Handles
//!
//! The router never mounts anything. It is generic over a component handle
//! `C` that it only clones and hands back in a [`RenderedPage`]. Components
//! can be eager ([`Component::Sync`]) or loaded on demand
//! ([`Component::Async`]).
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use waypost_router::{
//!     HookOutcome, LayoutSpec, MemoryHistory, PageSpec, Router, RouterConfig,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let router = Router::new(Arc::new(MemoryHistory::new("/account")));
//!     router
//!         .initialize(RouterConfig::new(vec![
//!             PageSpec::new("/login", "Login").with_name("Login").into(),
//!             LayoutSpec::new("Private")
//!                 .with_before_load(|_ctx| async {
//!                     anyhow::Ok(HookOutcome::redirect("/login"))
//!                 })
//!                 .with_children([PageSpec::new("/account", "Account")])
//!                 .into(),
//!         ]))
//!         .await;
//!
//!     let first = router.render().await.unwrap();
//!     assert!(first.into_page().is_none());
//!
//!     let page = router.render().await.unwrap().into_page().unwrap();
//!     assert_eq!(page.component, "Login");
//! }
//! ```

// ============================================================================
// Module Declarations
// ============================================================================

pub mod config;
pub mod error;
pub mod history;
pub mod hook;
pub mod link;
pub mod matcher;
pub mod path;
pub mod query;
pub mod route;
pub mod router;
pub mod state;

// Re-export public types
pub use config::{RouterConfig, RouterSettings, RouterToml};
pub use error::{ErrorPayload, LinkError, RouterError};
pub use history::{AnchorClick, EventOutcome, History, MemoryHistory, NavigationEvent};
pub use hook::{BeforeLoad, HookContext, HookDirectives, HookOutcome};
pub use link::{build_link, Navigate, RouteRef};
pub use matcher::{match_url, RouteMatch};
pub use query::Query;
pub use route::{
    Component, ComponentLoader, FlatLayout, FlatRoute, LayoutId, LayoutSpec, PageSpec, Params,
    Props, RouteSpec, RouteTable, UidGenerator,
};
pub use router::{RenderedPage, Resolution, Router};
pub use state::{PageData, RouteInfo, RouterSnapshot, RouterStatus};

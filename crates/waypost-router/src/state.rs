//! Observable router state
//!
//! One snapshot holds both the page data and the router status. It lives in
//! a `tokio::sync::watch` channel and is only ever replaced through a single
//! `send_modify`, so a subscriber never sees, say, a new route name next to
//! the previous route's params.

use crate::error::ErrorPayload;
use crate::query::Query;
use crate::route::{Params, Props};
use serde::Serialize;
use tokio::sync::watch;

/// Data handed to the current page
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PageData {
    pub props: Props,
    pub params: Params,
    pub query: Query,
}

/// Name and declared path of the committed route
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RouteInfo {
    pub name: String,
    pub path: String,
}

/// Router status
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RouterStatus {
    /// True from a committed navigation until its render finishes
    pub navigating: bool,
    pub route: RouteInfo,
    /// URL the router is resolved against
    pub url: String,
    /// Error recorded by the last render, if it failed
    pub error: Option<ErrorPayload>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RouterSnapshot {
    pub page: PageData,
    pub status: RouterStatus,
}

/// Write side of the snapshot channel; owned by the router
pub(crate) struct StateStore {
    tx: watch::Sender<RouterSnapshot>,
}

impl StateStore {
    pub(crate) fn new(url: String) -> Self {
        let snapshot = RouterSnapshot {
            status: RouterStatus {
                url,
                ..RouterStatus::default()
            },
            ..RouterSnapshot::default()
        };
        let (tx, _rx) = watch::channel(snapshot);
        Self { tx }
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<RouterSnapshot> {
        self.tx.subscribe()
    }

    pub(crate) fn snapshot(&self) -> RouterSnapshot {
        self.tx.borrow().clone()
    }

    /// URL captured at initialization; no render is pending yet
    pub(crate) fn set_url(&self, url: &str) {
        self.tx.send_modify(|state| state.status.url = url.to_string());
    }

    /// A navigation was committed and its render is pending
    pub(crate) fn begin_navigation(&self, url: &str) {
        self.tx.send_modify(|state| {
            state.status.navigating = true;
            state.status.url = url.to_string();
        });
    }

    /// A render finished successfully
    pub(crate) fn commit_page(&self, page: PageData, route: RouteInfo) {
        self.tx.send_modify(|state| {
            state.page = page;
            state.status.route = route;
            state.status.navigating = false;
            state.status.error = None;
        });
    }

    /// A render failed; page data stays as it was
    pub(crate) fn record_error(&self, error: ErrorPayload) {
        self.tx.send_modify(|state| {
            state.status.navigating = false;
            state.status.error = Some(error);
        });
    }
}

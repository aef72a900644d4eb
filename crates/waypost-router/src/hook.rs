//! Before-render hook pipeline
//!
//! A matched page runs at most two hooks: its enclosing layout's, then its
//! own. They run one after the other, never concurrently, so that page props
//! override layout defaults and a layout redirect stops the page hook from
//! starting.
//!
//! Props accumulate in this order, later entries overwriting earlier keys:
//! layout static props, layout hook props, page static props, page hook props.

use crate::error::ErrorPayload;
use crate::link::Navigate;
use crate::query::Query;
use crate::route::{Params, Props};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

/// Input handed to every hook
///
/// Layouts have no parameters of their own: a layout hook receives the
/// context of the page being rendered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HookContext {
    pub params: Params,
    pub props: Props,
    pub query: Query,
}

/// Any combination of the three things a hook can ask for
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HookDirectives {
    pub redirect: Option<Navigate>,
    pub props: Option<Props>,
    pub error: Option<ErrorPayload>,
}

/// What a hook returns
///
/// The single-purpose variants cover the common cases; `Combined` spells out
/// mixed requests. When several are present, `error` wins over `redirect`,
/// which wins over `props`.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum HookOutcome {
    #[default]
    Continue,
    Props(Props),
    Redirect(Navigate),
    Error(ErrorPayload),
    Combined(HookDirectives),
}

impl HookOutcome {
    /// Redirect to a literal path or a named route
    pub fn redirect(target: impl Into<Navigate>) -> Self {
        HookOutcome::Redirect(target.into())
    }

    /// Fail the render with a status and message
    pub fn error(status: u16, message: impl Into<String>) -> Self {
        HookOutcome::Error(ErrorPayload::new(status, message))
    }

    /// Flattens the variants into the explicit directive form
    pub fn into_directives(self) -> HookDirectives {
        match self {
            HookOutcome::Continue => HookDirectives::default(),
            HookOutcome::Props(props) => HookDirectives {
                props: Some(props),
                ..HookDirectives::default()
            },
            HookOutcome::Redirect(target) => HookDirectives {
                redirect: Some(target),
                ..HookDirectives::default()
            },
            HookOutcome::Error(error) => HookDirectives {
                error: Some(error),
                ..HookDirectives::default()
            },
            HookOutcome::Combined(directives) => directives,
        }
    }
}

/// Logic run before a page or layout is committed
#[async_trait]
pub trait BeforeLoad: Send + Sync {
    async fn before_load(&self, ctx: HookContext) -> Result<HookOutcome>;
}

#[async_trait]
impl<F, Fut> BeforeLoad for F
where
    F: Fn(HookContext) -> Fut + Send + Sync,
    Fut: Future<Output = Result<HookOutcome>> + Send + 'static,
{
    async fn before_load(&self, ctx: HookContext) -> Result<HookOutcome> {
        (self)(ctx).await
    }
}

/// One level of the pipeline (a layout or the page itself)
pub struct HookStage<'a> {
    pub label: &'a str,
    pub props: &'a Props,
    pub hook: Option<&'a Arc<dyn BeforeLoad>>,
}

/// Result of running every stage
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    /// All hooks passed; merged props ready to commit
    Proceed(Props),
    /// A hook redirected; nothing from this resolution may be committed
    Redirect(Navigate),
    /// A hook flagged an error
    Fail(ErrorPayload),
}

/// Runs the stages in order, awaiting each hook before starting the next
///
/// Returns `Err` only when a hook itself fails; the caller wraps that into a
/// router error.
pub async fn run_pipeline(stages: &[HookStage<'_>], ctx: &HookContext) -> Result<PipelineOutcome> {
    let mut props = Props::new();

    for stage in stages {
        props.extend(stage.props.clone());

        let Some(hook) = stage.hook else {
            continue;
        };

        debug!(stage = stage.label, "running before_load hook");
        let directives = hook
            .before_load(ctx.clone())
            .await
            .with_context(|| format!("before_load hook of {} failed", stage.label))?
            .into_directives();

        if let Some(error) = directives.error {
            return Ok(PipelineOutcome::Fail(error));
        }
        if let Some(target) = directives.redirect {
            return Ok(PipelineOutcome::Redirect(target));
        }
        if let Some(hook_props) = directives.props {
            props.extend(hook_props);
        }
    }

    Ok(PipelineOutcome::Proceed(props))
}

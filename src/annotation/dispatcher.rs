/*!
 * Action dispatch.
 *
 * Every user intent is one variant of [`UserAction`] and is handled by an
 * exhaustive match. Actions never fail: a missing target is a no-op, and
 * conversion or storage problems are logged where they happen. The result of
 * every action is the target's annotated status afterwards.
 */

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::context::AnnotationContext;
use crate::preferences::PartialPreferences;

/// The closed set of user actions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    Check,
    UpdateOptions(PartialPreferences),
    Annotate,
    Clear,
    Toggle,
}

/// Whether the ObservationTarget currently holds annotations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationStatus {
    Annotated,
    NotAnnotated,
}

impl AnnotationStatus {
    pub fn from_flag(annotated: bool) -> Self {
        if annotated {
            Self::Annotated
        } else {
            Self::NotAnnotated
        }
    }

    pub fn is_annotated(&self) -> bool {
        matches!(self, Self::Annotated)
    }
}

impl fmt::Display for AnnotationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Annotated => write!(f, "annotated"),
            Self::NotAnnotated => write!(f, "not_annotated"),
        }
    }
}

/// Run `action` against `ctx` and report the target's status afterwards
pub async fn dispatch(ctx: &mut AnnotationContext, action: UserAction) -> AnnotationStatus {
    debug!("Dispatching {:?}", action);
    match action {
        UserAction::Check => check(ctx).await,
        UserAction::UpdateOptions(partial) => ctx.update_preferences(&partial).await,
        UserAction::Annotate => annotate(ctx).await,
        UserAction::Clear => clear(ctx),
        UserAction::Toggle => toggle(ctx).await,
    }
    AnnotationStatus::from_flag(ctx.is_annotated())
}

async fn check(ctx: &mut AnnotationContext) {
    ctx.reconcile_preferences().await;
}

/// Reconcile, clear, apply over the target, then watch it when monitoring is on.
///
/// The watcher is off for the whole Apply pass and only enabled after it.
async fn annotate(ctx: &mut AnnotationContext) {
    ctx.reconcile_preferences().await;
    clear(ctx);

    let Some(target) = ctx.target() else {
        debug!("No observation target, nothing to annotate");
        return;
    };

    let report = ctx.apply(target).await;
    info!(
        "Annotated {} of {} text nodes ({} skipped, {} failed)",
        report.converted, report.scanned, report.skipped, report.failed
    );

    if ctx.preferences().monitor_enabled {
        ctx.enable_watcher(target);
    }
}

fn clear(ctx: &mut AnnotationContext) {
    ctx.disable_watcher();
    let Some(target) = ctx.target() else {
        return;
    };
    let removed = ctx.clear(target);
    if removed > 0 {
        info!("Removed {} annotation elements", removed);
    }
}

async fn toggle(ctx: &mut AnnotationContext) {
    if ctx.target().is_none() {
        return;
    }
    if ctx.is_annotated() {
        clear(ctx);
    } else {
        annotate(ctx).await;
    }
}

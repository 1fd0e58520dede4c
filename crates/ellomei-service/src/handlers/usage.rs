//! Usage metrics operations.

use ellomei_core::{evaluate, Plan, UsageMetrics, UsageSnapshot};

use crate::context::RequestContext;
use crate::error::{Result, ServiceError};
use crate::state::AppState;

/// Current-period usage metrics for the acting user.
pub async fn get_usage(state: &AppState, ctx: &RequestContext) -> Result<UsageMetrics> {
    let used = state
        .store
        .entry_count(&ctx.actor.user_id, ctx.period())?;

    let metrics = metrics_for(state, ctx, ctx.actor.plan, used);

    tracing::debug!(
        user_id = %ctx.actor.user_id,
        period = %ctx.period(),
        used = metrics.used,
        percent_used = %metrics.percent_used,
        "Usage evaluated"
    );

    Ok(metrics)
}

/// Usage metrics for the acting user, refusing if no further entry is allowed.
pub async fn check_entry_allowance(state: &AppState, ctx: &RequestContext) -> Result<UsageMetrics> {
    let metrics = get_usage(state, ctx).await?;
    ensure_can_record(&metrics)?;
    Ok(metrics)
}

/// Enforcement policy: non-PRO accounts at their quota may not record entries.
///
/// # Errors
///
/// Returns `ServiceError::PlanLimitExceeded` when the metrics block new entries.
pub fn ensure_can_record(metrics: &UsageMetrics) -> Result<()> {
    if metrics.blocks_new_entries() {
        return Err(ServiceError::PlanLimitExceeded {
            used: metrics.used,
            quota: metrics.quota,
        });
    }
    Ok(())
}

/// Evaluate usage for `plan` with `used` entries in the context's period.
pub(crate) fn metrics_for(
    state: &AppState,
    ctx: &RequestContext,
    plan: Plan,
    used: u64,
) -> UsageMetrics {
    let snapshot = UsageSnapshot::new(
        plan,
        used,
        state.config.plan_limits.snapshot_quota(plan),
        ctx.period().days_remaining(ctx.now.date_naive()),
    );
    evaluate(snapshot)
}

//! Entry ("lançamento") operations.

use serde::{Deserialize, Serialize};

use ellomei_core::{Entry, EntryKind, UsageMetrics};

use crate::context::RequestContext;
use crate::error::{Result, ServiceError};
use crate::handlers::usage::metrics_for;
use crate::state::AppState;
use crate::validation::{FieldCheck, FieldError};

/// Record entry request.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordEntryRequest {
    /// Income or expense.
    pub kind: EntryKind,
    /// Description.
    pub description: String,
    /// Amount in centavos.
    pub amount_cents: i64,
}

/// Entry receipt.
#[derive(Debug, Clone, Serialize)]
pub struct EntryReceipt {
    /// The recorded entry.
    pub entry: Entry,
    /// Usage after recording it.
    pub usage: UsageMetrics,
}

/// Record an entry, enforcing the acting user's plan quota.
///
/// The quota check and the increment are one store operation, so concurrent
/// requests cannot overshoot the quota.
pub async fn record_entry(
    state: &AppState,
    ctx: &RequestContext,
    body: RecordEntryRequest,
) -> Result<EntryReceipt> {
    let mut errors = state
        .validators
        .check(&[FieldCheck::new("description", "required", &body.description)])
        .err()
        .unwrap_or_default();
    if body.amount_cents <= 0 {
        errors.push(FieldError::new(
            "amount_cents",
            "positive",
            "o valor deve ser maior que zero",
        ));
    }
    if !errors.is_empty() {
        return Err(ServiceError::Validation(errors));
    }

    let plan = ctx.actor.plan;
    let period = ctx.period();
    let quota = state.config.plan_limits.quota_for(plan);
    let entry = Entry::new(
        ctx.actor.user_id,
        body.kind,
        body.description.trim().to_string(),
        body.amount_cents,
        ctx.now,
    );

    let used = state
        .store
        .record_entry(&entry, period, quota)
        .map_err(|e| {
            tracing::warn!(
                user_id = %ctx.actor.user_id,
                plan = %plan,
                period = %period,
                error = %e,
                "Entry rejected"
            );
            ServiceError::from(e)
        })?;

    tracing::info!(
        user_id = %ctx.actor.user_id,
        entry_id = %entry.id,
        period = %period,
        used,
        "Entry recorded"
    );

    Ok(EntryReceipt {
        usage: metrics_for(state, ctx, plan, used),
        entry,
    })
}

/// List the acting user's entries in the current period, oldest first.
pub async fn list_entries(state: &AppState, ctx: &RequestContext) -> Result<Vec<Entry>> {
    Ok(state
        .store
        .list_entries(&ctx.actor.user_id, ctx.period())?)
}

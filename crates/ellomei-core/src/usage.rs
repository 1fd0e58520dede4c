//! Usage metrics for plan quotas.
//!
//! [`evaluate`] is a pure function from a [`UsageSnapshot`] to the
//! [`UsageMetrics`] the dashboard renders and the entry path enforces.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::{MeiError, Plan};

/// Utilization (in percent) from which an account is considered near its limit.
pub const NEAR_LIMIT_PERCENT: Decimal = Decimal::from_parts(80, 0, 0, false, 0);

/// Decimal places kept in `percent_used`.
const PERCENT_SCALE: u32 = 2;

/// Point-in-time usage for one account, fed into [`evaluate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageSnapshot {
    /// The account's plan.
    pub plan: Plan,

    /// Entries recorded in the current period.
    pub used: u64,

    /// Entries allowed per period (`0` for unlimited plans).
    pub quota: u64,

    /// Days left in the current period.
    pub days_remaining: u32,
}

impl UsageSnapshot {
    /// Create a snapshot from already validated values.
    #[must_use]
    pub const fn new(plan: Plan, used: u64, quota: u64, days_remaining: u32) -> Self {
        Self {
            plan,
            used,
            quota,
            days_remaining,
        }
    }

    /// Create a snapshot from signed values supplied by an external collaborator.
    ///
    /// # Errors
    ///
    /// Returns `MeiError::InvalidArgument` naming the first negative (or
    /// oversized) field.
    pub fn try_new(plan: Plan, used: i64, quota: i64, days_remaining: i64) -> crate::Result<Self> {
        Ok(Self {
            plan,
            used: non_negative("used", used)?,
            quota: non_negative("quota", quota)?,
            days_remaining: u32::try_from(non_negative("days_remaining", days_remaining)?)
                .map_err(|_| MeiError::invalid_argument("days_remaining", "too large"))?,
        })
    }
}

fn non_negative(field: &'static str, value: i64) -> crate::Result<u64> {
    u64::try_from(value)
        .map_err(|_| MeiError::invalid_argument(field, format!("must be >= 0, got {value}")))
}

/// Progress bar color for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressColor {
    /// Normal utilization.
    Primary,
    /// Near the limit.
    Warning,
    /// Limit reached.
    Danger,
    /// Unlimited plan.
    Success,
}

impl ProgressColor {
    /// CSS-style class name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Warning => "warning",
            Self::Danger => "danger",
            Self::Success => "success",
        }
    }
}

/// Status icon for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatusIcon {
    /// Unlimited plan.
    Unlimited,
    /// Limit reached.
    AlertFilled,
    /// Near the limit.
    WarningFilled,
    /// Normal utilization.
    OkFilled,
}

impl StatusIcon {
    /// Icon tag.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unlimited => "unlimited",
            Self::AlertFilled => "alert-filled",
            Self::WarningFilled => "warning-filled",
            Self::OkFilled => "ok-filled",
        }
    }
}

/// Usage metrics derived from a [`UsageSnapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageMetrics {
    /// The account's plan.
    pub plan: Plan,

    /// Entries recorded in the current period.
    pub used: u64,

    /// Entries allowed per period (`0` for unlimited plans).
    pub quota: u64,

    /// Entries left before the quota is reached; `None` for unlimited plans.
    pub remaining: Option<u64>,

    /// Days left in the current period.
    pub days_remaining: u32,

    /// `used / quota * 100`, rounded half-up to two decimal places.
    pub percent_used: Decimal,

    /// Utilization is at or above [`NEAR_LIMIT_PERCENT`].
    pub near_limit: bool,

    /// The quota is used up.
    pub limit_exceeded: bool,

    /// Advisory shown to the user, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert_message: Option<String>,

    /// Progress bar color.
    pub progress_color: ProgressColor,

    /// Status icon.
    pub status_icon: StatusIcon,
}

impl UsageMetrics {
    /// Whether the enforcement path must refuse new entries.
    ///
    /// Unlimited plans are never blocked, even if the flags were computed as set.
    #[must_use]
    pub const fn blocks_new_entries(&self) -> bool {
        self.limit_exceeded && !self.plan.is_unlimited()
    }
}

/// Evaluate a usage snapshot.
///
/// Pure and total: the same snapshot always yields the same metrics.
#[must_use]
pub fn evaluate(snapshot: UsageSnapshot) -> UsageMetrics {
    let UsageSnapshot {
        plan,
        used,
        quota,
        days_remaining,
    } = snapshot;

    let percent_used = percent_used(used, quota);
    let near_limit = percent_used >= NEAR_LIMIT_PERCENT;
    let limit_exceeded = quota > 0 && used >= quota;

    let (alert_message, progress_color, status_icon) = if plan.is_unlimited() {
        (None, ProgressColor::Success, StatusIcon::Unlimited)
    } else if limit_exceeded {
        (
            Some(exceeded_message(plan, quota)),
            ProgressColor::Danger,
            StatusIcon::AlertFilled,
        )
    } else if near_limit {
        (
            Some(near_limit_message(plan, quota - used)),
            ProgressColor::Warning,
            StatusIcon::WarningFilled,
        )
    } else {
        (None, ProgressColor::Primary, StatusIcon::OkFilled)
    };

    UsageMetrics {
        plan,
        used,
        quota,
        remaining: (!plan.is_unlimited()).then(|| quota.saturating_sub(used)),
        days_remaining,
        percent_used,
        near_limit,
        limit_exceeded,
        alert_message,
        progress_color,
        status_icon,
    }
}

/// `used * 100 / quota` in decimal arithmetic, half-up at two places.
fn percent_used(used: u64, quota: u64) -> Decimal {
    let mut percent = if quota == 0 {
        Decimal::ZERO
    } else {
        (Decimal::from(used) * Decimal::ONE_HUNDRED / Decimal::from(quota))
            .round_dp_with_strategy(PERCENT_SCALE, RoundingStrategy::MidpointAwayFromZero)
    };
    // Display as e.g. "75.00" rather than "75".
    percent.rescale(PERCENT_SCALE);
    percent
}

fn exceeded_message(plan: Plan, quota: u64) -> String {
    format!(
        "Você atingiu o limite de {quota} lançamentos do plano {plan} neste mês. \
         Faça upgrade para o plano PRO e registre lançamentos ilimitados."
    )
}

fn near_limit_message(plan: Plan, remaining: u64) -> String {
    format!(
        "Atenção: restam apenas {remaining} lançamentos no plano {plan} neste mês. \
         Faça upgrade para o plano PRO e não fique sem registrar."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn free(used: u64, quota: u64) -> UsageMetrics {
        evaluate(UsageSnapshot::new(Plan::Free, used, quota, 10))
    }

    fn pct(units: i64) -> Decimal {
        Decimal::new(units, 2)
    }

    #[test]
    fn under_threshold_has_no_alert() {
        let metrics = free(15, 20);
        assert_eq!(metrics.percent_used, pct(7500));
        assert_eq!(metrics.percent_used.to_string(), "75.00");
        assert!(!metrics.near_limit);
        assert!(!metrics.limit_exceeded);
        assert_eq!(metrics.alert_message, None);
        assert_eq!(metrics.progress_color, ProgressColor::Primary);
        assert_eq!(metrics.status_icon, StatusIcon::OkFilled);
        assert_eq!(metrics.remaining, Some(5));
        assert_eq!(metrics.days_remaining, 10);
    }

    #[test]
    fn near_limit_mentions_remaining_entries() {
        let metrics = free(17, 20);
        assert_eq!(metrics.percent_used, pct(8500));
        assert!(metrics.near_limit);
        assert!(!metrics.limit_exceeded);
        let alert = metrics.alert_message.unwrap();
        assert!(alert.contains(" 3 "), "{alert}");
        assert!(alert.contains("PRO"));
        assert_eq!(metrics.progress_color, ProgressColor::Warning);
        assert_eq!(metrics.status_icon, StatusIcon::WarningFilled);
    }

    #[test]
    fn exactly_at_threshold_is_near_limit() {
        let metrics = free(16, 20);
        assert_eq!(metrics.percent_used, pct(8000));
        assert!(metrics.near_limit);
    }

    #[test]
    fn exceeded_wins_over_near_limit() {
        let metrics = free(20, 20);
        assert_eq!(metrics.percent_used, pct(10000));
        assert!(metrics.near_limit);
        assert!(metrics.limit_exceeded);
        let alert = metrics.alert_message.clone().unwrap();
        assert!(alert.contains("limite de 20"), "{alert}");
        assert!(!alert.contains("restam"));
        assert_eq!(metrics.progress_color, ProgressColor::Danger);
        assert_eq!(metrics.status_icon, StatusIcon::AlertFilled);
        assert_eq!(metrics.remaining, Some(0));
        assert!(metrics.blocks_new_entries());
    }

    #[test]
    fn over_quota_keeps_counting_percent() {
        let metrics = free(25, 20);
        assert_eq!(metrics.percent_used, pct(12500));
        assert!(metrics.limit_exceeded);
        assert_eq!(metrics.remaining, Some(0));
    }

    #[test]
    fn unused_free_account() {
        let metrics = free(0, 20);
        assert_eq!(metrics.percent_used, pct(0));
        assert_eq!(metrics.percent_used.to_string(), "0.00");
        assert!(!metrics.near_limit);
        assert!(!metrics.limit_exceeded);
        assert_eq!(metrics.alert_message, None);
        assert_eq!(metrics.progress_color, ProgressColor::Primary);
    }

    #[test]
    fn zero_quota_is_never_exceeded() {
        for used in [0, 1, 500] {
            let metrics = free(used, 0);
            assert_eq!(metrics.percent_used, Decimal::ZERO);
            assert!(!metrics.limit_exceeded);
            assert!(!metrics.near_limit);
            assert!(!metrics.blocks_new_entries());
        }
    }

    #[test]
    fn pro_with_unlimited_sentinel() {
        let metrics = evaluate(UsageSnapshot::new(Plan::Pro, 500, 0, 3));
        assert_eq!(metrics.percent_used.to_string(), "0.00");
        assert!(!metrics.limit_exceeded);
        assert_eq!(metrics.alert_message, None);
        assert_eq!(metrics.progress_color, ProgressColor::Success);
        assert_eq!(metrics.status_icon, StatusIcon::Unlimited);
        assert_eq!(metrics.remaining, None);
    }

    #[test]
    fn pro_suppresses_messaging_even_when_flags_are_set() {
        let metrics = evaluate(UsageSnapshot::new(Plan::Pro, 30, 20, 3));
        assert!(metrics.limit_exceeded);
        assert_eq!(metrics.alert_message, None);
        assert_eq!(metrics.progress_color, ProgressColor::Success);
        assert_eq!(metrics.status_icon, StatusIcon::Unlimited);
        assert!(!metrics.blocks_new_entries());
    }

    #[test]
    fn rounds_half_up_at_exact_midpoints() {
        // 1.005 and 0.015 are not representable in binary floating point.
        assert_eq!(free(201, 20_000).percent_used, pct(101));
        assert_eq!(free(3, 20_000).percent_used, pct(2));
        assert_eq!(free(1, 20_000).percent_used, pct(1));
        assert_eq!(free(1, 40_000).percent_used, pct(0));
    }

    #[test]
    fn rounds_repeating_fractions() {
        assert_eq!(free(1, 3).percent_used, pct(3333));
        assert_eq!(free(2, 3).percent_used, pct(6667));
        assert_eq!(free(13, 16).percent_used, pct(8125));
    }

    #[test]
    fn percent_matches_formula_across_range() {
        for quota in 1..=40u64 {
            for used in 0..=quota + 5 {
                let metrics = free(used, quota);
                let expected = (Decimal::from(used * 100) / Decimal::from(quota))
                    .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
                assert_eq!(metrics.percent_used, expected, "{used}/{quota}");
                assert!(metrics.percent_used >= Decimal::ZERO);
                assert_eq!(metrics.near_limit, expected >= NEAR_LIMIT_PERCENT);
                assert_eq!(metrics.limit_exceeded, used >= quota);
            }
        }
    }

    #[test]
    fn evaluation_is_idempotent() {
        let snapshot = UsageSnapshot::new(Plan::Free, 17, 20, 4);
        assert_eq!(evaluate(snapshot), evaluate(snapshot));
    }

    #[test]
    fn try_new_rejects_negative_fields() {
        let err = UsageSnapshot::try_new(Plan::Free, -1, 20, 5).unwrap_err();
        assert!(matches!(err, MeiError::InvalidArgument { field: "used", .. }));

        let err = UsageSnapshot::try_new(Plan::Free, 1, -20, 5).unwrap_err();
        assert!(matches!(err, MeiError::InvalidArgument { field: "quota", .. }));

        let err = UsageSnapshot::try_new(Plan::Free, 1, 20, -5).unwrap_err();
        assert!(matches!(
            err,
            MeiError::InvalidArgument {
                field: "days_remaining",
                ..
            }
        ));

        let ok = UsageSnapshot::try_new(Plan::Free, 1, 20, 5).unwrap();
        assert_eq!(ok, UsageSnapshot::new(Plan::Free, 1, 20, 5));
    }

    #[test]
    fn metrics_serialize_for_the_dashboard() {
        let json = serde_json::to_value(free(17, 20)).unwrap();
        assert_eq!(json["plan"], "FREE");
        assert_eq!(json["progress_color"], "warning");
        assert_eq!(json["status_icon"], "warning-filled");
        assert_eq!(json["percent_used"], "85.00");

        let json = serde_json::to_value(free(1, 20)).unwrap();
        assert!(json.get("alert_message").is_none());
    }
}

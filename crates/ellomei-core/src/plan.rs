//! Subscription plans and their entry quotas.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::MeiError;

/// Default number of entries a FREE account may record per month.
pub const DEFAULT_FREE_MONTHLY_QUOTA: u64 = 20;

/// Available subscription plans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Plan {
    /// Free tier: fixed monthly entry quota.
    Free,

    /// Pro plan: unlimited entries.
    Pro,
}

impl Plan {
    /// Whether the plan has no entry quota.
    #[must_use]
    pub const fn is_unlimited(&self) -> bool {
        matches!(self, Self::Pro)
    }

    /// Get the plan name as shown to users.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "FREE",
            Self::Pro => "PRO",
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Plan {
    type Err = MeiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FREE" => Ok(Self::Free),
            "PRO" => Ok(Self::Pro),
            _ => Err(MeiError::InvalidPlan(s.to_string())),
        }
    }
}

/// Entry quotas per plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanLimits {
    /// Entries a FREE account may record per billing period.
    pub free_monthly_quota: u64,
}

impl PlanLimits {
    /// Create limits with the given FREE quota.
    #[must_use]
    pub const fn new(free_monthly_quota: u64) -> Self {
        Self { free_monthly_quota }
    }

    /// Quota enforced for `plan`, or `None` when unlimited.
    #[must_use]
    pub const fn quota_for(&self, plan: Plan) -> Option<u64> {
        match plan {
            Plan::Free => Some(self.free_monthly_quota),
            Plan::Pro => None,
        }
    }

    /// Quota as carried in a usage snapshot. Unlimited plans use the `0` sentinel.
    #[must_use]
    pub const fn snapshot_quota(&self, plan: Plan) -> u64 {
        match self.quota_for(plan) {
            Some(quota) => quota,
            None => 0,
        }
    }
}

impl Default for PlanLimits {
    fn default() -> Self {
        Self::new(DEFAULT_FREE_MONTHLY_QUOTA)
    }
}

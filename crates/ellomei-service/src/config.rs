//! Service configuration.

use std::str::FromStr;
use std::time::Duration;

use ellomei_core::{PlanLimits, DEFAULT_FREE_MONTHLY_QUOTA};

/// Default minimum password length.
const DEFAULT_MIN_PASSWORD_LENGTH: usize = 8;

/// Default number of delivery attempts per outbox intent.
const DEFAULT_OUTBOX_MAX_ATTEMPTS: u32 = 3;

/// Default initial retry backoff (doubles with each attempt).
const DEFAULT_OUTBOX_INITIAL_BACKOFF_MS: u64 = 100;

/// Default retry backoff cap.
const DEFAULT_OUTBOX_MAX_BACKOFF_MS: u64 = 5000;

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Entry quotas per plan (`FREE_PLAN_MONTHLY_QUOTA`, default 20).
    pub plan_limits: PlanLimits,

    /// Minimum password length accepted at registration (`MIN_PASSWORD_LENGTH`, default 8).
    pub min_password_length: usize,

    /// Delivery attempts per outbox intent (`OUTBOX_MAX_ATTEMPTS`, default 3).
    pub outbox_max_attempts: u32,

    /// First retry backoff in milliseconds (`OUTBOX_INITIAL_BACKOFF_MS`, default 100).
    pub outbox_initial_backoff_ms: u64,

    /// Retry backoff cap in milliseconds (`OUTBOX_MAX_BACKOFF_MS`, default 5000).
    pub outbox_max_backoff_ms: u64,

    /// Sender address for welcome emails (`WELCOME_SENDER`).
    pub welcome_sender: String,
}

impl ServiceConfig {
    /// Load configuration from environment variables.
    ///
    /// Missing variables use defaults; unparseable ones are logged and ignored.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            plan_limits: PlanLimits::new(parse_var(
                &lookup,
                "FREE_PLAN_MONTHLY_QUOTA",
                defaults.plan_limits.free_monthly_quota,
            )),
            min_password_length: parse_var(
                &lookup,
                "MIN_PASSWORD_LENGTH",
                defaults.min_password_length,
            ),
            outbox_max_attempts: parse_var(
                &lookup,
                "OUTBOX_MAX_ATTEMPTS",
                defaults.outbox_max_attempts,
            )
            .max(1),
            outbox_initial_backoff_ms: parse_var(
                &lookup,
                "OUTBOX_INITIAL_BACKOFF_MS",
                defaults.outbox_initial_backoff_ms,
            ),
            outbox_max_backoff_ms: parse_var(
                &lookup,
                "OUTBOX_MAX_BACKOFF_MS",
                defaults.outbox_max_backoff_ms,
            ),
            welcome_sender: lookup("WELCOME_SENDER").unwrap_or(defaults.welcome_sender),
        }
    }

    /// First retry backoff.
    #[must_use]
    pub const fn outbox_initial_backoff(&self) -> Duration {
        Duration::from_millis(self.outbox_initial_backoff_ms)
    }

    /// Retry backoff cap.
    #[must_use]
    pub const fn outbox_max_backoff(&self) -> Duration {
        Duration::from_millis(self.outbox_max_backoff_ms)
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    let Some(raw) = lookup(key) else {
        return default;
    };
    raw.trim().parse().unwrap_or_else(|_| {
        tracing::warn!(key = %key, value = %raw, "Ignoring unparseable configuration value");
        default
    })
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            plan_limits: PlanLimits::new(DEFAULT_FREE_MONTHLY_QUOTA),
            min_password_length: DEFAULT_MIN_PASSWORD_LENGTH,
            outbox_max_attempts: DEFAULT_OUTBOX_MAX_ATTEMPTS,
            outbox_initial_backoff_ms: DEFAULT_OUTBOX_INITIAL_BACKOFF_MS,
            outbox_max_backoff_ms: DEFAULT_OUTBOX_MAX_BACKOFF_MS,
            welcome_sender: "no-reply@ellomei.com.br".into(),
        }
    }
}

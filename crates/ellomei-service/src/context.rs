//! Request context.
//!
//! The acting user is resolved once, where a request enters the service, and
//! then passed explicitly to every operation that needs it.

use chrono::{DateTime, Utc};

use ellomei_core::{BillingPeriod, Plan, UserId};

use crate::error::{Result, ServiceError};
use crate::state::AppState;

/// The user performing an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActingUser {
    /// The user ID.
    pub user_id: UserId,
    /// The user's plan at resolution time.
    pub plan: Plan,
}

/// Everything an operation needs to know about its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestContext {
    /// The acting user.
    pub actor: ActingUser,
    /// The request time.
    pub now: DateTime<Utc>,
}

impl RequestContext {
    /// Resolve the context for `user_id` at the current time.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the user doesn't exist.
    pub fn resolve(state: &AppState, user_id: UserId) -> Result<Self> {
        Self::resolve_at(state, user_id, Utc::now())
    }

    /// Resolve the context for `user_id` at a given time.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the user doesn't exist.
    pub fn resolve_at(state: &AppState, user_id: UserId, now: DateTime<Utc>) -> Result<Self> {
        let user = state
            .store
            .get_user(&user_id)?
            .ok_or_else(|| ServiceError::NotFound("User not found".into()))?;

        Ok(Self {
            actor: ActingUser {
                user_id: user.id,
                plan: user.plan,
            },
            now,
        })
    }

    /// The billing period the request falls in.
    #[must_use]
    pub fn period(&self) -> BillingPeriod {
        BillingPeriod::at(self.now)
    }
}

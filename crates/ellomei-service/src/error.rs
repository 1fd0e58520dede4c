//! Service error types and their rendered form.

use serde::Serialize;

use ellomei_core::MeiError;
use ellomei_store::StoreError;

use crate::validation::FieldError;

/// Result type for service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Service error type.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Resource already exists.
    #[error("conflict: {0}")]
    Conflict(String),

    /// One or more fields failed validation.
    #[error("validation failed: {} field error(s)", .0.len())]
    Validation(Vec<FieldError>),

    /// A value is outside the accepted domain.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The plan's entry quota is used up.
    #[error("plan limit exceeded: used={used}, quota={quota}")]
    PlanLimitExceeded {
        /// Entries already recorded this period.
        used: u64,
        /// Entries allowed per period.
        quota: u64,
    },

    /// A follow-up intent could not be delivered.
    #[error("dispatch error: {0}")]
    Dispatch(String),
}

/// JSON error body for presentation layers.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// The error.
    pub error: ErrorBody,
}

/// Error details.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Stable machine-readable code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// Structured details, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ServiceError {
    /// Stable snake_case error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::Validation(_) => "validation_failed",
            Self::InvalidArgument(_) => "invalid_argument",
            Self::PlanLimitExceeded { .. } => "plan_limit_exceeded",
            Self::Dispatch(_) => "dispatch_failed",
        }
    }

    /// Render the error for a presentation layer.
    #[must_use]
    pub fn to_body(&self) -> ErrorResponse {
        let details = match self {
            Self::Validation(errors) => Some(serde_json::json!({ "fields": errors })),
            Self::PlanLimitExceeded { used, quota } => Some(serde_json::json!({
                "used": used,
                "quota": quota
            })),
            _ => None,
        };

        ErrorResponse {
            error: ErrorBody {
                code: self.code().to_string(),
                message: self.to_string(),
                details,
            },
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => Self::NotFound(format!("{entity} not found: {id}")),
            StoreError::Conflict(msg) => Self::Conflict(msg),
            StoreError::QuotaExhausted { used, quota } => Self::PlanLimitExceeded { used, quota },
        }
    }
}

impl From<MeiError> for ServiceError {
    fn from(err: MeiError) -> Self {
        Self::InvalidArgument(err.to_string())
    }
}

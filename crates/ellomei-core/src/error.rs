//! Error types for ElloMEI.

/// Result type for ElloMEI core operations.
pub type Result<T> = std::result::Result<T, MeiError>;

/// Errors that can occur in ElloMEI core operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MeiError {
    /// A value is outside the domain the operation accepts.
    #[error("invalid argument `{field}`: {reason}")]
    InvalidArgument {
        /// The offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// Unknown plan name.
    #[error("invalid plan: {0}")]
    InvalidPlan(String),
}

impl MeiError {
    /// Shorthand for [`MeiError::InvalidArgument`].
    #[must_use]
    pub fn invalid_argument(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field,
            reason: reason.into(),
        }
    }
}

//! Error types for ElloMEI storage.

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Record not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of record.
        entity: &'static str,
        /// The identifier that was looked up.
        id: String,
    },

    /// A unique field is already taken.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The period quota is used up.
    #[error("quota exhausted: used={used}, quota={quota}")]
    QuotaExhausted {
        /// Entries already recorded this period.
        used: u64,
        /// Entries allowed per period.
        quota: u64,
    },
}

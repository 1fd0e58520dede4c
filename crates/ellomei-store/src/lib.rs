//! Usage-tracking storage layer for ElloMEI.
//!
//! This crate stores users, their entries and the audit trail, and counts
//! entries per user per billing period.
//!
//! # Quota enforcement
//!
//! [`Store::record_entry`] checks the quota and records the entry under a single
//! write lock. Two concurrent requests that both see 19 of 20 entries cannot
//! both succeed: the second one observes the first one's increment.
//!
//! # Example
//!
//! ```
//! use chrono::Utc;
//! use ellomei_core::{BillingPeriod, Entry, EntryKind, TaxDocument, User};
//! use ellomei_store::{MemoryStore, Store};
//!
//! let store = MemoryStore::new();
//! let doc = TaxDocument::parse("123.456.789-09").unwrap();
//! let user = User::new("Maria".into(), "maria@example.com", doc, Utc::now());
//! store.insert_user(&user).unwrap();
//!
//! let entry = Entry::new(user.id, EntryKind::Income, "Venda".into(), 15_000, Utc::now());
//! let period = BillingPeriod::at(entry.occurred_at);
//! assert_eq!(store.record_entry(&entry, period, Some(20)).unwrap(), 1);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod memory;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;

use chrono::{DateTime, Utc};
use ellomei_core::{AuditRecord, BillingPeriod, Entry, Plan, User, UserId};

/// The storage trait defining all usage-tracking operations.
///
/// This trait abstracts the storage layer so the service can run against any
/// backend that honours the atomic check-and-record contract.
pub trait Store: Send + Sync {
    // =========================================================================
    // User Operations
    // =========================================================================

    /// Insert a new user.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` if the id, email or document is taken.
    fn insert_user(&self, user: &User) -> Result<()>;

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn get_user(&self, user_id: &UserId) -> Result<Option<User>>;

    /// Change a user's plan. Returns the updated user.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the user doesn't exist.
    fn update_plan(&self, user_id: &UserId, plan: Plan, now: DateTime<Utc>) -> Result<User>;

    // =========================================================================
    // Entry Operations
    // =========================================================================

    /// Number of entries the user recorded in `period`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn entry_count(&self, user_id: &UserId, period: BillingPeriod) -> Result<u64>;

    /// Record an entry in `period` if the quota allows it.
    ///
    /// With `quota = Some(q)` the entry is rejected when `q` entries already
    /// exist. `None` and `Some(0)` mean unlimited. Returns the new count.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the user doesn't exist.
    /// - `StoreError::QuotaExhausted` if the quota is used up; nothing is recorded.
    fn record_entry(&self, entry: &Entry, period: BillingPeriod, quota: Option<u64>)
        -> Result<u64>;

    /// List the user's entries in `period`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn list_entries(&self, user_id: &UserId, period: BillingPeriod) -> Result<Vec<Entry>>;

    // =========================================================================
    // Audit Operations
    // =========================================================================

    /// Append an audit record.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn append_audit(&self, record: &AuditRecord) -> Result<()>;

    /// List audit records for a user, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn list_audit(&self, user_id: &UserId) -> Result<Vec<AuditRecord>>;
}

//! In-memory storage implementation.
//!
//! This module provides the `MemoryStore` implementation of the `Store` trait.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use ellomei_core::{AuditRecord, BillingPeriod, Entry, Plan, User, UserId};

use crate::error::{Result, StoreError};
use crate::Store;

/// In-memory storage implementation.
///
/// All state sits behind one `RwLock`; quota checks and increments happen
/// under the write guard.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    users: HashMap<UserId, User>,
    // Unique indexes: lower-cased email and document digits.
    emails: HashMap<String, UserId>,
    documents: HashMap<String, UserId>,
    entries: HashMap<(UserId, BillingPeriod), Vec<Entry>>,
    audit: HashMap<UserId, Vec<AuditRecord>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn user_not_found(user_id: &UserId) -> StoreError {
    StoreError::NotFound {
        entity: "user",
        id: user_id.to_string(),
    }
}

impl Store for MemoryStore {
    // =========================================================================
    // User Operations
    // =========================================================================

    fn insert_user(&self, user: &User) -> Result<()> {
        let mut inner = self.inner.write();

        if inner.users.contains_key(&user.id) {
            return Err(StoreError::Conflict(format!("user {} already exists", user.id)));
        }
        let email = user.email.to_lowercase();
        if inner.emails.contains_key(&email) {
            return Err(StoreError::Conflict("email already registered".into()));
        }
        let document = user.document.digits().to_string();
        if inner.documents.contains_key(&document) {
            return Err(StoreError::Conflict(format!(
                "{} already registered",
                user.document.kind()
            )));
        }

        inner.emails.insert(email, user.id);
        inner.documents.insert(document, user.id);
        inner.users.insert(user.id, user.clone());

        tracing::debug!(user_id = %user.id, "User stored");
        Ok(())
    }

    fn get_user(&self, user_id: &UserId) -> Result<Option<User>> {
        Ok(self.inner.read().users.get(user_id).cloned())
    }

    fn update_plan(&self, user_id: &UserId, plan: Plan, now: DateTime<Utc>) -> Result<User> {
        let mut inner = self.inner.write();
        let user = inner
            .users
            .get_mut(user_id)
            .ok_or_else(|| user_not_found(user_id))?;

        user.plan = plan;
        user.updated_at = now;

        Ok(user.clone())
    }

    // =========================================================================
    // Entry Operations
    // =========================================================================

    fn entry_count(&self, user_id: &UserId, period: BillingPeriod) -> Result<u64> {
        let inner = self.inner.read();
        let count = inner.entries.get(&(*user_id, period)).map_or(0, Vec::len);
        Ok(count as u64)
    }

    fn record_entry(
        &self,
        entry: &Entry,
        period: BillingPeriod,
        quota: Option<u64>,
    ) -> Result<u64> {
        let mut inner = self.inner.write();

        if !inner.users.contains_key(&entry.user_id) {
            return Err(user_not_found(&entry.user_id));
        }

        let key = (entry.user_id, period);
        let used = inner.entries.get(&key).map_or(0, |entries| entries.len() as u64);

        // A zero quota is never exhausted.
        if let Some(quota) = quota.filter(|&q| q > 0) {
            if used >= quota {
                tracing::debug!(
                    user_id = %entry.user_id,
                    period = %period,
                    used,
                    quota,
                    "Entry rejected, quota exhausted"
                );
                return Err(StoreError::QuotaExhausted { used, quota });
            }
        }

        inner.entries.entry(key).or_default().push(entry.clone());
        Ok(used + 1)
    }

    fn list_entries(&self, user_id: &UserId, period: BillingPeriod) -> Result<Vec<Entry>> {
        let inner = self.inner.read();
        Ok(inner
            .entries
            .get(&(*user_id, period))
            .cloned()
            .unwrap_or_default())
    }

    // =========================================================================
    // Audit Operations
    // =========================================================================

    fn append_audit(&self, record: &AuditRecord) -> Result<()> {
        self.inner
            .write()
            .audit
            .entry(record.user_id)
            .or_default()
            .push(record.clone());
        Ok(())
    }

    fn list_audit(&self, user_id: &UserId) -> Result<Vec<AuditRecord>> {
        Ok(self
            .inner
            .read()
            .audit
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }
}

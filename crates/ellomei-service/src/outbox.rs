//! Follow-up intents and their dispatcher.
//!
//! Operations never call the mailer or the audit trail themselves. They return
//! an [`Outbox`]: the ordered follow-ups the caller hands to an
//! [`OutboxDispatcher`] once the operation has committed.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use ellomei_core::{AuditRecord, UserId};
use ellomei_store::Store;

use crate::config::ServiceConfig;
use crate::error::ServiceError;

/// A follow-up to run after an operation commits.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FollowUp {
    /// Welcome a newly registered user.
    SendWelcomeEmail {
        /// The new user.
        user_id: UserId,
        /// Display name.
        name: String,
        /// Recipient address.
        email: String,
    },

    /// Append to the user's audit trail.
    WriteAuditRecord {
        /// The user the event concerns.
        user_id: UserId,
        /// Event name.
        action: String,
        /// Event details.
        details: serde_json::Value,
        /// When the event happened.
        at: DateTime<Utc>,
    },
}

impl FollowUp {
    /// Short name for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::SendWelcomeEmail { .. } => "send_welcome_email",
            Self::WriteAuditRecord { .. } => "write_audit_record",
        }
    }
}

/// Ordered list of follow-ups produced by one operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Outbox {
    intents: Vec<FollowUp>,
}

impl Outbox {
    /// Create an empty outbox.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an intent.
    pub fn push(&mut self, intent: FollowUp) {
        self.intents.push(intent);
    }

    /// The intents in order.
    #[must_use]
    pub fn intents(&self) -> &[FollowUp] {
        &self.intents
    }

    /// Number of intents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.intents.len()
    }

    /// Whether there is nothing to dispatch.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.intents.is_empty()
    }
}

impl IntoIterator for Outbox {
    type Item = FollowUp;
    type IntoIter = std::vec::IntoIter<FollowUp>;

    fn into_iter(self) -> Self::IntoIter {
        self.intents.into_iter()
    }
}

/// A follow-up could not be delivered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct DispatchError(pub String);

/// Sends transactional email.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send the welcome email to a new user.
    async fn send_welcome(&self, to: &str, name: &str) -> Result<(), DispatchError>;
}

/// Receives audit records.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Persist an audit record.
    async fn write(&self, record: AuditRecord) -> Result<(), DispatchError>;
}

/// Mailer that only logs. Used until a real delivery backend is wired in.
#[derive(Debug, Clone)]
pub struct LogMailer {
    sender: String,
}

impl LogMailer {
    /// Create a mailer sending from `sender`.
    #[must_use]
    pub fn new(sender: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
        }
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send_welcome(&self, to: &str, name: &str) -> Result<(), DispatchError> {
        tracing::info!(from = %self.sender, to = %to, name = %name, "Welcome email sent");
        Ok(())
    }
}

/// Audit sink writing to the store.
#[derive(Clone)]
pub struct StoreAuditSink {
    store: Arc<dyn Store>,
}

impl StoreAuditSink {
    /// Create a sink over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl AuditSink for StoreAuditSink {
    async fn write(&self, record: AuditRecord) -> Result<(), DispatchError> {
        self.store
            .append_audit(&record)
            .map_err(|e| DispatchError(e.to_string()))
    }
}

/// An intent that exhausted its attempts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedIntent {
    /// The intent.
    pub intent: FollowUp,
    /// The last error.
    pub error: String,
}

/// Result of dispatching an outbox.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DispatchReport {
    /// Intents delivered.
    pub delivered: usize,
    /// Intents that failed after all retries.
    pub failed: Vec<FailedIntent>,
}

impl DispatchReport {
    /// Whether every intent was delivered.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Turn a partial delivery into an error.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Dispatch` listing the failed intents.
    pub fn into_result(self) -> Result<usize, ServiceError> {
        if self.failed.is_empty() {
            return Ok(self.delivered);
        }
        let failed: Vec<_> = self
            .failed
            .iter()
            .map(|f| format!("{}: {}", f.intent.kind(), f.error))
            .collect();
        Err(ServiceError::Dispatch(failed.join("; ")))
    }
}

/// Delivers outbox intents in order, retrying each with exponential backoff.
#[derive(Clone)]
pub struct OutboxDispatcher {
    mailer: Arc<dyn Mailer>,
    audit: Arc<dyn AuditSink>,
    max_attempts: u32,
    initial_backoff: Duration,
    max_backoff: Duration,
}

impl OutboxDispatcher {
    /// Create a dispatcher with retry settings from `config`.
    #[must_use]
    pub fn new(mailer: Arc<dyn Mailer>, audit: Arc<dyn AuditSink>, config: &ServiceConfig) -> Self {
        Self {
            mailer,
            audit,
            max_attempts: config.outbox_max_attempts.max(1),
            initial_backoff: config.outbox_initial_backoff(),
            max_backoff: config.outbox_max_backoff(),
        }
    }

    /// Deliver every intent. A failed intent does not stop the ones after it.
    pub async fn dispatch(&self, outbox: Outbox) -> DispatchReport {
        let mut report = DispatchReport::default();

        for intent in outbox {
            match self.deliver_with_retry(&intent).await {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    tracing::error!(
                        intent = intent.kind(),
                        error = %e,
                        "Follow-up failed after all retries"
                    );
                    report.failed.push(FailedIntent {
                        intent,
                        error: e.0,
                    });
                }
            }
        }

        report
    }

    async fn deliver_with_retry(&self, intent: &FollowUp) -> Result<(), DispatchError> {
        let mut attempt = 0;
        let mut backoff = self.initial_backoff;

        loop {
            match self.deliver(intent).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    attempt += 1;

                    if attempt >= self.max_attempts {
                        return Err(e);
                    }

                    tracing::debug!(
                        intent = intent.kind(),
                        attempt = %attempt,
                        backoff_ms = %backoff.as_millis(),
                        error = %e,
                        "Follow-up failed, retrying"
                    );

                    tokio::time::sleep(backoff).await;
                    backoff = (backoff * 2).min(self.max_backoff);
                }
            }
        }
    }

    async fn deliver(&self, intent: &FollowUp) -> Result<(), DispatchError> {
        match intent {
            FollowUp::SendWelcomeEmail { email, name, .. } => {
                self.mailer.send_welcome(email, name).await
            }
            FollowUp::WriteAuditRecord {
                user_id,
                action,
                details,
                at,
            } => {
                let record = AuditRecord::new(*user_id, action.clone(), details.clone(), *at);
                self.audit.write(record).await
            }
        }
    }
}

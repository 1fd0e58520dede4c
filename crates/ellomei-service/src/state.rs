//! Application state.

use std::sync::Arc;

use ellomei_store::Store;

use crate::config::ServiceConfig;
use crate::outbox::{AuditSink, LogMailer, Mailer, OutboxDispatcher, StoreAuditSink};
use crate::validation::ValidatorRegistry;

/// Application state shared across operations.
#[derive(Clone)]
pub struct AppState {
    /// The storage backend.
    pub store: Arc<dyn Store>,

    /// Service configuration.
    pub config: ServiceConfig,

    /// Validation rules for incoming data.
    pub validators: Arc<ValidatorRegistry>,

    /// Delivers follow-ups returned by operations.
    pub dispatcher: OutboxDispatcher,
}

impl AppState {
    /// Create a new application state with the built-in validators, a logging
    /// mailer and an audit trail kept in `store`.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, config: ServiceConfig) -> Self {
        let mailer: Arc<dyn Mailer> = Arc::new(LogMailer::new(config.welcome_sender.clone()));
        let audit: Arc<dyn AuditSink> = Arc::new(StoreAuditSink::new(Arc::clone(&store)));

        tracing::info!(
            free_monthly_quota = config.plan_limits.free_monthly_quota,
            "Application state initialised"
        );

        Self {
            validators: Arc::new(ValidatorRegistry::with_builtins(config.min_password_length)),
            dispatcher: OutboxDispatcher::new(mailer, audit, &config),
            store,
            config,
        }
    }

    /// Replace the mailer used for follow-ups.
    #[must_use]
    pub fn with_mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
        let audit: Arc<dyn AuditSink> = Arc::new(StoreAuditSink::new(Arc::clone(&self.store)));
        self.dispatcher = OutboxDispatcher::new(mailer, audit, &self.config);
        self
    }
}

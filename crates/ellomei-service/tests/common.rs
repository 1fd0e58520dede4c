//! Common test utilities for ElloMEI integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};

use ellomei_core::{EntryKind, UserId};
use ellomei_service::handlers::accounts::{self, RegisterUserRequest};
use ellomei_service::handlers::entries::{self, RecordEntryRequest};
use ellomei_service::{telemetry, AppState, RequestContext, ServiceConfig};
use ellomei_store::{MemoryStore, Store};

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The application state.
    pub state: AppState,
    /// The store behind the state, for direct inspection.
    pub store: Arc<MemoryStore>,
}

impl TestHarness {
    /// Create a new harness with default configuration (FREE quota 20).
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    /// Create a new harness with the given configuration.
    pub fn with_config(config: ServiceConfig) -> Self {
        telemetry::init_for_tests();

        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(store.clone(), config);

        Self { state, store }
    }

    /// Register a user and return its ID.
    pub async fn register(&self, email: &str, document: &str) -> UserId {
        let registration = accounts::register_user(&self.state, registration(email, document))
            .await
            .expect("registration succeeds");
        registration.user.user_id.parse().expect("valid user id")
    }

    /// Register a default user and return its ID.
    pub async fn register_default(&self) -> UserId {
        self.register("maria@example.com", "123.456.789-09").await
    }

    /// Resolve a request context at a fixed instant.
    pub fn ctx(&self, user_id: UserId, now: DateTime<Utc>) -> RequestContext {
        RequestContext::resolve_at(&self.state, user_id, now).expect("user exists")
    }

    /// Record `count` entries for the user at `now`.
    pub async fn record_many(&self, user_id: UserId, now: DateTime<Utc>, count: usize) {
        let ctx = self.ctx(user_id, now);
        for i in 0..count {
            entries::record_entry(&self.state, &ctx, entry_request(&format!("Venda {i}")))
                .await
                .expect("entry recorded");
        }
    }

    /// Entries stored for the user in the period containing `now`.
    pub fn stored_count(&self, user_id: UserId, now: DateTime<Utc>) -> u64 {
        self.store
            .entry_count(&user_id, ellomei_core::BillingPeriod::at(now))
            .expect("count")
    }
}

/// Configuration with retries that don't slow tests down.
pub fn test_config() -> ServiceConfig {
    ServiceConfig {
        outbox_initial_backoff_ms: 1,
        outbox_max_backoff_ms: 2,
        ..ServiceConfig::default()
    }
}

/// A valid registration request.
pub fn registration(email: &str, document: &str) -> RegisterUserRequest {
    RegisterUserRequest {
        name: "Maria da Silva".into(),
        email: email.into(),
        password: "segura123".into(),
        document: document.into(),
    }
}

/// A valid income entry of R$ 150,00.
pub fn entry_request(description: &str) -> RecordEntryRequest {
    RecordEntryRequest {
        kind: EntryKind::Income,
        description: description.into(),
        amount_cents: 15_000,
    }
}

/// 19 October 2026, 12 days before the end of the month.
pub fn mid_october() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 14, 30, 0).unwrap()
}

/// 1 November 2026, the start of the next period.
pub fn first_of_november() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 11, 1, 9, 0, 0).unwrap()
}

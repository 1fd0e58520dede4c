//! Registration and plan management integration tests.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use common::{mid_october, registration, TestHarness};
use ellomei_core::{Plan, UserId};
use ellomei_service::handlers::accounts::{self, ChangePlanRequest, RegisterUserRequest};
use ellomei_service::{DispatchError, FollowUp, Mailer, RequestContext, ServiceError};
use ellomei_store::Store;

// ============================================================================
// Registration
// ============================================================================

#[tokio::test]
async fn register_user_success() {
    let harness = TestHarness::new();

    let registration = accounts::register_user(
        &harness.state,
        registration(" Maria@Example.com ", "123.456.789-09"),
    )
    .await
    .unwrap();

    assert_eq!(registration.user.email, "maria@example.com");
    assert_eq!(registration.user.plan, Plan::Free);
    assert_eq!(registration.user.document_type, "cpf");

    let user_id: UserId = registration.user.user_id.parse().unwrap();
    let stored = harness.store.get_user(&user_id).unwrap().unwrap();
    assert_eq!(stored.document.digits(), "12345678909");
}

#[tokio::test]
async fn register_with_cnpj() {
    let harness = TestHarness::new();

    let registration = accounts::register_user(
        &harness.state,
        registration("loja@example.com", "12.345.678/0001-95"),
    )
    .await
    .unwrap();

    assert_eq!(registration.user.document_type, "cnpj");
}

#[tokio::test]
async fn registration_outbox_is_welcome_then_audit() {
    let harness = TestHarness::new();

    let registration =
        accounts::register_user(&harness.state, registration("maria@example.com", "12345678909"))
            .await
            .unwrap();

    let intents = registration.outbox.intents();
    assert_eq!(intents.len(), 2);
    assert!(matches!(
        &intents[0],
        FollowUp::SendWelcomeEmail { email, .. } if email == "maria@example.com"
    ));
    assert!(matches!(
        &intents[1],
        FollowUp::WriteAuditRecord { action, .. } if action == "user_registered"
    ));

    // Nothing runs until the outbox is dispatched.
    let user_id: UserId = registration.user.user_id.parse().unwrap();
    assert!(harness.store.list_audit(&user_id).unwrap().is_empty());

    let report = harness.state.dispatcher.dispatch(registration.outbox).await;
    assert!(report.is_complete());
    assert_eq!(report.delivered, 2);

    let audit = harness.store.list_audit(&user_id).unwrap();
    assert_eq!(audit.len(), 1);
    assert_eq!(audit[0].action, "user_registered");
    assert_eq!(audit[0].details["plan"], "FREE");
}

#[tokio::test]
async fn registration_reports_every_invalid_field() {
    let harness = TestHarness::new();

    let err = accounts::register_user(
        &harness.state,
        RegisterUserRequest {
            name: "  ".into(),
            email: "not-an-email".into(),
            password: "curta".into(),
            document: "123".into(),
        },
    )
    .await
    .unwrap_err();

    let ServiceError::Validation(errors) = err else {
        panic!("expected validation error, got {err:?}");
    };
    let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
    assert_eq!(fields, ["name", "email", "password", "document"]);
}

#[tokio::test]
async fn duplicate_email_conflicts() {
    let harness = TestHarness::new();
    harness.register("maria@example.com", "12345678909").await;

    let err = accounts::register_user(
        &harness.state,
        registration("MARIA@example.com", "98765432100"),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ServiceError::Conflict(_)));
    assert_eq!(err.code(), "conflict");
}

#[tokio::test]
async fn duplicate_document_conflicts() {
    let harness = TestHarness::new();
    harness.register("maria@example.com", "12345678909").await;

    let err = accounts::register_user(
        &harness.state,
        registration("outra@example.com", "123.456.789-09"),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ServiceError::Conflict(_)));
}

// ============================================================================
// Context and profile
// ============================================================================

#[tokio::test]
async fn context_for_unknown_user_is_not_found() {
    let harness = TestHarness::new();

    let err = RequestContext::resolve(&harness.state, UserId::generate()).unwrap_err();

    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn get_profile_of_acting_user() {
    let harness = TestHarness::new();
    let user_id = harness.register_default().await;
    let ctx = RequestContext::resolve(&harness.state, user_id).unwrap();

    let profile = accounts::get_profile(&harness.state, &ctx).await.unwrap();

    assert_eq!(profile.user_id, user_id.to_string());
    assert_eq!(ctx.actor.plan, Plan::Free);
}

// ============================================================================
// Plan changes
// ============================================================================

#[tokio::test]
async fn upgrade_to_pro_emits_audit() {
    let harness = TestHarness::new();
    let user_id = harness.register_default().await;
    let ctx = harness.ctx(user_id, mid_october());

    let change = accounts::change_plan(
        &harness.state,
        &ctx,
        ChangePlanRequest { plan: Plan::Pro },
    )
    .await
    .unwrap();

    assert_eq!(change.user.plan, Plan::Pro);
    assert_eq!(change.outbox.len(), 1);

    harness.state.dispatcher.dispatch(change.outbox).await;
    let audit = harness.store.list_audit(&user_id).unwrap();
    assert_eq!(audit[0].action, "plan_changed");
    assert_eq!(audit[0].details["from"], "FREE");
    assert_eq!(audit[0].details["to"], "PRO");
    assert_eq!(audit[0].recorded_at, mid_october());
}

#[tokio::test]
async fn unchanged_plan_is_a_no_op() {
    let harness = TestHarness::new();
    let user_id = harness.register_default().await;
    let ctx = harness.ctx(user_id, mid_october());

    let change = accounts::change_plan(
        &harness.state,
        &ctx,
        ChangePlanRequest { plan: Plan::Free },
    )
    .await
    .unwrap();

    assert!(change.outbox.is_empty());
}

// ============================================================================
// Dispatch with a custom mailer
// ============================================================================

struct DownMailer {
    attempts: AtomicUsize,
}

#[async_trait]
impl Mailer for DownMailer {
    async fn send_welcome(&self, _to: &str, _name: &str) -> Result<(), DispatchError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(DispatchError("mail server down".into()))
    }
}

#[tokio::test]
async fn failing_mailer_still_writes_audit() {
    let mailer = Arc::new(DownMailer {
        attempts: AtomicUsize::new(0),
    });
    let mut harness = TestHarness::new();
    harness.state = harness.state.clone().with_mailer(mailer.clone());

    let registration =
        accounts::register_user(&harness.state, registration("maria@example.com", "12345678909"))
            .await
            .unwrap();
    let user_id: UserId = registration.user.user_id.parse().unwrap();

    let report = harness.state.dispatcher.dispatch(registration.outbox).await;

    assert_eq!(report.delivered, 1);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(mailer.attempts.load(Ordering::SeqCst), 3);
    assert_eq!(harness.store.list_audit(&user_id).unwrap().len(), 1);
    assert!(matches!(
        report.into_result(),
        Err(ServiceError::Dispatch(_))
    ));
}

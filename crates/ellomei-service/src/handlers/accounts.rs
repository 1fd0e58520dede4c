//! Account management operations.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use ellomei_core::account::digits_only;
use ellomei_core::{Plan, TaxDocument, User};

use crate::context::RequestContext;
use crate::error::{Result, ServiceError};
use crate::outbox::{FollowUp, Outbox};
use crate::state::AppState;
use crate::validation::FieldCheck;

/// User response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserResponse {
    /// User ID.
    pub user_id: String,
    /// Display name.
    pub name: String,
    /// Email.
    pub email: String,
    /// `cpf` or `cnpj`.
    pub document_type: String,
    /// Current plan.
    pub plan: Plan,
    /// Created timestamp.
    pub created_at: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id.to_string(),
            name: user.name.clone(),
            email: user.email.clone(),
            document_type: user.document.kind().to_string(),
            plan: user.plan,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// Registration request.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterUserRequest {
    /// Display name.
    pub name: String,
    /// Email.
    pub email: String,
    /// Password. Only checked against the password rule here; credential
    /// storage belongs to the authentication layer.
    pub password: String,
    /// CPF or CNPJ, with or without punctuation.
    pub document: String,
}

/// Result of a registration: the new user and its follow-ups.
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    /// The registered user.
    pub user: UserResponse,
    /// Welcome email, then audit record.
    pub outbox: Outbox,
}

/// Register a new user on the FREE plan.
pub async fn register_user(state: &AppState, body: RegisterUserRequest) -> Result<Registration> {
    let document_rule = if digits_only(&body.document).len() == 14 {
        "cnpj"
    } else {
        "cpf"
    };

    state
        .validators
        .check(&[
            FieldCheck::new("name", "required", &body.name),
            FieldCheck::new("email", "email", &body.email),
            FieldCheck::new("password", "password", &body.password),
            FieldCheck::new("document", document_rule, &body.document),
        ])
        .map_err(ServiceError::Validation)?;

    let document = TaxDocument::parse(&body.document)?;
    let user = User::new(body.name.trim().to_string(), &body.email, document, Utc::now());

    state.store.insert_user(&user)?;

    tracing::info!(
        user_id = %user.id,
        document_type = user.document.kind(),
        "User registered"
    );

    let mut outbox = Outbox::new();
    outbox.push(FollowUp::SendWelcomeEmail {
        user_id: user.id,
        name: user.name.clone(),
        email: user.email.clone(),
    });
    outbox.push(FollowUp::WriteAuditRecord {
        user_id: user.id,
        action: "user_registered".into(),
        details: serde_json::json!({
            "plan": user.plan,
            "document_type": user.document.kind(),
        }),
        at: user.created_at,
    });

    Ok(Registration {
        user: UserResponse::from(&user),
        outbox,
    })
}

/// Get the acting user's profile.
pub async fn get_profile(state: &AppState, ctx: &RequestContext) -> Result<UserResponse> {
    let user = state
        .store
        .get_user(&ctx.actor.user_id)?
        .ok_or_else(|| ServiceError::NotFound("User not found".into()))?;

    Ok(UserResponse::from(&user))
}

/// Change plan request.
#[derive(Debug, Clone, Deserialize)]
pub struct ChangePlanRequest {
    /// Target plan.
    pub plan: Plan,
}

/// Result of a plan change.
#[derive(Debug, Clone, Serialize)]
pub struct PlanChange {
    /// The updated user.
    pub user: UserResponse,
    /// Audit record, or nothing if the plan was unchanged.
    pub outbox: Outbox,
}

/// Move the acting user to another plan. Unchanged plans are a no-op.
pub async fn change_plan(
    state: &AppState,
    ctx: &RequestContext,
    body: ChangePlanRequest,
) -> Result<PlanChange> {
    let user = state
        .store
        .get_user(&ctx.actor.user_id)?
        .ok_or_else(|| ServiceError::NotFound("User not found".into()))?;

    if user.plan == body.plan {
        return Ok(PlanChange {
            user: UserResponse::from(&user),
            outbox: Outbox::new(),
        });
    }

    let from = user.plan;
    let user = state.store.update_plan(&user.id, body.plan, ctx.now)?;

    tracing::info!(user_id = %user.id, from = %from, to = %user.plan, "Plan changed");

    let mut outbox = Outbox::new();
    outbox.push(FollowUp::WriteAuditRecord {
        user_id: user.id,
        action: "plan_changed".into(),
        details: serde_json::json!({ "from": from, "to": user.plan }),
        at: ctx.now,
    });

    Ok(PlanChange {
        user: UserResponse::from(&user),
        outbox,
    })
}

//! Account types for ElloMEI.
//!
//! This module defines registered users, the entries they record and the
//! audit trail kept for account events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AuditId, EntryId, MeiError, Plan, UserId};

/// A registered micro-entrepreneur.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// The user ID.
    pub id: UserId,

    /// Display name.
    pub name: String,

    /// Login and contact email, stored lower-cased.
    pub email: String,

    /// CPF or CNPJ, digits only.
    pub document: TaxDocument,

    /// Current subscription plan.
    pub plan: Plan,

    /// When the user registered.
    pub created_at: DateTime<Utc>,

    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user on the FREE plan.
    #[must_use]
    pub fn new(name: String, email: &str, document: TaxDocument, now: DateTime<Utc>) -> Self {
        Self {
            id: UserId::generate(),
            name,
            email: email.trim().to_lowercase(),
            document,
            plan: Plan::Free,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Brazilian taxpayer document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "number")]
pub enum TaxDocument {
    /// Individual taxpayer number (11 digits).
    Cpf(String),

    /// Company taxpayer number (14 digits).
    Cnpj(String),
}

impl TaxDocument {
    /// Build a document from user input, keeping only its digits.
    ///
    /// The kind is decided by digit count. Check digits are not verified.
    ///
    /// # Errors
    ///
    /// Returns `MeiError::InvalidArgument` unless the input has 11 or 14 digits.
    pub fn parse(input: &str) -> crate::Result<Self> {
        let digits = digits_only(input);
        match digits.len() {
            11 => Ok(Self::Cpf(digits)),
            14 => Ok(Self::Cnpj(digits)),
            n => Err(MeiError::invalid_argument(
                "document",
                format!("expected 11 (CPF) or 14 (CNPJ) digits, got {n}"),
            )),
        }
    }

    /// The digits of the document.
    #[must_use]
    pub fn digits(&self) -> &str {
        match self {
            Self::Cpf(d) | Self::Cnpj(d) => d,
        }
    }

    /// Short kind label.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Cpf(_) => "cpf",
            Self::Cnpj(_) => "cnpj",
        }
    }
}

/// Strip everything but ASCII digits.
#[must_use]
pub fn digits_only(input: &str) -> String {
    input.chars().filter(char::is_ascii_digit).collect()
}

/// Whether an entry is money in or money out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Revenue ("receita").
    Income,
    /// Expense ("despesa").
    Expense,
}

/// A bookkeeping entry ("lançamento"). Each one counts against the plan quota.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Entry ID (time-ordered).
    pub id: EntryId,

    /// Owner.
    pub user_id: UserId,

    /// Income or expense.
    pub kind: EntryKind,

    /// Free-text description.
    pub description: String,

    /// Amount in centavos, always positive.
    pub amount_cents: i64,

    /// When the entry was recorded.
    pub occurred_at: DateTime<Utc>,
}

impl Entry {
    /// Create a new entry.
    #[must_use]
    pub fn new(
        user_id: UserId,
        kind: EntryKind,
        description: String,
        amount_cents: i64,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: EntryId::generate(),
            user_id,
            kind,
            description,
            amount_cents,
            occurred_at,
        }
    }
}

/// An audit trail record for an account event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Record ID.
    pub id: AuditId,

    /// The user the event concerns.
    pub user_id: UserId,

    /// Event name (e.g. `user_registered`).
    pub action: String,

    /// Event details.
    pub details: serde_json::Value,

    /// When the record was written.
    pub recorded_at: DateTime<Utc>,
}

impl AuditRecord {
    /// Create a new audit record.
    #[must_use]
    pub fn new(
        user_id: UserId,
        action: impl Into<String>,
        details: serde_json::Value,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: AuditId::generate(),
            user_id,
            action: action.into(),
            details,
            recorded_at,
        }
    }
}

//! Core types and utilities for ElloMEI.
//!
//! This crate provides the foundational types used throughout the ElloMEI backend:
//!
//! - **Identifiers**: `UserId`, `AuditId`, `EntryId`
//! - **Accounts**: `User`, `TaxDocument`, `Entry`, `AuditRecord`
//! - **Plans**: `Plan`, `PlanLimits`
//! - **Periods**: `BillingPeriod`
//! - **Usage**: `UsageSnapshot`, `UsageMetrics`, `evaluate`
//!
//! # Usage metrics
//!
//! FREE accounts may record a fixed number of entries ("lançamentos") per
//! calendar month; PRO accounts are unlimited. [`usage::evaluate`] turns a
//! point-in-time [`UsageSnapshot`] into the percentage, threshold flags and
//! presentation hints shown on the dashboard. Percentages are computed with
//! decimal arithmetic and rounded half-up to two places.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod account;
pub mod error;
pub mod ids;
pub mod period;
pub mod plan;
pub mod usage;

pub use account::{AuditRecord, Entry, EntryKind, TaxDocument, User};
pub use error::{MeiError, Result};
pub use ids::{AuditId, EntryId, IdError, UserId};
pub use period::BillingPeriod;
pub use plan::{Plan, PlanLimits, DEFAULT_FREE_MONTHLY_QUOTA};
pub use usage::{
    evaluate, ProgressColor, StatusIcon, UsageMetrics, UsageSnapshot, NEAR_LIMIT_PERCENT,
};

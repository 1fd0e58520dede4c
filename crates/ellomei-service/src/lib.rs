//! ElloMEI application service.
//!
//! This crate provides the operations behind the ElloMEI backend, including:
//!
//! - User registration with explicit validation rules
//! - Plan changes (FREE / PRO)
//! - Entry recording with plan-limit enforcement
//! - Usage metrics for the dashboard
//!
//! # Request flow
//!
//! 1. Resolve a [`RequestContext`] once for the acting user.
//! 2. Call an operation from [`handlers`] with the [`AppState`] and the context.
//! 3. If the operation returned an [`Outbox`], hand it to the
//!    [`OutboxDispatcher`] after the result has been delivered.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::unused_async)]

pub mod config;
pub mod context;
pub mod error;
pub mod handlers;
pub mod outbox;
pub mod state;
pub mod telemetry;
pub mod validation;

pub use config::ServiceConfig;
pub use context::{ActingUser, RequestContext};
pub use error::{Result, ServiceError};
pub use outbox::{
    AuditSink, DispatchError, DispatchReport, FollowUp, LogMailer, Mailer, Outbox,
    OutboxDispatcher, StoreAuditSink,
};
pub use state::AppState;
pub use validation::{FieldCheck, FieldError, ValidatorRegistry};

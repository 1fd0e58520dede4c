//! Service operations.
//!
//! Each operation takes the shared [`AppState`](crate::AppState) and, when it
//! acts on behalf of a user, an explicit [`RequestContext`](crate::RequestContext).

pub mod accounts;
pub mod entries;
pub mod usage;

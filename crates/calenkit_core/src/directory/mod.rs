//! Seams to collaborators that live outside the calendar core.
//!
//! # Responsibility
//! - Resolve member ids through a `MemberDirectory`.
//! - Hand invitation emails to an `EmailDispatcher` without knowing transport.

pub mod email;
pub mod member;

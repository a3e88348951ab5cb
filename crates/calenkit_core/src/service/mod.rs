//! Calendar use-case services.
//!
//! # Responsibility
//! - Compose schedule, team and alarm repositories into use-case APIs.
//! - Keep callers decoupled from SQLite details.
//!
//! Leaves first: `schedule_store`, `team_manager`, `alarm_engine`, then
//! `calendar_facade` which orchestrates all three.

pub mod alarm_engine;
pub mod calendar_facade;
pub mod error;
pub mod invitation;
pub mod schedule_store;
pub mod team_manager;

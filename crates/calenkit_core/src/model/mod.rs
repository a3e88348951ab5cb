//! Domain model for shared schedules, team shares and alarms.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep enum encodings (status, level, alarm kind) in one place.
//!
//! # Invariants
//! - Schedules are identified by a stable, never reused `ScheduleNo`.
//! - Recycling is a status flag; only hard delete removes a schedule row.
//! - Alarm visibility is derived from schedule state, never stored.

pub mod alarm;
pub mod member;
pub mod schedule;
pub mod team;

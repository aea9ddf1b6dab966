//! Journal domain model shared by every storage backend.
//!
//! # Responsibility
//! - Define the canonical entity shapes (notes, goals, subtasks, stats).
//! - Own the validation and XP-normalization rules so the two hosting
//!   modes cannot diverge on business semantics.
//!
//! # Invariants
//! - Every entity is identified by a stable `EntryId`.
//! - Exactly one `UserStats` record exists per store; it is never deleted.

pub mod journal;
pub mod stats;

//! Journal use-case services.
//!
//! # Responsibility
//! - Orchestrate store calls into use-case level APIs.
//! - Hold the business rules (input validation, XP crediting) in one
//!   place so both storage backends behave identically.

pub mod journal_service;

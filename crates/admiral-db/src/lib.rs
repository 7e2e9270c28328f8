//! Admiral DB — repository implementations.
//!
//! The store behind the dashboard is reached exclusively through the
//! traits in `admiral_core::repository`. This crate ships the
//! in-memory implementations used for tests and single-process
//! deployments; a SQL-backed implementation plugs into the same traits
//! without touching the action layer.

pub mod memory;

pub use memory::{MemoryAuditLogRepository, MemoryUserRepository};

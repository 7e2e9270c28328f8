//! Admiral Core — shared domain types for the admin dashboard.
//!
//! This crate holds everything the feature crates agree on: the error
//! taxonomy ([`error::AppError`]), the action-result envelope returned
//! by every mutating entry point ([`action::ActionState`]), pagination
//! normalization, environment configuration, and the repository traits
//! the data store must implement.

pub mod action;
pub mod config;
pub mod error;
pub mod models;
pub mod pagination;
pub mod repository;
pub mod validation;

pub use action::{ActionState, ActionStatus};
pub use error::{AppError, AppResult, FieldErrors};

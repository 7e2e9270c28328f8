//! Admiral Users — the user management feature.
//!
//! Mutations (create, update, delete) run through the action-result
//! protocol: permission gate, schema validation, store mutation,
//! best-effort audit record, one [`ActionState`] out. Listing runs
//! through pagination normalization and search filter construction.
//!
//! [`ActionState`]: admiral_core::action::ActionState

pub mod actions;
pub mod audit;
pub mod queries;
pub mod schemas;

pub use actions::UserService;
pub use queries::{UserListQuery, UsersResponse, build_user_search_filter, get_users};

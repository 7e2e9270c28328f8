//! Domain models shared across the workspace.

pub mod audit;
pub mod session;
pub mod user;

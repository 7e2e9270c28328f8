//! Admiral Auth — credential verification, secret encryption at rest,
//! the throttled login action, and permission gates for mutations.

pub mod crypto;
pub mod login;
pub mod password;
pub mod permissions;
pub mod service;

pub use login::{LoginInput, login_action};
pub use permissions::{require_admin, require_session};
pub use service::Authenticator;
